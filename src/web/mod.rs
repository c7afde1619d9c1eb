//! HTTP API for the partner-matching core, built on Axum.
//!
//! The web layer is thin glue: it authenticates the acting user, shapes
//! JSON, and maps domain errors to status codes. All pairing semantics
//! live in [`crate::partnership`]; all scoring lives in
//! [`crate::matching`].
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! wingman serve
//!
//! # Custom port, custom invitation link base
//! wingman serve --port 3000 --frontend-url https://app.example.com
//! ```
//!
//! ## API Endpoints
//!
//! - `POST /api/auth/register` - Register (optionally consuming an invite token)
//! - `GET  /api/match/suggestions` - Ranked partner suggestions
//! - `POST /api/match/request` - Send a partnership request
//! - `GET  /api/match/requests` - Pending requests, sent and received
//! - `POST /api/match/requests/{id}/accept` - Accept (receiver only)
//! - `POST /api/match/requests/{id}/reject` - Reject (receiver only)
//! - `POST /api/match/unmatch` - Dissolve the current partnership
//! - `POST /api/match/invite` - Invite an unregistered email
//! - `GET  /api/partner` - Current partner, if any
//! - `GET  /api/invitations` - Pending invitations sent by the caller
//! - `GET  /api/taxonomy` - The scoring taxonomy

pub mod server;
