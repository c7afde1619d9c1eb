//! Partnership state machine, storage, and invitation tokens.
//!
//! This module owns the pairing half of the crate:
//!
//! - [`PartnershipManager`]: the state machine over the unordered pair
//!   {A,B} with states unrelated / request-pending / partnered
//! - [`PartnerStore`]: in-memory relational store with transactional
//!   multi-row updates
//! - [`PartnershipError`]: the typed, recoverable error taxonomy shared by
//!   all pairing operations
//!
//! ## Invariants
//!
//! - A user has at most one partner at a time
//! - A partnership's unordered pair is stored canonically (smaller id
//!   first) and is unique
//! - At most one pending request exists between any pair, in either
//!   direction
//! - An invitation token is consumed at most once, and only by a
//!   registration whose email matches the invitation exactly
//!
//! Each operation validates and commits under a single store transaction,
//! so the invariants hold under request-parallel execution.

pub mod error;
pub mod manager;
pub mod store;
pub mod token;

pub use error::PartnershipError;
pub use manager::{AcceptedMatch, PartnershipManager, Registration, RequestView};
pub use store::{Invitation, PartnerStore, Partnership, PartnershipRequest};
