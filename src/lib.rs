//! # wingman
//!
//! A library for matching accountability partners by weekly-goal
//! compatibility.
//!
//! People stick to their goals better with a partner checking in on them.
//! Given short free-text biographies describing what each person wants to
//! work on, `wingman` scores how compatible two people's goals are, ranks
//! the best available partners for a user, and manages the partnership
//! lifecycle end to end: direct requests between registered users,
//! accept/reject, unmatch, and tokenized email invitations for people who
//! have not signed up yet.
//!
//! ## Features
//!
//! - **Keyword-category scoring**: Bios are mapped onto goal categories
//!   (fitness, career, creative, ...) and compared by category overlap
//! - **Word-overlap scoring**: A second signal from shared significant
//!   words, so similar phrasing counts even across categories
//! - **Top-N match finding**: Ranks every unpartnered user for a requester
//! - **Partnership state machine**: One partner per user, one pending
//!   request per pair, receiver-only accept/reject
//! - **Email invitations**: Single-use 256-bit tokens that auto-pair the
//!   inviter with the invitee on registration
//!
//! ## Example
//!
//! ```rust
//! use wingman::matching::finder::MatchFinder;
//! use wingman::matching::taxonomy::KeywordTaxonomy;
//! use wingman::partnership::PartnershipManager;
//! use wingman::partnership::store::PartnerStore;
//! use wingman::core::profile::NewUser;
//! use std::sync::Arc;
//!
//! let manager = PartnershipManager::new(Arc::new(PartnerStore::new()));
//!
//! let alice = manager
//!     .register_user(
//!         &NewUser {
//!             name: "Alice".to_string(),
//!             email: "alice@example.com".to_string(),
//!             bio: Some("train for a marathon and eat healthy".to_string()),
//!         },
//!         None,
//!     )
//!     .unwrap();
//!
//! let (requester, candidates) = manager.suggestion_pool(&alice.user.id).unwrap();
//!
//! let taxonomy = KeywordTaxonomy::load_embedded().unwrap();
//! let finder = MatchFinder::new(&taxonomy);
//! let matches = finder.find_top_matches(&requester.id, requester.bio.as_deref(), &candidates, 3);
//!
//! for m in matches {
//!     println!("{}: {}/100", m.candidate.name, m.score.value);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: User records, profiles, and identifier types
//! - [`matching`]: Compatibility scoring and top-N match finding
//! - [`partnership`]: Partnership state machine, storage, and invitations
//! - [`email`]: Fire-and-forget invitation delivery
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: HTTP API server

pub mod cli;
pub mod core;
pub mod email;
pub mod matching;
pub mod partnership;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use crate::core::profile::{NewUser, UserProfile, UserRecord};
pub use crate::core::types::*;
pub use matching::finder::{Candidate, MatchFinder, ScoredMatch};
pub use matching::taxonomy::KeywordTaxonomy;
pub use partnership::{PartnerStore, PartnershipError, PartnershipManager};
