//! Compatibility scoring and partner suggestion ranking.
//!
//! This module provides the matching half of the crate:
//!
//! - [`KeywordTaxonomy`]: the embedded goal-category taxonomy
//! - [`score_bios`]: heuristic 0-100 compatibility between two biographies
//! - [`MatchFinder`]: ranks an eligible candidate pool and returns the top N
//!
//! ## Scoring
//!
//! The final score combines two symmetric set similarities:
//!
//! 1. **Category score** (weight 0.6): Jaccard similarity of the goal
//!    categories each bio triggers, favoring intentional topical alignment
//! 2. **Word overlap** (weight 0.4): Jaccard similarity of the significant
//!    word sets, capturing incidental lexical similarity
//!
//! A small uniform jitter breaks exact ties so the finder can always produce
//! a strict ranking, and empty bios draw a moderate random score instead of
//! zero so sparse profiles are treated as neutral rather than incompatible.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wingman::matching::scoring::score_bios;
//! use wingman::matching::taxonomy::KeywordTaxonomy;
//!
//! let taxonomy = KeywordTaxonomy::load_embedded().unwrap();
//! let score = score_bios(
//!     &taxonomy,
//!     "training for a marathon, saving for a house",
//!     "gym every morning and a strict budget",
//! );
//! println!("compatibility: {}", score.value);
//! ```

pub mod finder;
pub mod scoring;
pub mod taxonomy;

pub use finder::{Candidate, MatchFinder, ScoredMatch};
pub use scoring::{score_bios, CompatibilityScore, ScoringConfig};
pub use taxonomy::KeywordTaxonomy;
