//! Core data types for users, pairs, and lifecycle states.

pub mod profile;
pub mod types;
