use thiserror::Error;

use crate::utils::validation::ValidationError;

/// Domain errors for pairing operations.
///
/// All variants are expected, recoverable-by-caller conditions; none is
/// fatal to the process. Storage connectivity problems are the only fatal
/// class and surface separately as infrastructure errors at the binary
/// boundary.
#[derive(Error, Debug)]
pub enum PartnershipError {
    #[error("Already matched with a partner")]
    AlreadyPartnered,

    #[error("No partner to unmatch")]
    NoPartner,

    #[error("Partnership request already pending")]
    DuplicatePending,

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Not authorized to act on this request")]
    NotAuthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("This email is already registered")]
    EmailTaken,

    #[error("Lost a concurrent update, please retry")]
    Conflict,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
