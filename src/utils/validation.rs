//! Centralized input validation helpers.

/// Maximum accepted biography length in bytes
pub const MAX_BIO_LENGTH: usize = 2_000;

/// Maximum accepted display-name length in bytes
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum accepted email length in bytes (RFC 5321 limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Input validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Name too long: exceeds {MAX_NAME_LENGTH} characters")]
    NameTooLong,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Email too long: exceeds {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,
    #[error("Bio too long: exceeds {MAX_BIO_LENGTH} characters")]
    BioTooLong,
}

/// Check that a string looks like an email address.
///
/// Intentionally loose: one `@`, a non-empty local part, and a domain
/// containing a dot, with no whitespace or control characters anywhere.
/// Deliverability is the mail layer's problem.
///
/// # Examples
///
/// ```
/// use wingman::utils::validation::is_valid_email;
///
/// assert!(is_valid_email("pat@example.com"));
/// assert!(!is_valid_email("not-an-email"));
/// assert!(!is_valid_email("two@at@signs.com"));
/// ```
#[must_use]
pub fn is_valid_email(s: &str) -> bool {
    if s.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    let mut parts = s.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    // Domain needs a dot with something on both sides
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Normalize an email for storage and lookup: trimmed and lowercased.
///
/// Returns an error if the result is not a plausible email address.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`] or
/// [`ValidationError::EmailTooLong`].
pub fn normalize_email(s: &str) -> Result<String, ValidationError> {
    let normalized = s.trim().to_lowercase();
    if normalized.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    if !is_valid_email(&normalized) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(normalized)
}

/// Validate a display name.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] or
/// [`ValidationError::NameTooLong`].
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    Ok(trimmed.to_string())
}

/// Validate an optional biography, normalizing blank bios to `None`.
///
/// # Errors
///
/// Returns [`ValidationError::BioTooLong`].
pub fn validate_bio(bio: Option<&str>) -> Result<Option<String>, ValidationError> {
    match bio {
        None => Ok(None),
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if trimmed.len() > MAX_BIO_LENGTH {
                return Err(ValidationError::BioTooLong);
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@sub.example.com"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plain"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@domain.com."));
        assert!(!is_valid_email("sp ace@example.com"));
        assert!(!is_valid_email("two@at@signs.com"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Pat@Example.COM ").unwrap(),
            "pat@example.com"
        );
        assert_eq!(
            normalize_email("nope").unwrap_err(),
            ValidationError::InvalidEmail
        );
    }

    #[test]
    fn test_email_length_limit() {
        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_LENGTH));
        assert_eq!(
            normalize_email(&long).unwrap_err(),
            ValidationError::EmailTooLong
        );
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Alice ").unwrap(), "Alice");
        assert_eq!(validate_name("   ").unwrap_err(), ValidationError::EmptyName);
        assert_eq!(
            validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).unwrap_err(),
            ValidationError::NameTooLong
        );
    }

    #[test]
    fn test_validate_bio() {
        assert_eq!(validate_bio(None).unwrap(), None);
        assert_eq!(validate_bio(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_bio(Some(" running ")).unwrap(),
            Some("running".to_string())
        );
        assert_eq!(
            validate_bio(Some(&"x".repeat(MAX_BIO_LENGTH + 1))).unwrap_err(),
            ValidationError::BioTooLong
        );
    }
}
