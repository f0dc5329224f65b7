//! Custom validation rules shared by request DTOs.

use std::borrow::Cow;

use validator::ValidationError;

use crate::domain::{Password, TransactionStatus};

/// Value must be one of the transaction status spellings.
pub fn validate_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<TransactionStatus>()
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("in").with_message(Cow::Borrowed("The selected status is invalid."))
        })
}

/// Password strength policy.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    match Password::strength_violation(password) {
        Some(problem) => Err(ValidationError::new("password").with_message(Cow::Owned(problem))),
        None => Ok(()),
    }
}

/// Loose boolean flag as sent by form-style clients (`1`, `true`, `yes`, `on`).
pub fn is_truthy(value: Option<&str>) -> bool {
    value
        .map(|v| v.trim().to_ascii_lowercase())
        .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_rule() {
        assert!(validate_status("SHIPPING").is_ok());
        let err = validate_status("LOST").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("The selected status is invalid."));
    }

    #[test]
    fn test_password_rule() {
        assert!(validate_password_strength("longenough").is_ok());
        assert!(validate_password_strength("short").is_err());
    }

    #[test]
    fn test_truthy_flags() {
        for value in ["1", "true", "TRUE", "yes", "On"] {
            assert!(is_truthy(Some(value)), "{value} should be truthy");
        }
        for value in ["0", "false", "no", "", "maybe"] {
            assert!(!is_truthy(Some(value)), "{value} should be falsy");
        }
        assert!(!is_truthy(None));
    }
}
