//! Input validation helpers shared by handlers.
//!
//! All failures are [`CoreError::Validation`] so they surface as 400 before
//! any storage call is made.

use validator::ValidateEmail;

use crate::error::CoreError;
use crate::types::Date;

/// Minimum accepted password length for new or reset passwords.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Require a non-blank string. Returns the trimmed value.
pub fn require_non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

/// Like [`require_non_empty`] but only when the value is present.
pub fn require_non_empty_opt(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) => require_non_empty(field, v).map(|_| ()),
        None => Ok(()),
    }
}

/// When both ends of a publish window are given, the start must not be
/// after the end.
pub fn validate_publish_window(start: Option<Date>, end: Option<Date>) -> Result<(), CoreError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(CoreError::Validation(format!(
            "published_start ({start}) must not be after published_end ({end})"
        ))),
        _ => Ok(()),
    }
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.to_string().validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("'{email}' is not a valid email address")))
    }
}

pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
