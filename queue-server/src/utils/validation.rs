//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen as reasonable UX limits for names, notes and contact
//! fields; the embedded store has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: shop, queue, customer, service, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, comments
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone numbers etc.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Shape-check an optional email address (local part + `@` + domain).
pub fn validate_optional_email(value: &Option<String>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value {
        if v.len() > MAX_EMAIL_LEN {
            return Err(AppError::validation(format!(
                "{field} is too long ({} chars, max {MAX_EMAIL_LEN})",
                v.len()
            )));
        }
        let mut parts = v.splitn(2, '@');
        let local = parts.next().unwrap_or("");
        let domain = parts.next().unwrap_or("");
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(AppError::validation(format!(
                "{field} is not a valid email address"
            )));
        }
    }
    Ok(())
}

/// Validate a rating value (1-5 inclusive).
pub fn validate_rating(value: i64, field: &str) -> Result<(), AppError> {
    if !(1..=5).contains(&value) {
        return Err(AppError::validation(format!(
            "{field} must be between 1 and 5"
        )));
    }
    Ok(())
}
