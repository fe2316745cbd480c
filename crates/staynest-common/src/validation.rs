//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes.

use std::borrow::Cow;

use validator::{Validate, ValidationError};

use crate::error::StayError;

/// Validate a request body, returning a StayError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), StayError> {
    body.validate().map_err(|e| StayError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>();
    // HashMap iteration order is unstable
    messages.sort();
    messages.join("; ")
}

/// `validator` custom rule: reject strings that are empty once trimmed.
/// Required text fields pair it with `length`.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("Value cannot be blank")));
    }
    Ok(())
}

/// Clamp a client-supplied page size into `1..=max`, defaulting when absent.
pub fn page_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, max.max(1))
}
