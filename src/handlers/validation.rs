//! Declarative field validation for request bodies. Messages follow the
//! `field <Name> is a required field` convention; handlers collect all
//! failures into one 400 response.

use crate::error::ApiError;

pub(crate) fn required_message(field: &str) -> String {
    format!("field {field} is a required field")
}

pub(crate) fn invalid_message(field: &str) -> String {
    format!("field {field} is not valid")
}

/// A required string field: must be present and non-empty.
pub(crate) fn require_string(
    value: Option<&str>,
    field: &str,
    errors: &mut Vec<String>,
) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            errors.push(required_message(field));
            String::new()
        }
    }
}

/// A required numeric field: must be present.
pub(crate) fn require_f64(value: Option<f64>, field: &str, errors: &mut Vec<String>) -> f64 {
    match value {
        Some(v) => v,
        None => {
            errors.push(required_message(field));
            0.0
        }
    }
}

pub(crate) fn require_i64(value: Option<i64>, field: &str, errors: &mut Vec<String>) -> i64 {
    match value {
        Some(v) => v,
        None => {
            errors.push(required_message(field));
            0
        }
    }
}

/// Finish a validation pass: any collected message fails the request.
pub(crate) fn finish(errors: Vec<String>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(errors))
    }
}
