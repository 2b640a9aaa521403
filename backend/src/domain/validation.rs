//! Field validation helpers shared by record drafts.
//!
//! Failures carry the offending field and a stable code so adapters can
//! surface them as structured `invalid_request` details.

use rust_decimal::Decimal;
use serde_json::json;

use super::Error;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }
}

impl From<FieldError> for Error {
    fn from(value: FieldError) -> Self {
        Error::invalid_request(value.message)
            .with_details(json!({ "field": value.field, "code": value.code }))
    }
}

/// Upper bounds mirroring the stored column precision.
pub mod limits {
    use rust_decimal::Decimal;

    /// `NUMERIC(5,2)`
    pub const MILK_QUANTITY: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);
    /// `NUMERIC(6,2)`
    pub const SMALL_AMOUNT: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);
    /// `NUMERIC(8,2)`
    pub const AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);
    /// `NUMERIC(10,2)`
    pub const TOTAL: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    pub const SHORT_TEXT: usize = 50;
    pub const TEXT: usize = 100;
    pub const PHONE: usize = 15;
}

/// Trim `value` and require it to be non-empty and at most `max_len` chars.
pub fn required_text(field: &'static str, value: &str, max_len: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(
            field,
            "required",
            format!("{field} must not be empty"),
        ));
    }
    optional_text(field, trimmed, max_len)
}

/// Trim `value` and require it to be at most `max_len` chars.
pub fn optional_text(field: &'static str, value: &str, max_len: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max_len {
        return Err(FieldError::new(
            field,
            "too_long",
            format!("{field} must be at most {max_len} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

/// Require a non-negative amount with at most two decimal places, not above
/// `max`. Returns the amount rescaled to two places.
pub fn amount(field: &'static str, value: Decimal, max: Decimal) -> Result<Decimal, FieldError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(FieldError::new(
            field,
            "negative",
            format!("{field} must not be negative"),
        ));
    }
    if value.normalize().scale() > 2 {
        return Err(FieldError::new(
            field,
            "precision",
            format!("{field} allows at most 2 decimal places"),
        ));
    }
    if value > max {
        return Err(FieldError::new(
            field,
            "too_large",
            format!("{field} must not exceed {max}"),
        ));
    }
    let mut scaled = value.normalize();
    scaled.rescale(2);
    Ok(scaled)
}
