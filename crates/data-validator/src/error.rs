//! Validation Error Types

use thiserror::Error;

/// Errors raised while validating a single form field.
///
/// Every variant names the offending field so the caller can point the
/// user at it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Required field absent and no default declared
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Value could not be read as a finite number
    #[error("{field}: '{value}' is not a valid number")]
    InvalidNumber { field: String, value: String },

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Coded value not among the allowed codes
    #[error("{field}: {value} is not one of [{}]", join_codes(allowed))]
    InvalidChoice {
        field: String,
        value: f64,
        allowed: Vec<f64>,
    },

    /// Label not among the declared categories
    #[error("{field}: '{value}' is not one of [{}]", allowed.join(", "))]
    UnknownCategory {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
}

impl ValidationError {
    /// Name of the field that failed
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidNumber { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidChoice { field, .. }
            | ValidationError::UnknownCategory { field, .. } => field,
        }
    }
}

fn join_codes(codes: &[f64]) -> String {
    codes.iter().map(f64::to_string).collect::<Vec<_>>().join(", ")
}

/// A column whose reference range has zero width.
///
/// Not a request failure: callers substitute the neutral value instead.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Degenerate scaling range [{lower}, {upper}]")]
pub struct ScalingDegenerate {
    pub lower: f64,
    pub upper: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_accessor() {
        let err = ValidationError::InvalidNumber {
            field: "age".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(err.field(), "age");
        assert_eq!(ValidationError::MissingField("bmi".into()).field(), "bmi");
    }

    #[test]
    fn test_unknown_category_message() {
        let err = ValidationError::UnknownCategory {
            field: "gender".to_string(),
            value: "Other".to_string(),
            allowed: vec!["Male".to_string(), "Female".to_string()],
        };
        assert_eq!(err.to_string(), "gender: 'Other' is not one of [Male, Female]");
    }
}
