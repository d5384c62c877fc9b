//! Field Validation and Coercion

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A single user-supplied scalar, as produced by a form widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Checkbox or radio rendered as true/false
    Bool(bool),
    /// Numeric picker or slider value
    Number(f64),
    /// Text input or selected label
    Text(String),
    /// Widget left unset
    Null,
}

impl RawValue {
    /// Whether the widget was left empty
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Canonical label form, used for category matching.
    ///
    /// Booleans read as `"True"`/`"False"`; `-0` reads as `"0"`.
    pub fn as_label(&self) -> Cow<'_, str> {
        match self {
            RawValue::Bool(true) => Cow::Borrowed("True"),
            RawValue::Bool(false) => Cow::Borrowed("False"),
            RawValue::Number(n) if *n == 0.0 => Cow::Borrowed("0"),
            RawValue::Number(n) => Cow::Owned(n.to_string()),
            RawValue::Text(s) => Cow::Borrowed(s.as_str()),
            RawValue::Null => Cow::Borrowed(""),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_label())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Inclusive numeric bounds; either side may be unbounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default = "neg_infinity", skip_serializing_if = "is_unbounded")]
    pub min: f64,
    #[serde(default = "infinity", skip_serializing_if = "is_unbounded")]
    pub max: f64,
}

fn is_unbounded(value: &f64) -> bool {
    value.is_infinite()
}

fn neg_infinity() -> f64 {
    f64::NEG_INFINITY
}

fn infinity() -> f64 {
    f64::INFINITY
}

impl Bounds {
    /// Closed range [min, max]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Lower bound only
    pub fn at_least(min: f64) -> Self {
        Self::new(min, f64::INFINITY)
    }

    /// Upper bound only
    pub fn at_most(max: f64) -> Self {
        Self::new(f64::NEG_INFINITY, max)
    }

    /// Whether the value lies inside the bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Whether min <= max
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Read a raw value as a finite number
pub fn coerce_number(field: &str, raw: &RawValue) -> Result<f64, ValidationError> {
    let parsed = match raw {
        RawValue::Number(n) => Some(*n),
        RawValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        RawValue::Text(s) => s.trim().parse::<f64>().ok(),
        RawValue::Null => None,
    };

    match parsed {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Validate a single value against its bounds
pub fn validate_range(field: &str, value: f64, bounds: Bounds) -> Result<(), ValidationError> {
    if bounds.contains(value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min: bounds.min,
            max: bounds.max,
        })
    }
}

/// Check a coded numeric value against its allowed codes
pub fn match_choice(field: &str, value: f64, choices: &[f64]) -> Result<(), ValidationError> {
    if choices.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidChoice {
            field: field.to_string(),
            value,
            allowed: choices.to_vec(),
        })
    }
}

/// Position of the raw label among the declared categories
pub fn match_category<S: AsRef<str>>(
    field: &str,
    raw: &RawValue,
    categories: &[S],
) -> Result<usize, ValidationError> {
    let label = raw.as_label();
    categories
        .iter()
        .position(|c| c.as_ref() == label.as_ref())
        .ok_or_else(|| ValidationError::UnknownCategory {
            field: field.to_string(),
            value: label.into_owned(),
            allowed: categories.iter().map(|c| c.as_ref().to_string()).collect(),
        })
}

/// Result of validating a whole submission
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// Build from collected errors
    pub fn from_errors(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        if errors.is_empty() {
            Self::valid(fields_checked)
        } else {
            Self::invalid(errors, fields_checked)
        }
    }

    /// Fields that failed, in schema order
    pub fn failed_fields(&self) -> Vec<&str> {
        self.errors.iter().map(ValidationError::field).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("age", &RawValue::Number(45.0)), Ok(45.0));
        assert_eq!(coerce_number("age", &" 45.5 ".into()), Ok(45.5));
    }

    #[test]
    fn test_coerce_rejects_text() {
        let err = coerce_number("age", &"abc".into()).unwrap_err();
        assert_eq!(err.field(), "age");
        assert!(matches!(err, ValidationError::InvalidNumber { .. }));
    }

    #[test]
    fn test_coerce_rejects_non_finite() {
        assert!(coerce_number("glucose", &"NaN".into()).is_err());
        assert!(coerce_number("glucose", &"inf".into()).is_err());
        assert!(coerce_number("glucose", &RawValue::Number(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_valid_range() {
        let bounds = Bounds::new(0.0, 122.0);
        assert!(validate_range("age", 0.0, bounds).is_ok());
        assert!(validate_range("age", 65.0, bounds).is_ok());
        assert!(validate_range("age", 122.0, bounds).is_ok());
    }

    #[test]
    fn test_invalid_range() {
        let bounds = Bounds::new(0.0, 30.0);
        assert!(validate_range("mmse", -1.0, bounds).is_err());
        assert!(validate_range("mmse", 31.0, bounds).is_err());
    }

    #[test]
    fn test_one_sided_bounds() {
        let bounds = Bounds::at_least(1.0);
        assert!(validate_range("chol", 1.0, bounds).is_ok());
        assert!(validate_range("chol", 1e9, bounds).is_ok());
        assert!(validate_range("chol", 0.5, bounds).is_err());
        assert!(Bounds::at_most(5.0).contains(-1e9));
    }

    #[test]
    fn test_match_category() {
        let categories = ["Male", "Female"];
        assert_eq!(match_category("gender", &"Female".into(), &categories), Ok(1));
        assert_eq!(match_category("gender", &"Male".into(), &categories), Ok(0));
    }

    #[test]
    fn test_match_category_is_exact() {
        let categories = ["Male", "Female"];
        let err = match_category("gender", &"female".into(), &categories).unwrap_err();
        assert_eq!(err.field(), "gender");
        assert!(match_category("gender", &"Other".into(), &categories).is_err());
    }

    #[test]
    fn test_match_numeric_label() {
        let categories = ["0", "1", "2", "3"];
        assert_eq!(match_category("ca", &RawValue::Number(3.0), &categories), Ok(3));
        assert!(match_category("ca", &RawValue::Number(2.5), &categories).is_err());
    }

    #[test]
    fn test_negative_zero_label() {
        let categories = ["0", "1", "2"];
        assert_eq!(RawValue::Number(-0.0).as_label(), "0");
        assert_eq!(match_category("apoe4", &RawValue::Number(-0.0), &categories), Ok(0));
    }

    #[test]
    fn test_bool_matches_python_labels() {
        let categories = ["True", "False"];
        assert_eq!(match_category("imputed_genotype", &true.into(), &categories), Ok(0));
        assert_eq!(match_category("imputed_genotype", &false.into(), &categories), Ok(1));
        assert_eq!(coerce_number("fbs", &true.into()), Ok(1.0));
    }

    #[test]
    fn test_null_is_blank() {
        assert!(RawValue::Null.is_blank());
        assert!(RawValue::from("  ").is_blank());
        assert!(!RawValue::Number(0.0).is_blank());
        assert!(coerce_number("age", &RawValue::Null).is_err());
    }

    #[test]
    fn test_match_choice() {
        let codes = [0.0, 1.0, 2.0, 3.0];
        assert!(match_choice("cp", 2.0, &codes).is_ok());
        let err = match_choice("cp", 2.7, &codes).unwrap_err();
        assert_eq!(err.field(), "cp");
        assert_eq!(err.to_string(), "cp: 2.7 is not one of [0, 1, 2, 3]");
    }

    #[test]
    fn test_raw_value_from_json() {
        let values: Vec<RawValue> =
            serde_json::from_str(r#"[45, 1.5, "Female", true, null]"#).unwrap();
        assert_eq!(values[0], RawValue::Number(45.0));
        assert_eq!(values[1], RawValue::Number(1.5));
        assert_eq!(values[2], RawValue::Text("Female".to_string()));
        assert_eq!(values[3], RawValue::Bool(true));
        assert_eq!(values[4], RawValue::Null);
    }

    #[test]
    fn test_validation_result() {
        let result = ValidationResult::from_errors(Vec::new(), 3);
        assert!(result.valid);

        let result = ValidationResult::from_errors(
            vec![ValidationError::MissingField("age".into())],
            3,
        );
        assert!(!result.valid);
        assert_eq!(result.fields_checked, 3);
        assert_eq!(result.failed_fields(), vec!["age"]);
    }
}
