//! Data Validation and Normalization
//!
//! Provides field-level validation, numeric coercion, and scalar
//! normalization for form input.

mod error;
mod normalizer;
mod validator;

pub use error::{ScalingDegenerate, ValidationError};
pub use normalizer::{NormalizationMethod, Normalizer, NEUTRAL};
pub use validator::{
    coerce_number, match_category, match_choice, validate_range, Bounds, RawValue, ValidationResult,
};
