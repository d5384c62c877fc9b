//! Feature Engineering Engine
//!
//! Turns raw form input into the fixed-order numeric vector a trained model
//! expects: schema definition, one-hot encoding, and reference-statistics
//! scaling.

pub mod catalog;
mod features;
mod scaling;
mod schema;
mod statistics;

pub use features::{encode, EncodedVector, RawInput};
pub use scaling::{scale, ScaleOutcome, Scaler};
pub use schema::{Column, ColumnKind, FeatureSchema, FieldKind, FieldSpec};
pub use statistics::{ColumnStats, ReferenceStats};

pub use data_validator::{Bounds, NormalizationMethod, RawValue, ValidationError, ValidationResult};

use thiserror::Error;

/// Errors in a schema definition, caught when the schema is built
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Schema {0} declares no fields")]
    Empty(String),
    #[error("Duplicate field: {0}")]
    DuplicateField(String),
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
    #[error("Field {0} declares no categories")]
    EmptyCategories(String),
    #[error("Field {field} declares category {category} more than once")]
    DuplicateCategory { field: String, category: String },
    #[error("Field {field} has invalid bounds [{min}, {max}]")]
    InvalidBounds { field: String, min: f64, max: f64 },
    #[error("Field {field} default {default} is outside its bounds")]
    DefaultOutOfRange { field: String, default: f64 },
    #[error("Field {0} declares no codes")]
    EmptyChoices(String),
    #[error("Field {field} code {code} is not a finite value inside its bounds")]
    InvalidChoice { field: String, code: f64 },
    #[error("Field {0} uses the same label for both binary values")]
    AmbiguousBinary(String),
    #[error("Schema {schema} expands to {actual} columns, model expects {expected}")]
    WidthMismatch {
        schema: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors while loading reference statistics
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Reference dataset error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Reference dataset has no numeric columns")]
    NoNumericColumns,
}
