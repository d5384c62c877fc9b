//! ONNX Inference Engine
//!
//! Owns everything one prediction needs: the form schema, the loaded
//! classifier, and the reference statistics, all fixed at startup.

mod engine;
mod model;
mod profile;
mod registry;

pub use engine::{InferenceEngine, InferenceResult, Prediction};
pub use model::{argmax, Classifier, MockClassifier, OnnxClassifier};
pub use profile::{ClassLabel, ModelProfile};
pub use registry::{ModelConfig, ModelRegistry};

use feature_engine::{SchemaError, ValidationError};
use thiserror::Error;

/// Errors during model setup and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Model {model} returned {actual} class scores, profile declares {expected}")]
    ClassCountMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },
    #[error("Unknown model profile: {0}")]
    UnknownProfile(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
