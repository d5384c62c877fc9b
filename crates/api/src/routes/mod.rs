//! Route Handlers

pub mod models;
pub mod predictions;

use crate::error::ApiError;
use crate::AppState;
use inference_engine::InferenceEngine;

/// Resolve a served model by name
fn engine<'a>(state: &'a AppState, name: &str) -> Result<&'a InferenceEngine, ApiError> {
    state
        .registry
        .get(name)
        .ok_or_else(|| ApiError::UnknownModel(name.to_string()))
}
