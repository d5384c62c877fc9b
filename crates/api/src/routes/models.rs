//! Model Catalog Routes

use axum::{
    extract::{Path, State},
    Json,
};
use feature_engine::{FeatureSchema, NormalizationMethod};
use inference_engine::{ClassLabel, InferenceEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::engine;
use crate::error::ApiError;
use crate::AppState;

/// One served model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub title: String,
    /// Length of the encoded vector
    pub width: usize,
    pub classes: Vec<ClassLabel>,
    pub scaling: NormalizationMethod,
    /// Columns with reference statistics
    pub reference_columns: usize,
}

impl ModelSummary {
    fn of(engine: &InferenceEngine) -> Self {
        let profile = engine.profile();
        Self {
            name: profile.name.clone(),
            title: profile.title.clone(),
            width: profile.schema.width(),
            classes: profile.classes.clone(),
            scaling: profile.model_scaling,
            reference_columns: engine.stats().len(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub data: Vec<ModelSummary>,
    pub count: usize,
}

/// List served models
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let data: Vec<ModelSummary> = state
        .registry
        .iter()
        .map(|(_, engine)| ModelSummary::of(engine))
        .collect();

    Json(ModelsResponse {
        count: data.len(),
        data,
    })
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub model: String,
    pub schema: FeatureSchema,
    /// Column order of encoded vectors
    pub columns: Vec<String>,
}

/// Form definition of a model
pub async fn get_schema(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<SchemaResponse>, ApiError> {
    let engine = engine(&state, &name)?;
    let schema = engine.schema();

    Ok(Json(SchemaResponse {
        model: name.clone(),
        columns: schema.column_names().into_iter().map(String::from).collect(),
        schema: schema.clone(),
    }))
}
