//! Encoding and Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use feature_engine::{EncodedVector, RawInput};
use inference_engine::InferenceResult;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::engine;
use crate::error::{ApiError, ErrorBody};
use crate::AppState;

/// Count rejected submissions by model and offending field
fn rejected(model: &str, err: impl Into<ApiError>) -> ApiError {
    let err = err.into();
    if let ApiError::Validation(e) = &err {
        counter!(
            "clinic_validation_failures_total",
            "model" => model.to_string(),
            "field" => e.field().to_string()
        )
        .increment(1);
    }
    err
}

/// Encoded vector with its column names
#[derive(Debug, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub model: String,
    pub columns: Vec<String>,
    pub values: Vec<f64>,
}

impl EncodeResponse {
    fn new(model: &str, vector: EncodedVector) -> Self {
        let columns = vector.column_names().into_iter().map(String::from).collect();
        Self {
            model: model.to_string(),
            columns,
            values: vector.into_values(),
        }
    }
}

/// Validate and encode a form without scaling
pub async fn encode(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    payload: Result<Json<RawInput>, JsonRejection>,
) -> Result<Json<EncodeResponse>, ApiError> {
    let engine = engine(&state, &name)?;
    let Json(raw) = payload?;
    let vector = engine.encode(&raw).map_err(|e| rejected(&name, e))?;
    Ok(Json(EncodeResponse::new(&name, vector)))
}

/// Every field problem in a form, for inline feedback
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub model: String,
    pub valid: bool,
    pub fields_checked: usize,
    pub errors: Vec<ErrorBody>,
}

/// Check a form without stopping at the first invalid field
pub async fn validate(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    payload: Result<Json<RawInput>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let engine = engine(&state, &name)?;
    let Json(raw) = payload?;
    let result = engine.schema().validate(&raw);

    debug!(model = %name, failed = ?result.failed_fields(), "Form validated");
    Ok(Json(ValidateResponse {
        model: name,
        valid: result.valid,
        fields_checked: result.fields_checked,
        errors: result.errors.iter().map(ErrorBody::from).collect(),
    }))
}

/// Min-max scaled values for charting against the reference population
#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    pub model: String,
    pub columns: Vec<String>,
    pub values: Vec<f64>,
    /// Columns with a zero-width reference range, reported as 0
    pub degenerate: Vec<String>,
    /// Columns without reference statistics, left unscaled
    pub unscaled: Vec<String>,
}

pub async fn chart(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    payload: Result<Json<RawInput>, JsonRejection>,
) -> Result<Json<ChartResponse>, ApiError> {
    let engine = engine(&state, &name)?;
    let Json(raw) = payload?;
    let outcome = engine.chart_values(&raw).map_err(|e| rejected(&name, e))?;
    let encoded = EncodeResponse::new(&name, outcome.vector);

    Ok(Json(ChartResponse {
        model: encoded.model,
        columns: encoded.columns,
        values: encoded.values,
        degenerate: outcome.degenerate,
        unscaled: outcome.unscaled,
    }))
}

/// Run a form through the model
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    payload: Result<Json<RawInput>, JsonRejection>,
) -> Result<Json<InferenceResult>, ApiError> {
    let engine = engine(&state, &name)?;
    let Json(raw) = payload?;
    let result = engine.predict(&raw).map_err(|e| rejected(&name, e))?;

    counter!(
        "clinic_predictions_total",
        "model" => name.clone(),
        "class" => result.prediction.code.clone()
    )
    .increment(1);
    histogram!("clinic_inference_latency_ms", "model" => name.clone())
        .record(result.latency_ms as f64);

    debug!(model = %name, class = %result.prediction.code, "Prediction served");
    Ok(Json(result))
}
