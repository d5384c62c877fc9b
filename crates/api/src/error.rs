//! API Error Responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feature_engine::ValidationError;
use inference_engine::InferenceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// JSON error body; `field` is set for validation failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&ValidationError> for ErrorBody {
    fn from(err: &ValidationError) -> Self {
        Self {
            error: err.to_string(),
            field: Some(err.field().to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),
    #[error("Invalid request body: {}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Inference(InferenceError),
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Validation(e) => ApiError::Validation(e),
            other => ApiError::Inference(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownModel(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Request rejected");
        }

        let body = match &self {
            ApiError::Validation(e) => ErrorBody::from(e),
            _ => ErrorBody {
                error: self.to_string(),
                field: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
