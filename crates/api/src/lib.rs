//! Clinical Prediction API Server
//!
//! REST API exposing form schemas, feature encoding, chart scaling and
//! predictions for every configured model.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use inference_engine::ModelRegistry;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod routes;
mod settings;

pub use error::{ApiError, ErrorBody};
pub use routes::models::{ModelSummary, ModelsResponse, SchemaResponse};
pub use routes::predictions::{ChartResponse, EncodeResponse, ValidateResponse};
pub use settings::{LoggingSettings, ServerSettings, Settings, CONFIG_PATH_VAR};

/// Application state shared across handlers; immutable after startup
pub struct AppState {
    /// Served models
    pub registry: ModelRegistry,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exporter, absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle rendered on `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub models: Vec<String>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/models", get(routes::models::list_models))
        .route("/api/v1/models/:name/schema", get(routes::models::get_schema))
        .route("/api/v1/models/:name/validate", post(routes::predictions::validate))
        .route("/api/v1/models/:name/encode", post(routes::predictions::encode))
        .route("/api/v1/models/:name/chart", post(routes::predictions::chart))
        .route("/api/v1/models/:name/predict", post(routes::predictions::predict))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        models: state.registry.names().map(String::from).collect(),
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let level: Level = settings.level.parse()?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Load every configured model and serve until shutdown
pub async fn run_server(settings: &Settings) -> anyhow::Result<()> {
    let registry = ModelRegistry::load(&settings.model_configs())?;
    let metrics = PrometheusBuilder::new().install_recorder()?;

    let state = Arc::new(AppState::new(registry).with_metrics(metrics));
    let app = create_router(state);

    info!("Starting API server on {}", settings.server.addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
