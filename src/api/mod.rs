//! HTTP API for wine quality prediction
//!
//! Provides REST endpoints over the loaded artifact bundle using axum.
//!
//! ## Endpoints
//!
//! - `GET /` - Service info banner
//! - `GET /health` - Readiness probe (503 until artifacts are loaded)
//! - `POST /predict` - Score a single wine sample
//! - `POST /predict_batch` - Score an ordered list of samples
//! - `GET /model_info` - Static metadata about the loaded model
//! - `GET /metrics` - Prometheus-formatted request metrics
//! - `GET /openapi.json` - Generated OpenAPI document
//! - `GET /docs` - Interactive documentation (Swagger UI)
//!
//! ## Example
//!
//! ```rust,ignore
//! use catar::api::{create_router, AppState};
//!
//! let state = AppState::demo();
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    artifact::{WineArtifacts, WineSample},
    error::CatarError,
    forest::{Hyperparameters, TrainingMetrics},
    metrics::MetricsCollector,
};

mod docs;


/// Largest batch `/predict_batch` accepts in one request
pub const MAX_BATCH_SIZE: usize = 1000;

/// Application state shared across handlers
///
/// Artifacts are loaded once before serving and never mutated, so the state
/// clones cheaply and handlers read without locks. The `Option` exists only
/// for the not-ready window: `serve` always constructs a loaded state or
/// exits, while tests exercise the 503 path via [`AppState::unloaded`].
#[derive(Clone)]
pub struct AppState {
    /// Immutable artifact bundle, absent until loading succeeds
    artifacts: Option<Arc<WineArtifacts>>,
    /// Metrics collector for monitoring
    metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// Create state around a loaded artifact bundle
    #[must_use]
    pub fn new(artifacts: WineArtifacts) -> Self {
        Self {
            artifacts: Some(Arc::new(artifacts)),
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Create state around the built-in demo bundle
    #[must_use]
    pub fn demo() -> Self {
        Self::new(WineArtifacts::demo())
    }

    /// Create state with no artifacts, as during a failed startup
    #[must_use]
    pub fn unloaded() -> Self {
        Self {
            artifacts: None,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Whether the artifact bundle is loaded
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Access the metrics collector
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

/// Build the router with all routes registered
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .route("/predict_batch", post(predict_batch_handler))
        .route("/model_info", get(model_info_handler))
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_handler))
        .route("/docs", get(docs_handler))
        .with_state(state)
}

/// Error body returned with every non-2xx response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description of what went wrong
    pub error: String,
}

/// Response for `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfoResponse {
    /// Service banner
    pub message: String,
    /// Short usage hint
    pub description: String,
    /// Where the interactive docs live
    pub documentation: String,
}

/// Response for `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" when ready, "unavailable" otherwise
    pub status: String,
    /// Whether all three artifacts loaded successfully
    pub model_loaded: bool,
}

/// Response for `POST /predict` and each item of `POST /predict_batch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Predicted quality score, rounded to the nearest tenth
    pub predicted_quality: f32,
    /// Category label derived from fixed thresholds
    pub quality_category: String,
    /// Coarse confidence label
    pub confidence: String,
}

impl From<crate::artifact::Prediction> for PredictionResponse {
    fn from(p: crate::artifact::Prediction) -> Self {
        Self {
            predicted_quality: p.score,
            quality_category: p.category.as_str().to_string(),
            confidence: p.confidence.as_str().to_string(),
        }
    }
}

/// Response for `POST /predict_batch`
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    /// One result per input sample, in input order
    pub predictions: Vec<PredictionResponse>,
    /// Number of results (always equals the input length)
    pub count: usize,
}

/// Response for `GET /model_info`
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    /// Algorithm name recorded at training time
    pub model_type: String,
    /// Feature names in training order
    pub features: Vec<String>,
    /// Target column the model predicts
    pub target: String,
    /// Documented score range
    pub quality_range: String,
    /// Human-readable description
    pub description: String,
    /// Number of trees in the loaded ensemble
    pub n_trees: usize,
    /// Hyperparameters used for training
    pub hyperparameters: Hyperparameters,
    /// Held-out metrics from the training run
    pub metrics: TrainingMetrics,
}

/// Error pair every fallible handler returns
type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error to an HTTP status and body
fn error_response(err: &CatarError) -> HandlerError {
    let status = match err {
        CatarError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        CatarError::ArtifactError { .. } | CatarError::FormatError { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        CatarError::InferenceError { .. } | CatarError::ServerError { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Fetch the artifact bundle or produce the 503 the probes promise
fn require_artifacts(state: &AppState) -> Result<Arc<WineArtifacts>, HandlerError> {
    state.artifacts.clone().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "model artifacts not loaded".to_string(),
            }),
        )
    })
}

async fn root_handler() -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse {
        message: "Wine Quality Prediction API".to_string(),
        description: "Send POST request to /predict with wine features".to_string(),
        documentation: "/docs".to_string(),
    })
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.is_ready() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                model_loaded: true,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable".to_string(),
                model_loaded: false,
            }),
        )
    }
}

/// Single prediction handler (`POST /predict`)
async fn predict_handler(
    State(state): State<AppState>,
    Json(sample): Json<WineSample>,
) -> Result<Json<PredictionResponse>, HandlerError> {
    let start = Instant::now();
    let artifacts = require_artifacts(&state).map_err(|e| {
        state.metrics.record_failure();
        e
    })?;

    if let Err(err) = sample.validate() {
        state.metrics.record_failure();
        return Err(error_response(&err));
    }

    match artifacts.predict(&sample) {
        Ok(prediction) => {
            state.metrics.record_success(1, start.elapsed());
            Ok(Json(prediction.into()))
        }
        Err(err) => {
            state.metrics.record_failure();
            Err(error_response(&err))
        }
    }
}

/// Batch prediction handler (`POST /predict_batch`)
///
/// All-or-nothing: one invalid item fails the whole batch with a message
/// naming its index, and no partial results are returned. Results preserve
/// input order.
async fn predict_batch_handler(
    State(state): State<AppState>,
    Json(samples): Json<Vec<WineSample>>,
) -> Result<Json<BatchPredictionResponse>, HandlerError> {
    let start = Instant::now();
    let artifacts = require_artifacts(&state).map_err(|e| {
        state.metrics.record_failure();
        e
    })?;

    if samples.is_empty() {
        state.metrics.record_failure();
        return Err(error_response(&CatarError::InvalidInput {
            reason: "batch must contain at least one sample".to_string(),
        }));
    }
    if samples.len() > MAX_BATCH_SIZE {
        state.metrics.record_failure();
        return Err(error_response(&CatarError::InvalidInput {
            reason: format!(
                "batch of {} samples exceeds limit of {MAX_BATCH_SIZE}",
                samples.len()
            ),
        }));
    }

    let mut predictions = Vec::with_capacity(samples.len());
    for (i, sample) in samples.iter().enumerate() {
        if let Err(err) = sample.validate() {
            state.metrics.record_failure();
            return Err(error_response(&CatarError::InvalidInput {
                reason: format!("sample {i}: {err}"),
            }));
        }
        match artifacts.predict(sample) {
            Ok(prediction) => predictions.push(PredictionResponse::from(prediction)),
            Err(err) => {
                state.metrics.record_failure();
                return Err(error_response(&err));
            }
        }
    }

    let count = predictions.len();
    state.metrics.record_success(count, start.elapsed());
    Ok(Json(BatchPredictionResponse { predictions, count }))
}

/// Model metadata handler (`GET /model_info`)
///
/// Everything here was recorded at training time; nothing is recomputed.
async fn model_info_handler(
    State(state): State<AppState>,
) -> Result<Json<ModelInfoResponse>, HandlerError> {
    let artifacts = require_artifacts(&state)?;
    let model = artifacts.model();
    Ok(Json(ModelInfoResponse {
        model_type: model.metadata.algorithm.clone(),
        features: artifacts.feature_names().to_vec(),
        target: model.metadata.target.clone(),
        quality_range: "3-9 (higher is better)".to_string(),
        description: "Predicts wine quality based on chemical properties".to_string(),
        n_trees: model.n_trees(),
        hyperparameters: model.metadata.hyperparameters.clone(),
        metrics: model.metadata.metrics.clone(),
    }))
}

async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.to_prometheus()
}

async fn openapi_handler() -> Json<serde_json::Value> {
    Json(docs::openapi_document())
}

async fn docs_handler() -> Html<&'static str> {
    Html(docs::SWAGGER_UI_PAGE)
}
