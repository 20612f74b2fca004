//! HTTP API for scoring, model management, health and Prometheus metrics

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use scoring_lib::{
    service::{EMPTY_BODY_MESSAGE, MISSING_MODEL_NAME_MESSAGE},
    ErrorResponse, JobPosting, ScoringError, ScoringService, MODEL_NAME_KEY,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ScoringService>,
}

impl AppState {
    pub fn new(service: Arc<ScoringService>) -> Self {
        Self { service }
    }
}

/// Handler error rendered as `{success: false, error}`
#[derive(Debug)]
pub struct ApiError(ScoringError);

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ScoringError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ScoringError::ArtifactNotFound { .. } => StatusCode::NOT_FOUND,
            ScoringError::FeatureMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ScoringError::Deserialization { .. }
            | ScoringError::Inference(_)
            | ScoringError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.0.kind(), error = %self.0, "Request failed");
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

/// Decode a request body into a JSON object; blank, `null` and `{}` are empty
fn parse_body(body: &[u8]) -> Result<JobPosting, ApiError> {
    let raw = std::str::from_utf8(body)
        .map_err(|e| ScoringError::MalformedInput(format!("request body is not UTF-8: {}", e)))?;
    if raw.trim().is_empty() || raw.trim() == "null" {
        return Err(ScoringError::MalformedInput(EMPTY_BODY_MESSAGE.to_string()).into());
    }
    Ok(JobPosting::from_json_str(raw)?)
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.health().await)
}

async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ApiError> {
    let posting = parse_body(&body)?;
    let result = state.service.predict(posting).await?;
    Ok(Json(result).into_response())
}

async fn switch(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ApiError> {
    // an empty body is just a missing name here
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(ApiError(ScoringError::MalformedInput(msg))) if msg == EMPTY_BODY_MESSAGE => {
            JobPosting::default()
        }
        Err(e) => return Err(e),
    };

    let name = match payload.get(MODEL_NAME_KEY) {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        _ => {
            return Err(
                ScoringError::MalformedInput(MISSING_MODEL_NAME_MESSAGE.to_string()).into(),
            )
        }
    };

    let response = state.service.switch(&name).await?;
    Ok(Json(response).into_response())
}

async fn models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.list_models().await)
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/switch", post(switch))
        .route("/models", get(models))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server, returning when `shutdown` resolves
pub async fn serve<F>(port: u16, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
