//! HTTP routes for the scoring service

use crate::error::ValidationError;
use crate::metrics::{MetricsSnapshot, ServiceMetrics};
use crate::service::{ModelStatus, PredictionService};
use crate::types::prediction::PredictResponse;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(service: PredictionService) -> Self {
        Self {
            service: Arc::new(service),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }
}

/// Errors returned to HTTP clients
#[derive(Debug)]
pub enum ApiError {
    /// Body was not parseable JSON
    MalformedBody(String),
    /// Payload failed validation
    Invalid(ValidationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match self {
            ApiError::MalformedBody(reason) => reason,
            ApiError::Invalid(e) => e.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Build the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/model", get(model_status))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness: fixed body, no model involvement
async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let start = Instant::now();

    let Json(payload) = payload.map_err(|e| {
        state.metrics.record_rejection();
        warn!(error = %e, "Unreadable prediction request");
        ApiError::MalformedBody(e.body_text())
    })?;

    match state.service.predict_payload(&payload) {
        Ok(response) => {
            state.metrics.record_prediction(
                start.elapsed(),
                response.predict.len(),
                response.delayed_count(),
            );
            Ok(Json(response))
        }
        Err(e) => {
            state.metrics.record_rejection();
            info!(error = %e, "Prediction request rejected");
            Err(ApiError::Invalid(e))
        }
    }
}

async fn model_status(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.service.status().clone())
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
