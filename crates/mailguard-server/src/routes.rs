//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::state::AppState;
use mailguard_classifiers::{demask, validate_body};
use mailguard_core::{ClassifiedEmail, EmailRequest, Entity};
use mailguard_telemetry::MetricsSnapshot;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/stats", get(stats))
        .route("/classify", post(classify))
        .route("/mask", post(mask))
        .route("/demask", post(demask_email))
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

async fn stats(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Masking-only response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskResponse {
    pub masked_email: String,
    pub list_of_masked_entities: Vec<Entity>,
}

/// Demasking request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemaskRequest {
    pub masked_email: String,
    #[serde(default)]
    pub list_of_masked_entities: Vec<Entity>,
}

/// Demasking response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemaskResponse {
    pub demasked_email: String,
}

async fn classify(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<ClassifiedEmail>, AppError> {
    state.metrics.record_request("classify");
    classify_email(&state, payload).inspect_err(|e| state.metrics.record_error(e.error_type()))
}

fn classify_email(
    state: &AppState,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<ClassifiedEmail>, AppError> {
    let Json(request) = payload?;
    validate_body(&request.input_email_body)?;

    let pipeline = state.pipeline.as_ref().ok_or(AppError::ModelUnavailable)?;

    let start = Instant::now();
    let result = pipeline.process(&request.input_email_body)?;
    state
        .metrics
        .record_latency("classify", start.elapsed().as_micros() as u64);
    state.metrics.record_entities(&result.list_of_masked_entities);
    state.metrics.record_category(&result.category_of_the_email);

    debug!(
        "Classified email as {} with {} masked entities",
        result.category_of_the_email,
        result.list_of_masked_entities.len()
    );
    Ok(Json(result))
}

async fn mask(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<MaskResponse>, AppError> {
    state.metrics.record_request("mask");
    mask_email(&state, payload).inspect_err(|e| state.metrics.record_error(e.error_type()))
}

fn mask_email(
    state: &AppState,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<MaskResponse>, AppError> {
    let Json(request) = payload?;
    validate_body(&request.input_email_body)?;

    let start = Instant::now();
    let result = state.masker.mask(&request.input_email_body);
    state
        .metrics
        .record_latency("mask", start.elapsed().as_micros() as u64);
    state.metrics.record_entities(&result.entities);

    Ok(Json(MaskResponse {
        masked_email: result.masked_text,
        list_of_masked_entities: result.entities,
    }))
}

async fn demask_email(
    State(state): State<AppState>,
    payload: Result<Json<DemaskRequest>, JsonRejection>,
) -> Result<Json<DemaskResponse>, AppError> {
    state.metrics.record_request("demask");

    let Json(request) = payload
        .map_err(AppError::from)
        .inspect_err(|e| state.metrics.record_error(e.error_type()))?;
    Ok(Json(DemaskResponse {
        demasked_email: demask(&request.masked_email, &request.list_of_masked_entities),
    }))
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
    PayloadTooLarge(String),
    InvalidInput(String),
    ModelUnavailable,
    InternalError(String),
}

impl AppError {
    /// Error type reported in the response body and metrics
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::ModelUnavailable => "model_unavailable",
            AppError::InternalError(_) => "internal_error",
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::InvalidRequest(rejection.body_text())
        }
    }
}

impl From<mailguard_core::Error> for AppError {
    fn from(err: mailguard_core::Error) -> Self {
        match err {
            mailguard_core::Error::InvalidInput(msg) => AppError::InvalidInput(msg),
            mailguard_core::Error::ModelUnavailable(_) => AppError::ModelUnavailable,
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_type = self.error_type();
        let (status, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::InvalidInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::ModelUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Classification model is not loaded".to_string(),
            ),
            AppError::InternalError(msg) => {
                error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        if status.is_client_error() {
            warn!("Rejected request: {}", message);
        }

        let body = json!({
            "error": {
                "message": message,
                "type": error_type,
            }
        });

        (status, Json(body)).into_response()
    }
}
