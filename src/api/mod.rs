//! REST API endpoints.
//!
//! Axum-based HTTP API over the in-memory draft store: draft management,
//! aggregate statistics, relational analyses and table sort state.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::calculate::ranking::UnknownSortKey;
use crate::calculate::AnalysisError;
use crate::models::{StageFilter, UnknownStage};
use crate::store::{Snapshot, StoreError};
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Cannot process: {0}")]
    Unprocessable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        ApiError::Unprocessable(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::NotFound(e.to_string())
    }
}

impl From<UnknownStage> for ApiError {
    fn from(e: UnknownStage) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<UnknownSortKey> for ApiError {
    fn from(e: UnknownSortKey) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

/// Stage selection shared by every analysis endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct StageParams {
    /// Comma-separated stages; absent or empty selects all
    pub stages: Option<String>,
}

/// Take a snapshot of the selected stages. The store lock is released
/// before any analysis runs.
pub async fn take_snapshot(state: &AppState, stages: Option<&str>) -> Result<Snapshot, ApiError> {
    let filter = StageFilter::parse(stages)?;
    let store = state.store.read().await;
    Ok(store.snapshot(&filter))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/drafts",
            get(routes::drafts::list_drafts).delete(routes::drafts::clear_drafts),
        )
        .route(
            "/api/drafts/:stage",
            get(routes::drafts::stage_drafts).post(routes::drafts::add_draft),
        )
        .route("/api/drafts/:stage/:index", delete(routes::drafts::remove_draft))
        .route("/api/stats/overview", get(routes::stats::overview))
        .route("/api/stats/entities", get(routes::stats::entities))
        .route("/api/stats/effects", get(routes::stats::effects))
        .route("/api/focus-candidates", get(routes::relations::focus_candidates))
        .route("/api/pairings/:id", get(routes::relations::pairings))
        .route("/api/counters/:id", get(routes::relations::counters))
        .route("/api/timing", get(routes::stats::timing))
        .route("/api/sort/:table", post(routes::stats::select_sort))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
