pub mod drafts;
pub mod relations;
pub mod stats;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub drafts: usize,
    pub store_version: u64,
    pub catalog_entities: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.read().await;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        drafts: store.len(),
        store_version: store.version(),
        catalog_entities: state.catalog.entities().len(),
    })
}
