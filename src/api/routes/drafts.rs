use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{DraftEntry, DraftId, RawDraft, Stage};
use crate::store::DraftSummary;

#[derive(Debug, Serialize)]
pub struct StageCount {
    pub stage: Stage,
    pub display_name: &'static str,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DraftsOverview {
    pub version: u64,
    pub total: usize,
    pub stages: Vec<StageCount>,
}

#[derive(Debug, Serialize)]
pub struct StageDrafts {
    pub stage: Stage,
    pub display_name: &'static str,
    pub drafts: Vec<DraftSummary>,
}

#[derive(Debug, Serialize)]
pub struct DraftAdded {
    pub stage: Stage,
    pub index: usize,
    pub id: DraftId,
    pub version: u64,
}

#[derive(Debug, Serialize)]
pub struct DraftsChanged {
    pub removed: usize,
    pub version: u64,
}

fn parse_stage(stage: &str) -> Result<Stage, ApiError> {
    Ok(stage.parse::<Stage>()?)
}

pub async fn list_drafts(State(state): State<AppState>) -> Json<DraftsOverview> {
    let store = state.store.read().await;
    let stages = store
        .counts()
        .into_iter()
        .map(|(stage, count)| StageCount {
            stage,
            display_name: stage.display_name(),
            count,
        })
        .collect();

    Json(DraftsOverview {
        version: store.version(),
        total: store.len(),
        stages,
    })
}

pub async fn stage_drafts(
    State(state): State<AppState>,
    Path(stage): Path<String>,
) -> Result<Json<StageDrafts>, ApiError> {
    let stage = parse_stage(&stage)?;
    let store = state.store.read().await;

    Ok(Json(StageDrafts {
        stage,
        display_name: stage.display_name(),
        drafts: store.summaries(stage),
    }))
}

/// Add a decoded draft to a stage. Drafts missing their pick or ban
/// containers are rejected.
pub async fn add_draft(
    State(state): State<AppState>,
    Path(stage): Path<String>,
    Json(raw): Json<RawDraft>,
) -> Result<(StatusCode, Json<DraftAdded>), ApiError> {
    let stage = parse_stage(&stage)?;
    let entry = DraftEntry::decode(raw);
    let id = match &entry {
        DraftEntry::Valid(record) => record.id.clone(),
        DraftEntry::Malformed { reason } => {
            return Err(ApiError::Unprocessable(format!("Draft rejected: {}", reason)));
        }
    };

    let mut store = state.store.write().await;
    let index = store.add(stage, entry);
    tracing::info!("Added draft {} to {} via API", id, stage);

    Ok((
        StatusCode::CREATED,
        Json(DraftAdded {
            stage,
            index,
            id,
            version: store.version(),
        }),
    ))
}

pub async fn remove_draft(
    State(state): State<AppState>,
    Path((stage, index)): Path<(String, usize)>,
) -> Result<Json<DraftsChanged>, ApiError> {
    let stage = parse_stage(&stage)?;
    let mut store = state.store.write().await;
    store.remove(stage, index)?;

    Ok(Json(DraftsChanged {
        removed: 1,
        version: store.version(),
    }))
}

pub async fn clear_drafts(State(state): State<AppState>) -> Json<DraftsChanged> {
    let mut store = state.store.write().await;
    let removed = store.len();
    store.clear();

    Json(DraftsChanged {
        removed,
        version: store.version(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::test_support::{delete_json, get_json, post_json, state};
    use axum::http::StatusCode;

    const RAW_DRAFT: &str = r#"{
        "participants": { "p1": { "name": "Carol" }, "p2": { "name": "Dave" } },
        "draft": {
            "picks": { "p1": ["x"], "p2": ["y"] },
            "idBans": { "p1": ["z"], "p2": [] }
        },
        "winner": "p1"
    }"#;

    #[tokio::test]
    async fn test_list_drafts() {
        let (status, json) = get_json(build_router(state()), "/api/drafts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 3);
        assert_eq!(json["stages"][0]["stage"], "qualifiers");
        assert_eq!(json["stages"][0]["count"], 0);
        assert_eq!(json["stages"][1]["count"], 2);
        assert_eq!(json["stages"][2]["display_name"], "Playoffs/Finals");
    }

    #[tokio::test]
    async fn test_stage_drafts() {
        let (status, json) = get_json(build_router(state()), "/api/drafts/groups").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["drafts"][0]["title"], "Draft 1: Alice vs Bob");
        assert_eq!(json["drafts"][0]["winner_label"], "Left Side");

        let (status, json) = get_json(build_router(state()), "/api/drafts/semis").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let state = state();
        let (status, json) =
            post_json(build_router(state.clone()), "/api/drafts/qualifiers", RAW_DRAFT).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["index"], 0);
        assert_eq!(json["version"], 4);

        let (_, json) = get_json(build_router(state), "/api/drafts/qualifiers").await;
        assert_eq!(json["drafts"][0]["title"], "Draft 1: Carol vs Dave");
    }

    #[tokio::test]
    async fn test_add_rejects_malformed() {
        let (status, json) = post_json(
            build_router(state()),
            "/api/drafts/groups",
            r#"{ "draft": { "picks": { "p1": [], "p2": [] } } }"#,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "UNPROCESSABLE");
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let state = state();
        let (status, _) = delete_json(build_router(state.clone()), "/api/drafts/groups/5").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = delete_json(build_router(state.clone()), "/api/drafts/groups/0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["removed"], 1);

        let (_, json) = delete_json(build_router(state.clone()), "/api/drafts").await;
        assert_eq!(json["removed"], 2);

        let (_, json) = get_json(build_router(state), "/api/drafts").await;
        assert_eq!(json["total"], 0);
    }
}
