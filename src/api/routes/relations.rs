use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{take_snapshot, ApiError, StageParams};
use crate::calculate::{analyze_counters, analyze_pairings, focus_candidates as rank_candidates};
use crate::models::{CounterReport, EntityId, FocusCandidate, PairingReport};

#[derive(Debug, Deserialize)]
pub struct RelationParams {
    pub stages: Option<String>,
    /// Overrides the configured display limit for every list in the report
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FocusCandidates {
    pub version: u64,
    pub candidates: Vec<FocusCandidate>,
}

#[derive(Debug, Serialize)]
pub struct PairingResponse {
    pub version: u64,
    pub name: String,
    #[serde(flatten)]
    pub report: PairingReport,
}

#[derive(Debug, Serialize)]
pub struct CounterResponse {
    pub version: u64,
    pub name: String,
    #[serde(flatten)]
    pub report: CounterReport,
}

pub async fn focus_candidates(
    State(state): State<AppState>,
    Query(params): Query<StageParams>,
) -> Result<Json<FocusCandidates>, ApiError> {
    let snapshot = take_snapshot(&state, params.stages.as_deref()).await?;
    let candidates = rank_candidates(&snapshot.entries, &state.catalog)?;

    Ok(Json(FocusCandidates {
        version: snapshot.version,
        candidates,
    }))
}

pub async fn pairings(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<RelationParams>,
) -> Result<Json<PairingResponse>, ApiError> {
    let focus = EntityId::from(id);
    let snapshot = take_snapshot(&state, params.stages.as_deref()).await?;
    let mut report = analyze_pairings(&snapshot.entries, &focus, &state.catalog)?;
    report
        .partners
        .truncate(params.limit.unwrap_or(state.analysis.limits.pairings));

    Ok(Json(PairingResponse {
        version: snapshot.version,
        name: state.catalog.display_name(&focus).to_string(),
        report,
    }))
}

pub async fn counters(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<RelationParams>,
) -> Result<Json<CounterResponse>, ApiError> {
    let focus = EntityId::from(id);
    let snapshot = take_snapshot(&state, params.stages.as_deref()).await?;
    let mut report = analyze_counters(
        &snapshot.entries,
        &focus,
        &state.catalog,
        &state.analysis.matchup,
    )?;

    let limits = &state.analysis.limits;
    report
        .responses
        .truncate(params.limit.unwrap_or(limits.responses));
    let matchups = params.limit.unwrap_or(limits.matchups);
    report.strong_against.truncate(matchups);
    report.weak_against.truncate(matchups);

    Ok(Json(CounterResponse {
        version: snapshot.version,
        name: state.catalog.display_name(&focus).to_string(),
        report,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::test_support::{get_json, state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_focus_candidates() {
        let (status, json) = get_json(build_router(state()), "/api/focus-candidates").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = json["candidates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["z", "x", "y", "q"]);
        assert_eq!(json["candidates"][0]["picks"], 3);
    }

    #[tokio::test]
    async fn test_pairings() {
        let (status, json) = get_json(build_router(state()), "/api/pairings/x").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "X");
        assert_eq!(json["focus"], "x");
        assert_eq!(json["games_with_focus"], 2);
        assert_eq!(json["partners"][0]["partner"], "y");
        assert_eq!(json["partners"][0]["count"], 2);
        assert_eq!(json["partners"][0]["win_rate"], 100.0);
    }

    #[tokio::test]
    async fn test_pairings_limit() {
        let (_, json) = get_json(build_router(state()), "/api/pairings/x?limit=0").await;
        assert!(json["partners"].as_array().unwrap().is_empty());
        assert_eq!(json["games_with_focus"], 2);
    }

    #[tokio::test]
    async fn test_unknown_focus_is_empty() {
        let (status, json) = get_json(build_router(state()), "/api/pairings/nobody").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "nobody");
        assert_eq!(json["games_with_focus"], 0);
        assert!(json["focus_win_rate"].is_null());
    }

    #[tokio::test]
    async fn test_counters() {
        let (status, json) = get_json(build_router(state()), "/api/counters/x?stages=groups").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_responses"], 2);
        assert_eq!(json["responses"][0]["id"], "z");
        assert_eq!(json["responses"][0]["wins"], 0);
        assert_eq!(json["strong_against"][0]["id"], "z");
        assert_eq!(json["strong_against"][0]["tier"], "strong");
        assert!(json["weak_against"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counters_bad_stage() {
        let (status, _) = get_json(build_router(state()), "/api/counters/x?stages=semis").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
