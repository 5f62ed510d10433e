use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::{AppState, TableSorts};
use crate::api::{take_snapshot, ApiError};
use crate::calculate::ranking::UnknownSortKey;
use crate::calculate::{
    aggregate, analyze_timing, effect_rows, entity_rows, sort_effects, sort_entities, sort_timing,
    EffectSortKey, EntitySortKey, SortDirection, SortKey, SortState, TimingSortKey,
};
use crate::models::{DataQuality, EffectRow, EntityRow, OverallStats, TimingRow};

#[derive(Debug, Deserialize)]
pub struct TableParams {
    pub stages: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub version: u64,
    pub stages: Vec<&'static str>,
    pub overall: OverallStats,
    pub quality: DataQuality,
}

#[derive(Debug, Serialize)]
pub struct EntityTable {
    pub version: u64,
    pub total_drafts: u32,
    pub sort: EntitySortKey,
    pub direction: SortDirection,
    pub rows: Vec<EntityRow>,
}

#[derive(Debug, Serialize)]
pub struct EffectTable {
    pub version: u64,
    pub total_drafts: u32,
    pub total_effect_bans: u32,
    pub sort: EffectSortKey,
    pub direction: SortDirection,
    pub rows: Vec<EffectRow>,
}

#[derive(Debug, Serialize)]
pub struct TimingTable {
    pub version: u64,
    pub min_occurrences: u32,
    pub sort: TimingSortKey,
    pub direction: SortDirection,
    pub rows: Vec<TimingRow>,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub key: String,
}

/// An explicit `sort` starts from that key's default direction; without
/// one the table's stored sort state applies. `dir` overrides either.
fn resolve_sort<K>(
    current: SortState<K>,
    sort: Option<&str>,
    dir: Option<&str>,
) -> Result<(K, SortDirection), ApiError>
where
    K: SortKey + FromStr<Err = UnknownSortKey>,
{
    let key = match sort {
        Some(s) => s.parse::<K>()?,
        None => current.key(),
    };
    let direction = match dir {
        Some(d) => d.parse::<SortDirection>()?,
        None if sort.is_some() => key.default_direction(),
        None => current.direction(),
    };
    Ok((key, direction))
}

pub async fn overview(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Result<Json<OverviewResponse>, ApiError> {
    let snapshot = take_snapshot(&state, params.stages.as_deref()).await?;
    let agg = aggregate(&snapshot.entries, &state.catalog)?;

    Ok(Json(OverviewResponse {
        version: snapshot.version,
        stages: snapshot.stages.display_names(),
        overall: agg.overall,
        quality: agg.quality,
    }))
}

pub async fn entities(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Result<Json<EntityTable>, ApiError> {
    let current = state.sorts.read().await.entities;
    let (sort, direction) = resolve_sort(current, params.sort.as_deref(), params.dir.as_deref())?;

    let snapshot = take_snapshot(&state, params.stages.as_deref()).await?;
    let agg = aggregate(&snapshot.entries, &state.catalog)?;
    let mut rows = entity_rows(&agg, params.search.as_deref());
    sort_entities(&mut rows, sort, direction);

    Ok(Json(EntityTable {
        version: snapshot.version,
        total_drafts: agg.overall.total_drafts,
        sort,
        direction,
        rows,
    }))
}

pub async fn effects(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Result<Json<EffectTable>, ApiError> {
    let current = state.sorts.read().await.effects;
    let (sort, direction) = resolve_sort(current, params.sort.as_deref(), params.dir.as_deref())?;

    let snapshot = take_snapshot(&state, params.stages.as_deref()).await?;
    let agg = aggregate(&snapshot.entries, &state.catalog)?;
    let mut rows = effect_rows(&agg, params.search.as_deref());
    sort_effects(&mut rows, sort, direction);

    Ok(Json(EffectTable {
        version: snapshot.version,
        total_drafts: agg.overall.total_drafts,
        total_effect_bans: agg.overall.total_effect_bans,
        sort,
        direction,
        rows,
    }))
}

pub async fn timing(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Result<Json<TimingTable>, ApiError> {
    let current = state.sorts.read().await.timing;
    let (sort, direction) = resolve_sort(current, params.sort.as_deref(), params.dir.as_deref())?;

    let snapshot = take_snapshot(&state, params.stages.as_deref()).await?;
    let mut rows = analyze_timing(&snapshot.entries, &state.catalog, &state.analysis.timing)?;
    sort_timing(&mut rows, sort, direction);

    Ok(Json(TimingTable {
        version: snapshot.version,
        min_occurrences: state.analysis.timing.min_occurrences,
        sort,
        direction,
        rows,
    }))
}

/// Select a sort key on a table: the same key flips direction, a new key
/// starts at its default.
pub async fn select_sort(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(request): Json<SortRequest>,
) -> Result<Json<TableSorts>, ApiError> {
    let mut sorts = state.sorts.write().await;
    match table.as_str() {
        "entities" => sorts.entities.select(request.key.parse()?),
        "timing" => sorts.timing.select(request.key.parse()?),
        "effects" => sorts.effects.select(request.key.parse()?),
        other => return Err(ApiError::NotFound(format!("No sortable table {}", other))),
    }
    Ok(Json(sorts.clone()))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::test_support::{catalog, empty_state, get_json, post_json, state};
    use crate::api::state::AppState;
    use crate::config::AnalysisConfig;
    use axum::http::StatusCode;
    use serde_json::Value;

    fn names(json: &Value) -> Vec<String> {
        json["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_overview() {
        let (status, json) = get_json(build_router(state()), "/api/stats/overview").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["overall"]["total_drafts"], 3);
        assert_eq!(json["overall"]["first_side_wins"], 2);
        assert_eq!(json["overall"]["first_side_win_rate"], 100);
        assert_eq!(json["overall"]["win_data_coverage"], 67);
        assert_eq!(json["stages"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_overview_stage_filter() {
        let (status, json) =
            get_json(build_router(state()), "/api/stats/overview?stages=playoffs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["overall"]["total_drafts"], 1);
        assert_eq!(json["overall"]["first_side_win_rate"], 0);
        assert_eq!(json["stages"][0], "Playoffs/Finals");
    }

    #[tokio::test]
    async fn test_nothing_to_analyze() {
        let (status, json) =
            get_json(build_router(state()), "/api/stats/overview?stages=qualifiers").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "UNPROCESSABLE");

        let (status, _) = get_json(build_router(empty_state()), "/api/stats/entities").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_entities_default_sort_is_name() {
        let (status, json) = get_json(build_router(state()), "/api/stats/entities").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sort"], "name");
        assert_eq!(json["direction"], "asc");
        assert_eq!(names(&json), vec!["Q", "X", "Y", "Z"]);
    }

    #[tokio::test]
    async fn test_entities_explicit_sort_and_search() {
        let (_, json) = get_json(build_router(state()), "/api/stats/entities?sort=picks").await;
        assert_eq!(json["direction"], "desc");
        assert_eq!(names(&json), vec!["Z", "X", "Y", "Q"]);

        let (_, json) = get_json(build_router(state()), "/api/stats/entities?search=z").await;
        assert_eq!(names(&json), vec!["Z"]);

        let (status, _) = get_json(build_router(state()), "/api/stats/entities?sort=height").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_entity_win_rate_is_null_without_games() {
        let (_, json) =
            get_json(build_router(state()), "/api/stats/entities?stages=playoffs&sort=name").await;
        let x = json["rows"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["id"] == "x")
            .unwrap()
            .clone();
        assert_eq!(x["bans"], 1);
        assert!(x["win_rate"].is_null());
    }

    #[tokio::test]
    async fn test_select_sort_toggles() {
        let state = state();
        let (status, json) = post_json(
            build_router(state.clone()),
            "/api/sort/entities",
            r#"{"key":"picks"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["entities"]["key"], "picks");
        assert_eq!(json["entities"]["direction"], "desc");
        assert_eq!(json["timing"]["key"], "name");

        let (_, json) = post_json(
            build_router(state.clone()),
            "/api/sort/entities",
            r#"{"key":"picks"}"#,
        )
        .await;
        assert_eq!(json["entities"]["direction"], "asc");

        let (_, json) = get_json(build_router(state), "/api/stats/entities").await;
        assert_eq!(names(&json), vec!["Q", "X", "Y", "Z"]);
        assert_eq!(json["sort"], "picks");
    }

    #[tokio::test]
    async fn test_select_sort_effects_table() {
        let state = state();
        let (status, json) =
            post_json(build_router(state.clone()), "/api/sort/effects", r#"{"key":"bans"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["effects"]["key"], "bans");
        assert_eq!(json["effects"]["direction"], "asc");
        assert_eq!(json["entities"]["key"], "name");

        let (_, json) = get_json(build_router(state), "/api/stats/effects").await;
        assert_eq!(json["sort"], "bans");
        assert_eq!(json["direction"], "asc");
    }

    #[tokio::test]
    async fn test_select_sort_unknown_table() {
        let (status, _) =
            post_json(build_router(state()), "/api/sort/players", r#"{"key":"name"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_effects_table() {
        let (status, json) = get_json(build_router(state()), "/api/stats/effects").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sort"], "bans");
        assert!(json["rows"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timing_suppresses_sparse_entities() {
        let (status, json) = get_json(build_router(state()), "/api/timing").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["min_occurrences"], 5);
        assert!(json["rows"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timing_rows() {
        let mut analysis = AnalysisConfig::default();
        analysis.timing.min_occurrences = 3;
        let base = state();
        let store = base.store.read().await.clone();
        let state = AppState::new(store, catalog(), analysis);

        let (_, json) = get_json(build_router(state), "/api/timing").await;
        assert_eq!(names(&json), vec!["Q", "X", "Z"]);
        let x = &json["rows"][1];
        assert_eq!(x["avg_pick_position"], 1.0);
        assert_eq!(x["pick_tendency"], "early");
        assert_eq!(x["avg_ban_position"], 1.0);
    }
}
