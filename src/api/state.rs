use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::calculate::{EffectSortKey, EntitySortKey, SortState, TimingSortKey};
use crate::config::AnalysisConfig;
use crate::models::Catalog;
use crate::store::DraftStore;

/// Server-side sort state of each result table.
#[derive(Debug, Clone, Serialize)]
pub struct TableSorts {
    pub entities: SortState<EntitySortKey>,
    pub timing: SortState<TimingSortKey>,
    pub effects: SortState<EffectSortKey>,
}

impl Default for TableSorts {
    fn default() -> Self {
        Self {
            entities: SortState::new(EntitySortKey::Name),
            timing: SortState::new(TimingSortKey::Name),
            effects: SortState::new(EffectSortKey::Bans),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<DraftStore>>,
    pub catalog: Arc<Catalog>,
    pub analysis: Arc<AnalysisConfig>,
    pub sorts: Arc<RwLock<TableSorts>>,
    pub cors_origin: String,
}

impl AppState {
    pub fn new(store: DraftStore, catalog: Catalog, analysis: AnalysisConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            catalog: Arc::new(catalog),
            analysis: Arc::new(analysis),
            sorts: Arc::new(RwLock::new(TableSorts::default())),
            cors_origin: "*".to_string(),
        }
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = origin.into();
        self
    }
}
