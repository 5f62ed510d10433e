//! In-memory draft store.
//!
//! Drafts are kept per stage behind `Arc`s. Mutation goes through
//! `Arc::make_mut`, so a snapshot handed out earlier keeps seeing the entries
//! it was built from while the store moves on to a new version.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{DraftEntry, DraftId, Side, Stage, StageFilter};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No draft {index} in {stage} (stage holds {len})")]
    IndexOutOfRange { stage: Stage, index: usize, len: usize },
}

/// Listing row for one stored draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSummary {
    pub index: usize,
    pub stage: Stage,
    pub id: Option<DraftId>,
    pub title: String,
    pub winner: Option<Side>,
    pub winner_label: Option<&'static str>,
    pub malformed: bool,
}

impl DraftSummary {
    fn new(stage: Stage, index: usize, entry: &DraftEntry) -> Self {
        let number = index + 1;
        match entry {
            DraftEntry::Valid(record) => Self {
                index,
                stage,
                id: Some(record.id.clone()),
                title: format!(
                    "Draft {}: {} vs {}",
                    number, record.participants[0], record.participants[1]
                ),
                winner: record.winner,
                winner_label: record.winner.map(Side::label),
                malformed: false,
            },
            DraftEntry::Malformed { reason } => Self {
                index,
                stage,
                id: None,
                title: format!("Draft {}: unreadable ({})", number, reason),
                winner: None,
                winner_label: None,
                malformed: true,
            },
        }
    }
}

/// Read-only view of the store at one version.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub stages: StageFilter,
    /// Entries of the selected stages, in stage order
    pub entries: Vec<DraftEntry>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Versioned per-stage draft collections.
#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    stages: BTreeMap<Stage, Arc<Vec<DraftEntry>>>,
    version: u64,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version; bumped by every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn contains_id(&self, id: &DraftId) -> bool {
        self.stages.values().flat_map(|entries| entries.iter()).any(|entry| {
            entry.record().is_some_and(|record| &record.id == id)
        })
    }

    /// Append a draft to a stage and return its index.
    ///
    /// Duplicate content is accepted but logged.
    pub fn add(&mut self, stage: Stage, entry: DraftEntry) -> usize {
        if let Some(record) = entry.record() {
            if self.contains_id(&record.id) {
                warn!("Draft {} is already stored, adding duplicate to {}", record.id, stage);
            }
        }
        let entries = Arc::make_mut(self.stages.entry(stage).or_default());
        entries.push(entry);
        self.version += 1;
        debug!("Added draft {} to {} (version {})", entries.len() - 1, stage, self.version);
        entries.len() - 1
    }

    /// Append several drafts to a stage.
    pub fn extend(&mut self, stage: Stage, entries: impl IntoIterator<Item = DraftEntry>) -> usize {
        entries
            .into_iter()
            .map(|entry| self.add(stage, entry))
            .count()
    }

    /// Remove the draft at `index` from a stage.
    pub fn remove(&mut self, stage: Stage, index: usize) -> Result<DraftEntry, StoreError> {
        let len = self.stage_len(stage);
        if index >= len {
            return Err(StoreError::IndexOutOfRange { stage, index, len });
        }
        let entries = Arc::make_mut(self.stages.entry(stage).or_default());
        let removed = entries.remove(index);
        self.version += 1;
        info!("Removed draft {} from {} (version {})", index, stage, self.version);
        Ok(removed)
    }

    /// Drop every draft of every stage.
    pub fn clear(&mut self) {
        self.stages.clear();
        self.version += 1;
        info!("Cleared all drafts (version {})", self.version);
    }

    fn stage_len(&self, stage: Stage) -> usize {
        self.stages.get(&stage).map_or(0, |entries| entries.len())
    }

    /// Number of drafts per stage, including empty stages.
    pub fn counts(&self) -> BTreeMap<Stage, usize> {
        Stage::ALL
            .into_iter()
            .map(|stage| (stage, self.stage_len(stage)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stages.values().map(|entries| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summaries(&self, stage: Stage) -> Vec<DraftSummary> {
        self.stages
            .get(&stage)
            .map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| DraftSummary::new(stage, i, entry))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Flattened entries of the selected stages at the current version.
    pub fn snapshot(&self, filter: &StageFilter) -> Snapshot {
        let entries: Vec<DraftEntry> = filter
            .iter()
            .filter_map(|stage| self.stages.get(&stage))
            .flat_map(|entries| entries.iter().cloned())
            .collect();
        debug!(
            "Snapshot v{} of {:?}: {} drafts",
            self.version,
            filter.display_names(),
            entries.len()
        );
        Snapshot {
            version: self.version,
            stages: filter.clone(),
            entries,
        }
    }
}
