//! Statistics calculation engine.
//!
//! Pure computations over a snapshot of draft entries:
//! - Per-entity pick/ban/win aggregation and draft-wide totals
//! - Pairing affinity for a focus entity
//! - Counter-pick responses and head-to-head matchups
//! - Per-side pick/ban timing
//! - Key-driven sorting of the resulting tables
//!
//! Every call is self-contained and recomputes from its input.

pub mod aggregate;
pub mod counters;
pub mod pairing;
pub mod ranking;
pub mod timing;

pub use aggregate::{aggregate, effect_rows, entity_rows, focus_candidates};
pub use counters::analyze_counters;
pub use pairing::analyze_pairings;
pub use ranking::{
    sort_effects, sort_entities, sort_timing, EffectSortKey, EntitySortKey, SortDirection,
    SortKey, SortState, TimingSortKey,
};
pub use timing::analyze_timing;

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{DraftEntry, DraftRecord, EntityId};

/// Errors that end an analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("No drafts to analyze for the selected stages")]
    NothingToAnalyze,
}

/// Percentage of `count` over `total`; `None` when `total` is zero.
pub fn calculate_rate(count: u32, total: u32) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(count as f64 / total as f64 * 100.0)
    }
}

/// Integer percentage of `count` over `total`; 0 when `total` is zero.
pub fn round_percentage(count: u32, total: u32) -> u32 {
    calculate_rate(count, total).map_or(0, |r| r.round() as u32)
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The analysable records of a snapshot.
pub(crate) fn valid_records(entries: &[DraftEntry]) -> Result<Vec<&DraftRecord>, AnalysisError> {
    let records: Vec<&DraftRecord> = entries.iter().filter_map(DraftEntry::record).collect();
    if records.is_empty() {
        return Err(AnalysisError::NothingToAnalyze);
    }
    Ok(records)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TallyCounts {
    pub count: u32,
    pub wins: u32,
}

/// Occurrence and win counter keyed by entity, kept in first-seen order.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    index: HashMap<EntityId, usize>,
    rows: Vec<(EntityId, TallyCounts)>,
}

impl Tally {
    pub fn record(&mut self, id: &EntityId, won: bool) {
        let slot = match self.index.get(id) {
            Some(&i) => i,
            None => {
                self.index.insert(id.clone(), self.rows.len());
                self.rows.push((id.clone(), TallyCounts::default()));
                self.rows.len() - 1
            }
        };
        let counts = &mut self.rows[slot].1;
        counts.count += 1;
        if won {
            counts.wins += 1;
        }
    }

    /// Number of distinct ids seen.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn total(&self) -> u32 {
        self.rows.iter().map(|(_, c)| c.count).sum()
    }

    /// Rows by count descending; equal counts keep first-seen order.
    pub fn into_ranked(self) -> Vec<(EntityId, TallyCounts)> {
        let mut rows = self.rows;
        rows.sort_by(|a, b| b.1.count.cmp(&a.1.count));
        rows
    }
}
