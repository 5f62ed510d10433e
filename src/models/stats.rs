//! Derived statistics models.
//!
//! Every value here is recomputed per analysis pass and never persisted.
//! Rates are percentages in `[0, 100]`; `None` means "no data" and is kept
//! distinct from a measured `0.0`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, Side};
use crate::calculate::calculate_rate;

/// Per-entity counters from one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedEntityStat {
    pub entity: Entity,
    pub picks: u32,
    pub bans: u32,
    pub wins: u32,
    pub games_played: u32,
}

impl AggregatedEntityStat {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            picks: 0,
            bans: 0,
            wins: 0,
            games_played: 0,
        }
    }

    pub fn pick_rate(&self, total_drafts: u32) -> Option<f64> {
        calculate_rate(self.picks, total_drafts)
    }

    pub fn ban_rate(&self, total_drafts: u32) -> Option<f64> {
        calculate_rate(self.bans, total_drafts)
    }

    /// Combined pick and ban rate.
    pub fn presence(&self, total_drafts: u32) -> Option<f64> {
        calculate_rate(self.picks + self.bans, total_drafts)
    }

    /// Win rate over games played; `None` when never played.
    pub fn win_rate(&self) -> Option<f64> {
        calculate_rate(self.wins, self.games_played)
    }

    /// Whether the entity appeared at all in the analysed drafts.
    pub fn is_present(&self) -> bool {
        self.picks > 0 || self.bans > 0
    }
}

/// Ban counter for a banned-only effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectStat {
    pub effect: Entity,
    pub bans: u32,
}

impl EffectStat {
    pub fn ban_rate(&self, total_drafts: u32) -> Option<f64> {
        calculate_rate(self.bans, total_drafts)
    }
}

/// Draft-wide totals for one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_drafts: u32,
    pub drafts_with_winner: u32,
    pub drafts_without_winner: u32,
    pub first_side_wins: u32,
    pub second_side_wins: u32,
    /// Rounded percentage; 0 when no draft has a winner
    pub first_side_win_rate: u32,
    /// Rounded percentage; 0 when no draft has a winner
    pub second_side_win_rate: u32,
    /// Rounded percentage of drafts that carry a winner
    pub win_data_coverage: u32,
    pub total_picks: u32,
    pub total_bans: u32,
    pub total_effect_bans: u32,
}

impl OverallStats {
    pub fn side_wins(&self, side: Side) -> u32 {
        match side {
            Side::First => self.first_side_wins,
            Side::Second => self.second_side_wins,
        }
    }

    pub fn side_win_rate(&self, side: Side) -> u32 {
        match side {
            Side::First => self.first_side_win_rate,
            Side::Second => self.second_side_win_rate,
        }
    }
}

/// Data-quality findings of an aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    /// Entries skipped because their pick/ban containers were missing
    pub malformed_records: u32,
    /// Picked or banned ids absent from the catalog, with occurrence counts
    pub unknown_entities: BTreeMap<EntityId, u32>,
    /// Banned effect ids absent from the catalog, with occurrence counts
    pub unknown_effects: BTreeMap<EntityId, u32>,
}

impl DataQuality {
    pub fn is_clean(&self) -> bool {
        self.malformed_records == 0
            && self.unknown_entities.is_empty()
            && self.unknown_effects.is_empty()
    }
}

/// Output of the aggregation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub overall: OverallStats,
    /// One entry per catalog entity, in catalog order
    pub per_entity: Vec<AggregatedEntityStat>,
    /// One entry per catalog effect, in catalog order
    pub per_effect: Vec<EffectStat>,
    pub quality: DataQuality,
}

impl Aggregate {
    pub fn entity(&self, id: &EntityId) -> Option<&AggregatedEntityStat> {
        self.per_entity.iter().find(|s| &s.entity.id == id)
    }

    pub fn effect(&self, id: &EntityId) -> Option<&EffectStat> {
        self.per_effect.iter().find(|s| &s.effect.id == id)
    }
}

/// A row of the entity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRow {
    pub id: EntityId,
    pub name: String,
    pub picks: u32,
    pub bans: u32,
    pub wins: u32,
    pub games_played: u32,
    pub pick_rate: Option<f64>,
    pub ban_rate: Option<f64>,
    pub presence: Option<f64>,
    pub win_rate: Option<f64>,
}

impl EntityRow {
    pub fn from_stat(stat: &AggregatedEntityStat, total_drafts: u32) -> Self {
        Self {
            id: stat.entity.id.clone(),
            name: stat.entity.name.clone(),
            picks: stat.picks,
            bans: stat.bans,
            wins: stat.wins,
            games_played: stat.games_played,
            pick_rate: stat.pick_rate(total_drafts),
            ban_rate: stat.ban_rate(total_drafts),
            presence: stat.presence(total_drafts),
            win_rate: stat.win_rate(),
        }
    }
}

/// A row of the effect ban table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRow {
    pub id: EntityId,
    pub name: String,
    pub bans: u32,
    pub ban_rate: Option<f64>,
}

impl EffectRow {
    pub fn from_stat(stat: &EffectStat, total_drafts: u32) -> Self {
        Self {
            id: stat.effect.id.clone(),
            name: stat.effect.name.clone(),
            bans: stat.bans,
            ban_rate: stat.ban_rate(total_drafts),
        }
    }
}

/// A pickable entity offered as a focus for pairing/counter analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusCandidate {
    pub id: EntityId,
    pub name: String,
    pub picks: u32,
    pub pick_rate: f64,
}

/// An entity picked alongside the focus entity by the same side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingStat {
    pub partner: EntityId,
    pub name: String,
    pub count: u32,
    pub wins: u32,
    /// Share of the focus entity's games that included this partner
    pub pairing_rate: Option<f64>,
    pub win_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingReport {
    pub focus: EntityId,
    pub games_with_focus: u32,
    pub wins_with_focus: u32,
    pub focus_win_rate: Option<f64>,
    /// Partners ranked by co-occurrence count
    pub partners: Vec<PairingStat>,
}

/// An entity the opposing side picked against the focus entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePick {
    pub id: EntityId,
    pub name: String,
    pub count: u32,
    /// Wins of the responding side
    pub wins: u32,
    /// Share of all response picks recorded against the focus entity
    pub response_share: Option<f64>,
    pub win_rate: Option<f64>,
}

/// Magnitude band of a head-to-head advantage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvantageTier {
    Slight,
    Moderate,
    Strong,
}

impl std::fmt::Display for AdvantageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvantageTier::Slight => write!(f, "Slight"),
            AdvantageTier::Moderate => write!(f, "Moderate"),
            AdvantageTier::Strong => write!(f, "Strong"),
        }
    }
}

/// Head-to-head record of the focus entity against one opposing entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub id: EntityId,
    pub name: String,
    pub games: u32,
    pub focus_side_wins: u32,
    /// Focus side win rate
    pub win_rate: f64,
    /// Distance of the win rate from 50%
    pub advantage: f64,
    pub tier: AdvantageTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterReport {
    pub focus: EntityId,
    pub total_responses: u32,
    /// Response picks ranked by count
    pub responses: Vec<ResponsePick>,
    /// Matchups favouring the focus entity, best first
    pub strong_against: Vec<Matchup>,
    /// Matchups against the focus entity, worst first
    pub weak_against: Vec<Matchup>,
}

/// Early/mid/late classification of an average action position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tendency {
    Early,
    Mid,
    Late,
    NoData,
}

impl std::fmt::Display for Tendency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tendency::Early => write!(f, "Early"),
            Tendency::Mid => write!(f, "Mid"),
            Tendency::Late => write!(f, "Late"),
            Tendency::NoData => write!(f, "N/A"),
        }
    }
}

/// Per-side pick/ban timing of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingRow {
    pub id: EntityId,
    pub name: String,
    pub pick_samples: u32,
    pub ban_samples: u32,
    /// Mean per-side pick position, one decimal
    pub avg_pick_position: Option<f64>,
    pub pick_tendency: Tendency,
    /// Mean per-side ban position, one decimal
    pub avg_ban_position: Option<f64>,
    pub ban_tendency: Tendency,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(picks: u32, bans: u32, wins: u32, games: u32) -> AggregatedEntityStat {
        AggregatedEntityStat {
            entity: Entity::pickable("Test", "Group"),
            picks,
            bans,
            wins,
            games_played: games,
        }
    }

    #[test]
    fn test_entity_rates() {
        let s = stat(3, 1, 2, 3);
        assert_eq!(s.pick_rate(10), Some(30.0));
        assert_eq!(s.ban_rate(10), Some(10.0));
        assert_eq!(s.presence(10), Some(40.0));
        let wr = s.win_rate().unwrap();
        assert!((wr - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_never_played_has_no_win_rate() {
        let never = stat(0, 4, 0, 0);
        let always_lost = stat(2, 0, 0, 2);
        assert_eq!(never.win_rate(), None);
        assert_eq!(always_lost.win_rate(), Some(0.0));
    }

    #[test]
    fn test_rates_without_drafts() {
        let s = stat(0, 0, 0, 0);
        assert_eq!(s.pick_rate(0), None);
        assert!(!s.is_present());
    }

    #[test]
    fn test_tendency_ordering() {
        assert!(Tendency::Early < Tendency::Mid);
        assert!(Tendency::Mid < Tendency::Late);
        assert!(Tendency::Late < Tendency::NoData);
        assert_eq!(format!("{}", Tendency::NoData), "N/A");
    }

    #[test]
    fn test_entity_row_serializes_missing_rate_as_null() {
        let row = EntityRow::from_stat(&stat(0, 1, 0, 0), 4);
        let json = serde_json::to_value(&row).unwrap();
        assert!(json["win_rate"].is_null());
        assert_eq!(json["ban_rate"], 25.0);
    }

    #[test]
    fn test_advantage_tier_display() {
        assert_eq!(format!("{}", AdvantageTier::Strong), "Strong");
        assert_eq!(
            serde_json::to_string(&AdvantageTier::Moderate).unwrap(),
            "\"moderate\""
        );
    }
}
