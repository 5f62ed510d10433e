//! Key-driven sorting of result tables.
//!
//! Each table declares its sort keys. Names compare ignoring case and
//! accents, counts and rates numerically, tendencies by
//! `Early < Mid < Late < N/A`.
//! All sorts are stable, so rows that compare equal keep their input order.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{EffectRow, EntityRow, TimingRow};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown sort key: {0}")]
pub struct UnknownSortKey(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

/// A sortable column of a result table.
pub trait SortKey: Copy + Eq {
    /// Direction applied when the key is newly selected.
    fn default_direction(self) -> SortDirection;
}

/// Sort state of one table.
///
/// Selecting the current key again flips the direction; selecting a new key
/// resets to that key's default direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState<K> {
    key: K,
    direction: SortDirection,
}

impl<K: SortKey> SortState<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            direction: key.default_direction(),
        }
    }

    pub fn select(&mut self, key: K) {
        if key == self.key {
            self.direction = self.direction.toggled();
        } else {
            self.key = key;
            self.direction = key.default_direction();
        }
    }

    pub fn key(&self) -> K {
        self.key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Columns of the entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySortKey {
    Name,
    Picks,
    Bans,
    PickRate,
    BanRate,
    Presence,
    WinRate,
}

impl SortKey for EntitySortKey {
    fn default_direction(self) -> SortDirection {
        match self {
            EntitySortKey::Name => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

impl FromStr for EntitySortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(EntitySortKey::Name),
            "picks" => Ok(EntitySortKey::Picks),
            "bans" => Ok(EntitySortKey::Bans),
            "pick_rate" | "pickRate" => Ok(EntitySortKey::PickRate),
            "ban_rate" | "banRate" => Ok(EntitySortKey::BanRate),
            "presence" => Ok(EntitySortKey::Presence),
            "win_rate" | "winRate" => Ok(EntitySortKey::WinRate),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

/// Columns of the timing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingSortKey {
    Name,
    AvgPickPosition,
    PickTendency,
    AvgBanPosition,
    BanTendency,
}

impl SortKey for TimingSortKey {
    // Positions read earliest first, so every timing column starts ascending.
    fn default_direction(self) -> SortDirection {
        SortDirection::Asc
    }
}

impl FromStr for TimingSortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(TimingSortKey::Name),
            "avg_pick_position" | "avgPickPos" => Ok(TimingSortKey::AvgPickPosition),
            "pick_tendency" | "pickTendency" => Ok(TimingSortKey::PickTendency),
            "avg_ban_position" | "avgBanPos" => Ok(TimingSortKey::AvgBanPosition),
            "ban_tendency" | "banTendency" => Ok(TimingSortKey::BanTendency),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

/// Columns of the effect ban table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSortKey {
    Name,
    Bans,
}

impl SortKey for EffectSortKey {
    fn default_direction(self) -> SortDirection {
        match self {
            EffectSortKey::Name => SortDirection::Asc,
            EffectSortKey::Bans => SortDirection::Desc,
        }
    }
}

impl FromStr for EffectSortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(EffectSortKey::Name),
            "bans" => Ok(EffectSortKey::Bans),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

/// Lowercase with diacritics stripped, so `Ö` collates with `o`.
fn fold_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Name order ignoring case and accents. Ties fall back to the accented
/// lowercase form, then the exact text.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    fold_name(a)
        .cmp(&fold_name(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Missing rates sort below every measured rate.
fn compare_rates(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

/// Missing positions sort after every measured position.
fn compare_positions(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

pub fn sort_entities(rows: &mut [EntityRow], key: EntitySortKey, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = match key {
            EntitySortKey::Name => compare_names(&a.name, &b.name),
            EntitySortKey::Picks => a.picks.cmp(&b.picks),
            EntitySortKey::Bans => a.bans.cmp(&b.bans),
            EntitySortKey::PickRate => compare_rates(a.pick_rate, b.pick_rate),
            EntitySortKey::BanRate => compare_rates(a.ban_rate, b.ban_rate),
            EntitySortKey::Presence => compare_rates(a.presence, b.presence),
            EntitySortKey::WinRate => compare_rates(a.win_rate, b.win_rate),
        };
        direction.apply(ordering)
    });
}

pub fn sort_timing(rows: &mut [TimingRow], key: TimingSortKey, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = match key {
            TimingSortKey::Name => compare_names(&a.name, &b.name),
            TimingSortKey::AvgPickPosition => {
                compare_positions(a.avg_pick_position, b.avg_pick_position)
            }
            TimingSortKey::PickTendency => a.pick_tendency.cmp(&b.pick_tendency),
            TimingSortKey::AvgBanPosition => {
                compare_positions(a.avg_ban_position, b.avg_ban_position)
            }
            TimingSortKey::BanTendency => a.ban_tendency.cmp(&b.ban_tendency),
        };
        direction.apply(ordering)
    });
}

pub fn sort_effects(rows: &mut [EffectRow], key: EffectSortKey, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = match key {
            EffectSortKey::Name => compare_names(&a.name, &b.name),
            EffectSortKey::Bans => a.bans.cmp(&b.bans),
        };
        direction.apply(ordering)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityId, Tendency};
    use pretty_assertions::assert_eq;

    fn entity(name: &str, picks: u32, win_rate: Option<f64>) -> EntityRow {
        EntityRow {
            id: EntityId::from(name.to_lowercase()),
            name: name.to_string(),
            picks,
            bans: 0,
            wins: 0,
            games_played: 0,
            pick_rate: Some(picks as f64 * 10.0),
            ban_rate: Some(0.0),
            presence: Some(picks as f64 * 10.0),
            win_rate,
        }
    }

    fn timing(name: &str, pick: Option<f64>, tendency: Tendency) -> TimingRow {
        TimingRow {
            id: EntityId::from(name.to_lowercase()),
            name: name.to_string(),
            pick_samples: 5,
            ban_samples: 0,
            avg_pick_position: pick,
            pick_tendency: tendency,
            avg_ban_position: None,
            ban_tendency: Tendency::NoData,
        }
    }

    fn names<T>(rows: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
        rows.iter().map(|r| name(r).to_string()).collect()
    }

    #[test]
    fn test_sort_state_toggles_same_key() {
        let mut state = SortState::new(EntitySortKey::Name);
        assert_eq!(state.direction(), SortDirection::Asc);
        state.select(EntitySortKey::Name);
        assert_eq!(state.direction(), SortDirection::Desc);
        state.select(EntitySortKey::Name);
        assert_eq!(state.direction(), SortDirection::Asc);
    }

    #[test]
    fn test_sort_state_new_key_resets_to_default() {
        let mut state = SortState::new(EntitySortKey::Name);
        state.select(EntitySortKey::Picks);
        assert_eq!(state.key(), EntitySortKey::Picks);
        assert_eq!(state.direction(), SortDirection::Desc);

        state.select(EntitySortKey::Picks);
        assert_eq!(state.direction(), SortDirection::Asc);

        state.select(EntitySortKey::Name);
        assert_eq!(state.direction(), SortDirection::Asc);
    }

    #[test]
    fn test_independent_table_states() {
        let mut entities = SortState::new(EntitySortKey::Name);
        let timing = SortState::new(TimingSortKey::Name);
        entities.select(EntitySortKey::WinRate);
        assert_eq!(timing.key(), TimingSortKey::Name);
        assert_eq!(timing.direction(), SortDirection::Asc);
    }

    #[test]
    fn test_sort_entities_by_name_is_case_insensitive() {
        let mut rows = vec![
            entity("beta", 1, None),
            entity("Alpha", 2, None),
            entity("gamma", 3, None),
        ];
        sort_entities(&mut rows, EntitySortKey::Name, SortDirection::Asc);
        assert_eq!(names(&rows, |r| r.name.as_str()), vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_accented_names_sort_with_base_letter() {
        let mut rows = vec![
            entity("Zwei Association Yi Sang", 1, None),
            entity("Öufi Association Heathcliff", 1, None),
            entity("Pequod Captain Ishmael", 1, None),
            entity("LCB Sinner Ryōshū", 1, None),
        ];
        sort_entities(&mut rows, EntitySortKey::Name, SortDirection::Asc);
        assert_eq!(
            names(&rows, |r| r.name.as_str()),
            vec![
                "LCB Sinner Ryōshū",
                "Öufi Association Heathcliff",
                "Pequod Captain Ishmael",
                "Zwei Association Yi Sang",
            ]
        );
        assert_eq!(compare_names("Öufi", "oufi"), Ordering::Greater);
        assert_eq!(compare_names("Öufi", "Oz"), Ordering::Less);
    }

    #[test]
    fn test_sort_by_name_twice_is_stable() {
        let mut rows = vec![
            entity("Delta", 1, None),
            entity("alpha", 2, None),
            entity("Charlie", 3, None),
            entity("Alpha", 4, None),
        ];
        sort_entities(&mut rows, EntitySortKey::Name, SortDirection::Asc);
        let first = rows.clone();
        sort_entities(&mut rows, EntitySortKey::Name, SortDirection::Asc);
        assert_eq!(rows, first);
    }

    #[test]
    fn test_sort_entities_numeric_desc() {
        let mut rows = vec![entity("A", 1, None), entity("B", 5, None), entity("C", 3, None)];
        sort_entities(&mut rows, EntitySortKey::Picks, SortDirection::Desc);
        assert_eq!(names(&rows, |r| r.name.as_str()), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_entities_win_rate_missing_last_when_desc() {
        let mut rows = vec![
            entity("A", 1, None),
            entity("B", 1, Some(0.0)),
            entity("C", 1, Some(75.0)),
        ];
        sort_entities(&mut rows, EntitySortKey::WinRate, SortDirection::Desc);
        assert_eq!(names(&rows, |r| r.name.as_str()), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_sort_timing_by_tendency_ordinal() {
        let mut rows = vec![
            timing("NoPick", None, Tendency::NoData),
            timing("Late", Some(10.0), Tendency::Late),
            timing("Early", Some(2.0), Tendency::Early),
            timing("Mid", Some(6.0), Tendency::Mid),
        ];
        sort_timing(&mut rows, TimingSortKey::PickTendency, SortDirection::Asc);
        assert_eq!(names(&rows, |r| r.name.as_str()), vec!["Early", "Mid", "Late", "NoPick"]);
    }

    #[test]
    fn test_sort_timing_missing_position_last_when_asc() {
        let mut rows = vec![
            timing("NoPick", None, Tendency::NoData),
            timing("Late", Some(10.0), Tendency::Late),
            timing("Early", Some(2.0), Tendency::Early),
        ];
        sort_timing(&mut rows, TimingSortKey::AvgPickPosition, SortDirection::Asc);
        assert_eq!(names(&rows, |r| r.name.as_str()), vec!["Early", "Late", "NoPick"]);
    }

    #[test]
    fn test_sort_effects() {
        let effect = |name: &str, bans| EffectRow {
            id: EntityId::from(name),
            name: name.to_string(),
            bans,
            ban_rate: None,
        };
        let mut rows = vec![effect("b", 1), effect("a", 3), effect("c", 2)];
        sort_effects(&mut rows, EffectSortKey::Bans, EffectSortKey::Bans.default_direction());
        assert_eq!(names(&rows, |r| r.name.as_str()), vec!["a", "c", "b"]);
        sort_effects(&mut rows, EffectSortKey::Name, SortDirection::Asc);
        assert_eq!(names(&rows, |r| r.name.as_str()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("winRate".parse::<EntitySortKey>(), Ok(EntitySortKey::WinRate));
        assert_eq!("pick_rate".parse::<EntitySortKey>(), Ok(EntitySortKey::PickRate));
        assert_eq!("avgBanPos".parse::<TimingSortKey>(), Ok(TimingSortKey::AvgBanPosition));
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("height".parse::<EntitySortKey>().is_err());
    }
}
