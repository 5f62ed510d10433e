//! Per-side pick and ban timing.
//!
//! A position is counted per acting side: the third pick a side makes is
//! position 3 no matter how many actions the other side has taken.

use std::collections::HashMap;

use tracing::debug;

use super::{round_one_decimal, valid_records, AnalysisError};
use crate::config::TimingConfig;
use crate::models::{
    Catalog, DraftAction, DraftEntry, DraftOrder, DraftRecord, EntityId, Side, Tendency,
    TimingRow, SIDE_COUNT,
};

#[derive(Debug, Default)]
struct Positions {
    pick_sum: u64,
    picks: u32,
    ban_sum: u64,
    bans: u32,
}

impl Positions {
    fn occurrences(&self) -> u32 {
        self.picks + self.bans
    }
}

/// Position samples keyed by entity, in first-seen order.
#[derive(Debug, Default)]
struct PositionLog {
    index: HashMap<EntityId, usize>,
    rows: Vec<(EntityId, Positions)>,
}

impl PositionLog {
    fn slot(&mut self, id: &EntityId) -> &mut Positions {
        let slot = match self.index.get(id) {
            Some(&i) => i,
            None => {
                self.index.insert(id.clone(), self.rows.len());
                self.rows.push((id.clone(), Positions::default()));
                self.rows.len() - 1
            }
        };
        &mut self.rows[slot].1
    }

    fn pick(&mut self, id: &EntityId, position: usize) {
        let entry = self.slot(id);
        entry.pick_sum += position as u64;
        entry.picks += 1;
    }

    fn ban(&mut self, id: &EntityId, position: usize) {
        let entry = self.slot(id);
        entry.ban_sum += position as u64;
        entry.bans += 1;
    }

    fn record(&mut self, record: &DraftRecord) {
        match &record.order {
            DraftOrder::Chronological(history) => {
                let mut picks = [0usize; SIDE_COUNT];
                let mut bans = [0usize; SIDE_COUNT];
                for event in history {
                    let side = event.side.index();
                    match event.action {
                        DraftAction::Pick => {
                            picks[side] += 1;
                            self.pick(&event.target, picks[side]);
                        }
                        DraftAction::Ban => {
                            bans[side] += 1;
                            self.ban(&event.target, bans[side]);
                        }
                        DraftAction::EffectBan => {}
                    }
                }
            }
            DraftOrder::Positional => {
                for side in Side::ALL {
                    let draft = record.side(side);
                    for (i, id) in draft.all_picks().enumerate() {
                        self.pick(id, i + 1);
                    }
                    for (i, id) in draft.bans.iter().enumerate() {
                        self.ban(id, i + 1);
                    }
                }
            }
        }
    }
}

fn average(sum: u64, samples: u32) -> Option<f64> {
    if samples == 0 {
        None
    } else {
        Some(round_one_decimal(sum as f64 / samples as f64))
    }
}

/// Classify an average position against `early_max`/`mid_max` bands.
pub fn tendency(average: Option<f64>, early_max: u32, mid_max: u32) -> Tendency {
    match average {
        None => Tendency::NoData,
        Some(avg) if avg <= f64::from(early_max) => Tendency::Early,
        Some(avg) if avg <= f64::from(mid_max) => Tendency::Mid,
        Some(_) => Tendency::Late,
    }
}

/// Average per-side pick and ban positions of every entity with enough
/// samples.
///
/// Drafts with a recorded history use it; the rest fall back to stored list
/// order, where phase-two picks continue after the side's phase-one picks.
/// Effect bans never contribute. Rows come back in first-seen order.
pub fn analyze_timing(
    entries: &[DraftEntry],
    catalog: &Catalog,
    config: &TimingConfig,
) -> Result<Vec<TimingRow>, AnalysisError> {
    let records = valid_records(entries)?;

    let mut log = PositionLog::default();
    for record in &records {
        log.record(record);
    }

    let seen = log.rows.len();
    let rows: Vec<TimingRow> = log
        .rows
        .into_iter()
        .filter(|(_, p)| p.occurrences() >= config.min_occurrences)
        .map(|(id, p)| {
            let avg_pick_position = average(p.pick_sum, p.picks);
            let avg_ban_position = average(p.ban_sum, p.bans);
            TimingRow {
                name: catalog.display_name(&id).to_string(),
                pick_samples: p.picks,
                ban_samples: p.bans,
                avg_pick_position,
                pick_tendency: tendency(
                    avg_pick_position,
                    config.pick_early_max,
                    config.pick_mid_max,
                ),
                avg_ban_position,
                ban_tendency: tendency(avg_ban_position, config.ban_early_max, config.ban_mid_max),
                id,
            }
        })
        .collect();

    debug!(
        "Timing: {} of {} entities have at least {} occurrences",
        rows.len(),
        seen,
        config.min_occurrences
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DraftEvent, Entity, SideDraft};
    use pretty_assertions::assert_eq;

    fn ids(items: &[&str]) -> Vec<EntityId> {
        items.iter().map(|s| EntityId::from(*s)).collect()
    }

    fn catalog() -> Catalog {
        Catalog::new(
            ["X", "Y", "Q", "W"]
                .iter()
                .map(|n| Entity::pickable(*n, "Group"))
                .collect(),
            Vec::new(),
        )
    }

    fn every_sample() -> TimingConfig {
        TimingConfig {
            min_occurrences: 1,
            ..TimingConfig::default()
        }
    }

    fn event(side: Side, action: DraftAction, target: &str) -> DraftEvent {
        DraftEvent {
            side,
            action,
            target: EntityId::from(target),
        }
    }

    fn row<'a>(rows: &'a [TimingRow], id: &str) -> &'a TimingRow {
        rows.iter().find(|r| r.id.as_str() == id).unwrap()
    }

    #[test]
    fn test_history_positions() {
        let sides = [
            SideDraft {
                picks: ids(&["x", "y"]),
                bans: ids(&["q"]),
                ..Default::default()
            },
            SideDraft::default(),
        ];
        let record = DraftRecord::new(sides, None).with_history(vec![
            event(Side::First, DraftAction::Pick, "x"),
            event(Side::First, DraftAction::Pick, "y"),
            event(Side::First, DraftAction::Ban, "q"),
        ]);
        assert!(matches!(record.order, DraftOrder::Chronological(_)));

        let rows =
            analyze_timing(&[DraftEntry::from(record)], &catalog(), &every_sample()).unwrap();
        assert_eq!(row(&rows, "x").avg_pick_position, Some(1.0));
        assert_eq!(row(&rows, "y").avg_pick_position, Some(2.0));
        assert_eq!(row(&rows, "q").avg_ban_position, Some(1.0));
        assert_eq!(row(&rows, "q").avg_pick_position, None);
        assert_eq!(row(&rows, "q").pick_tendency, Tendency::NoData);
        assert_eq!(row(&rows, "x").ban_tendency, Tendency::NoData);
    }

    #[test]
    fn test_history_positions_are_per_side() {
        let sides = [
            SideDraft {
                picks: ids(&["x"]),
                ..Default::default()
            },
            SideDraft {
                picks: ids(&["y", "w"]),
                ..Default::default()
            },
        ];
        let record = DraftRecord::new(sides, None).with_history(vec![
            event(Side::Second, DraftAction::Pick, "y"),
            event(Side::Second, DraftAction::EffectBan, "lantern"),
            event(Side::Second, DraftAction::Pick, "w"),
            event(Side::First, DraftAction::Pick, "x"),
        ]);

        let rows =
            analyze_timing(&[DraftEntry::from(record)], &catalog(), &every_sample()).unwrap();
        assert_eq!(row(&rows, "x").avg_pick_position, Some(1.0));
        assert_eq!(row(&rows, "w").avg_pick_position, Some(2.0));
        assert!(rows.iter().all(|r| r.id.as_str() != "lantern"));
    }

    #[test]
    fn test_positional_fallback() {
        let sides = [
            SideDraft {
                picks: ids(&["a", "b"]),
                late_picks: ids(&["c"]),
                bans: ids(&["q", "r"]),
                effect_bans: ids(&["lantern"]),
            },
            SideDraft {
                picks: ids(&["d"]),
                late_picks: ids(&["e"]),
                ..Default::default()
            },
        ];
        let rows = analyze_timing(
            &[DraftEntry::from(DraftRecord::new(sides, None))],
            &catalog(),
            &every_sample(),
        )
        .unwrap();

        assert_eq!(row(&rows, "c").avg_pick_position, Some(3.0));
        assert_eq!(row(&rows, "e").avg_pick_position, Some(2.0));
        assert_eq!(row(&rows, "r").avg_ban_position, Some(2.0));
        assert!(rows.iter().all(|r| r.id.as_str() != "lantern"));
        // Unknown ids keep their raw id as name.
        assert_eq!(row(&rows, "c").name, "c");
    }

    #[test]
    fn test_suppression_boundary() {
        let pick = |id: &str| -> DraftEntry {
            DraftRecord::new(
                [
                    SideDraft {
                        picks: ids(&[id]),
                        ..Default::default()
                    },
                    SideDraft::default(),
                ],
                None,
            )
            .into()
        };
        let mut entries: Vec<DraftEntry> = (0..4).map(|_| pick("w")).collect();
        entries.extend((0..5).map(|_| pick("x")));

        let rows = analyze_timing(&entries, &catalog(), &TimingConfig::default()).unwrap();
        let included: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(included, vec!["x"]);
        assert_eq!(rows[0].name, "X");
        assert_eq!(rows[0].pick_samples, 5);
    }

    #[test]
    fn test_picks_and_bans_combine_toward_threshold() {
        let entries: Vec<DraftEntry> = (0..5)
            .map(|i| {
                let (picks, bans) = if i < 3 {
                    (ids(&["x"]), vec![])
                } else {
                    (vec![], ids(&["x"]))
                };
                DraftRecord::new(
                    [
                        SideDraft {
                            picks,
                            bans,
                            ..Default::default()
                        },
                        SideDraft::default(),
                    ],
                    None,
                )
                .into()
            })
            .collect();

        let rows = analyze_timing(&entries, &catalog(), &TimingConfig::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].pick_samples, rows[0].ban_samples), (3, 2));
    }

    #[test]
    fn test_tendency_bands() {
        let config = TimingConfig::default();
        let pick = |avg| tendency(Some(avg), config.pick_early_max, config.pick_mid_max);
        let ban = |avg| tendency(Some(avg), config.ban_early_max, config.ban_mid_max);

        assert_eq!(pick(4.0), Tendency::Early);
        assert_eq!(pick(4.1), Tendency::Mid);
        assert_eq!(pick(8.0), Tendency::Mid);
        assert_eq!(pick(9.0), Tendency::Late);
        assert_eq!(ban(2.0), Tendency::Early);
        assert_eq!(ban(3.0), Tendency::Mid);
        assert_eq!(ban(5.0), Tendency::Late);
        assert_eq!(tendency(None, 4, 8), Tendency::NoData);
    }

    #[test]
    fn test_averages_round_to_one_decimal() {
        assert_eq!(average(10, 3), Some(3.3));
        assert_eq!(average(0, 0), None);
    }

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(
            analyze_timing(&[], &catalog(), &TimingConfig::default()),
            Err(AnalysisError::NothingToAnalyze)
        );
    }
}
