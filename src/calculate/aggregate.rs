//! Aggregation of draft entries into per-entity and draft-wide counters.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::ranking::compare_names;
use super::{calculate_rate, round_percentage, valid_records, AnalysisError, Tally};
use crate::models::{
    Aggregate, AggregatedEntityStat, Catalog, DataQuality, DraftEntry, EffectRow, EffectStat,
    EntityId, EntityRow, FocusCandidate, OverallStats, Side,
};

/// Fold a snapshot into per-entity counters and draft-wide totals.
///
/// Every catalog entity and effect gets a row, including those that never
/// appear. Malformed entries are skipped. Ids missing from the catalog still
/// count toward the totals and are reported in [`DataQuality`].
pub fn aggregate(entries: &[DraftEntry], catalog: &Catalog) -> Result<Aggregate, AnalysisError> {
    let records = valid_records(entries)?;

    let mut per_entity: Vec<AggregatedEntityStat> = catalog
        .entities()
        .iter()
        .cloned()
        .map(AggregatedEntityStat::new)
        .collect();
    let mut per_effect: Vec<EffectStat> = catalog
        .effects()
        .iter()
        .cloned()
        .map(|effect| EffectStat { effect, bans: 0 })
        .collect();
    let entity_slot: HashMap<&EntityId, usize> = catalog
        .entities()
        .iter()
        .enumerate()
        .map(|(i, e)| (&e.id, i))
        .collect();
    let effect_slot: HashMap<&EntityId, usize> = catalog
        .effects()
        .iter()
        .enumerate()
        .map(|(i, e)| (&e.id, i))
        .collect();

    let mut overall = OverallStats {
        total_drafts: records.len() as u32,
        ..Default::default()
    };
    let mut quality = DataQuality {
        malformed_records: (entries.len() - records.len()) as u32,
        ..Default::default()
    };

    for record in &records {
        for side in Side::ALL {
            let draft = record.side(side);
            let won = record.won_by(side);

            for id in draft.all_picks() {
                overall.total_picks += 1;
                match entity_slot.get(id) {
                    Some(&i) => {
                        let stat = &mut per_entity[i];
                        stat.picks += 1;
                        stat.games_played += 1;
                        if won {
                            stat.wins += 1;
                        }
                    }
                    None => *quality.unknown_entities.entry(id.clone()).or_default() += 1,
                }
            }

            for id in &draft.bans {
                overall.total_bans += 1;
                match entity_slot.get(id) {
                    Some(&i) => per_entity[i].bans += 1,
                    None => *quality.unknown_entities.entry(id.clone()).or_default() += 1,
                }
            }

            for id in &draft.effect_bans {
                overall.total_effect_bans += 1;
                match effect_slot.get(id) {
                    Some(&i) => per_effect[i].bans += 1,
                    None => *quality.unknown_effects.entry(id.clone()).or_default() += 1,
                }
            }
        }

        match record.winner {
            Some(Side::First) => overall.first_side_wins += 1,
            Some(Side::Second) => overall.second_side_wins += 1,
            None => {}
        }
    }

    let decided = overall.first_side_wins + overall.second_side_wins;
    overall.drafts_with_winner = decided;
    overall.drafts_without_winner = overall.total_drafts - decided;
    overall.first_side_win_rate = round_percentage(overall.first_side_wins, decided);
    overall.second_side_win_rate = round_percentage(overall.second_side_wins, decided);
    overall.win_data_coverage = round_percentage(decided, overall.total_drafts);

    if quality.malformed_records > 0 {
        warn!("Skipped {} malformed draft(s)", quality.malformed_records);
    }
    if !quality.unknown_entities.is_empty() {
        warn!(
            "{} id(s) not in the entity catalog: {:?}",
            quality.unknown_entities.len(),
            quality.unknown_entities.keys().collect::<Vec<_>>()
        );
    }
    if !quality.unknown_effects.is_empty() {
        warn!(
            "{} id(s) not in the effect catalog: {:?}",
            quality.unknown_effects.len(),
            quality.unknown_effects.keys().collect::<Vec<_>>()
        );
    }
    debug!(
        "Aggregated {} drafts: {} picks, {} bans, {} effect bans",
        overall.total_drafts, overall.total_picks, overall.total_bans, overall.total_effect_bans
    );

    Ok(Aggregate {
        overall,
        per_entity,
        per_effect,
        quality,
    })
}

fn matches_search(name: &str, search: Option<&str>) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => name.to_lowercase().contains(&term.to_lowercase()),
        None => true,
    }
}

/// Entity table rows: entities that were picked or banned, filtered by a
/// case-insensitive name search. Rows stay in catalog order.
pub fn entity_rows(aggregate: &Aggregate, search: Option<&str>) -> Vec<EntityRow> {
    let total = aggregate.overall.total_drafts;
    aggregate
        .per_entity
        .iter()
        .filter(|s| s.is_present())
        .filter(|s| matches_search(&s.entity.name, search))
        .map(|s| EntityRow::from_stat(s, total))
        .collect()
}

/// Effect table rows: effects banned at least once, filtered by name search.
pub fn effect_rows(aggregate: &Aggregate, search: Option<&str>) -> Vec<EffectRow> {
    let total = aggregate.overall.total_drafts;
    aggregate
        .per_effect
        .iter()
        .filter(|s| s.bans > 0)
        .filter(|s| matches_search(&s.effect.name, search))
        .map(|s| EffectRow::from_stat(s, total))
        .collect()
}

/// Every picked entity with its pick rate, most picked first, then by name.
pub fn focus_candidates(
    entries: &[DraftEntry],
    catalog: &Catalog,
) -> Result<Vec<FocusCandidate>, AnalysisError> {
    let records = valid_records(entries)?;
    let total = records.len() as u32;

    let mut tally = Tally::default();
    for record in &records {
        for side in Side::ALL {
            for id in record.side(side).all_picks() {
                tally.record(id, false);
            }
        }
    }

    let mut candidates: Vec<FocusCandidate> = tally
        .into_ranked()
        .into_iter()
        .map(|(id, counts)| FocusCandidate {
            name: catalog.display_name(&id).to_string(),
            picks: counts.count,
            pick_rate: calculate_rate(counts.count, total).unwrap_or_default(),
            id,
        })
        .collect();
    candidates.sort_by(|a, b| b.picks.cmp(&a.picks).then_with(|| compare_names(&a.name, &b.name)));
    Ok(candidates)
}
