//! Counter-pick responses and head-to-head matchups for a focus entity.

use tracing::debug;

use super::{calculate_rate, valid_records, AnalysisError, Tally, TallyCounts};
use crate::config::MatchupConfig;
use crate::models::{
    AdvantageTier, Catalog, CounterReport, DraftEntry, EntityId, Matchup, ResponsePick, Side,
};

/// Analyse what the opposing side picks against `focus` and how those
/// matchups end.
///
/// Response picks count every opposing pick. Matchups count each opposing
/// entity once per game, and are classified only once they reach
/// `thresholds.min_games`.
pub fn analyze_counters(
    entries: &[DraftEntry],
    focus: &EntityId,
    catalog: &Catalog,
    thresholds: &MatchupConfig,
) -> Result<CounterReport, AnalysisError> {
    let records = valid_records(entries)?;

    let mut responses = Tally::default();
    let mut matchups = Tally::default();

    for record in &records {
        for side in Side::ALL {
            if !record.side(side).has_picked(focus) {
                continue;
            }
            let opponent = side.opponent();
            let opponent_won = record.won_by(opponent);
            let focus_won = record.won_by(side);

            let mut seen: Vec<&EntityId> = Vec::new();
            for pick in record.side(opponent).all_picks().filter(|p| *p != focus) {
                responses.record(pick, opponent_won);
                if !seen.contains(&pick) {
                    seen.push(pick);
                    matchups.record(pick, focus_won);
                }
            }
        }
    }

    let total_responses = responses.total();
    debug!(
        "Counters for {}: {} response picks, {} opposing entities",
        focus,
        total_responses,
        matchups.len()
    );

    let responses = responses
        .into_ranked()
        .into_iter()
        .map(|(id, counts)| ResponsePick {
            name: catalog.display_name(&id).to_string(),
            count: counts.count,
            wins: counts.wins,
            response_share: calculate_rate(counts.count, total_responses),
            win_rate: calculate_rate(counts.wins, counts.count),
            id,
        })
        .collect();

    let mut strong_against = Vec::new();
    let mut weak_against = Vec::new();
    for (id, counts) in matchups.into_ranked() {
        if counts.count < thresholds.min_games {
            continue;
        }
        let verdict = classify(counts, thresholds);
        if verdict == Verdict::Neutral {
            continue;
        }
        let win_rate = calculate_rate(counts.wins, counts.count).unwrap_or_default();
        let matchup = Matchup {
            name: catalog.display_name(&id).to_string(),
            games: counts.count,
            focus_side_wins: counts.wins,
            win_rate,
            advantage: (win_rate - 50.0).abs(),
            tier: advantage_tier(counts, thresholds),
            id,
        };
        match verdict {
            Verdict::Strong => strong_against.push(matchup),
            Verdict::Weak => weak_against.push(matchup),
            Verdict::Neutral => {}
        }
    }
    strong_against.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    weak_against.sort_by(|a, b| a.win_rate.total_cmp(&b.win_rate));

    Ok(CounterReport {
        focus: focus.clone(),
        total_responses,
        responses,
        strong_against,
        weak_against,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Strong,
    Weak,
    Neutral,
}

// Thresholds are compared as `wins * 100` against `pct * games` so that
// boundary rates such as 2/5 land exactly on 40.
fn classify(counts: TallyCounts, thresholds: &MatchupConfig) -> Verdict {
    let scaled_wins = u64::from(counts.wins) * 100;
    let games = u64::from(counts.count);
    if scaled_wins >= u64::from(thresholds.strong_pct) * games {
        Verdict::Strong
    } else if scaled_wins <= u64::from(thresholds.weak_pct) * games {
        Verdict::Weak
    } else {
        Verdict::Neutral
    }
}

fn advantage_tier(counts: TallyCounts, thresholds: &MatchupConfig) -> AdvantageTier {
    let games = i64::from(counts.count);
    let distance = (i64::from(counts.wins) * 100 - 50 * games).abs();
    if distance >= i64::from(thresholds.strong_advantage) * games {
        AdvantageTier::Strong
    } else if distance >= i64::from(thresholds.moderate_advantage) * games {
        AdvantageTier::Moderate
    } else {
        AdvantageTier::Slight
    }
}
