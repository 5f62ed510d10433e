//! Pairing affinity: who gets picked alongside a focus entity.

use tracing::debug;

use super::{calculate_rate, valid_records, AnalysisError, Tally};
use crate::models::{Catalog, DraftEntry, EntityId, PairingReport, PairingStat, Side};

/// Rank the entities picked by the same side as `focus`.
///
/// Each side that picked the focus entity counts as one game with it, so a
/// draft where both sides picked it contributes two independent games.
pub fn analyze_pairings(
    entries: &[DraftEntry],
    focus: &EntityId,
    catalog: &Catalog,
) -> Result<PairingReport, AnalysisError> {
    let records = valid_records(entries)?;

    let mut games_with_focus = 0u32;
    let mut wins_with_focus = 0u32;
    let mut partners = Tally::default();

    for record in &records {
        for side in Side::ALL {
            let draft = record.side(side);
            if !draft.has_picked(focus) {
                continue;
            }
            let won = record.won_by(side);
            games_with_focus += 1;
            if won {
                wins_with_focus += 1;
            }
            for partner in draft.all_picks().filter(|p| *p != focus) {
                partners.record(partner, won);
            }
        }
    }

    debug!(
        "Pairings for {}: {} games, {} distinct partners",
        focus,
        games_with_focus,
        partners.len()
    );

    let partners = partners
        .into_ranked()
        .into_iter()
        .map(|(id, counts)| PairingStat {
            name: catalog.display_name(&id).to_string(),
            count: counts.count,
            wins: counts.wins,
            pairing_rate: calculate_rate(counts.count, games_with_focus),
            win_rate: calculate_rate(counts.wins, counts.count),
            partner: id,
        })
        .collect();

    Ok(PairingReport {
        focus: focus.clone(),
        games_with_focus,
        wins_with_focus,
        focus_win_rate: calculate_rate(wins_with_focus, games_with_focus),
        partners,
    })
}
