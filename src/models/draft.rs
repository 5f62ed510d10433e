//! Draft records: the raw import shape and the canonical analysed shape.
//!
//! Raw drafts arrive from the external decode step with every container
//! optional. [`DraftEntry::decode`] resolves each raw draft exactly once into
//! either a canonical [`DraftRecord`] or a malformed marker, so the analysis
//! code only ever sees one record shape.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::{DraftId, EffectId, EntityId};

/// Number of competing sides in a draft.
pub const SIDE_COUNT: usize = 2;

/// One of the competing sides, addressed by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "p1")]
    First,
    #[serde(rename = "p2")]
    Second,
}

impl Side {
    pub const ALL: [Side; SIDE_COUNT] = [Side::First, Side::Second];

    pub fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::First => "Left Side",
            Side::Second => "Right Side",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::First => write!(f, "p1"),
            Side::Second => write!(f, "p2"),
        }
    }
}

/// Kind of a chronological draft action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftAction {
    #[serde(rename = "ID_PICK")]
    Pick,
    #[serde(rename = "ID_BAN")]
    Ban,
    #[serde(rename = "EGO_BAN")]
    EffectBan,
}

/// One event of a draft's chronological history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEvent {
    #[serde(rename = "player")]
    pub side: Side,
    #[serde(rename = "type")]
    pub action: DraftAction,
    #[serde(rename = "targetId")]
    pub target: EntityId,
}

// ── Raw import shape ────────────────────────────────────────────

/// Per-side lists as they appear in the import format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSideLists {
    #[serde(default)]
    pub p1: Option<Vec<EntityId>>,
    #[serde(default)]
    pub p2: Option<Vec<EntityId>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawParticipant {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawParticipants {
    #[serde(default)]
    pub p1: Option<RawParticipant>,
    #[serde(default)]
    pub p2: Option<RawParticipant>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDraftBody {
    #[serde(default)]
    pub picks: Option<RawSideLists>,
    #[serde(default)]
    pub picks_s2: Option<RawSideLists>,
    #[serde(default, rename = "idBans")]
    pub bans: Option<RawSideLists>,
    #[serde(default, rename = "egoBans")]
    pub effect_bans: Option<RawSideLists>,
    #[serde(default)]
    pub history: Option<Vec<DraftEvent>>,
}

/// A decoded draft code with its attached winner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDraft {
    #[serde(default)]
    pub participants: Option<RawParticipants>,
    #[serde(default)]
    pub draft: Option<RawDraftBody>,
    #[serde(default)]
    pub winner: Option<Side>,
}

/// Why a raw draft could not be resolved into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing draft body")]
    MissingDraft,

    #[error("missing {0} container")]
    MissingContainer(&'static str),
}

fn split_sides(
    lists: Option<RawSideLists>,
    name: &'static str,
) -> Result<[Vec<EntityId>; SIDE_COUNT], DecodeError> {
    let lists = lists.ok_or(DecodeError::MissingContainer(name))?;
    match (lists.p1, lists.p2) {
        (Some(p1), Some(p2)) => Ok([p1, p2]),
        _ => Err(DecodeError::MissingContainer(name)),
    }
}

// ── Canonical shape ─────────────────────────────────────────────

/// Everything one side picked and banned in a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideDraft {
    /// Phase-one picks in stored order
    pub picks: Vec<EntityId>,
    /// Phase-two picks, continuing the phase-one order
    pub late_picks: Vec<EntityId>,
    pub bans: Vec<EntityId>,
    pub effect_bans: Vec<EffectId>,
}

impl SideDraft {
    /// Phase-one then phase-two picks.
    pub fn all_picks(&self) -> impl Iterator<Item = &EntityId> {
        self.picks.iter().chain(self.late_picks.iter())
    }

    pub fn has_picked(&self, id: &EntityId) -> bool {
        self.all_picks().any(|p| p == id)
    }

    pub fn pick_count(&self) -> usize {
        self.picks.len() + self.late_picks.len()
    }
}

/// Where per-side action positions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOrder {
    /// Recorded history of every action in draft order.
    Chronological(Vec<DraftEvent>),
    /// No usable history; positions follow the stored list order.
    Positional,
}

/// A canonical draft record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRecord {
    pub id: DraftId,
    pub participants: [String; SIDE_COUNT],
    pub sides: [SideDraft; SIDE_COUNT],
    pub order: DraftOrder,
    pub winner: Option<Side>,
}

impl DraftRecord {
    /// Create a record without history; positions follow list order.
    pub fn new(sides: [SideDraft; SIDE_COUNT], winner: Option<Side>) -> Self {
        let participants = ["Side A".to_string(), "Side B".to_string()];
        let id = content_id(&participants, &sides, winner);
        Self {
            id,
            participants,
            sides,
            order: DraftOrder::Positional,
            winner,
        }
    }

    /// Attach a chronological history, falling back to list order when the
    /// history disagrees with the flat pick/ban lists.
    pub fn with_history(mut self, history: Vec<DraftEvent>) -> Self {
        self.order = resolve_order(&self.id, &self.sides, history);
        self
    }

    pub fn with_participants(
        mut self,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        self.participants = [first.into(), second.into()];
        self.id = content_id(&self.participants, &self.sides, self.winner);
        self
    }

    pub fn side(&self, side: Side) -> &SideDraft {
        &self.sides[side.index()]
    }

    /// Whether `side` won this draft.
    pub fn won_by(&self, side: Side) -> bool {
        self.winner == Some(side)
    }

    /// Resolve a raw draft into the canonical shape.
    pub fn decode(raw: RawDraft) -> Result<Self, DecodeError> {
        let body = raw.draft.ok_or(DecodeError::MissingDraft)?;
        let picks = split_sides(body.picks, "picks")?;
        let bans = split_sides(body.bans, "idBans")?;
        let late_picks = match body.picks_s2 {
            Some(lists) => split_sides(Some(lists), "picks_s2")?,
            None => Default::default(),
        };
        let effect_bans = match body.effect_bans {
            Some(lists) => [lists.p1.unwrap_or_default(), lists.p2.unwrap_or_default()],
            None => Default::default(),
        };

        let [picks_a, picks_b] = picks;
        let [late_a, late_b] = late_picks;
        let [bans_a, bans_b] = bans;
        let [effects_a, effects_b] = effect_bans;
        let sides = [
            SideDraft {
                picks: picks_a,
                late_picks: late_a,
                bans: bans_a,
                effect_bans: effects_a,
            },
            SideDraft {
                picks: picks_b,
                late_picks: late_b,
                bans: bans_b,
                effect_bans: effects_b,
            },
        ];

        let participants = raw.participants.unwrap_or_default();
        let name_or = |p: Option<RawParticipant>, fallback: &str| {
            p.map(|p| p.name)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };
        let record = Self::new(sides, raw.winner).with_participants(
            name_or(participants.p1, "Side A"),
            name_or(participants.p2, "Side B"),
        );

        Ok(match body.history {
            Some(history) if !history.is_empty() => record.with_history(history),
            _ => record,
        })
    }
}

fn content_id(
    participants: &[String; SIDE_COUNT],
    sides: &[SideDraft; SIDE_COUNT],
    winner: Option<Side>,
) -> DraftId {
    let join = |ids: &[EntityId]| ids.iter().map(EntityId::as_str).collect::<Vec<_>>().join(",");
    let mut fields = Vec::with_capacity(SIDE_COUNT * 5 + 1);
    for (name, side) in participants.iter().zip(sides) {
        fields.push(name.clone());
        fields.push(join(&side.picks));
        fields.push(join(&side.late_picks));
        fields.push(join(&side.bans));
        fields.push(join(&side.effect_bans));
    }
    fields.push(winner.map(|w| w.to_string()).unwrap_or_default());
    let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
    DraftId::generate(&refs)
}

fn resolve_order(
    id: &DraftId,
    sides: &[SideDraft; SIDE_COUNT],
    history: Vec<DraftEvent>,
) -> DraftOrder {
    for side in Side::ALL {
        let count = |action: DraftAction| {
            history
                .iter()
                .filter(|e| e.side == side && e.action == action)
                .count()
        };
        let flat = &sides[side.index()];
        if count(DraftAction::Pick) != flat.pick_count()
            || count(DraftAction::Ban) != flat.bans.len()
        {
            warn!(
                "Draft {} history disagrees with {} pick/ban lists, using list order",
                id, side
            );
            return DraftOrder::Positional;
        }
    }
    DraftOrder::Chronological(history)
}

/// A stored draft: either analysable or kept only for listing.
#[derive(Debug, Clone)]
pub enum DraftEntry {
    Valid(Arc<DraftRecord>),
    Malformed { reason: DecodeError },
}

impl DraftEntry {
    pub fn decode(raw: RawDraft) -> Self {
        match DraftRecord::decode(raw) {
            Ok(record) => DraftEntry::Valid(Arc::new(record)),
            Err(reason) => DraftEntry::Malformed { reason },
        }
    }

    pub fn record(&self) -> Option<&DraftRecord> {
        match self {
            DraftEntry::Valid(record) => Some(record),
            DraftEntry::Malformed { .. } => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, DraftEntry::Malformed { .. })
    }
}

impl From<DraftRecord> for DraftEntry {
    fn from(record: DraftRecord) -> Self {
        DraftEntry::Valid(Arc::new(record))
    }
}
