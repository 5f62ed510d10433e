//! Entity catalog: the static pool of pickable entities and ban-only effects.
//!
//! The catalog is supplied once at startup by an external loader and is only
//! read by the analysis engine. Every entry is identified by a slug derived
//! from its display name.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::EntityId;

/// Group assigned when an entry's name matches no configured group.
pub const UNKNOWN_GROUP: &str = "Unknown";

fn slug_patterns() -> &'static [(Regex, &'static str); 5] {
    static PATTERNS: OnceLock<[(Regex, &'static str); 5]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (Regex::new(r" & ").expect("valid pattern"), " "),
            (Regex::new(r#"[.'"]"#).expect("valid pattern"), ""),
            (Regex::new(r"\s+").expect("valid pattern"), "-"),
            (Regex::new(r"-+").expect("valid pattern"), "-"),
            (Regex::new(r"[^A-Za-z0-9_-]+").expect("valid pattern"), ""),
        ]
    })
}

/// Names whose published slugs keep only part of a non-ASCII spelling.
const SLUG_ALIASES: [(&str, &str); 2] = [("ryōshū", "ryshu"), ("öufi", "ufi")];

/// Derive the catalog slug for a display name.
///
/// Known spellings are rewritten first; any other non-ASCII letter is
/// dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = name.to_lowercase();
    for (spelling, alias) in SLUG_ALIASES {
        slug = slug.replace(spelling, alias);
    }
    slug = slug.replace("e.g.o::", "ego-");
    for (pattern, replacement) in slug_patterns() {
        slug = pattern.replace_all(&slug, *replacement).into_owned();
    }
    slug
}

/// Kind-specific metadata of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKind {
    Pickable { group: String, image: String },
    Effect { group: String },
}

/// A pickable entity or a banned-only effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    #[serde(flatten)]
    pub kind: EntityKind,
}

impl Entity {
    /// Create a pickable entity; its image reference follows the slug.
    pub fn pickable(name: impl Into<String>, group: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            id: EntityId::new(slug.clone()),
            name,
            kind: EntityKind::Pickable {
                group: group.into(),
                image: format!("{}.webp", slug),
            },
        }
    }

    /// Create a ban-only effect. Effects are keyed by name and group together.
    pub fn effect(name: &str, group: &str) -> Self {
        Self {
            id: EntityId::new(slugify(&format!("{} {}", name, group))),
            name: format!("{} ({})", name, group),
            kind: EntityKind::Effect {
                group: group.to_string(),
            },
        }
    }

    pub fn group(&self) -> &str {
        match &self.kind {
            EntityKind::Pickable { group, .. } | EntityKind::Effect { group } => group,
        }
    }
}

/// One entry of the external reference dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
}

/// The reference dataset as loaded from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSource {
    #[serde(default)]
    pub entities: Vec<CatalogEntry>,
    #[serde(default)]
    pub effects: Vec<CatalogEntry>,
}

fn detect_group<'a>(name: &str, groups: &'a [String]) -> Option<&'a str> {
    groups
        .iter()
        .find(|g| name.contains(g.as_str()))
        .map(String::as_str)
}

/// Read-only catalog of entities and effects, indexed by slug.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: Vec<Entity>,
    effects: Vec<Entity>,
    entity_index: HashMap<EntityId, usize>,
    effect_index: HashMap<EntityId, usize>,
}

impl Catalog {
    /// Build a catalog. Duplicate slugs within a kind keep the first entry.
    pub fn new(entities: Vec<Entity>, effects: Vec<Entity>) -> Self {
        let (entities, entity_index) = Self::index(entities, "entity");
        let (effects, effect_index) = Self::index(effects, "effect");
        Self {
            entities,
            effects,
            entity_index,
            effect_index,
        }
    }

    fn index(items: Vec<Entity>, label: &str) -> (Vec<Entity>, HashMap<EntityId, usize>) {
        let mut kept = Vec::with_capacity(items.len());
        let mut index = HashMap::with_capacity(items.len());
        for item in items {
            if index.contains_key(&item.id) {
                warn!("Duplicate {} slug {} ({}), keeping first", label, item.id, item.name);
                continue;
            }
            index.insert(item.id.clone(), kept.len());
            kept.push(item);
        }
        (kept, index)
    }

    /// Build a catalog from the reference dataset, assigning groups from the
    /// configured group names when an entry has none.
    pub fn from_source(source: CatalogSource, groups: &[String]) -> Self {
        let entities = source
            .entities
            .into_iter()
            .filter(|e| !e.name.trim().is_empty())
            .map(|e| {
                let group = e
                    .group
                    .or_else(|| detect_group(&e.name, groups).map(str::to_string))
                    .unwrap_or_else(|| UNKNOWN_GROUP.to_string());
                Entity::pickable(e.name.trim(), group)
            })
            .collect();

        let effects = source
            .effects
            .into_iter()
            .filter(|e| !e.name.trim().is_empty())
            .map(|e| match e.group {
                Some(group) => Entity::effect(e.name.trim(), &group),
                None => match detect_group(&e.name, groups) {
                    Some(group) => Entity::effect(e.name.replace(group, "").trim(), group),
                    None => Entity::effect(e.name.trim(), UNKNOWN_GROUP),
                },
            })
            .collect();

        Self::new(entities, effects)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn effects(&self) -> &[Entity] {
        &self.effects
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entity_index.get(id).map(|&i| &self.entities[i])
    }

    pub fn effect(&self, id: &EntityId) -> Option<&Entity> {
        self.effect_index.get(id).map(|&i| &self.effects[i])
    }

    /// Display name for an entity, falling back to the raw id.
    pub fn display_name<'a>(&'a self, id: &'a EntityId) -> &'a str {
        self.entity(id).map_or(id.as_str(), |e| e.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.effects.is_empty()
    }
}
