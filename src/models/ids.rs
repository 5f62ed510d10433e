//! Identifiers: catalog slugs and deterministic draft hashes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Identifier of a catalog entity or effect (its normalized slug).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(slug: String) -> Self {
        Self(slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Banned-only effects share the slug representation.
pub type EffectId = EntityId;

/// A deterministic draft ID derived from the record's content.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(String);

impl DraftId {
    /// Generate a DraftId from input fields.
    /// Uses SHA256 and takes the first 16 characters for brevity.
    pub fn generate(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DraftId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_id_deterministic() {
        let a = DraftId::generate(&["p1:heathcliff", "p2:outis", "w:p1"]);
        let b = DraftId::generate(&["p1:heathcliff", "p2:outis", "w:p1"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_draft_id_field_boundaries() {
        // The separator keeps ["ab", "c"] and ["a", "bc"] apart
        let a = DraftId::generate(&["ab", "c"]);
        let b = DraftId::generate(&["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_draft_id_hex_format() {
        let id = DraftId::generate(&["test"]);
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_entity_id_transparent_serde() {
        let id = EntityId::from("lcb-sinner-faust");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"lcb-sinner-faust\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_entity_id_ordering() {
        let mut ids = vec![EntityId::from("b"), EntityId::from("a")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "a");
    }
}
