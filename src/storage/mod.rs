//! Filesystem input for the draft store and entity catalog.
//!
//! Layout under the data directory:
//! - `drafts/<stage>.jsonl`: one decoded draft per line
//! - `catalog.json`: the entity/effect reference dataset

mod jsonl;

pub use jsonl::{load_catalog, load_store, JsonlReader};

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Stage;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.data_dir.join("drafts")
    }

    /// JSONL file holding one stage's drafts.
    pub fn stage_path(&self, stage: Stage) -> PathBuf {
        self.drafts_dir().join(format!("{}.jsonl", stage.as_str()))
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("catalog.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.drafts_dir(), PathBuf::from("/data/drafts"));
        assert_eq!(
            config.stage_path(Stage::Playoffs),
            PathBuf::from("/data/drafts/playoffs.jsonl")
        );
        assert_eq!(config.catalog_path(), PathBuf::from("/data/catalog.json"));
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
