//! JSONL (JSON Lines) input.
//!
//! Each line is one JSON object. Lines that fail to parse are logged and
//! skipped so one bad line never hides the rest of a file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};
use crate::models::{Catalog, CatalogSource, DraftEntry, RawDraft, Stage};
use crate::store::DraftStore;

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entries from the file. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        let mut line_num = 0;

        for line in reader.lines() {
            line_num += 1;
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        line_num, self.path, e
                    );
                }
            }
        }

        debug!("Read {} entries from {:?}", entries.len(), self.path);
        Ok(entries)
    }
}

/// Load every stage file into a fresh store.
///
/// Each raw draft is decoded once; drafts missing their pick or ban
/// containers are stored as malformed entries rather than dropped.
pub fn load_store(config: &StorageConfig) -> Result<DraftStore, StorageError> {
    let mut store = DraftStore::new();

    for stage in Stage::ALL {
        let reader: JsonlReader<RawDraft> = JsonlReader::new(config.stage_path(stage));
        let raws = reader.read_all()?;
        let loaded = store.extend(stage, raws.into_iter().map(DraftEntry::decode));
        if loaded > 0 {
            info!("Loaded {} drafts for {}", loaded, stage.display_name());
        }
    }

    Ok(store)
}

/// Load the entity catalog reference dataset.
pub fn load_catalog(config: &StorageConfig, groups: &[String]) -> Result<Catalog, StorageError> {
    let path = config.catalog_path();
    if !path.exists() {
        return Err(StorageError::PathNotFound(path));
    }

    let contents = std::fs::read_to_string(&path)?;
    let source: CatalogSource = serde_json::from_str(&contents)?;
    let catalog = Catalog::from_source(source, groups);

    info!(
        "Loaded catalog: {} entities, {} effects",
        catalog.entities().len(),
        catalog.effects().len()
    );
    Ok(catalog)
}
