//! # Draft Stats
//!
//! Pick/ban statistics over recorded tournament drafts.
//!
//! ## Architecture
//!
//! - **models**: Draft records, catalog entities, stages and result rows
//! - **calculate**: Aggregation, pairing, counter-pick, timing and sorting
//! - **store**: Versioned in-memory draft store with read snapshots
//! - **storage**: JSONL draft files and the catalog reference dataset
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;

pub use models::*;
