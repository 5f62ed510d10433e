//! Core data models for draft statistics.

mod catalog;
mod draft;
mod ids;
mod stage;
mod stats;

pub use catalog::*;
pub use draft::*;
pub use ids::*;
pub use stage::*;
pub use stats::*;
