//! Domain models
//!
//! Catalog items as the migration engine sees them, and the ephemeral values
//! the engine hands back to its callers.

pub mod item;
pub mod migration;

pub use item::{DerivedAsset, ItemId, LocationFilter, MediaItem};
pub use migration::{BatchResult, MigrationStatistics};
