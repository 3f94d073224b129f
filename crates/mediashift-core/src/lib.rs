//! Mediashift Core Library
//!
//! This crate provides the domain models, error types, configuration and
//! location rules shared by every Mediashift component.

pub mod config;
pub mod error;
pub mod location;
pub mod models;

// Re-export commonly used types
pub use config::{AppConfig, Credentials, MigrationConfig, OffloadSettings, SchedulerConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use location::LocationRules;
pub use models::{
    BatchResult, DerivedAsset, ItemId, LocationFilter, MediaItem, MigrationStatistics,
};
