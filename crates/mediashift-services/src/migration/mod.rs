//! Batched migration of catalog items to the object store

pub mod engine;
pub mod outcome;
pub mod scheduler;
pub mod stats;

pub use engine::{MigrationEngine, NO_FILES, NO_MORE_FILES};
pub use outcome::{ItemOutcome, MigrationError, SkipReason};
pub use scheduler::{MigrationScheduler, SchedulerRun};
pub use stats::catalog_statistics;
