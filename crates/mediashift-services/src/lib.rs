//! Mediashift Services Layer
//!
//! This crate is the service layer: the migration engine and its batch
//! scheduler, the connectivity probe and the upload offloader. The API and CLI
//! crates construct these from a validated `MigrationConfig` and the catalog
//! and object-store collaborators; keep thin HTTP and terminal handling there.

pub mod migration;
pub mod offload;
pub mod probe;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use migration::{
    catalog_statistics, ItemOutcome, MigrationEngine, MigrationError, MigrationScheduler,
    SchedulerRun, SkipReason, NO_FILES, NO_MORE_FILES,
};
pub use offload::{UploadLocation, UploadOffloader};
pub use probe::{ConnectivityProbe, ProbeReport};
