//! Application state shared by all handlers.

use mediashift_db::CatalogScanner;
use mediashift_services::{ConnectivityProbe, MigrationEngine};
use sqlx::PgPool;
use std::sync::Arc;

/// Engine and probe built from a validated migration configuration.
#[derive(Clone)]
pub struct MigrationServices {
    pub engine: Arc<MigrationEngine>,
    pub probe: ConnectivityProbe,
    /// Batch size used by the batch endpoint.
    pub batch_size: u32,
}

/// Offload availability. Migration endpoints refuse to run unless `Ready`.
#[derive(Clone)]
pub enum Offload {
    Ready(MigrationServices),
    /// Human-readable reason, usually the list of missing settings.
    NotConfigured(String),
}

impl Offload {
    pub fn is_configured(&self) -> bool {
        matches!(self, Offload::Ready(_))
    }
}

#[derive(Clone)]
pub struct AppState {
    /// Absent only when the state is built without a database (tests).
    pub pool: Option<PgPool>,
    /// Read side of the catalog, available whether or not offload is configured.
    pub scanner: Arc<dyn CatalogScanner>,
    pub offload: Offload,
}
