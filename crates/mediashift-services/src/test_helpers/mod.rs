//! Test helpers for engine and surface tests
//!
//! In-memory implementations of the catalog and object-store collaborators plus
//! fixtures, so the engine can be exercised without PostgreSQL or S3.

pub mod mock_catalog;
pub mod mock_storage;

pub use mock_catalog::InMemoryCatalog;
pub use mock_storage::{InMemoryObjectStore, PutRecord};

use crate::MigrationEngine;
use mediashift_core::{MigrationConfig, OffloadSettings};
use std::path::Path;
use std::sync::Arc;

pub const TEST_BUCKET: &str = "media-bucket";
/// CDN base containing the default remote marker, so migrated items classify as remote.
pub const TEST_CDN_URL: &str = "https://media-bucket.s3.amazonaws.com";

/// Complete offload settings pointing at the test bucket.
pub fn test_settings(local_root: Option<&Path>) -> OffloadSettings {
    OffloadSettings {
        bucket: Some(TEST_BUCKET.to_string()),
        access_key_id: Some("AKIATEST".to_string()),
        secret_access_key: Some("test-secret".to_string()),
        cdn_url: Some(TEST_CDN_URL.to_string()),
        local_root: local_root.map(|p| p.display().to_string()),
        ..OffloadSettings::default()
    }
}

pub fn test_config(local_root: Option<&Path>) -> MigrationConfig {
    MigrationConfig::from_settings(&test_settings(local_root)).unwrap()
}

/// Engine over fresh in-memory collaborators, returned with handles to them.
pub fn test_engine(
    local_root: Option<&Path>,
) -> (MigrationEngine, InMemoryCatalog, InMemoryObjectStore) {
    let config = Arc::new(test_config(local_root));
    let catalog = InMemoryCatalog::new(config.location.remote_marker());
    let store = InMemoryObjectStore::new();
    let engine = MigrationEngine::new(
        config,
        Arc::new(catalog.clone()),
        Arc::new(catalog.clone()),
        Arc::new(store.clone()),
    );
    (engine, catalog, store)
}
