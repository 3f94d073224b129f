//! Test helpers: build AppState and router over in-memory collaborators.
//!
//! No database or object store is needed: the catalog and the store are the
//! fakes from `mediashift_services::test_helpers`.

use axum_test::TestServer;
use mediashift_api::constants;
use mediashift_api::setup::routes;
use mediashift_api::state::{AppState, MigrationServices, Offload};
use mediashift_core::MediaItem;
use mediashift_services::test_helpers::{
    test_config, InMemoryCatalog, InMemoryObjectStore,
};
use mediashift_services::{ConnectivityProbe, MigrationEngine};
use std::sync::Arc;
use tempfile::TempDir;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus handles on the fakes it runs against.
pub struct TestApp {
    pub server: TestServer,
    pub catalog: InMemoryCatalog,
    pub store: InMemoryObjectStore,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Add a local item whose file exists under the temp dir.
    pub fn add_local_item(&self, id: i64, name: &str) {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, b"payload").unwrap();
        self.catalog
            .insert(MediaItem::new(id, path.display().to_string()));
    }
}

fn build(catalog: InMemoryCatalog, store: InMemoryObjectStore, offload: Offload) -> TestApp {
    let state = Arc::new(AppState {
        pool: None,
        scanner: Arc::new(catalog.clone()),
        offload,
    });
    let app = routes::setup_routes(state);
    let server =
        TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        catalog,
        store,
        temp_dir: TempDir::new().unwrap(),
    }
}

/// App with offload configured, a batch size of `batch_size`.
pub fn setup_test_app(batch_size: u32) -> TestApp {
    let mut config = test_config(None);
    config.batch_size = batch_size;
    let config = Arc::new(config);

    let catalog = InMemoryCatalog::new(config.location.remote_marker());
    let store = InMemoryObjectStore::new();
    let engine = Arc::new(MigrationEngine::new(
        config.clone(),
        Arc::new(catalog.clone()),
        Arc::new(catalog.clone()),
        Arc::new(store.clone()),
    ));
    let offload = Offload::Ready(MigrationServices {
        engine,
        probe: ConnectivityProbe::new(config, Arc::new(store.clone())),
        batch_size,
    });

    build(catalog, store, offload)
}

/// App whose offload settings are incomplete.
pub fn setup_unconfigured_app() -> TestApp {
    let catalog = InMemoryCatalog::new("amazonaws.com");
    build(
        catalog,
        InMemoryObjectStore::new(),
        Offload::NotConfigured("missing required settings: OFFLOAD_S3_BUCKET".to_string()),
    )
}
