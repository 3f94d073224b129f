use mediashift_core::MediaItem;
use mediashift_services::test_helpers::{
    test_config, test_engine, InMemoryObjectStore, TEST_BUCKET, TEST_CDN_URL,
};
use mediashift_services::{ConnectivityProbe, MigrationScheduler, UploadLocation, UploadOffloader};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn scheduler_runs_batches_until_converged() {
    let dir = TempDir::new().unwrap();
    let (engine, catalog, store) = test_engine(None);
    for id in 1..=5 {
        let path = dir.path().join(format!("s{}.jpg", id));
        std::fs::write(&path, b"data").unwrap();
        catalog.insert(MediaItem::new(id, path.display().to_string()));
    }
    // Item 6 never migrates; the cursor must carry the pass past it.
    catalog.insert(MediaItem::new(6, dir.path().join("absent.jpg").display().to_string()));

    let scheduler = MigrationScheduler::new(Arc::new(engine), 2, Duration::ZERO);
    let run = scheduler.run_until_converged().await.unwrap();

    assert_eq!(run.batches, 3);
    assert_eq!(run.migrated, 5);
    assert_eq!(run.examined, 6);
    assert!(run.errors.is_empty());
    assert_eq!(store.object_count(), 5);
}

#[tokio::test]
async fn scheduler_collects_item_errors_and_stops() {
    let dir = TempDir::new().unwrap();
    let (engine, catalog, store) = test_engine(None);
    for id in 1..=3 {
        let path = dir.path().join(format!("e{}.jpg", id));
        std::fs::write(&path, b"data").unwrap();
        catalog.insert(MediaItem::new(id, path.display().to_string()));
    }
    store.fail_puts(true);

    let scheduler = MigrationScheduler::new(Arc::new(engine), 2, Duration::ZERO);
    let run = scheduler.run_until_converged().await.unwrap();

    assert_eq!(run.batches, 2);
    assert_eq!(run.migrated, 0);
    assert_eq!(run.errors.len(), 3);
}

#[tokio::test]
async fn scheduler_propagates_scan_failure() {
    let (engine, catalog, _store) = test_engine(None);
    catalog.fail_scans(true);

    let scheduler = MigrationScheduler::new(Arc::new(engine), 10, Duration::ZERO);
    assert!(scheduler.run_until_converged().await.is_err());
}

#[tokio::test]
async fn connectivity_check_reports_bucket_on_success() {
    let store = InMemoryObjectStore::new();
    let probe = ConnectivityProbe::new(Arc::new(test_config(None)), Arc::new(store.clone()));

    let report = probe.probe().await;

    assert!(report.success);
    assert!(report.message.contains(TEST_BUCKET));
    assert!(report.message.contains(TEST_CDN_URL));
    assert_eq!(store.head_calls(), 1);
}

#[tokio::test]
async fn connectivity_check_reports_cause_on_failure() {
    let store = InMemoryObjectStore::new();
    store.set_unreachable(true);
    let probe = ConnectivityProbe::new(Arc::new(test_config(None)), Arc::new(store));

    let report = probe.probe().await;

    assert!(!report.success);
    assert!(report.message.starts_with("Connection failed: "));
    assert!(report.message.contains("not reachable"));
}

#[tokio::test]
async fn offload_upload_moves_file_and_returns_cdn_url() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("new-upload.png");
    std::fs::write(&path, b"png").unwrap();
    let store = InMemoryObjectStore::new();
    let offloader = UploadOffloader::new(Arc::new(test_config(None)), Arc::new(store.clone()));

    let location = offloader.offload_upload(&path).await;

    assert_eq!(
        location,
        UploadLocation::Remote(format!("{}/uploads/new-upload.png", TEST_CDN_URL))
    );
    assert!(store.contains(TEST_BUCKET, "uploads/new-upload.png"));
    assert!(!path.exists());
}

#[tokio::test]
async fn offload_upload_keeps_file_when_transfer_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keep.png");
    std::fs::write(&path, b"png").unwrap();
    let store = InMemoryObjectStore::new();
    store.fail_puts(true);
    let offloader = UploadOffloader::new(Arc::new(test_config(None)), Arc::new(store));

    let location = offloader.offload_upload(&path).await;

    assert!(!location.is_remote());
    assert_eq!(location.stored_location(), path.display().to_string());
    assert!(path.exists());
}
