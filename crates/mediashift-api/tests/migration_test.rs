//! Migration API integration tests.
//!
//! Run with: `cargo test -p mediashift-api --test migration_test`

mod helpers;

use helpers::{api_path, setup_test_app, setup_unconfigured_app};
use mediashift_api::handlers::health::HealthCheckResponse;
use mediashift_api::handlers::migration::{BatchResponse, ConnectionResponse, StatusResponse};

#[tokio::test]
async fn test_batch_endpoint_converges() {
    let app = setup_test_app(2);
    for (id, name) in [(1, "a.jpg"), (2, "b.jpg"), (3, "c.jpg")] {
        app.add_local_item(id, name);
    }
    let client = app.client();

    let first: BatchResponse = client.post(&api_path("/migration/batch")).await.json();
    assert!(first.success);
    assert_eq!((first.migrated, first.total), (2, 2));
    assert!(first.errors.is_empty());

    let second: BatchResponse = client.post(&api_path("/migration/batch")).await.json();
    assert_eq!((second.migrated, second.total), (1, 1));

    let third = client.post(&api_path("/migration/batch")).await;
    assert_eq!(third.status_code(), 200);
    let third: BatchResponse = third.json();
    assert!(third.success);
    assert_eq!(third.total, 0);
    assert_eq!(third.message.as_deref(), Some("No more files to migrate"));
    assert_eq!(app.store.object_count(), 3);
}

#[tokio::test]
async fn test_batch_item_failures_are_still_success() {
    let app = setup_test_app(10);
    app.add_local_item(1, "a.jpg");
    app.add_local_item(2, "b.jpg");
    app.store.fail_puts(true);

    let response = app.client().post(&api_path("/migration/batch")).await;

    assert_eq!(response.status_code(), 200);
    let body: BatchResponse = response.json();
    assert!(body.success);
    assert_eq!(body.migrated, 0);
    assert_eq!(body.total, 2);
    assert_eq!(body.errors.len(), 2);
    assert!(body.errors[0].starts_with("Item 1: "));
}

#[tokio::test]
async fn test_batch_cursor_skips_earlier_items() {
    let app = setup_test_app(10);
    app.add_local_item(1, "a.jpg");
    app.add_local_item(2, "b.jpg");
    app.add_local_item(3, "c.jpg");

    let body: BatchResponse = app
        .client()
        .post(&api_path("/migration/batch"))
        .json(&serde_json::json!({ "after": 1 }))
        .await
        .json();

    assert_eq!((body.migrated, body.total), (2, 2));
    assert_eq!(body.next_cursor, Some(3));
    assert!(!app.catalog.file_path(1).unwrap().starts_with("https://"));
}

#[tokio::test]
async fn test_batch_invalid_body() {
    let app = setup_test_app(10);

    let response = app
        .client()
        .post(&api_path("/migration/batch"))
        .text("not json")
        .await;

    assert_eq!(response.status_code(), 400);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "INVALID_INPUT");
    assert!(data["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("JSON parsing error"));
}

#[tokio::test]
async fn test_batch_without_configuration() {
    let app = setup_unconfigured_app();

    let response = app.client().post(&api_path("/migration/batch")).await;

    assert_eq!(response.status_code(), 503);
    let body: BatchResponse = response.json();
    assert!(!body.success);
    assert!(body.message.unwrap().contains("OFFLOAD_S3_BUCKET"));
}

#[tokio::test]
async fn test_batch_catalog_unreachable() {
    let app = setup_test_app(10);
    app.catalog.fail_scans(true);

    let response = app.client().post(&api_path("/migration/batch")).await;

    assert_ne!(response.status_code(), 200);
    let body: BatchResponse = response.json();
    assert!(!body.success);
}

#[tokio::test]
async fn test_connection_reports_check_result() {
    let app = setup_test_app(10);

    let ok: ConnectionResponse = app
        .client()
        .post(&api_path("/migration/test-connection"))
        .await
        .json();
    assert!(ok.success);
    assert!(ok.message.contains("media-bucket"));

    app.store.set_unreachable(true);
    let failed: ConnectionResponse = app
        .client()
        .post(&api_path("/migration/test-connection"))
        .await
        .json();
    assert!(!failed.success);
    assert!(failed.message.starts_with("Connection failed"));
}

#[tokio::test]
async fn test_connection_without_configuration() {
    let app = setup_unconfigured_app();

    let response = app
        .client()
        .post(&api_path("/migration/test-connection"))
        .await;

    assert_eq!(response.status_code(), 503);
    let body: ConnectionResponse = response.json();
    assert!(!body.success);
}

#[tokio::test]
async fn test_status_counts_and_configuration() {
    let app = setup_test_app(10);
    app.add_local_item(1, "a.jpg");
    app.add_local_item(2, "b.jpg");
    app.client().post(&api_path("/migration/batch")).await;
    app.add_local_item(3, "c.jpg");

    let status: StatusResponse = app
        .client()
        .get(&api_path("/migration/status"))
        .await
        .json();

    assert_eq!(status.total, 3);
    assert_eq!(status.remote, 2);
    assert_eq!(status.local, 1);
    assert_eq!(status.percentage, 66.67);
    assert!(status.configured);
}

#[tokio::test]
async fn test_status_without_configuration_still_counts() {
    let app = setup_unconfigured_app();
    app.add_local_item(1, "a.jpg");

    let response = app.client().get(&api_path("/migration/status")).await;

    assert_eq!(response.status_code(), 200);
    let status: StatusResponse = response.json();
    assert_eq!(status.total, 1);
    assert_eq!(status.local, 1);
    assert!(!status.configured);
}

#[tokio::test]
async fn test_status_catalog_unreachable() {
    let app = setup_test_app(10);
    app.catalog.fail_scans(true);

    let response = app.client().get(&api_path("/migration/status")).await;

    assert_eq!(response.status_code(), 500);
    let data: serde_json::Value = response.json();
    assert!(data["code"].is_string());
}

#[tokio::test]
async fn test_health() {
    let app = setup_unconfigured_app();

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: HealthCheckResponse = response.json();
    assert_eq!(body.status, "healthy");
    assert_eq!(body.offload, "not_configured");
}
