//! Route configuration and setup

use crate::constants::{API_PREFIX, MAX_BODY_BYTES};
use crate::handlers::{health, migration};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

fn migration_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/migration/batch", post(migration::migrate_batch))
        .route("/migration/test-connection", post(migration::test_connection))
        .route("/migration/status", get(migration::migration_status))
}

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest(API_PREFIX, migration_routes())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
