//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::Result;
use mediashift_core::AppConfig;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: &AppConfig) -> Result<(Arc<AppState>, axum::Router)> {
    tracing::info!("Configuration loaded and validated successfully");

    let pool = mediashift_db::connect(config).await?;
    let state = services::initialize_services(config, pool)?;
    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
