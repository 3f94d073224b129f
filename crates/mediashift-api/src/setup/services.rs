//! Service wiring: catalog, object store, engine, scheduler

use crate::state::{AppState, MigrationServices, Offload};
use anyhow::Result;
use mediashift_core::AppConfig;
use mediashift_db::PostgresCatalog;
use mediashift_services::{ConnectivityProbe, MigrationEngine, MigrationScheduler};
use mediashift_storage::create_object_store;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Build the application state. Missing offload settings do not fail start-up; the
/// migration endpoints report them instead.
pub fn initialize_services(config: &AppConfig, pool: PgPool) -> Result<Arc<AppState>> {
    let catalog = Arc::new(PostgresCatalog::new(
        pool.clone(),
        config.media_type(),
        config.remote_marker(),
    ));

    let offload = match config.migration() {
        Ok(migration_config) => match create_object_store(&migration_config) {
            Ok(store) => {
                let migration_config = Arc::new(migration_config);
                let engine = Arc::new(MigrationEngine::new(
                    migration_config.clone(),
                    catalog.clone(),
                    catalog.clone(),
                    store.clone(),
                ));
                let batch_size = migration_config.batch_size;

                if config.scheduler.enabled {
                    let scheduler = Arc::new(MigrationScheduler::new(
                        engine.clone(),
                        batch_size,
                        Duration::from_millis(config.scheduler.interval_ms),
                    ));
                    let _scheduler_task = scheduler.start();
                    tracing::info!(
                        interval_ms = config.scheduler.interval_ms,
                        batch_size,
                        "Migration scheduler started"
                    );
                }

                tracing::info!(
                    bucket = %migration_config.bucket,
                    region = %migration_config.region,
                    cdn_url = %migration_config.cdn_base_url(),
                    "Offload configured"
                );

                Offload::Ready(MigrationServices {
                    engine,
                    probe: ConnectivityProbe::new(migration_config, store),
                    batch_size,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create object store client");
                Offload::NotConfigured(e.to_string())
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Offload not configured, migration endpoints disabled");
            Offload::NotConfigured(e.to_string())
        }
    };

    Ok(Arc::new(AppState {
        pool: Some(pool),
        scanner: catalog,
        offload,
    }))
}
