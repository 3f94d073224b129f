//! Object-store connectivity check

use mediashift_core::MigrationConfig;
use mediashift_storage::ObjectStore;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a connectivity probe, with a human-readable cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub success: bool,
    pub message: String,
}

#[derive(Clone)]
pub struct ConnectivityProbe {
    config: Arc<MigrationConfig>,
    store: Arc<dyn ObjectStore>,
}

impl ConnectivityProbe {
    pub fn new(config: Arc<MigrationConfig>, store: Arc<dyn ObjectStore>) -> Self {
        Self { config, store }
    }

    /// `head_bucket` against the configured bucket.
    #[tracing::instrument(skip(self), fields(bucket = %self.config.bucket))]
    pub async fn probe(&self) -> ProbeReport {
        match self.store.head_bucket(&self.config.bucket).await {
            Ok(()) => {
                tracing::info!("Object store reachable");
                ProbeReport {
                    success: true,
                    message: format!(
                        "Connected to bucket '{}' in region {}. CDN URL: {}",
                        self.config.bucket,
                        self.config.region,
                        self.config.cdn_base_url()
                    ),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Object store connectivity check failed");
                ProbeReport {
                    success: false,
                    message: format!("Connection failed: {}", e),
                }
            }
        }
    }
}
