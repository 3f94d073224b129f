#[cfg(feature = "storage-s3")]
use crate::S3ObjectStore;
use crate::{ObjectStore, StorageResult};
use mediashift_core::MigrationConfig;
use std::sync::Arc;

/// Create the object store client described by a validated migration config
#[cfg(feature = "storage-s3")]
pub fn create_object_store(config: &MigrationConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    tracing::debug!(
        bucket = %config.bucket,
        region = %config.region,
        endpoint = ?config.endpoint,
        "Creating S3 object store client"
    );
    let store = S3ObjectStore::from_config(config)?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "storage-s3"))]
pub fn create_object_store(_config: &MigrationConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    Err(crate::StorageError::ConfigError(
        "S3 object store not available (storage-s3 feature not enabled)".to_string(),
    ))
}
