//! Object store abstraction trait
//!
//! This module defines the narrow interface the migration engine needs from a
//! remote object store: put a local file under a key, and probe a bucket.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Source file unreadable: {0}")]
    SourceUnreadable(String),

    #[error("Bucket not reachable: {0}")]
    BucketUnreachable(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object store client
///
/// Implementations are expected to apply their own per-request timeout and retry
/// policy. Errors are opaque causes; the caller attaches them to its own reports.
/// Putting an existing key overwrites it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `source` to `bucket/key`, readable by anyone (public-read).
    async fn put_object(&self, bucket: &str, key: &str, source: &Path) -> StorageResult<()>;

    /// Check that `bucket` exists and is reachable with the configured credentials.
    async fn head_bucket(&self, bucket: &str) -> StorageResult<()>;
}

/// Reject keys that would escape the prefix or address the bucket root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
