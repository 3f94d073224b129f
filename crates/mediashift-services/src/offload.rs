//! Offloading of freshly uploaded files

use mediashift_core::MigrationConfig;
use mediashift_storage::ObjectStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where an upload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadLocation {
    /// Transferred; the CDN URL to store in the catalog.
    Remote(String),
    /// Kept on local disk, untouched.
    Local(PathBuf),
}

impl UploadLocation {
    /// The value to record as the item's stored location.
    pub fn stored_location(&self) -> String {
        match self {
            UploadLocation::Remote(url) => url.clone(),
            UploadLocation::Local(path) => path.display().to_string(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, UploadLocation::Remote(_))
    }
}

/// Moves a newly uploaded file to the object store before it is ever cataloged
/// as local.
#[derive(Clone)]
pub struct UploadOffloader {
    config: Arc<MigrationConfig>,
    store: Arc<dyn ObjectStore>,
}

impl UploadOffloader {
    pub fn new(config: Arc<MigrationConfig>, store: Arc<dyn ObjectStore>) -> Self {
        Self { config, store }
    }

    /// Upload `local_file` under the derived key, delete it locally, and return the CDN
    /// URL. A missing file or a failed transfer keeps the upload local.
    #[tracing::instrument(skip(self), fields(path = %local_file.display()))]
    pub async fn offload_upload(&self, local_file: &Path) -> UploadLocation {
        let keep_local = || UploadLocation::Local(local_file.to_path_buf());

        let is_file = tokio::fs::metadata(local_file)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return keep_local();
        }

        let rules = &self.config.location;
        let stored = local_file.to_string_lossy();
        let (Some(key), Some(url)) = (rules.remote_key(&stored), rules.cdn_url_for_path(&stored))
        else {
            return keep_local();
        };

        if let Err(e) = self
            .store
            .put_object(&self.config.bucket, &key, local_file)
            .await
        {
            tracing::error!(error = %e, key = %key, "Upload offload failed, keeping local file");
            return keep_local();
        }

        if let Err(e) = tokio::fs::remove_file(local_file).await {
            tracing::warn!(error = %e, "Failed to delete local copy of offloaded upload");
        }

        tracing::info!(key = %key, url = %url, "Upload offloaded");
        UploadLocation::Remote(url)
    }
}
