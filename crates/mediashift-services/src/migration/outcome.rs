use mediashift_core::AppError;
use mediashift_storage::StorageError;
use std::fmt;
use thiserror::Error;

/// Per-item failure. Every variant is caught at the item boundary and reported in the
/// batch's error list; none of them aborts a batch.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The object-store put failed. Catalog and local file are untouched.
    #[error("transfer of '{key}' failed: {source}")]
    Transfer {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The object exists remotely but the catalog still points at the local file.
    /// Re-running the item overwrites the object and retries the update.
    #[error("catalog update failed after transfer of '{key}': {source}")]
    CatalogUpdate {
        key: String,
        #[source]
        source: AppError,
    },

    /// The item could not be loaded from the catalog.
    #[error("catalog lookup failed: {0}")]
    CatalogLookup(#[source] AppError),

    /// A local derived asset has no file name to map to a remote location. Detected
    /// before the transfer, so nothing is changed.
    #[error("derived asset '{asset}' has no file name")]
    UnmappableDerivedAsset { asset: String },
}

impl MigrationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            MigrationError::Transfer { .. } => "TRANSFER_FAILED",
            MigrationError::CatalogUpdate { .. } => "CATALOG_UPDATE_FAILED",
            MigrationError::CatalogLookup(_) => "CATALOG_LOOKUP_FAILED",
            MigrationError::UnmappableDerivedAsset { .. } => "DERIVED_ASSET_UNMAPPABLE",
        }
    }

    /// True when the remote object was written before the failure.
    pub fn left_remote_copy(&self) -> bool {
        matches!(self, MigrationError::CatalogUpdate { .. })
    }
}

/// Why an item was not migrated. Skips are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No managed item with this id.
    NotFound,
    /// The item has no stored path, or the path has no file name.
    NoLocalPath,
    /// The stored path already denotes remote residency.
    AlreadyRemote,
    /// The local file does not exist.
    MissingFile,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::NotFound => "not found",
            SkipReason::NoLocalPath => "no local path",
            SkipReason::AlreadyRemote => "already remote",
            SkipReason::MissingFile => "local file missing",
        };
        f.write_str(s)
    }
}

/// Result of one single-item transition.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Transferred and re-pointed. `evicted` is false when the local file could not be
    /// deleted; the item still counts as migrated.
    Migrated { url: String, evicted: bool },
    /// Dry run: the local file exists and would be transferred.
    WouldMigrate,
    Skipped(SkipReason),
    Failed(MigrationError),
}

impl ItemOutcome {
    /// Counts toward `BatchResult::migrated`.
    pub fn counts_as_migrated(&self) -> bool {
        matches!(self, ItemOutcome::Migrated { .. } | ItemOutcome::WouldMigrate)
    }

    pub fn error(&self) -> Option<&MigrationError> {
        match self {
            ItemOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_error_names_key_and_cause() {
        let err = MigrationError::Transfer {
            key: "uploads/a.jpg".to_string(),
            source: StorageError::UploadFailed("access denied".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("uploads/a.jpg"));
        assert!(message.contains("access denied"));
        assert_eq!(err.error_code(), "TRANSFER_FAILED");
        assert!(!err.left_remote_copy());
    }

    #[test]
    fn unmappable_derived_asset_leaves_no_remote_copy() {
        let err = MigrationError::UnmappableDerivedAsset {
            asset: "thumbnail".to_string(),
        };
        assert_eq!(err.to_string(), "derived asset 'thumbnail' has no file name");
        assert_eq!(err.error_code(), "DERIVED_ASSET_UNMAPPABLE");
        assert!(!err.left_remote_copy());
    }

    #[test]
    fn only_migrations_are_counted() {
        assert!(ItemOutcome::WouldMigrate.counts_as_migrated());
        assert!(ItemOutcome::Migrated {
            url: "https://cdn/a.jpg".to_string(),
            evicted: false
        }
        .counts_as_migrated());
        assert!(!ItemOutcome::Skipped(SkipReason::MissingFile).counts_as_migrated());
        assert!(
            !ItemOutcome::Failed(MigrationError::CatalogLookup(AppError::Internal(
                "down".to_string()
            )))
            .counts_as_migrated()
        );
    }
}
