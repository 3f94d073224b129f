use super::outcome::{ItemOutcome, MigrationError, SkipReason};
use super::stats::catalog_statistics;
use mediashift_core::{
    AppError, BatchResult, ItemId, MediaItem, MigrationConfig, MigrationStatistics,
};
use mediashift_db::{CatalogMutator, CatalogScanner, DerivedLocations};
use mediashift_storage::ObjectStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const NO_MORE_FILES: &str = "No more files to migrate";
pub const NO_FILES: &str = "No files to migrate";

/// A local item that passed every precondition and can be transferred.
#[derive(Debug)]
struct Candidate {
    derived: DerivedLocations,
    local_file: PathBuf,
    key: String,
    url: String,
}

/// Drives items from local storage to the object store.
///
/// Each item goes through transfer, then catalog re-point, then eviction of the
/// local file. A step only runs once the previous one is confirmed, so a failure
/// leaves either nothing changed or a harmless duplicate in the object store.
/// Items are processed strictly one after another.
#[derive(Clone)]
pub struct MigrationEngine {
    config: Arc<MigrationConfig>,
    scanner: Arc<dyn CatalogScanner>,
    mutator: Arc<dyn CatalogMutator>,
    store: Arc<dyn ObjectStore>,
}

impl MigrationEngine {
    pub fn new(
        config: Arc<MigrationConfig>,
        scanner: Arc<dyn CatalogScanner>,
        mutator: Arc<dyn CatalogMutator>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            scanner,
            mutator,
            store,
        }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Run the single-item transition for `id`.
    #[tracing::instrument(skip(self), fields(item_id = id))]
    pub async fn migrate_item(&self, id: ItemId) -> ItemOutcome {
        let candidate = match self.candidate(id).await {
            Ok(candidate) => candidate,
            Err(outcome) => return outcome,
        };

        if let Err(e) = self
            .store
            .put_object(&self.config.bucket, &candidate.key, &candidate.local_file)
            .await
        {
            let err = MigrationError::Transfer {
                key: candidate.key,
                source: e,
            };
            tracing::error!(
                error = %err,
                error_code = err.error_code(),
                "Transfer failed, catalog and local file left untouched"
            );
            return ItemOutcome::Failed(err);
        }

        let derived = candidate.derived;
        let url = candidate.url;

        if let Err(e) = self.mutator.repoint_item(id, &url, &derived).await {
            let err = MigrationError::CatalogUpdate {
                key: candidate.key,
                source: e,
            };
            tracing::error!(
                error = %err,
                error_code = err.error_code(),
                "Catalog update failed after transfer; remote copy kept, local file kept"
            );
            return ItemOutcome::Failed(err);
        }

        let evicted = match tokio::fs::remove_file(&candidate.local_file).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %candidate.local_file.display(),
                    "Failed to delete local file after migration, leaving it in place"
                );
                false
            }
        };

        tracing::info!(
            key = %candidate.key,
            url = %url,
            derived_assets = derived.len(),
            evicted,
            "Item migrated"
        );

        ItemOutcome::Migrated { url, evicted }
    }

    /// Check preconditions only. Never touches the object store or the catalog mutator.
    #[tracing::instrument(skip(self), fields(item_id = id))]
    pub async fn check_item(&self, id: ItemId) -> ItemOutcome {
        match self.candidate(id).await {
            Ok(_) => ItemOutcome::WouldMigrate,
            Err(outcome) => outcome,
        }
    }

    /// One batch from the start of the catalog.
    pub async fn migrate_batch(&self, batch_size: u32) -> Result<BatchResult, AppError> {
        self.migrate_batch_from(None, batch_size).await
    }

    /// One batch of at most `batch_size` local items with id greater than `after`.
    ///
    /// Per-item failures are collected into `errors`; only a failed scan is returned
    /// as `Err`. A scan that finds nothing yields `total == 0` and a message.
    #[tracing::instrument(skip(self))]
    pub async fn migrate_batch_from(
        &self,
        after: Option<ItemId>,
        batch_size: u32,
    ) -> Result<BatchResult, AppError> {
        let ids = self
            .scanner
            .find_local_items_after(after, Some(batch_size))
            .await?;

        if ids.is_empty() {
            tracing::info!("No local items left to migrate");
            return Ok(BatchResult::empty(NO_MORE_FILES));
        }

        Ok(self.process(&ids, false).await)
    }

    /// Scan once, optionally bounded by `limit`, and process every result.
    ///
    /// With `dry_run` an item is only checked for an existing local file and counted
    /// as one that would migrate.
    #[tracing::instrument(skip(self))]
    pub async fn migrate_all(
        &self,
        dry_run: bool,
        limit: Option<u32>,
    ) -> Result<BatchResult, AppError> {
        let ids = self.scanner.find_local_items(limit).await?;

        if ids.is_empty() {
            return Ok(BatchResult::empty(NO_FILES));
        }

        Ok(self.process(&ids, dry_run).await)
    }

    pub async fn get_statistics(&self) -> Result<MigrationStatistics, AppError> {
        catalog_statistics(self.scanner.as_ref()).await
    }

    async fn process(&self, ids: &[ItemId], dry_run: bool) -> BatchResult {
        let mut result = BatchResult {
            total: ids.len() as u64,
            next_cursor: ids.last().copied(),
            ..BatchResult::default()
        };

        for &id in ids {
            let outcome = if dry_run {
                self.check_item(id).await
            } else {
                self.migrate_item(id).await
            };

            if outcome.counts_as_migrated() {
                result.migrated += 1;
            }
            if let Some(err) = outcome.error() {
                result.errors.push(format!("Item {}: {}", id, err));
            }
        }

        tracing::info!(
            migrated = result.migrated,
            total = result.total,
            errors = result.errors.len(),
            dry_run,
            "Batch completed"
        );

        result
    }

    /// Resolve the item and run the precondition checks, returning the terminal
    /// outcome when the item cannot proceed.
    async fn candidate(&self, id: ItemId) -> Result<Candidate, ItemOutcome> {
        let item = match self.scanner.get_item(id).await {
            Ok(Some(item)) => item,
            Ok(None) => return Err(skip(SkipReason::NotFound)),
            Err(e) => {
                let err = MigrationError::CatalogLookup(e);
                tracing::error!(
                    error = %err,
                    error_code = err.error_code(),
                    "Failed to load item"
                );
                return Err(ItemOutcome::Failed(err));
            }
        };

        let Some(stored_path) = item.file_path.clone().filter(|p| !p.trim().is_empty()) else {
            return Err(skip(SkipReason::NoLocalPath));
        };

        if self.config.location.is_remote(&stored_path) {
            return Err(skip(SkipReason::AlreadyRemote));
        }

        let (Some(key), Some(url)) = (
            self.config.location.remote_key(&stored_path),
            self.config.location.cdn_url_for_path(&stored_path),
        ) else {
            return Err(skip(SkipReason::NoLocalPath));
        };

        let local_file = self.resolve_local_path(&stored_path);
        let exists = tokio::fs::metadata(&local_file)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !exists {
            tracing::debug!(path = %local_file.display(), "Local file missing");
            return Err(skip(SkipReason::MissingFile));
        }

        let derived = match self.derived_locations(&item) {
            Ok(derived) => derived,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    error_code = err.error_code(),
                    "Derived asset cannot be mapped"
                );
                return Err(ItemOutcome::Failed(err));
            }
        };

        Ok(Candidate {
            derived,
            local_file,
            key,
            url,
        })
    }

    /// Relative stored paths are taken relative to the configured local root.
    fn resolve_local_path(&self, stored_path: &str) -> PathBuf {
        let path = Path::new(stored_path);
        match &self.config.local_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// New locations for every derived asset not yet remote, by basename substitution.
    /// Every local asset must map, or the item's primary and derived locations would
    /// end up split between local and remote.
    fn derived_locations(&self, item: &MediaItem) -> Result<DerivedLocations, MigrationError> {
        let rules = &self.config.location;
        item.derived_assets
            .iter()
            .filter(|asset| !rules.is_remote(&asset.file_path))
            .map(|asset| match rules.cdn_url_for_path(&asset.file_path) {
                Some(url) => Ok((asset.key.clone(), url)),
                None => Err(MigrationError::UnmappableDerivedAsset {
                    asset: asset.key.clone(),
                }),
            })
            .collect()
    }
}

fn skip(reason: SkipReason) -> ItemOutcome {
    tracing::debug!(reason = %reason, "Item skipped");
    ItemOutcome::Skipped(reason)
}
