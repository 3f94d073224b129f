//! Catalog collaborator traits

pub mod postgres;

use async_trait::async_trait;
use mediashift_core::{AppError, ItemId, LocationFilter, MediaItem};
use std::collections::BTreeMap;

/// New locations for an item's derived assets, keyed by asset key.
pub type DerivedLocations = BTreeMap<String, String>;

/// Treat `0` the same as "no bound".
pub fn effective_limit(limit: Option<u32>) -> Option<u32> {
    limit.filter(|&n| n > 0)
}

/// Read-only view of the catalog used to discover migration candidates.
///
/// Candidates are items of the managed media type whose stored location does not
/// indicate remote residency. Results are ordered by ascending id so repeated scans
/// over an unchanged catalog return the same sequence. Implementations do not retry.
#[async_trait]
pub trait CatalogScanner: Send + Sync {
    /// Local candidates with id strictly greater than `after`, at most `limit` of them.
    async fn find_local_items_after(
        &self,
        after: Option<ItemId>,
        limit: Option<u32>,
    ) -> Result<Vec<ItemId>, AppError>;

    /// Local candidates from the start of the catalog. `None` or `Some(0)` means unbounded.
    async fn find_local_items(&self, limit: Option<u32>) -> Result<Vec<ItemId>, AppError> {
        self.find_local_items_after(None, limit).await
    }

    /// Load one managed item with its derived assets.
    async fn get_item(&self, id: ItemId) -> Result<Option<MediaItem>, AppError>;

    /// Count managed items by residency.
    async fn count_items(&self, filter: LocationFilter) -> Result<u64, AppError>;
}

/// Write side of the catalog: moves an item's stored locations.
#[async_trait]
pub trait CatalogMutator: Send + Sync {
    async fn update_primary_location(&self, item_id: ItemId, new_url: &str)
        -> Result<(), AppError>;

    async fn update_derived_asset_locations(
        &self,
        item_id: ItemId,
        locations: &DerivedLocations,
    ) -> Result<(), AppError>;

    /// Re-point the primary location and every derived asset as one logical update.
    ///
    /// The default runs the two updates in sequence; implementations backed by a
    /// transactional store should override it so a failure leaves nothing changed.
    async fn repoint_item(
        &self,
        item_id: ItemId,
        primary_url: &str,
        derived: &DerivedLocations,
    ) -> Result<(), AppError> {
        self.update_primary_location(item_id, primary_url).await?;
        if !derived.is_empty() {
            self.update_derived_asset_locations(item_id, derived).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_means_unbounded() {
        assert_eq!(effective_limit(None), None);
        assert_eq!(effective_limit(Some(0)), None);
        assert_eq!(effective_limit(Some(25)), Some(25));
    }
}
