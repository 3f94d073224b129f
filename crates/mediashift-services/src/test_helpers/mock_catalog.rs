//! In-memory catalog for testing without a database

use async_trait::async_trait;
use mediashift_core::{AppError, ItemId, LocationFilter, LocationRules, MediaItem};
use mediashift_db::{effective_limit, CatalogMutator, CatalogScanner, DerivedLocations};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CatalogState {
    items: BTreeMap<ItemId, MediaItem>,
    fail_scans: bool,
    fail_all_updates: bool,
    fail_updates_for: HashSet<ItemId>,
    mutation_calls: usize,
}

/// Catalog scanner and mutator over a `BTreeMap`, with deterministic failure injection.
///
/// Residency is classified with `LocationRules::is_remote`, the same predicate the
/// engine uses. `repoint_item` is atomic: a failure changes nothing.
#[derive(Clone)]
pub struct InMemoryCatalog {
    state: Arc<Mutex<CatalogState>>,
    rules: LocationRules,
}

impl InMemoryCatalog {
    pub fn new(remote_marker: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(CatalogState::default())),
            rules: LocationRules::new("", "", remote_marker),
        }
    }

    pub fn insert(&self, item: MediaItem) {
        self.state.lock().unwrap().items.insert(item.id, item);
    }

    pub fn item(&self, id: ItemId) -> Option<MediaItem> {
        self.state.lock().unwrap().items.get(&id).cloned()
    }

    pub fn file_path(&self, id: ItemId) -> Option<String> {
        self.item(id).and_then(|item| item.file_path)
    }

    /// Make every scan and count fail, as if the database were unreachable.
    pub fn fail_scans(&self, fail: bool) {
        self.state.lock().unwrap().fail_scans = fail;
    }

    pub fn fail_all_updates(&self, fail: bool) {
        self.state.lock().unwrap().fail_all_updates = fail;
    }

    pub fn fail_updates_for(&self, id: ItemId) {
        self.state.lock().unwrap().fail_updates_for.insert(id);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_scans = false;
        state.fail_all_updates = false;
        state.fail_updates_for.clear();
    }

    /// Calls to any mutator method, including failed ones.
    pub fn mutation_calls(&self) -> usize {
        self.state.lock().unwrap().mutation_calls
    }

    fn is_local(&self, item: &MediaItem) -> bool {
        !item
            .file_path
            .as_deref()
            .map(|p| self.rules.is_remote(p))
            .unwrap_or(false)
    }

    fn begin_mutation(&self, state: &mut CatalogState, item_id: ItemId) -> Result<(), AppError> {
        state.mutation_calls += 1;
        if state.fail_all_updates || state.fail_updates_for.contains(&item_id) {
            return Err(AppError::Internal(format!(
                "injected catalog update failure for item {}",
                item_id
            )));
        }
        if !state.items.contains_key(&item_id) {
            return Err(AppError::NotFound(format!("Media item {} not found", item_id)));
        }
        Ok(())
    }
}

fn apply_derived(
    item: &mut MediaItem,
    locations: &DerivedLocations,
) -> Result<(), AppError> {
    for key in locations.keys() {
        if !item.derived_assets.iter().any(|a| &a.key == key) {
            return Err(AppError::NotFound(format!(
                "Derived asset '{}' of media item {} not found",
                key, item.id
            )));
        }
    }
    for asset in item.derived_assets.iter_mut() {
        if let Some(url) = locations.get(&asset.key) {
            asset.file_path = url.clone();
        }
    }
    Ok(())
}

#[async_trait]
impl CatalogScanner for InMemoryCatalog {
    async fn find_local_items_after(
        &self,
        after: Option<ItemId>,
        limit: Option<u32>,
    ) -> Result<Vec<ItemId>, AppError> {
        let state = self.state.lock().unwrap();
        if state.fail_scans {
            return Err(AppError::Internal("injected scan failure".to_string()));
        }

        let candidates = state
            .items
            .values()
            .filter(|item| after.map(|a| item.id > a).unwrap_or(true))
            .filter(|item| self.is_local(item))
            .map(|item| item.id);

        Ok(match effective_limit(limit) {
            Some(n) => candidates.take(n as usize).collect(),
            None => candidates.collect(),
        })
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<MediaItem>, AppError> {
        let state = self.state.lock().unwrap();
        if state.fail_scans {
            return Err(AppError::Internal("injected lookup failure".to_string()));
        }
        Ok(state.items.get(&id).cloned())
    }

    async fn count_items(&self, filter: LocationFilter) -> Result<u64, AppError> {
        let state = self.state.lock().unwrap();
        if state.fail_scans {
            return Err(AppError::Internal("injected count failure".to_string()));
        }
        let count = state
            .items
            .values()
            .filter(|item| match filter {
                LocationFilter::All => true,
                LocationFilter::Local => self.is_local(item),
                LocationFilter::Remote => !self.is_local(item),
            })
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl CatalogMutator for InMemoryCatalog {
    async fn update_primary_location(
        &self,
        item_id: ItemId,
        new_url: &str,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        self.begin_mutation(&mut state, item_id)?;
        if let Some(item) = state.items.get_mut(&item_id) {
            item.file_path = Some(new_url.to_string());
        }
        Ok(())
    }

    async fn update_derived_asset_locations(
        &self,
        item_id: ItemId,
        locations: &DerivedLocations,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        self.begin_mutation(&mut state, item_id)?;
        match state.items.get_mut(&item_id) {
            Some(item) => apply_derived(item, locations),
            None => Ok(()),
        }
    }

    async fn repoint_item(
        &self,
        item_id: ItemId,
        primary_url: &str,
        derived: &DerivedLocations,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        self.begin_mutation(&mut state, item_id)?;
        let Some(item) = state.items.get(&item_id) else {
            return Ok(());
        };

        let mut updated = item.clone();
        apply_derived(&mut updated, derived)?;
        updated.file_path = Some(primary_url.to_string());
        state.items.insert(item_id, updated);
        Ok(())
    }
}
