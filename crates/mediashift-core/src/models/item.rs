use serde::{Deserialize, Serialize};

/// Stable catalog identifier. Scans are ordered by ascending id.
pub type ItemId = i64;

/// A catalog entry for one managed media object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: ItemId,
    /// Stored location: a local path until migrated, then the CDN URL.
    pub file_path: Option<String>,
    pub derived_assets: Vec<DerivedAsset>,
}

impl MediaItem {
    pub fn new(id: ItemId, file_path: impl Into<String>) -> Self {
        Self {
            id,
            file_path: Some(file_path.into()),
            derived_assets: Vec::new(),
        }
    }

    pub fn with_derived_asset(mut self, key: impl Into<String>, file_path: impl Into<String>) -> Self {
        self.derived_assets.push(DerivedAsset {
            key: key.into(),
            file_path: file_path.into(),
        });
        self
    }
}

/// Secondary representation of an item (e.g. a resized variant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAsset {
    /// Asset name within the item, e.g. `thumbnail` or `medium`.
    pub key: String,
    pub file_path: String,
}

/// Residency filter for catalog counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationFilter {
    All,
    Local,
    Remote,
}
