use super::item::ItemId;
use serde::{Deserialize, Serialize};

/// Outcome of one batch invocation. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Items migrated (or, in a dry run, that would be migrated).
    pub migrated: u64,
    /// Items examined.
    pub total: u64,
    /// One entry per failed item, tagged with the item id, in scan order.
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Last examined id; pass back as the scan cursor to move past skipped or failed items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<ItemId>,
}

impl BatchResult {
    /// Result for a scan that found no candidates.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// True when the scan found nothing left to examine.
    pub fn is_converged(&self) -> bool {
        self.total == 0
    }
}

/// Catalog-wide migration progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MigrationStatistics {
    pub total: u64,
    pub local: u64,
    pub remote: u64,
    /// `remote / total * 100`, rounded to two decimals; 0 for an empty catalog.
    pub percentage: f64,
}

impl MigrationStatistics {
    pub fn from_counts(total: u64, local: u64, remote: u64) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            ((remote as f64 / total as f64) * 100.0 * 100.0).round() / 100.0
        };
        Self {
            total,
            local,
            remote,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_zero_for_empty_catalog() {
        let stats = MigrationStatistics::from_counts(0, 0, 0);
        assert_eq!(stats.percentage, 0.0);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        let stats = MigrationStatistics::from_counts(3, 2, 1);
        assert_eq!(stats.percentage, 33.33);
        let stats = MigrationStatistics::from_counts(3, 1, 2);
        assert_eq!(stats.percentage, 66.67);
        let stats = MigrationStatistics::from_counts(4, 0, 4);
        assert_eq!(stats.percentage, 100.0);
    }

    #[test]
    fn empty_batch_is_converged() {
        let result = BatchResult::empty("No more files to migrate");
        assert!(result.is_converged());
        assert_eq!(result.migrated, 0);
        assert!(result.errors.is_empty());
    }
}
