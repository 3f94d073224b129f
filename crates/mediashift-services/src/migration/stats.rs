use mediashift_core::{AppError, LocationFilter, MigrationStatistics};
use mediashift_db::CatalogScanner;

/// Migration progress for the managed item type: three independent counts and the
/// remote percentage. Read-only; needs no object store, so it works before offload
/// is configured.
#[tracing::instrument(skip(scanner))]
pub async fn catalog_statistics(
    scanner: &dyn CatalogScanner,
) -> Result<MigrationStatistics, AppError> {
    let total = scanner.count_items(LocationFilter::All).await?;
    let local = scanner.count_items(LocationFilter::Local).await?;
    let remote = scanner.count_items(LocationFilter::Remote).await?;

    Ok(MigrationStatistics::from_counts(total, local, remote))
}
