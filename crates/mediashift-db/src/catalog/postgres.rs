//! PostgreSQL catalog: `media_items` and `media_derived_assets`.

use super::{effective_limit, CatalogMutator, CatalogScanner, DerivedLocations};
use async_trait::async_trait;
use mediashift_core::{AppError, DerivedAsset, ItemId, LocationFilter, MediaItem};
use sqlx::{PgPool, Postgres};

/// SQL form of `LocationRules::is_remote`: `$2` is the remote marker. An empty marker
/// never matches. Keep the two in step.
const REMOTE_PREDICATE: &str =
    "(file_path IS NOT NULL AND $2 <> '' AND strpos(file_path, $2) > 0)";

/// Row type for media_items (for FromRow).
#[derive(Debug, sqlx::FromRow)]
struct MediaItemRow {
    id: i64,
    file_path: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct DerivedAssetRow {
    asset_key: String,
    file_path: String,
}

/// Catalog repository over a Postgres pool, scoped to one managed media type.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
    media_type: String,
    remote_marker: String,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool, media_type: impl Into<String>, remote_marker: impl Into<String>) -> Self {
        Self {
            pool,
            media_type: media_type.into(),
            remote_marker: remote_marker.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn update_primary_in<'e, E>(
        &self,
        executor: E,
        item_id: ItemId,
        new_url: &str,
    ) -> Result<(), AppError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE media_items
            SET file_path = $2, updated_at = NOW()
            WHERE id = $1 AND media_type = $3
            "#,
        )
        .bind(item_id)
        .bind(new_url)
        .bind(&self.media_type)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Media item {} not found", item_id)));
        }
        Ok(())
    }

    async fn update_derived_in(
        &self,
        conn: &mut sqlx::PgConnection,
        item_id: ItemId,
        locations: &DerivedLocations,
    ) -> Result<(), AppError> {
        for (asset_key, url) in locations {
            let result = sqlx::query(
                r#"
                UPDATE media_derived_assets
                SET file_path = $3
                WHERE item_id = $1 AND asset_key = $2
                "#,
            )
            .bind(item_id)
            .bind(asset_key)
            .bind(url)
            .execute(&mut *conn)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!(
                    "Derived asset '{}' of media item {} not found",
                    asset_key, item_id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogScanner for PostgresCatalog {
    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "scan"))]
    async fn find_local_items_after(
        &self,
        after: Option<ItemId>,
        limit: Option<u32>,
    ) -> Result<Vec<ItemId>, AppError> {
        // LIMIT NULL is LIMIT ALL in Postgres.
        let sql = format!(
            r#"
            SELECT id FROM media_items
            WHERE media_type = $1
              AND NOT {remote}
              AND ($3::BIGINT IS NULL OR id > $3)
            ORDER BY id ASC
            LIMIT $4
            "#,
            remote = REMOTE_PREDICATE
        );

        let ids: Vec<i64> = sqlx::query_scalar::<Postgres, i64>(&sql)
            .bind(&self.media_type)
            .bind(&self.remote_marker)
            .bind(after)
            .bind(effective_limit(limit).map(i64::from))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = ids.len(), "Local media items found");
        Ok(ids)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.record_id = id))]
    async fn get_item(&self, id: ItemId) -> Result<Option<MediaItem>, AppError> {
        let row: Option<MediaItemRow> = sqlx::query_as::<Postgres, MediaItemRow>(
            "SELECT id, file_path FROM media_items WHERE id = $1 AND media_type = $2",
        )
        .bind(id)
        .bind(&self.media_type)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let assets: Vec<DerivedAssetRow> = sqlx::query_as::<Postgres, DerivedAssetRow>(
            r#"
            SELECT asset_key, file_path FROM media_derived_assets
            WHERE item_id = $1
            ORDER BY asset_key ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(MediaItem {
            id: row.id,
            file_path: row.file_path,
            derived_assets: assets
                .into_iter()
                .map(|a| DerivedAsset {
                    key: a.asset_key,
                    file_path: a.file_path,
                })
                .collect(),
        }))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "count"))]
    async fn count_items(&self, filter: LocationFilter) -> Result<u64, AppError> {
        let query = match filter {
            LocationFilter::All => {
                sqlx::query_scalar::<Postgres, i64>(
                    "SELECT COUNT(*) FROM media_items WHERE media_type = $1",
                )
                .bind(&self.media_type)
                .fetch_one(&self.pool)
                .await
            }
            LocationFilter::Local | LocationFilter::Remote => {
                let negate = if filter == LocationFilter::Local { "NOT" } else { "" };
                let sql = format!(
                    "SELECT COUNT(*) FROM media_items WHERE media_type = $1 AND {} {}",
                    negate, REMOTE_PREDICATE
                );
                sqlx::query_scalar::<Postgres, i64>(&sql)
                    .bind(&self.media_type)
                    .bind(&self.remote_marker)
                    .fetch_one(&self.pool)
                    .await
            }
        };
        let count = query?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl CatalogMutator for PostgresCatalog {
    #[tracing::instrument(skip(self, new_url), fields(db.table = "media_items", db.operation = "update"))]
    async fn update_primary_location(
        &self,
        item_id: ItemId,
        new_url: &str,
    ) -> Result<(), AppError> {
        self.update_primary_in(&self.pool, item_id, new_url).await
    }

    #[tracing::instrument(skip(self, locations), fields(db.table = "media_derived_assets", count = locations.len()))]
    async fn update_derived_asset_locations(
        &self,
        item_id: ItemId,
        locations: &DerivedLocations,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.update_derived_in(&mut tx, item_id, locations).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Both updates in one transaction; any error rolls the item back untouched.
    #[tracing::instrument(skip(self, primary_url, derived), fields(db.table = "media_items", db.operation = "repoint"))]
    async fn repoint_item(
        &self,
        item_id: ItemId,
        primary_url: &str,
        derived: &DerivedLocations,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.update_primary_in(&mut *tx, item_id, primary_url).await?;
        self.update_derived_in(&mut tx, item_id, derived).await?;
        tx.commit().await?;
        Ok(())
    }
}
