//! # Bulk Item Repository
//!
//! Database operations for weight-based deli items. Same shape as the
//! product repository; `stock_grams` is ledger-only territory.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use despensa_core::BulkItem;

/// Repository for bulk-item database operations.
#[derive(Debug, Clone)]
pub struct BulkItemRepository {
    pool: SqlitePool,
}

impl BulkItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BulkItemRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<BulkItem>> {
        let item = sqlx::query_as::<_, BulkItem>(
            r#"
            SELECT id, name, price_per_100g_cents, stock_grams, created_at, updated_at
            FROM bulk_items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists all bulk items, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<BulkItem>> {
        let items = sqlx::query_as::<_, BulkItem>(
            r#"
            SELECT id, name, price_per_100g_cents, stock_grams, created_at, updated_at
            FROM bulk_items
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn insert(&self, item: &BulkItem) -> DbResult<BulkItem> {
        debug!(id = %item.id, name = %item.name, "Inserting bulk item");

        sqlx::query(
            r#"
            INSERT INTO bulk_items (
                id, name, price_per_100g_cents, stock_grams, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price_per_100g_cents)
        .bind(item.stock_grams)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item.clone())
    }

    /// Updates name and price. Stock goes through the ledger.
    pub async fn update(&self, item: &BulkItem) -> DbResult<()> {
        debug!(id = %item.id, "Updating bulk item");

        let result = sqlx::query(
            r#"
            UPDATE bulk_items SET
                name = ?2,
                price_per_100g_cents = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price_per_100g_cents)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("BulkItem", &item.id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting bulk item");

        let result = sqlx::query("DELETE FROM bulk_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("BulkItem", id));
        }

        Ok(())
    }
}
