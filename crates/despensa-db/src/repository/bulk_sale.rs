//! # Bulk Sale Repository
//!
//! Persistence for weight-based sales.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use despensa_core::BulkSale;

/// Repository for bulk-sale database operations.
#[derive(Debug, Clone)]
pub struct BulkSaleRepository {
    pool: SqlitePool,
}

impl BulkSaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BulkSaleRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<BulkSale>> {
        let sale = sqlx::query_as::<_, BulkSale>(
            r#"
            SELECT id, bulk_item_id, seller, quantity_grams,
                   unit_price_cents, total_price_cents, created_at
            FROM bulk_sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists all bulk sales, newest first.
    pub async fn list(&self) -> DbResult<Vec<BulkSale>> {
        let sales = sqlx::query_as::<_, BulkSale>(
            r#"
            SELECT id, bulk_item_id, seller, quantity_grams,
                   unit_price_cents, total_price_cents, created_at
            FROM bulk_sales
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists bulk sales created within `[from, to)`.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<BulkSale>> {
        let sales = sqlx::query_as::<_, BulkSale>(
            r#"
            SELECT id, bulk_item_id, seller, quantity_grams,
                   unit_price_cents, total_price_cents, created_at
            FROM bulk_sales
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    pub async fn insert(&self, sale: &BulkSale) -> DbResult<BulkSale> {
        debug!(id = %sale.id, bulk_item_id = %sale.bulk_item_id, "Inserting bulk sale");

        sqlx::query(
            r#"
            INSERT INTO bulk_sales (
                id, bulk_item_id, seller, quantity_grams,
                unit_price_cents, total_price_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.bulk_item_id)
        .bind(&sale.seller)
        .bind(sale.quantity_grams)
        .bind(sale.unit_price_cents)
        .bind(sale.total_price_cents)
        .bind(sale.created_at)
        .execute(&self.pool)
        .await?;

        Ok(sale.clone())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting bulk sale");

        let result = sqlx::query("DELETE FROM bulk_sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("BulkSale", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_list_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.bulk_sales();

        let sale = BulkSale {
            id: "bs1".to_string(),
            bulk_item_id: "e1".to_string(),
            seller: "ana".to_string(),
            quantity_grams: 250,
            unit_price_cents: 450,
            total_price_cents: 1125,
            created_at: Utc::now(),
        };
        repo.insert(&sale).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].total_price_cents, 1125);

        repo.delete("bs1").await.unwrap();
        let err = repo.delete("bs1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
