//! # Promotion Repository
//!
//! Persistence for the promotion catalog. Promotions referenced by past
//! sales are snapshotted by value into `sale_promotions`, so catalog rows
//! can be edited or deleted freely.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use despensa_core::Promotion;

const PROMOTION_COLUMNS: &str = r#"
    id, name, description, kind, primary_product_id, secondary_product_id,
    discount_value, minimum_quantity, price_cents, valid_from, valid_to,
    active, sales_count, created_at
"#;

/// Repository for promotion database operations.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Promotion>> {
        let sql = format!("SELECT {PROMOTION_COLUMNS} FROM promotions WHERE id = ?1");

        let promotion = sqlx::query_as::<_, Promotion>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(promotion)
    }

    /// Lists all promotions, newest first.
    pub async fn list(&self) -> DbResult<Vec<Promotion>> {
        let sql = format!("SELECT {PROMOTION_COLUMNS} FROM promotions ORDER BY created_at DESC");

        let promotions = sqlx::query_as::<_, Promotion>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(promotions)
    }

    /// Lists promotions still marked active, newest first.
    pub async fn list_active(&self) -> DbResult<Vec<Promotion>> {
        let sql = format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE active = 1 ORDER BY created_at DESC"
        );

        let promotions = sqlx::query_as::<_, Promotion>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(promotions)
    }

    pub async fn insert(&self, promotion: &Promotion) -> DbResult<Promotion> {
        debug!(id = %promotion.id, name = %promotion.name, "Inserting promotion");

        sqlx::query(
            r#"
            INSERT INTO promotions (
                id, name, description, kind, primary_product_id, secondary_product_id,
                discount_value, minimum_quantity, price_cents, valid_from, valid_to,
                active, sales_count, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.name)
        .bind(&promotion.description)
        .bind(promotion.kind)
        .bind(&promotion.primary_product_id)
        .bind(&promotion.secondary_product_id)
        .bind(promotion.discount_value)
        .bind(promotion.minimum_quantity)
        .bind(promotion.price_cents)
        .bind(promotion.valid_from)
        .bind(promotion.valid_to)
        .bind(promotion.active)
        .bind(promotion.sales_count)
        .bind(promotion.created_at)
        .execute(&self.pool)
        .await?;

        Ok(promotion.clone())
    }

    /// Overwrites a promotion's definition. `sales_count` is left alone;
    /// use [`increment_sales`](Self::increment_sales) for that.
    pub async fn update(&self, promotion: &Promotion) -> DbResult<()> {
        debug!(id = %promotion.id, "Updating promotion");

        let result = sqlx::query(
            r#"
            UPDATE promotions SET
                name = ?2,
                description = ?3,
                kind = ?4,
                primary_product_id = ?5,
                secondary_product_id = ?6,
                discount_value = ?7,
                minimum_quantity = ?8,
                price_cents = ?9,
                valid_from = ?10,
                valid_to = ?11,
                active = ?12
            WHERE id = ?1
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.name)
        .bind(&promotion.description)
        .bind(promotion.kind)
        .bind(&promotion.primary_product_id)
        .bind(&promotion.secondary_product_id)
        .bind(promotion.discount_value)
        .bind(promotion.minimum_quantity)
        .bind(promotion.price_cents)
        .bind(promotion.valid_from)
        .bind(promotion.valid_to)
        .bind(promotion.active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", &promotion.id));
        }

        Ok(())
    }

    /// Retires a promotion (active = false). The row stays for reference.
    pub async fn finalize(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Finalizing promotion");

        let result = sqlx::query("UPDATE promotions SET active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        Ok(())
    }

    /// Bumps the convenience sales counter by one.
    pub async fn increment_sales(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE promotions SET sales_count = sales_count + 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting promotion");

        let result = sqlx::query("DELETE FROM promotions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, Utc};
    use despensa_core::PromotionType;

    fn sample(id: &str) -> Promotion {
        let now = Utc::now();
        Promotion {
            id: id.to_string(),
            name: "2x1 Gaseosas".to_string(),
            description: "Lleva dos, paga una".to_string(),
            kind: PromotionType::TwoForOne,
            primary_product_id: "p1".to_string(),
            secondary_product_id: Some("p2".to_string()),
            discount_value: 0,
            minimum_quantity: 1,
            price_cents: 1500,
            valid_from: now,
            valid_to: now + Duration::days(30),
            active: true,
            sales_count: 0,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_kind_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();

        repo.insert(&sample("promo1")).await.unwrap();

        let found = repo.get_by_id("promo1").await.unwrap().unwrap();
        assert_eq!(found.kind, PromotionType::TwoForOne);
        assert_eq!(found.secondary_product_id.as_deref(), Some("p2"));
        assert!(found.active);
    }

    #[tokio::test]
    async fn test_finalize_removes_from_active_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();

        repo.insert(&sample("promo1")).await.unwrap();
        assert_eq!(repo.list_active().await.unwrap().len(), 1);

        repo.finalize("promo1").await.unwrap();
        assert!(repo.list_active().await.unwrap().is_empty());
        // still listed overall
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_increment_sales() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();

        repo.insert(&sample("promo1")).await.unwrap();
        repo.increment_sales("promo1").await.unwrap();
        repo.increment_sales("promo1").await.unwrap();

        let found = repo.get_by_id("promo1").await.unwrap().unwrap();
        assert_eq!(found.sales_count, 2);
    }
}
