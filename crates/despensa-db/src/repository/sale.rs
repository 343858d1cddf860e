//! # Sale Repository
//!
//! Persistence for sale records and their embedded lines.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  sales ──┬── sale_lines            (product snapshots)              │
//! │          └── sale_promotions ───── sale_promotion_items             │
//! │                (bundle snapshots)    (constituents per bundle)      │
//! │                                                                     │
//! │  Children cascade with the parent sale. Lines are embedded:         │
//! │  they are never addressed outside their sale.                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The insert runs in a transaction so a sale record never exists without
//! its lines. Stock movement happens BEFORE insert, in the engine's sale
//! flow, not here.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use despensa_core::{PromotionLine, PromotionLineItem, PromotionType, Sale, SaleLine};

/// Header row of a sale, without its lines.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    seller: String,
    payment_method: String,
    total_cents: i64,
    created_at: DateTime<Utc>,
}

/// A `sale_promotions` row; carries its own id so constituents can be
/// looked up.
#[derive(Debug, sqlx::FromRow)]
struct PromotionLineRow {
    id: String,
    promotion_id: String,
    name: String,
    unit_price_cents: i64,
    quantity: i64,
    subtotal_cents: i64,
    promotion_type: PromotionType,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale together with all of its lines, atomically.
    pub async fn insert(&self, sale: &Sale) -> DbResult<Sale> {
        debug!(id = %sale.id, lines = sale.lines.len(), promotions = sale.promotion_lines.len(), "Inserting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, seller, payment_method, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.seller)
        .bind(&sale.payment_method)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for line in &sale.lines {
            sqlx::query(
                r#"
                INSERT INTO sale_lines (
                    id, sale_id, product_id, description,
                    unit_price_cents, quantity, subtotal_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(generate_id())
            .bind(&sale.id)
            .bind(&line.product_id)
            .bind(&line.description)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .bind(line.subtotal_cents)
            .execute(&mut *tx)
            .await?;
        }

        for promo in &sale.promotion_lines {
            let promo_row_id = generate_id();

            sqlx::query(
                r#"
                INSERT INTO sale_promotions (
                    id, sale_id, promotion_id, name,
                    unit_price_cents, quantity, subtotal_cents, promotion_type
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&promo_row_id)
            .bind(&sale.id)
            .bind(&promo.promotion_id)
            .bind(&promo.name)
            .bind(promo.unit_price_cents)
            .bind(promo.quantity)
            .bind(promo.subtotal_cents)
            .bind(promo.promotion_type)
            .execute(&mut *tx)
            .await?;

            for item in &promo.items {
                sqlx::query(
                    r#"
                    INSERT INTO sale_promotion_items (
                        id, sale_promotion_id, product_id, quantity_per_bundle
                    ) VALUES (?1, ?2, ?3, ?4)
                    "#,
                )
                .bind(generate_id())
                .bind(&promo_row_id)
                .bind(&item.product_id)
                .bind(item.quantity_per_bundle)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(sale.clone())
    }

    /// Gets a sale with its lines assembled.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            "SELECT id, seller, payment_method, total_cents, created_at FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    /// Lists all sales, newest first, lines included.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, seller, payment_method, total_cents, created_at FROM sales ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            sales.push(self.assemble(row).await?);
        }

        Ok(sales)
    }

    /// Lists sales created within `[from, to)`, lines included.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, seller, payment_method, total_cents, created_at
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            sales.push(self.assemble(row).await?);
        }

        Ok(sales)
    }

    /// Deletes a sale; child lines cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Counts sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Loads a header row's lines and promotion bundles.
    async fn assemble(&self, row: SaleRow) -> DbResult<Sale> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT product_id, description, unit_price_cents, quantity, subtotal_cents
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        let promo_rows = sqlx::query_as::<_, PromotionLineRow>(
            r#"
            SELECT id, promotion_id, name, unit_price_cents, quantity,
                   subtotal_cents, promotion_type
            FROM sale_promotions
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        let mut promotion_lines = Vec::with_capacity(promo_rows.len());
        for promo in promo_rows {
            let items = sqlx::query_as::<_, PromotionLineItem>(
                r#"
                SELECT product_id, quantity_per_bundle
                FROM sale_promotion_items
                WHERE sale_promotion_id = ?1
                ORDER BY rowid
                "#,
            )
            .bind(&promo.id)
            .fetch_all(&self.pool)
            .await?;

            promotion_lines.push(PromotionLine {
                promotion_id: promo.promotion_id,
                name: promo.name,
                unit_price_cents: promo.unit_price_cents,
                quantity: promo.quantity,
                subtotal_cents: promo.subtotal_cents,
                promotion_type: promo.promotion_type,
                items,
            });
        }

        Ok(Sale {
            id: row.id,
            lines,
            promotion_lines,
            seller: row.seller,
            payment_method: row.payment_method,
            total_cents: row.total_cents,
            created_at: row.created_at,
        })
    }
}
