//! # Purchase Repository
//!
//! Persistence for supplier purchase invoices and their lines. Purchases
//! are bookkeeping only; receiving stock is a separate manual adjustment.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use despensa_core::{Purchase, PurchaseLine, PurchaseStatus};

/// Header row of a purchase, without its lines.
#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: String,
    supplier_id: String,
    invoice_number: String,
    purchased_at: DateTime<Utc>,
    total_cents: i64,
    payment_method: String,
    status: PurchaseStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Filters for listing purchases. Empty filter lists everything.
#[derive(Debug, Clone, Default)]
pub struct PurchaseFilter {
    pub supplier_id: Option<String>,
    pub status: Option<PurchaseStatus>,
    /// Inclusive lower bound on `purchased_at`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `purchased_at`.
    pub to: Option<DateTime<Utc>>,
}

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Inserts a purchase together with its lines, atomically.
    pub async fn insert(&self, purchase: &Purchase) -> DbResult<Purchase> {
        debug!(id = %purchase.id, invoice = %purchase.invoice_number, "Inserting purchase");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, supplier_id, invoice_number, purchased_at, total_cents,
                payment_method, status, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.supplier_id)
        .bind(&purchase.invoice_number)
        .bind(purchase.purchased_at)
        .bind(purchase.total_cents)
        .bind(&purchase.payment_method)
        .bind(purchase.status)
        .bind(&purchase.notes)
        .bind(purchase.created_at)
        .bind(purchase.updated_at)
        .execute(&mut *tx)
        .await?;

        for line in &purchase.lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_lines (
                    id, purchase_id, description, quantity, unit_price_cents, subtotal_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(generate_id())
            .bind(&purchase.id)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.subtotal_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(purchase.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let row = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT id, supplier_id, invoice_number, purchased_at, total_cents,
                   payment_method, status, notes, created_at, updated_at
            FROM purchases
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    /// Lists purchases matching the filter, newest purchase date first.
    ///
    /// The filter clauses are optional and combined with AND; the SQL is
    /// built from fixed fragments, values always go through binds.
    pub async fn list(&self, filter: &PurchaseFilter) -> DbResult<Vec<Purchase>> {
        let mut sql = String::from(
            "SELECT id, supplier_id, invoice_number, purchased_at, total_cents, \
             payment_method, status, notes, created_at, updated_at \
             FROM purchases WHERE 1 = 1",
        );

        if filter.supplier_id.is_some() {
            sql.push_str(" AND supplier_id = ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.from.is_some() {
            sql.push_str(" AND purchased_at >= ?");
        }
        if filter.to.is_some() {
            sql.push_str(" AND purchased_at < ?");
        }
        sql.push_str(" ORDER BY purchased_at DESC");

        let mut query = sqlx::query_as::<_, PurchaseRow>(&sql);
        if let Some(supplier_id) = &filter.supplier_id {
            query = query.bind(supplier_id.clone());
        }
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(from) = filter.from {
            query = query.bind(from);
        }
        if let Some(to) = filter.to {
            query = query.bind(to);
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut purchases = Vec::with_capacity(rows.len());
        for row in rows {
            purchases.push(self.assemble(row).await?);
        }

        Ok(purchases)
    }

    /// Rewrites a purchase's header and replaces its lines, atomically.
    pub async fn update(&self, purchase: &Purchase) -> DbResult<()> {
        debug!(id = %purchase.id, "Updating purchase");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE purchases SET
                supplier_id = ?2,
                invoice_number = ?3,
                purchased_at = ?4,
                total_cents = ?5,
                payment_method = ?6,
                status = ?7,
                notes = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.supplier_id)
        .bind(&purchase.invoice_number)
        .bind(purchase.purchased_at)
        .bind(purchase.total_cents)
        .bind(&purchase.payment_method)
        .bind(purchase.status)
        .bind(&purchase.notes)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", &purchase.id));
        }

        sqlx::query("DELETE FROM purchase_lines WHERE purchase_id = ?1")
            .bind(&purchase.id)
            .execute(&mut *tx)
            .await?;

        for line in &purchase.lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_lines (
                    id, purchase_id, description, quantity, unit_price_cents, subtotal_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(generate_id())
            .bind(&purchase.id)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.subtotal_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Updates only the payment status.
    pub async fn set_status(&self, id: &str, status: PurchaseStatus) -> DbResult<()> {
        debug!(id = %id, ?status, "Setting purchase status");

        let result =
            sqlx::query("UPDATE purchases SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(status)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", id));
        }

        Ok(())
    }

    /// Deletes a purchase; lines cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting purchase");

        let result = sqlx::query("DELETE FROM purchases WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", id));
        }

        Ok(())
    }

    async fn assemble(&self, row: PurchaseRow) -> DbResult<Purchase> {
        let lines = sqlx::query_as::<_, PurchaseLine>(
            r#"
            SELECT description, quantity, unit_price_cents, subtotal_cents
            FROM purchase_lines
            WHERE purchase_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Purchase {
            id: row.id,
            supplier_id: row.supplier_id,
            invoice_number: row.invoice_number,
            lines,
            purchased_at: row.purchased_at,
            total_cents: row.total_cents,
            payment_method: row.payment_method,
            status: row.status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
