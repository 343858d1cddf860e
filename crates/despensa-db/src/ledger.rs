//! # Stock Ledger
//!
//! The ONE place stock quantities are mutated. Sales, write-offs, bulk
//! sales and manual adjustments all funnel through `reserve`/`release`
//! here, so the non-negative invariant is enforced once instead of being
//! re-derived in every manager.
//!
//! ## Check-and-Decrement in One Statement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ❌ RACY: read stock, compare in Rust, write back                   │
//! │     Two concurrent sales both read stock=5, both pass the check,    │
//! │     both write → oversell.                                          │
//! │                                                                     │
//! │  ✅ ATOMIC: single conditional UPDATE                               │
//! │     UPDATE products SET stock = stock - ?n                          │
//! │     WHERE id = ? AND stock >= ?n                                    │
//! │                                                                     │
//! │     SQLite serializes writers, so the sufficiency check and the     │
//! │     decrement cannot be interleaved with another sale.              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `release` is an unconditional increment with no upper bound. Restoring
//! stock for a reversed transaction can over-credit an item whose stock
//! was manually edited in between; the system accepts that (documented
//! limitation inherited from the original design).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbError;

/// Which kind of stocked item a ledger operation targets.
///
/// The two kinds share the ledger implementation; only the table and
/// quantity column differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockKind {
    /// Discrete-unit products (`products.stock`).
    Product,
    /// Weight-based bulk items (`bulk_items.stock_grams`).
    BulkItem,
}

impl StockKind {
    const fn table(&self) -> &'static str {
        match self {
            StockKind::Product => "products",
            StockKind::BulkItem => "bulk_items",
        }
    }

    const fn column(&self) -> &'static str {
        match self {
            StockKind::Product => "stock",
            StockKind::BulkItem => "stock_grams",
        }
    }

    /// Entity name for error messages.
    pub const fn entity(&self) -> &'static str {
        match self {
            StockKind::Product => "Product",
            StockKind::BulkItem => "BulkItem",
        }
    }
}

/// Ledger operation failures.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The targeted item does not exist.
    #[error("{0} not found")]
    ItemNotFound(&'static str),

    /// The reservation would drive the quantity negative. Carries the
    /// quantity currently on hand for the caller's error message.
    #[error("insufficient stock: available {available}")]
    InsufficientStock { available: i64 },

    /// Underlying storage failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Shared reserve/release implementation over both stocked-item kinds.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Reserves `amount` units (or grams) from an item's stock.
    ///
    /// Fails without mutating anything when the item is missing or holds
    /// less than `amount`. On success returns the new quantity, which the
    /// sale flow uses for its low-stock warnings.
    pub async fn reserve(&self, kind: StockKind, id: &str, amount: i64) -> Result<i64, LedgerError> {
        debug!(kind = kind.entity(), id = %id, amount = %amount, "Reserving stock");

        let sql = format!(
            "UPDATE {table} SET {col} = {col} - ?1, updated_at = ?2 \
             WHERE id = ?3 AND {col} >= ?1",
            table = kind.table(),
            col = kind.column(),
        );

        let result = sqlx::query(&sql)
            .bind(amount)
            .bind(chrono::Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            // Disambiguate: missing item vs not enough on hand.
            return match self.quantity(kind, id).await? {
                None => Err(LedgerError::ItemNotFound(kind.entity())),
                Some(available) => Err(LedgerError::InsufficientStock { available }),
            };
        }

        let new_quantity = self
            .quantity(kind, id)
            .await?
            .ok_or(LedgerError::ItemNotFound(kind.entity()))?;

        debug!(kind = kind.entity(), id = %id, new_quantity = %new_quantity, "Stock reserved");
        Ok(new_quantity)
    }

    /// Releases `amount` units (or grams) back onto an item's stock.
    ///
    /// Always succeeds for an existing item; returns `Ok(None)` when the
    /// item no longer exists, which reversal flows log and skip.
    pub async fn release(
        &self,
        kind: StockKind,
        id: &str,
        amount: i64,
    ) -> Result<Option<i64>, LedgerError> {
        debug!(kind = kind.entity(), id = %id, amount = %amount, "Releasing stock");

        let sql = format!(
            "UPDATE {table} SET {col} = {col} + ?1, updated_at = ?2 WHERE id = ?3",
            table = kind.table(),
            col = kind.column(),
        );

        let result = sqlx::query(&sql)
            .bind(amount)
            .bind(chrono::Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(self.quantity(kind, id).await?)
    }

    /// Current quantity of an item, or `None` if it does not exist.
    pub async fn quantity(&self, kind: StockKind, id: &str) -> Result<Option<i64>, LedgerError> {
        let sql = format!(
            "SELECT {col} FROM {table} WHERE id = ?1",
            table = kind.table(),
            col = kind.column(),
        );

        let quantity: Option<i64> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use despensa_core::{BulkItem, Product};

    async fn db_with_product(stock: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let product = Product {
            id: "p1".to_string(),
            category: "almacen".to_string(),
            description: "Yerba 1kg".to_string(),
            barcode: None,
            price_cents: 2500,
            stock,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        (db, product.id)
    }

    #[tokio::test]
    async fn test_reserve_decrements_stock() {
        let (db, id) = db_with_product(5).await;
        let ledger = db.ledger();

        let new_qty = ledger.reserve(StockKind::Product, &id, 3).await.unwrap();
        assert_eq!(new_qty, 2);
    }

    #[tokio::test]
    async fn test_reserve_insufficient_has_no_effect() {
        let (db, id) = db_with_product(2).await;
        let ledger = db.ledger();

        let err = ledger.reserve(StockKind::Product, &id, 3).await.unwrap_err();
        match err {
            LedgerError::InsufficientStock { available } => assert_eq!(available, 2),
            other => panic!("unexpected error: {other}"),
        }

        // stock unchanged
        assert_eq!(ledger.quantity(StockKind::Product, &id).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_reserve_missing_item() {
        let (db, _) = db_with_product(2).await;
        let err = db
            .ledger()
            .reserve(StockKind::Product, "nope", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ItemNotFound("Product")));
    }

    #[tokio::test]
    async fn test_release_restores_and_is_unbounded() {
        let (db, id) = db_with_product(5).await;
        let ledger = db.ledger();

        ledger.reserve(StockKind::Product, &id, 5).await.unwrap();
        assert_eq!(
            ledger.release(StockKind::Product, &id, 5).await.unwrap(),
            Some(5)
        );
        // over-crediting is permitted
        assert_eq!(
            ledger.release(StockKind::Product, &id, 100).await.unwrap(),
            Some(105)
        );
    }

    #[tokio::test]
    async fn test_release_missing_item_is_skippable() {
        let (db, _) = db_with_product(5).await;
        let released = db
            .ledger()
            .release(StockKind::Product, "gone", 3)
            .await
            .unwrap();
        assert_eq!(released, None);
    }

    #[tokio::test]
    async fn test_bulk_item_grams_share_the_ledger() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let item = BulkItem {
            id: "e1".to_string(),
            name: "Salame".to_string(),
            price_per_100g_cents: 300,
            stock_grams: 1000,
            created_at: now,
            updated_at: now,
        };
        db.bulk_items().insert(&item).await.unwrap();

        let ledger = db.ledger();
        let left = ledger.reserve(StockKind::BulkItem, "e1", 250).await.unwrap();
        assert_eq!(left, 750);

        let err = ledger
            .reserve(StockKind::BulkItem, "e1", 800)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientStock { available: 750 }
        ));
    }
}
