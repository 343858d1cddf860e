//! # Bulk-Item Sale Manager
//!
//! Sales of deli items by weight. Single-item transactions: the scale
//! says 250 g, the flow reserves 250 g, prices it from the per-100g
//! price and freezes both into the record.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use despensa_core::{pricing, BulkSale};
use despensa_db::{generate_id, Database, StockKind};

use crate::error::{ledger_error, EngineError, EngineResult};

/// A new bulk-sale request.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSaleRequest {
    pub bulk_item_id: String,
    pub quantity_grams: i64,
    pub seller: String,
}

/// Manager for weight-based sales.
#[derive(Debug, Clone)]
pub struct BulkSaleManager {
    db: Database,
}

impl BulkSaleManager {
    pub fn new(db: Database) -> Self {
        BulkSaleManager { db }
    }

    /// Creates a bulk sale: reserves the grams, snapshots the per-100g
    /// price, computes the rounded total.
    pub async fn create(&self, request: BulkSaleRequest) -> EngineResult<BulkSale> {
        if request.seller.trim().is_empty() {
            return Err(EngineError::MissingFields("seller"));
        }
        if request.quantity_grams <= 0 {
            return Err(EngineError::InvalidQuantity);
        }

        let item = self
            .db
            .bulk_items()
            .get_by_id(&request.bulk_item_id)
            .await?
            .ok_or_else(|| EngineError::not_found("BulkItem", &request.bulk_item_id))?;

        self.db
            .ledger()
            .reserve(StockKind::BulkItem, &item.id, request.quantity_grams)
            .await
            .map_err(|err| ledger_error(err, &item.name, &item.id))?;

        let total = pricing::weighted_subtotal(item.price_per_100g(), request.quantity_grams);

        let sale = BulkSale {
            id: generate_id(),
            bulk_item_id: item.id,
            seller: request.seller,
            quantity_grams: request.quantity_grams,
            unit_price_cents: item.price_per_100g_cents,
            total_price_cents: total.cents(),
            created_at: Utc::now(),
        };
        self.db.bulk_sales().insert(&sale).await?;

        info!(id = %sale.id, grams = sale.quantity_grams, total_cents = sale.total_price_cents, "Bulk sale created");
        Ok(sale)
    }

    /// Reverses a bulk sale: grams go back onto the item (skipped if it
    /// was deleted), record removed.
    pub async fn delete(&self, id: &str) -> EngineResult<()> {
        let sale = self
            .db
            .bulk_sales()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("BulkSale", id))?;

        match self
            .db
            .ledger()
            .release(StockKind::BulkItem, &sale.bulk_item_id, sale.quantity_grams)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(bulk_item_id = %sale.bulk_item_id, "Bulk item missing during reversal, skipping release");
            }
            Err(err) => return Err(ledger_error(err, "bulk item", &sale.bulk_item_id)),
        }

        self.db.bulk_sales().delete(id).await?;
        info!(id = %id, "Bulk sale deleted, stock restored");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> EngineResult<BulkSale> {
        self.db
            .bulk_sales()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("BulkSale", id))
    }

    pub async fn list(&self) -> EngineResult<Vec<BulkSale>> {
        Ok(self.db.bulk_sales().list().await?)
    }

    /// Bulk sales rung up on the calendar day containing `at` (UTC).
    pub async fn list_for_day(&self, at: DateTime<Utc>) -> EngineResult<Vec<BulkSale>> {
        let day_start = at
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();
        let day_end = day_start + Duration::days(1);

        Ok(self.db.bulk_sales().list_between(day_start, day_end).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
