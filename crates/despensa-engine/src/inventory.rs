//! # Inventory Service
//!
//! Catalog CRUD for products and bulk items, plus manual stock
//! adjustments. Adjustments go through the same ledger as sales, so a
//! negative delta can never take stock below zero.

use chrono::Utc;
use tracing::info;

use despensa_core::{validation, BulkItem, Product};
use despensa_db::{generate_id, Database, StockKind};

use crate::error::{ledger_error, EngineError, EngineResult};

/// Product definition as requested by the interface layer. `stock` is
/// only honored on create; edits adjust stock separately.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub category: String,
    pub description: String,
    pub barcode: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i64,
}

/// Bulk-item definition. Same convention: `stock_grams` only on create.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemRequest {
    pub name: String,
    pub price_per_100g_cents: i64,
    #[serde(default)]
    pub stock_grams: i64,
}

/// Service for inventory maintenance.
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    pub fn new(db: Database) -> Self {
        InventoryService { db }
    }

    // ## Products

    pub async fn create_product(&self, request: ProductRequest) -> EngineResult<Product> {
        validation::validate_required("category", &request.category)?;
        validation::validate_required("description", &request.description)?;
        validation::validate_price_cents(request.price_cents)?;
        validation::validate_stock_level(request.stock)?;

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            category: request.category,
            description: request.description,
            barcode: request.barcode,
            price_cents: request.price_cents,
            stock: request.stock,
            created_at: now,
            updated_at: now,
        };
        self.db.products().insert(&product).await?;

        info!(id = %product.id, description = %product.description, "Product created");
        Ok(product)
    }

    /// Edits a product's catalog fields. Stock is untouched; use
    /// [`adjust_product_stock`](Self::adjust_product_stock).
    pub async fn update_product(&self, id: &str, request: ProductRequest) -> EngineResult<Product> {
        validation::validate_required("category", &request.category)?;
        validation::validate_required("description", &request.description)?;
        validation::validate_price_cents(request.price_cents)?;

        let existing = self.get_product(id).await?;

        let updated = Product {
            id: existing.id.clone(),
            category: request.category,
            description: request.description,
            barcode: request.barcode,
            price_cents: request.price_cents,
            stock: existing.stock,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.db.products().update(&updated).await?;

        Ok(updated)
    }

    /// Applies a manual stock correction: positive restocks, negative
    /// removes (and fails on insufficient stock). Returns the new level.
    pub async fn adjust_product_stock(&self, id: &str, delta: i64) -> EngineResult<i64> {
        if delta == 0 {
            return Err(EngineError::InvalidQuantity);
        }

        let product = self.get_product(id).await?;
        let ledger = self.db.ledger();

        let new_stock = if delta > 0 {
            ledger
                .release(StockKind::Product, id, delta)
                .await
                .map_err(|err| ledger_error(err, &product.description, id))?
                .ok_or_else(|| EngineError::not_found("Product", id))?
        } else {
            ledger
                .reserve(StockKind::Product, id, -delta)
                .await
                .map_err(|err| ledger_error(err, &product.description, id))?
        };

        info!(id = %id, delta = %delta, new_stock = %new_stock, "Product stock adjusted");
        Ok(new_stock)
    }

    pub async fn get_product(&self, id: &str) -> EngineResult<Product> {
        self.db
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", id))
    }

    pub async fn list_products(&self) -> EngineResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    pub async fn list_products_by_category(&self, category: &str) -> EngineResult<Vec<Product>> {
        Ok(self.db.products().list_by_category(category).await?)
    }

    /// Products at or below the low-stock threshold, for the restock list.
    pub async fn list_low_stock(&self) -> EngineResult<Vec<Product>> {
        Ok(self
            .db
            .products()
            .list_low_stock(despensa_core::LOW_STOCK_THRESHOLD)
            .await?)
    }

    pub async fn delete_product(&self, id: &str) -> EngineResult<()> {
        self.db.products().delete(id).await?;
        info!(id = %id, "Product deleted");
        Ok(())
    }

    // ## Bulk items

    pub async fn create_bulk_item(&self, request: BulkItemRequest) -> EngineResult<BulkItem> {
        validation::validate_required("name", &request.name)?;
        validation::validate_price_cents(request.price_per_100g_cents)?;
        validation::validate_stock_level(request.stock_grams)?;

        let now = Utc::now();
        let item = BulkItem {
            id: generate_id(),
            name: request.name,
            price_per_100g_cents: request.price_per_100g_cents,
            stock_grams: request.stock_grams,
            created_at: now,
            updated_at: now,
        };
        self.db.bulk_items().insert(&item).await?;

        info!(id = %item.id, name = %item.name, "Bulk item created");
        Ok(item)
    }

    pub async fn update_bulk_item(&self, id: &str, request: BulkItemRequest) -> EngineResult<BulkItem> {
        validation::validate_required("name", &request.name)?;
        validation::validate_price_cents(request.price_per_100g_cents)?;

        let existing = self.get_bulk_item(id).await?;

        let updated = BulkItem {
            id: existing.id.clone(),
            name: request.name,
            price_per_100g_cents: request.price_per_100g_cents,
            stock_grams: existing.stock_grams,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.db.bulk_items().update(&updated).await?;

        Ok(updated)
    }

    /// Adds grams to a bulk item after a deli delivery. Returns the new
    /// level.
    pub async fn restock_bulk(&self, id: &str, grams: i64) -> EngineResult<i64> {
        if grams <= 0 {
            return Err(EngineError::InvalidQuantity);
        }

        let item = self.get_bulk_item(id).await?;

        let new_grams = self
            .db
            .ledger()
            .release(StockKind::BulkItem, id, grams)
            .await
            .map_err(|err| ledger_error(err, &item.name, id))?
            .ok_or_else(|| EngineError::not_found("BulkItem", id))?;

        info!(id = %id, grams = %grams, new_grams = %new_grams, "Bulk item restocked");
        Ok(new_grams)
    }

    pub async fn get_bulk_item(&self, id: &str) -> EngineResult<BulkItem> {
        self.db
            .bulk_items()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("BulkItem", id))
    }

    pub async fn list_bulk_items(&self) -> EngineResult<Vec<BulkItem>> {
        Ok(self.db.bulk_items().list().await?)
    }

    pub async fn delete_bulk_item(&self, id: &str) -> EngineResult<()> {
        self.db.bulk_items().delete(id).await?;
        info!(id = %id, "Bulk item deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
