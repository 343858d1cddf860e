//! # Sale Transaction Manager
//!
//! Creates and reverses multi-line sales.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  request                                                            │
//! │    │ validate (fields present, quantities positive)                 │
//! │    ▼                                                                │
//! │  per product line:       load → reserve → snapshot → subtotal       │
//! │  per promotion line:     load promo → snapshot bundle               │
//! │                          reserve each constituent × bundles         │
//! │    │                                                                │
//! │    │ any failure here → release everything reserved so far,         │
//! │    │                    return the error                            │
//! │    ▼                                                                │
//! │  total = Σ subtotals → persist sale + lines (one tx)                │
//! │    ▼                                                                │
//! │  (Sale, [LowStockWarning])                                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Low-stock warnings ride alongside the success value; they never fail
//! the sale. Deleting a sale releases every reserved quantity first;
//! items deleted since the sale are logged and skipped.

use chrono::Utc;
use tracing::{debug, info, warn};

use despensa_core::{
    pricing, stock, LowStockWarning, PromotionLine, PromotionLineItem, Sale, SaleLine,
};
use despensa_db::{generate_id, Database, StockKind};

use crate::error::{ledger_error, EngineError, EngineResult};

/// One requested product line: which product, how many units.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// One requested promotion bundle.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionLineRequest {
    pub promotion_id: String,
    /// Number of bundles.
    pub quantity: i64,
    /// Constituent products and units consumed per bundle.
    pub items: Vec<PromotionItemRequest>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionItemRequest {
    pub product_id: String,
    pub quantity_per_bundle: i64,
}

/// A new-sale request as it arrives from the interface layer.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    #[serde(default)]
    pub lines: Vec<SaleLineRequest>,
    #[serde(default)]
    pub promotion_lines: Vec<PromotionLineRequest>,
    pub seller: String,
    pub payment_method: String,
}

/// Manager for the sale transaction flow.
#[derive(Debug, Clone)]
pub struct SaleManager {
    db: Database,
}

impl SaleManager {
    pub fn new(db: Database) -> Self {
        SaleManager { db }
    }

    /// Creates a sale: reserves stock for every line, snapshots prices and
    /// descriptions, persists the record. Returns the sale together with
    /// any low-stock warnings raised by product lines or promotion
    /// constituents.
    pub async fn create(
        &self,
        request: SaleRequest,
    ) -> EngineResult<(Sale, Vec<LowStockWarning>)> {
        self.validate(&request)?;

        let ledger = self.db.ledger();
        let products = self.db.products();
        let promotions = self.db.promotions();

        // Everything reserved so far, for compensating rollback.
        let mut reserved: Vec<(String, i64)> = Vec::new();
        let mut warnings = Vec::new();
        let mut lines = Vec::with_capacity(request.lines.len());
        let mut promotion_lines = Vec::with_capacity(request.promotion_lines.len());

        for line in &request.lines {
            let product = match products.get_by_id(&line.product_id).await? {
                Some(p) => p,
                None => {
                    self.rollback(&reserved).await;
                    return Err(EngineError::not_found("Product", &line.product_id));
                }
            };

            let new_stock = match ledger
                .reserve(StockKind::Product, &product.id, line.quantity)
                .await
            {
                Ok(q) => q,
                Err(err) => {
                    self.rollback(&reserved).await;
                    return Err(ledger_error(err, &product.description, &product.id));
                }
            };
            reserved.push((product.id.clone(), line.quantity));

            if stock::is_low(new_stock) {
                warnings.push(LowStockWarning {
                    description: product.description.clone(),
                    stock: new_stock,
                });
            }

            let subtotal = pricing::line_subtotal(product.price(), line.quantity);
            lines.push(SaleLine {
                product_id: product.id,
                description: product.description,
                unit_price_cents: product.price_cents,
                quantity: line.quantity,
                subtotal_cents: subtotal.cents(),
            });
        }

        for promo_request in &request.promotion_lines {
            let promotion = match promotions.get_by_id(&promo_request.promotion_id).await? {
                Some(p) => p,
                None => {
                    self.rollback(&reserved).await;
                    return Err(EngineError::not_found(
                        "Promotion",
                        &promo_request.promotion_id,
                    ));
                }
            };

            let mut items = Vec::with_capacity(promo_request.items.len());
            for item in &promo_request.items {
                let product = match products.get_by_id(&item.product_id).await? {
                    Some(p) => p,
                    None => {
                        self.rollback(&reserved).await;
                        return Err(EngineError::not_found("Product", &item.product_id));
                    }
                };

                let amount = item.quantity_per_bundle * promo_request.quantity;
                let new_stock = match ledger
                    .reserve(StockKind::Product, &product.id, amount)
                    .await
                {
                    Ok(q) => q,
                    Err(err) => {
                        self.rollback(&reserved).await;
                        let description = format!("{} (promotion)", product.description);
                        return Err(ledger_error(err, &description, &product.id));
                    }
                };
                reserved.push((product.id.clone(), amount));

                if stock::is_low(new_stock) {
                    warnings.push(LowStockWarning {
                        description: product.description.clone(),
                        stock: new_stock,
                    });
                }

                items.push(PromotionLineItem {
                    product_id: product.id,
                    quantity_per_bundle: item.quantity_per_bundle,
                });
            }

            let subtotal = pricing::line_subtotal(
                despensa_core::Money::from_cents(promotion.price_cents),
                promo_request.quantity,
            );
            promotion_lines.push(PromotionLine {
                promotion_id: promotion.id,
                name: promotion.name,
                unit_price_cents: promotion.price_cents,
                quantity: promo_request.quantity,
                subtotal_cents: subtotal.cents(),
                promotion_type: promotion.kind,
                items,
            });
        }

        let total_cents: i64 = lines.iter().map(|l| l.subtotal_cents).sum::<i64>()
            + promotion_lines
                .iter()
                .map(|p| p.subtotal_cents)
                .sum::<i64>();

        let sale = Sale {
            id: generate_id(),
            lines,
            promotion_lines,
            seller: request.seller,
            payment_method: request.payment_method,
            total_cents,
            created_at: Utc::now(),
        };

        if let Err(err) = self.db.sales().insert(&sale).await {
            self.rollback(&reserved).await;
            return Err(err.into());
        }

        info!(id = %sale.id, total_cents = sale.total_cents, warnings = warnings.len(), "Sale created");
        Ok((sale, warnings))
    }

    /// Reverses and removes a sale: every line's quantity and every
    /// promotion constituent's quantity goes back onto stock, then the
    /// record is deleted. Products removed since the sale are skipped.
    pub async fn delete(&self, id: &str) -> EngineResult<()> {
        let sale = self
            .db
            .sales()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Sale", id))?;

        let ledger = self.db.ledger();

        for line in &sale.lines {
            match ledger
                .release(StockKind::Product, &line.product_id, line.quantity)
                .await
            {
                Ok(Some(_)) => {}
                Ok(None) => {
                    warn!(product_id = %line.product_id, "Product missing during sale reversal, skipping release");
                }
                Err(err) => return Err(ledger_error(err, &line.description, &line.product_id)),
            }
        }

        for promo in &sale.promotion_lines {
            for item in &promo.items {
                let amount = item.quantity_per_bundle * promo.quantity;
                match ledger
                    .release(StockKind::Product, &item.product_id, amount)
                    .await
                {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        warn!(product_id = %item.product_id, "Product missing during sale reversal, skipping release");
                    }
                    Err(err) => return Err(ledger_error(err, &promo.name, &item.product_id)),
                }
            }
        }

        self.db.sales().delete(id).await?;
        info!(id = %id, "Sale deleted, stock restored");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> EngineResult<Sale> {
        self.db
            .sales()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Sale", id))
    }

    pub async fn list(&self) -> EngineResult<Vec<Sale>> {
        Ok(self.db.sales().list().await?)
    }

    fn validate(&self, request: &SaleRequest) -> EngineResult<()> {
        if request.lines.is_empty() && request.promotion_lines.is_empty() {
            return Err(EngineError::MissingFields("at least one line"));
        }
        if request.seller.trim().is_empty() {
            return Err(EngineError::MissingFields("seller"));
        }
        if request.payment_method.trim().is_empty() {
            return Err(EngineError::MissingFields("payment method"));
        }
        for line in &request.lines {
            if line.quantity <= 0 {
                return Err(EngineError::InvalidQuantity);
            }
        }
        for promo in &request.promotion_lines {
            if promo.quantity <= 0 {
                return Err(EngineError::InvalidQuantity);
            }
            for item in &promo.items {
                if item.quantity_per_bundle <= 0 {
                    return Err(EngineError::InvalidQuantity);
                }
            }
        }
        Ok(())
    }

    /// Releases everything reserved before a failed create. Release
    /// failures are logged, not propagated; the original error matters
    /// more to the caller.
    async fn rollback(&self, reserved: &[(String, i64)]) {
        let ledger = self.db.ledger();
        for (product_id, amount) in reserved {
            debug!(product_id = %product_id, amount = %amount, "Rolling back reservation");
            if let Err(err) = ledger.release(StockKind::Product, product_id, *amount).await {
                warn!(product_id = %product_id, error = %err, "Failed to roll back reservation");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use despensa_core::{Product, Promotion, PromotionType};
    use despensa_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_product(db: &Database, id: &str, description: &str, price_cents: i64, stock: i64) {
        let now = Utc::now();
        db.products()
            .insert(&Product {
                id: id.to_string(),
                category: "almacen".to_string(),
                description: description.to_string(),
                barcode: None,
                price_cents,
                stock,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    async fn add_two_for_one(db: &Database, id: &str, price_cents: i64) {
        let now = Utc::now();
        db.promotions()
            .insert(&Promotion {
                id: id.to_string(),
                name: "2x1 Gaseosas".to_string(),
                description: "Lleva dos, paga una".to_string(),
                kind: PromotionType::TwoForOne,
                primary_product_id: "p1".to_string(),
                secondary_product_id: Some("p2".to_string()),
                discount_value: 0,
                minimum_quantity: 1,
                price_cents,
                valid_from: now,
                valid_to: now + Duration::days(30),
                active: true,
                sales_count: 0,
                created_at: now,
            })
            .await
            .unwrap();
    }

    fn simple_request(product_id: &str, quantity: i64) -> SaleRequest {
        SaleRequest {
            lines: vec![SaleLineRequest {
                product_id: product_id.to_string(),
                quantity,
            }],
            promotion_lines: vec![],
            seller: "ana".to_string(),
            payment_method: "cash".to_string(),
        }
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_create_snapshots_and_totals() {
        let db = test_db().await;
        add_product(&db, "p1", "Fideos 500g", 900, 20).await;
        let manager = SaleManager::new(db.clone());

        let (sale, warnings) = manager.create(simple_request("p1", 3)).await.unwrap();

        assert_eq!(sale.lines[0].description, "Fideos 500g");
        assert_eq!(sale.lines[0].unit_price_cents, 900);
        assert_eq!(sale.lines[0].subtotal_cents, 2700);
        assert_eq!(sale.total_cents, 2700);
        assert!(warnings.is_empty());
        assert_eq!(stock_of(&db, "p1").await, 17);
    }

    #[tokio::test]
    async fn test_stock_five_one_sale_succeeds_next_fails() {
        let db = test_db().await;
        add_product(&db, "p1", "Arroz 1kg", 1800, 5).await;
        let manager = SaleManager::new(db.clone());

        manager.create(simple_request("p1", 3)).await.unwrap();

        let err = manager.create(simple_request("p1", 3)).await.unwrap_err();
        match err {
            EngineError::InsufficientStock {
                description,
                available,
            } => {
                assert_eq!(description, "Arroz 1kg");
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stock_of(&db, "p1").await, 2);
    }

    #[tokio::test]
    async fn test_low_stock_warning_boundary() {
        let db = test_db().await;
        add_product(&db, "p1", "Leche 1L", 1350, 12).await;
        let manager = SaleManager::new(db.clone());

        // 12 -> 11: above the threshold, no warning
        let (_, warnings) = manager.create(simple_request("p1", 1)).await.unwrap();
        assert!(warnings.is_empty());

        // 11 -> 7: in (0, 10], warning
        let (_, warnings) = manager.create(simple_request("p1", 4)).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].description, "Leche 1L");
        assert_eq!(warnings[0].stock, 7);
    }

    #[tokio::test]
    async fn test_failed_second_line_rolls_back_first() {
        let db = test_db().await;
        add_product(&db, "p1", "Azúcar 1kg", 1100, 10).await;
        add_product(&db, "p2", "Café 250g", 4500, 1).await;
        let manager = SaleManager::new(db.clone());

        let request = SaleRequest {
            lines: vec![
                SaleLineRequest {
                    product_id: "p1".to_string(),
                    quantity: 4,
                },
                SaleLineRequest {
                    product_id: "p2".to_string(),
                    quantity: 2,
                },
            ],
            promotion_lines: vec![],
            seller: "ana".to_string(),
            payment_method: "cash".to_string(),
        };

        let err = manager.create(request).await.unwrap_err();
        assert!(matches!(err, EngineError::InsufficientStock { .. }));

        // first line's reservation was compensated
        assert_eq!(stock_of(&db, "p1").await, 10);
        assert_eq!(stock_of(&db, "p2").await, 1);
        assert!(manager.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_promotion_line_reserves_constituents() {
        let db = test_db().await;
        add_product(&db, "p1", "Gaseosa cola 2.25L", 2800, 10).await;
        add_product(&db, "p2", "Gaseosa lima 2.25L", 2600, 10).await;
        add_two_for_one(&db, "promo1", 2800).await;
        let manager = SaleManager::new(db.clone());

        let request = SaleRequest {
            lines: vec![],
            promotion_lines: vec![PromotionLineRequest {
                promotion_id: "promo1".to_string(),
                quantity: 2,
                items: vec![
                    PromotionItemRequest {
                        product_id: "p1".to_string(),
                        quantity_per_bundle: 1,
                    },
                    PromotionItemRequest {
                        product_id: "p2".to_string(),
                        quantity_per_bundle: 1,
                    },
                ],
            }],
            seller: "ana".to_string(),
            payment_method: "card".to_string(),
        };

        let (sale, _) = manager.create(request).await.unwrap();

        assert_eq!(sale.promotion_lines[0].subtotal_cents, 5600);
        assert_eq!(sale.total_cents, 5600);
        // two bundles consumed one of each
        assert_eq!(stock_of(&db, "p1").await, 8);
        assert_eq!(stock_of(&db, "p2").await, 8);
    }

    #[tokio::test]
    async fn test_promotion_stock_error_is_annotated() {
        let db = test_db().await;
        add_product(&db, "p1", "Gaseosa cola 2.25L", 2800, 1).await;
        add_product(&db, "p2", "Gaseosa lima 2.25L", 2600, 10).await;
        add_two_for_one(&db, "promo1", 2800).await;
        let manager = SaleManager::new(db.clone());

        let request = SaleRequest {
            lines: vec![],
            promotion_lines: vec![PromotionLineRequest {
                promotion_id: "promo1".to_string(),
                quantity: 2,
                items: vec![PromotionItemRequest {
                    product_id: "p1".to_string(),
                    quantity_per_bundle: 1,
                }],
            }],
            seller: "ana".to_string(),
            payment_method: "cash".to_string(),
        };

        let err = manager.create(request).await.unwrap_err();
        match err {
            EngineError::InsufficientStock { description, .. } => {
                assert_eq!(description, "Gaseosa cola 2.25L (promotion)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_promotion_constituents_raise_low_stock_warning() {
        let db = test_db().await;
        add_product(&db, "p1", "Gaseosa cola 2.25L", 2800, 12).await;
        add_two_for_one(&db, "promo1", 2800).await;
        let manager = SaleManager::new(db.clone());

        // five bundles of one unit each: 12 -> 7, inside (0, 10]
        let request = SaleRequest {
            lines: vec![],
            promotion_lines: vec![PromotionLineRequest {
                promotion_id: "promo1".to_string(),
                quantity: 5,
                items: vec![PromotionItemRequest {
                    product_id: "p1".to_string(),
                    quantity_per_bundle: 1,
                }],
            }],
            seller: "ana".to_string(),
            payment_method: "cash".to_string(),
        };

        let (_, warnings) = manager.create(request).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].description, "Gaseosa cola 2.25L");
        assert_eq!(warnings[0].stock, 7);
        assert_eq!(stock_of(&db, "p1").await, 7);
    }

    #[tokio::test]
    async fn test_large_quantity_sells_against_ample_stock() {
        let db = test_db().await;
        add_product(&db, "p1", "Caramelos sueltos", 50, 5000).await;
        let manager = SaleManager::new(db.clone());

        let (sale, _) = manager.create(simple_request("p1", 1000)).await.unwrap();
        assert_eq!(sale.total_cents, 50_000);
        assert_eq!(stock_of(&db, "p1").await, 4000);
    }

    #[tokio::test]
    async fn test_delete_restores_stock_and_second_delete_fails() {
        let db = test_db().await;
        add_product(&db, "p1", "Yerba 1kg", 4200, 8).await;
        let manager = SaleManager::new(db.clone());

        let (sale, _) = manager.create(simple_request("p1", 3)).await.unwrap();
        assert_eq!(stock_of(&db, "p1").await, 5);

        manager.delete(&sale.id).await.unwrap();
        assert_eq!(stock_of(&db, "p1").await, 8);

        // no double release
        let err = manager.delete(&sale.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(stock_of(&db, "p1").await, 8);
    }

    #[tokio::test]
    async fn test_delete_skips_missing_product() {
        let db = test_db().await;
        add_product(&db, "p1", "Lavandina 1L", 950, 5).await;
        let manager = SaleManager::new(db.clone());

        let (sale, _) = manager.create(simple_request("p1", 2)).await.unwrap();
        db.products().delete("p1").await.unwrap();

        // reversal skips the missing product and still removes the record
        manager.delete(&sale.id).await.unwrap();
        assert!(manager.get(&sale.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_validation_rejections() {
        let db = test_db().await;
        let manager = SaleManager::new(db);

        let empty = SaleRequest {
            lines: vec![],
            promotion_lines: vec![],
            seller: "ana".to_string(),
            payment_method: "cash".to_string(),
        };
        assert!(matches!(
            manager.create(empty).await.unwrap_err(),
            EngineError::MissingFields(_)
        ));

        let mut no_seller = simple_request("p1", 1);
        no_seller.seller = "  ".to_string();
        assert!(matches!(
            manager.create(no_seller).await.unwrap_err(),
            EngineError::MissingFields(_)
        ));

        let zero_qty = simple_request("p1", 0);
        assert!(matches!(
            manager.create(zero_qty).await.unwrap_err(),
            EngineError::InvalidQuantity
        ));
    }
}
