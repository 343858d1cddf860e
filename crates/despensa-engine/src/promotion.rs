//! # Promotion Catalog
//!
//! Create/edit/retire promotions. Cross-field rules (validity window,
//! secondary product, discount, minimum quantity) live in
//! `despensa_core::validation`; this manager adds the existence checks
//! that need the database.
//!
//! Past sales keep their own snapshot of every promotion they used, so
//! nothing here rewrites history.

use chrono::{DateTime, Utc};
use tracing::info;

use despensa_core::{validation, Promotion, PromotionType};
use despensa_db::{generate_id, Database};

use crate::error::{EngineError, EngineResult};

/// Promotion definition as requested by the interface layer. Used for
/// both create and update.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRequest {
    pub name: String,
    pub description: String,
    pub kind: PromotionType,
    pub primary_product_id: String,
    pub secondary_product_id: Option<String>,
    #[serde(default)]
    pub discount_value: i64,
    #[serde(default = "default_minimum_quantity")]
    pub minimum_quantity: i64,
    pub price_cents: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

fn default_minimum_quantity() -> i64 {
    1
}

/// Manager for the promotion catalog.
#[derive(Debug, Clone)]
pub struct PromotionCatalog {
    db: Database,
}

impl PromotionCatalog {
    pub fn new(db: Database) -> Self {
        PromotionCatalog { db }
    }

    pub async fn create(&self, request: PromotionRequest) -> EngineResult<Promotion> {
        self.validate(&request).await?;

        let promotion = Promotion {
            id: generate_id(),
            name: request.name,
            description: request.description,
            kind: request.kind,
            primary_product_id: request.primary_product_id,
            secondary_product_id: request.secondary_product_id,
            discount_value: request.discount_value,
            minimum_quantity: request.minimum_quantity,
            price_cents: request.price_cents,
            valid_from: request.valid_from,
            valid_to: request.valid_to,
            active: true,
            sales_count: 0,
            created_at: Utc::now(),
        };
        self.db.promotions().insert(&promotion).await?;

        info!(id = %promotion.id, name = %promotion.name, "Promotion created");
        Ok(promotion)
    }

    /// Rewrites a promotion's definition. Sales count and active flag are
    /// untouched.
    pub async fn update(&self, id: &str, request: PromotionRequest) -> EngineResult<Promotion> {
        let existing = self.get(id).await?;
        self.validate(&request).await?;

        let updated = Promotion {
            id: existing.id.clone(),
            name: request.name,
            description: request.description,
            kind: request.kind,
            primary_product_id: request.primary_product_id,
            secondary_product_id: request.secondary_product_id,
            discount_value: request.discount_value,
            minimum_quantity: request.minimum_quantity,
            price_cents: request.price_cents,
            valid_from: request.valid_from,
            valid_to: request.valid_to,
            active: existing.active,
            sales_count: existing.sales_count,
            created_at: existing.created_at,
        };
        self.db.promotions().update(&updated).await?;

        info!(id = %id, "Promotion updated");
        Ok(updated)
    }

    /// Retires a promotion; the row survives for past-sale context.
    pub async fn finalize(&self, id: &str) -> EngineResult<()> {
        self.db.promotions().finalize(id).await?;
        info!(id = %id, "Promotion finalized");
        Ok(())
    }

    /// Bumps the convenience counter of sales through this promotion.
    pub async fn increment_sales(&self, id: &str) -> EngineResult<()> {
        Ok(self.db.promotions().increment_sales(id).await?)
    }

    pub async fn get(&self, id: &str) -> EngineResult<Promotion> {
        self.db
            .promotions()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Promotion", id))
    }

    pub async fn list(&self) -> EngineResult<Vec<Promotion>> {
        Ok(self.db.promotions().list().await?)
    }

    pub async fn list_active(&self) -> EngineResult<Vec<Promotion>> {
        Ok(self.db.promotions().list_active().await?)
    }

    pub async fn delete(&self, id: &str) -> EngineResult<()> {
        self.db.promotions().delete(id).await?;
        info!(id = %id, "Promotion deleted");
        Ok(())
    }

    async fn validate(&self, request: &PromotionRequest) -> EngineResult<()> {
        validation::validate_required("name", &request.name)?;
        validation::validate_price_cents(request.price_cents)?;
        validation::validate_promotion_rules(
            request.kind,
            request.secondary_product_id.as_deref(),
            request.discount_value,
            request.minimum_quantity,
            request.valid_from,
            request.valid_to,
        )?;

        let products = self.db.products();
        if products
            .get_by_id(&request.primary_product_id)
            .await?
            .is_none()
        {
            return Err(EngineError::not_found(
                "Product",
                &request.primary_product_id,
            ));
        }
        if let Some(secondary) = &request.secondary_product_id {
            if products.get_by_id(secondary).await?.is_none() {
                return Err(EngineError::not_found("Product", secondary));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use despensa_core::{Product, ValidationError};
    use despensa_db::DbConfig;

    async fn db_with_products() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        for (id, description) in [("p1", "Gaseosa cola 2.25L"), ("p2", "Gaseosa lima 2.25L")] {
            db.products()
                .insert(&Product {
                    id: id.to_string(),
                    category: "bebidas".to_string(),
                    description: description.to_string(),
                    barcode: None,
                    price_cents: 2800,
                    stock: 10,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }
        db
    }

    fn two_for_one() -> PromotionRequest {
        let now = Utc::now();
        PromotionRequest {
            name: "2x1 Gaseosas".to_string(),
            description: "Lleva dos, paga una".to_string(),
            kind: PromotionType::TwoForOne,
            primary_product_id: "p1".to_string(),
            secondary_product_id: Some("p2".to_string()),
            discount_value: 0,
            minimum_quantity: 1,
            price_cents: 2800,
            valid_from: now,
            valid_to: now + Duration::days(30),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db_with_products().await;
        let catalog = PromotionCatalog::new(db);

        let promo = catalog.create(two_for_one()).await.unwrap();
        assert!(promo.active);
        assert_eq!(promo.sales_count, 0);

        let found = catalog.get(&promo.id).await.unwrap();
        assert_eq!(found.kind, PromotionType::TwoForOne);
    }

    #[tokio::test]
    async fn test_two_for_one_requires_secondary() {
        let db = db_with_products().await;
        let catalog = PromotionCatalog::new(db);

        let mut request = two_for_one();
        request.secondary_product_id = None;

        let err = catalog.create(request).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::SecondaryProductRequired { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_date_range_rejected() {
        let db = db_with_products().await;
        let catalog = PromotionCatalog::new(db);

        let mut request = two_for_one();
        request.valid_to = request.valid_from - Duration::days(1);

        let err = catalog.create(request).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::InvalidDateRange)
        ));
    }

    #[tokio::test]
    async fn test_missing_product_rejected() {
        let db = db_with_products().await;
        let catalog = PromotionCatalog::new(db);

        let mut request = two_for_one();
        request.primary_product_id = "ghost".to_string();

        assert!(catalog.create(request).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_volume_discount_rules() {
        let db = db_with_products().await;
        let catalog = PromotionCatalog::new(db);

        let now = Utc::now();
        let mut request = PromotionRequest {
            name: "3 o más".to_string(),
            description: "Descuento por cantidad".to_string(),
            kind: PromotionType::VolumeDiscount,
            primary_product_id: "p1".to_string(),
            secondary_product_id: None,
            discount_value: 0,
            minimum_quantity: 3,
            price_cents: 2500,
            valid_from: now,
            valid_to: now + Duration::days(15),
        };

        // zero discount rejected
        let err = catalog.create(request.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::DiscountRequired { .. })
        ));

        request.discount_value = 500;
        catalog.create(request.clone()).await.unwrap();

        // minimum below 2 rejected
        request.minimum_quantity = 1;
        let err = catalog.create(request).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::MinimumQuantityTooSmall)
        ));
    }

    #[tokio::test]
    async fn test_update_preserves_counter_and_flag() {
        let db = db_with_products().await;
        let catalog = PromotionCatalog::new(db);

        let promo = catalog.create(two_for_one()).await.unwrap();
        catalog.increment_sales(&promo.id).await.unwrap();

        let mut request = two_for_one();
        request.price_cents = 2600;
        let updated = catalog.update(&promo.id, request).await.unwrap();

        assert_eq!(updated.price_cents, 2600);
        assert_eq!(catalog.get(&promo.id).await.unwrap().sales_count, 1);
    }

    #[tokio::test]
    async fn test_finalize_retires() {
        let db = db_with_products().await;
        let catalog = PromotionCatalog::new(db);

        let promo = catalog.create(two_for_one()).await.unwrap();
        catalog.finalize(&promo.id).await.unwrap();

        assert!(!catalog.get(&promo.id).await.unwrap().active);
        assert!(catalog.list_active().await.unwrap().is_empty());
    }
}
