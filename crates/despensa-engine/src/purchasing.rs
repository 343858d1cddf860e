//! # Purchasing
//!
//! Supplier directory and purchase invoices. Purchases are bookkeeping:
//! recording one does NOT move stock (receiving goods is a manual
//! inventory adjustment, deliberately separate).

use chrono::{DateTime, Utc};
use tracing::info;

use despensa_core::{pricing, validation, Money, Purchase, PurchaseLine, PurchaseStatus, Supplier};
use despensa_db::{generate_id, Database, PurchaseFilter};

use crate::error::{EngineError, EngineResult};

/// Supplier details as requested by the interface layer.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRequest {
    pub name: String,
    pub contact: String,
    pub phone: String,
    pub email: String,
    pub category: String,
    pub payment_terms: String,
    pub address: Option<String>,
    pub website: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
}

/// One invoiced line. Subtotal may be omitted and is then computed as
/// `unit_price × quantity`.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineRequest {
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: Option<i64>,
}

/// A purchase invoice as requested by the interface layer.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub supplier_id: String,
    pub invoice_number: String,
    pub lines: Vec<PurchaseLineRequest>,
    pub purchased_at: DateTime<Utc>,
    pub payment_method: String,
    #[serde(default)]
    pub status: PurchaseStatus,
    pub notes: Option<String>,
}

/// Service for suppliers and purchases.
#[derive(Debug, Clone)]
pub struct PurchasingService {
    db: Database,
}

impl PurchasingService {
    pub fn new(db: Database) -> Self {
        PurchasingService { db }
    }

    // ## Suppliers

    pub async fn create_supplier(&self, request: SupplierRequest) -> EngineResult<Supplier> {
        validation::validate_required("name", &request.name)?;
        validation::validate_required("category", &request.category)?;

        let now = Utc::now();
        let supplier = Supplier {
            id: generate_id(),
            name: request.name,
            contact: request.contact,
            phone: request.phone,
            email: request.email,
            category: request.category,
            payment_terms: request.payment_terms,
            address: request.address,
            website: request.website,
            tax_id: request.tax_id,
            notes: request.notes,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.db.suppliers().insert(&supplier).await?;

        info!(id = %supplier.id, name = %supplier.name, "Supplier created");
        Ok(supplier)
    }

    pub async fn update_supplier(&self, id: &str, request: SupplierRequest) -> EngineResult<Supplier> {
        validation::validate_required("name", &request.name)?;

        let existing = self.get_supplier(id).await?;

        let updated = Supplier {
            id: existing.id.clone(),
            name: request.name,
            contact: request.contact,
            phone: request.phone,
            email: request.email,
            category: request.category,
            payment_terms: request.payment_terms,
            address: request.address,
            website: request.website,
            tax_id: request.tax_id,
            notes: request.notes,
            active: existing.active,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.db.suppliers().update(&updated).await?;

        Ok(updated)
    }

    /// Soft-deletes a supplier; its purchases stay resolvable.
    pub async fn deactivate_supplier(&self, id: &str) -> EngineResult<()> {
        self.db.suppliers().deactivate(id).await?;
        info!(id = %id, "Supplier deactivated");
        Ok(())
    }

    pub async fn get_supplier(&self, id: &str) -> EngineResult<Supplier> {
        self.db
            .suppliers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Supplier", id))
    }

    pub async fn list_suppliers(&self, include_inactive: bool) -> EngineResult<Vec<Supplier>> {
        Ok(self.db.suppliers().list(include_inactive).await?)
    }

    pub async fn list_suppliers_by_category(&self, category: &str) -> EngineResult<Vec<Supplier>> {
        Ok(self.db.suppliers().list_by_category(category).await?)
    }

    // ## Purchases

    /// Records a purchase invoice. The supplier must exist; missing line
    /// subtotals are filled in from unit price × quantity.
    pub async fn create_purchase(&self, request: PurchaseRequest) -> EngineResult<Purchase> {
        self.get_supplier(&request.supplier_id).await?;
        validation::validate_required("invoice number", &request.invoice_number)?;
        if request.lines.is_empty() {
            return Err(EngineError::MissingFields("at least one line"));
        }

        let lines = build_lines(&request.lines)?;
        let total_cents: i64 = lines.iter().map(|l| l.subtotal_cents).sum();

        let now = Utc::now();
        let purchase = Purchase {
            id: generate_id(),
            supplier_id: request.supplier_id,
            invoice_number: request.invoice_number,
            lines,
            purchased_at: request.purchased_at,
            total_cents,
            payment_method: request.payment_method,
            status: request.status,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };
        self.db.purchases().insert(&purchase).await?;

        info!(id = %purchase.id, invoice = %purchase.invoice_number, total_cents = purchase.total_cents, "Purchase recorded");
        Ok(purchase)
    }

    pub async fn update_purchase(&self, id: &str, request: PurchaseRequest) -> EngineResult<Purchase> {
        let existing = self.get_purchase(id).await?;
        self.get_supplier(&request.supplier_id).await?;
        if request.lines.is_empty() {
            return Err(EngineError::MissingFields("at least one line"));
        }

        let lines = build_lines(&request.lines)?;
        let total_cents: i64 = lines.iter().map(|l| l.subtotal_cents).sum();

        let updated = Purchase {
            id: existing.id.clone(),
            supplier_id: request.supplier_id,
            invoice_number: request.invoice_number,
            lines,
            purchased_at: request.purchased_at,
            total_cents,
            payment_method: request.payment_method,
            status: request.status,
            notes: request.notes,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.db.purchases().update(&updated).await?;

        Ok(updated)
    }

    pub async fn set_purchase_status(&self, id: &str, status: PurchaseStatus) -> EngineResult<()> {
        self.db.purchases().set_status(id, status).await?;
        info!(id = %id, ?status, "Purchase status changed");
        Ok(())
    }

    pub async fn delete_purchase(&self, id: &str) -> EngineResult<()> {
        self.db.purchases().delete(id).await?;
        info!(id = %id, "Purchase deleted");
        Ok(())
    }

    pub async fn get_purchase(&self, id: &str) -> EngineResult<Purchase> {
        self.db
            .purchases()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Purchase", id))
    }

    pub async fn list_purchases(&self, filter: &PurchaseFilter) -> EngineResult<Vec<Purchase>> {
        Ok(self.db.purchases().list(filter).await?)
    }
}

fn build_lines(requests: &[PurchaseLineRequest]) -> EngineResult<Vec<PurchaseLine>> {
    let mut lines = Vec::with_capacity(requests.len());
    for line in requests {
        if line.quantity <= 0 {
            return Err(EngineError::InvalidQuantity);
        }
        let subtotal = match line.subtotal_cents {
            Some(cents) => cents,
            None => pricing::line_subtotal(Money::from_cents(line.unit_price_cents), line.quantity)
                .cents(),
        };
        lines.push(PurchaseLine {
            description: line.description.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            subtotal_cents: subtotal,
        });
    }
    Ok(lines)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use despensa_db::DbConfig;

    async fn test_service() -> PurchasingService {
        PurchasingService::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    fn supplier_request() -> SupplierRequest {
        SupplierRequest {
            name: "Distribuidora Norte".to_string(),
            contact: "Carlos".to_string(),
            phone: "11-5555-0000".to_string(),
            email: "ventas@norte.example".to_string(),
            category: "almacen".to_string(),
            payment_terms: "30 días".to_string(),
            address: None,
            website: None,
            tax_id: None,
            notes: None,
        }
    }

    fn purchase_request(supplier_id: &str) -> PurchaseRequest {
        PurchaseRequest {
            supplier_id: supplier_id.to_string(),
            invoice_number: "A-0001-00001234".to_string(),
            lines: vec![
                PurchaseLineRequest {
                    description: "Harina 000 x 25kg".to_string(),
                    quantity: 4,
                    unit_price_cents: 12000,
                    subtotal_cents: None,
                },
                PurchaseLineRequest {
                    description: "Azúcar x 10kg".to_string(),
                    quantity: 2,
                    unit_price_cents: 9000,
                    subtotal_cents: Some(17500),
                },
            ],
            purchased_at: Utc::now(),
            payment_method: "transfer".to_string(),
            status: PurchaseStatus::Pending,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_fills_subtotals_and_total() {
        let service = test_service().await;
        let supplier = service.create_supplier(supplier_request()).await.unwrap();

        let purchase = service
            .create_purchase(purchase_request(&supplier.id))
            .await
            .unwrap();

        // first line computed, second taken as given
        assert_eq!(purchase.lines[0].subtotal_cents, 48000);
        assert_eq!(purchase.lines[1].subtotal_cents, 17500);
        assert_eq!(purchase.total_cents, 65500);
    }

    #[tokio::test]
    async fn test_create_requires_existing_supplier() {
        let service = test_service().await;
        let err = service
            .create_purchase(purchase_request("ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_status_flow() {
        let service = test_service().await;
        let supplier = service.create_supplier(supplier_request()).await.unwrap();
        let purchase = service
            .create_purchase(purchase_request(&supplier.id))
            .await
            .unwrap();

        service
            .set_purchase_status(&purchase.id, PurchaseStatus::Paid)
            .await
            .unwrap();
        assert_eq!(
            service.get_purchase(&purchase.id).await.unwrap().status,
            PurchaseStatus::Paid
        );

        let paid = service
            .list_purchases(&PurchaseFilter {
                status: Some(PurchaseStatus::Paid),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paid.len(), 1);
    }

    #[tokio::test]
    async fn test_deactivated_supplier_keeps_purchases() {
        let service = test_service().await;
        let supplier = service.create_supplier(supplier_request()).await.unwrap();
        let purchase = service
            .create_purchase(purchase_request(&supplier.id))
            .await
            .unwrap();

        service.deactivate_supplier(&supplier.id).await.unwrap();

        assert!(service.list_suppliers(false).await.unwrap().is_empty());
        assert_eq!(
            service.get_purchase(&purchase.id).await.unwrap().supplier_id,
            supplier.id
        );
    }

    #[tokio::test]
    async fn test_empty_lines_rejected() {
        let service = test_service().await;
        let supplier = service.create_supplier(supplier_request()).await.unwrap();

        let mut request = purchase_request(&supplier.id);
        request.lines.clear();

        assert!(matches!(
            service.create_purchase(request).await.unwrap_err(),
            EngineError::MissingFields(_)
        ));
    }
}
