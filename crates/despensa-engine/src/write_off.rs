//! # Write-off Manager
//!
//! Records stock lost to expiration, breakage, defects or anything else.
//! A write-off reserves stock exactly like a sale does, but the record is
//! editable: quantity changes apply the delta, and switching the target
//! product moves the full quantity from one item to the other.
//!
//! Loss value is always recomputed from the product's price at the time
//! of the write (create or edit), then frozen into the record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use despensa_core::{pricing, Caller, WriteOff, WriteOffReason};
use despensa_db::{generate_id, Database, StockKind};

use crate::error::{ledger_error, EngineError, EngineResult};

/// A write-off as requested by the interface layer. Used for both create
/// and update; on update the recorded-by identity is kept from the
/// original record.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOffRequest {
    pub product_id: String,
    pub quantity: i64,
    pub reason: WriteOffReason,
    pub description: String,
}

/// Manager for the write-off flow.
#[derive(Debug, Clone)]
pub struct WriteOffManager {
    db: Database,
}

impl WriteOffManager {
    pub fn new(db: Database) -> Self {
        WriteOffManager { db }
    }

    /// Records a write-off: reserves the quantity and freezes the loss
    /// value at the product's current price.
    pub async fn create(&self, caller: &Caller, request: WriteOffRequest) -> EngineResult<WriteOff> {
        if request.quantity <= 0 {
            return Err(EngineError::InvalidQuantity);
        }

        let product = self
            .db
            .products()
            .get_by_id(&request.product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", &request.product_id))?;

        self.db
            .ledger()
            .reserve(StockKind::Product, &product.id, request.quantity)
            .await
            .map_err(|err| ledger_error(err, &product.description, &product.id))?;

        let loss = pricing::line_subtotal(product.price(), request.quantity);

        let write_off = WriteOff {
            id: generate_id(),
            product_id: product.id,
            quantity: request.quantity,
            reason: request.reason,
            description: request.description,
            loss_value_cents: loss.cents(),
            recorded_by: caller.id.clone(),
            created_at: Utc::now(),
        };
        self.db.write_offs().insert(&write_off).await?;

        info!(id = %write_off.id, quantity = write_off.quantity, "Write-off recorded");
        Ok(write_off)
    }

    /// Edits a write-off, adjusting stock to match.
    ///
    /// - Same product, new quantity: only the delta moves (reserve when it
    ///   grows, release when it shrinks).
    /// - Different product: the full old quantity goes back to the old
    ///   product, then the new quantity is reserved from the new one. If
    ///   that reservation fails, the old one is re-applied before the
    ///   error is returned.
    pub async fn update(&self, id: &str, request: WriteOffRequest) -> EngineResult<WriteOff> {
        if request.quantity <= 0 {
            return Err(EngineError::InvalidQuantity);
        }

        let existing = self
            .db
            .write_offs()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("WriteOff", id))?;

        let product = self
            .db
            .products()
            .get_by_id(&request.product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", &request.product_id))?;

        let ledger = self.db.ledger();

        if existing.product_id != request.product_id {
            // Move the write-off to another product.
            let old_description = self
                .db
                .products()
                .get_by_id(&existing.product_id)
                .await?
                .map(|p| p.description)
                .unwrap_or_else(|| existing.product_id.clone());

            match ledger
                .release(StockKind::Product, &existing.product_id, existing.quantity)
                .await
            {
                Ok(Some(_)) => {}
                Ok(None) => {
                    warn!(product_id = %existing.product_id, "Old product missing during write-off edit, skipping release");
                }
                Err(err) => return Err(ledger_error(err, &old_description, &existing.product_id)),
            }

            if let Err(err) = ledger
                .reserve(StockKind::Product, &product.id, request.quantity)
                .await
            {
                // Put the old reservation back before reporting failure.
                if let Err(undo_err) = ledger
                    .reserve(StockKind::Product, &existing.product_id, existing.quantity)
                    .await
                {
                    warn!(product_id = %existing.product_id, error = %undo_err, "Failed to restore old write-off reservation");
                }
                return Err(ledger_error(err, &product.description, &product.id));
            }
        } else {
            let delta = request.quantity - existing.quantity;
            if delta > 0 {
                ledger
                    .reserve(StockKind::Product, &product.id, delta)
                    .await
                    .map_err(|err| ledger_error(err, &product.description, &product.id))?;
            } else if delta < 0 {
                match ledger.release(StockKind::Product, &product.id, -delta).await {
                    Ok(_) => {}
                    Err(err) => return Err(ledger_error(err, &product.description, &product.id)),
                }
            }
        }

        let loss = pricing::line_subtotal(product.price(), request.quantity);

        let updated = WriteOff {
            id: existing.id.clone(),
            product_id: product.id,
            quantity: request.quantity,
            reason: request.reason,
            description: request.description,
            loss_value_cents: loss.cents(),
            recorded_by: existing.recorded_by.clone(),
            created_at: existing.created_at,
        };
        self.db.write_offs().update(&updated).await?;

        info!(id = %id, quantity = updated.quantity, "Write-off updated");
        Ok(updated)
    }

    /// Reverses a write-off: the quantity goes back onto stock (unless
    /// the product was deleted) and the record is removed.
    pub async fn delete(&self, id: &str) -> EngineResult<()> {
        let existing = self
            .db
            .write_offs()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("WriteOff", id))?;

        let item_description = self
            .db
            .products()
            .get_by_id(&existing.product_id)
            .await?
            .map(|p| p.description)
            .unwrap_or_else(|| existing.product_id.clone());

        match self
            .db
            .ledger()
            .release(StockKind::Product, &existing.product_id, existing.quantity)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(product_id = %existing.product_id, "Product missing during write-off reversal, skipping release");
            }
            Err(err) => return Err(ledger_error(err, &item_description, &existing.product_id)),
        }

        self.db.write_offs().delete(id).await?;
        info!(id = %id, "Write-off deleted, stock restored");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> EngineResult<WriteOff> {
        self.db
            .write_offs()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("WriteOff", id))
    }

    pub async fn list(&self) -> EngineResult<Vec<WriteOff>> {
        Ok(self.db.write_offs().list().await?)
    }

    /// Write-offs recorded within `[from, to)`.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<Vec<WriteOff>> {
        Ok(self.db.write_offs().list_between(from, to).await?)
    }

    /// Total loss value per reason over `[from, to)`.
    pub async fn loss_by_reason(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<HashMap<WriteOffReason, i64>> {
        let write_offs = self.db.write_offs().list_between(from, to).await?;

        let mut totals = HashMap::new();
        for w in write_offs {
            *totals.entry(w.reason).or_insert(0) += w.loss_value_cents;
        }

        Ok(totals)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
