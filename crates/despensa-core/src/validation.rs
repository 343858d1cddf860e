//! # Validation Module
//!
//! Input validation for Despensa POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Request schema (out of scope)                             │
//! │      shape and type checks on the JSON body                         │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - business rule validation                    │
//! │      runs BEFORE any stock mutation (fail fast, no partial effect)  │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database constraints (NOT NULL, CHECK stock >= 0)         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::{ValidationError, ValidationResult};
use crate::types::PromotionType;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a required string field is present and non-blank.
pub fn validate_required(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

/// Validates a unit quantity: strictly positive. No upper bound; the
/// ledger's stock check is the real limit on how much a line can take.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }
    Ok(())
}

/// Validates a gram amount for a bulk-item sale.
pub fn validate_grams(grams: i64) -> ValidationResult<()> {
    if grams <= 0 {
        return Err(ValidationError::MustBePositive { field: "grams" });
    }
    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price",
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a stock level on item create/update. Negative initial stock is
/// rejected here; afterwards the ledger owns the invariant.
pub fn validate_stock_level(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock",
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a UUID string.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required { field: "id" });
    }
    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id",
        reason: "must be a valid UUID",
    })?;
    Ok(())
}

// =============================================================================
// Promotion Rules
// =============================================================================

/// Cross-field promotion invariants, evaluated on create AND update, before
/// persistence:
///
/// - the validity window must be non-empty (`valid_to > valid_from`)
/// - two-for-one and combo-pack promotions need a secondary product
/// - discount-based types need `discount_value > 0`
/// - volume discounts need `minimum_quantity >= 2`
pub fn validate_promotion_rules(
    kind: PromotionType,
    secondary_product_id: Option<&str>,
    discount_value: i64,
    minimum_quantity: i64,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
) -> ValidationResult<()> {
    if valid_to <= valid_from {
        return Err(ValidationError::InvalidDateRange);
    }

    if kind.requires_secondary() && secondary_product_id.map_or(true, |s| s.trim().is_empty()) {
        return Err(ValidationError::SecondaryProductRequired {
            kind: kind.to_string(),
        });
    }

    if kind.requires_discount() && discount_value <= 0 {
        return Err(ValidationError::DiscountRequired {
            kind: kind.to_string(),
        });
    }

    if kind == PromotionType::VolumeDiscount && minimum_quantity < 2 {
        return Err(ValidationError::MinimumQuantityTooSmall);
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
