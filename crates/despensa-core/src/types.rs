//! # Domain Types
//!
//! Core domain types for Despensa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  Stocked items            Transactions           Catalog            │
//! │  ┌──────────────┐         ┌──────────────┐       ┌──────────────┐   │
//! │  │ Product      │         │ Sale         │       │ Promotion    │   │
//! │  │ (unit stock) │◄──id────│  SaleLine    │──id──►│ (by value in │   │
//! │  │ BulkItem     │         │  PromotionLn │       │  sales)      │   │
//! │  │ (grams)      │◄──id────│ WriteOff     │       └──────────────┘   │
//! │  └──────────────┘         │ BulkSale     │                          │
//! │                           └──────────────┘                          │
//! │                                                                     │
//! │  Supporting: Supplier, Purchase, Note, Caller                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Transaction records (SaleLine, PromotionLine, WriteOff, BulkSale) copy
//! price and description at creation time. Later edits to the live item or
//! promotion never retroactively alter historical records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Stocked Items
// =============================================================================

/// A discrete-unit product on the shelf.
///
/// `stock` is a unit count and is only ever mutated through the stock
/// ledger, which maintains `stock >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product category (free-form, e.g. "almacen", "bebidas").
    pub category: String,

    /// Display description shown to the cashier and snapshotted into sales.
    pub description: String,

    /// Barcode (EAN-13 etc.), if scanned in.
    pub barcode: Option<String>,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Current stock level, in units.
    pub stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A bulk deli item ("embutido") sold by weight.
///
/// Stock is tracked in grams; price is per 100 grams.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BulkItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, snapshotted into bulk sales.
    pub name: String,

    /// Price per 100 grams, in cents.
    pub price_per_100g_cents: i64,

    /// Current stock level, in grams.
    pub stock_grams: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BulkItem {
    /// Returns the per-100g price as a Money value.
    #[inline]
    pub fn price_per_100g(&self) -> Money {
        Money::from_cents(self.price_per_100g_cents)
    }
}

// =============================================================================
// Sale Transaction
// =============================================================================

/// A recorded sale: product lines plus promotion bundles.
///
/// Immutable once created, except for deletion (which restores every
/// reserved quantity before removing the record). Lines are embedded and
/// not independently addressable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub lines: Vec<SaleLine>,
    pub promotion_lines: Vec<PromotionLine>,
    /// Seller who rang the sale up.
    pub seller: String,
    /// Payment method as received (cash, card, transfer, ...).
    pub payment_method: String,
    /// Invariant: equals the sum of all line and promotion subtotals.
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as a Money value.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One product line in a sale. Uses the snapshot pattern: description and
/// unit price are frozen at sale time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub product_id: String,
    /// Description at time of sale (frozen).
    pub description: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// `unit_price_cents × quantity`.
    pub subtotal_cents: i64,
}

/// One promotion bundle in a sale, snapshotted by value from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionLine {
    pub promotion_id: String,
    /// Promotion name at time of sale (frozen).
    pub name: String,
    /// Bundle price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Number of bundles sold.
    pub quantity: i64,
    pub subtotal_cents: i64,
    pub promotion_type: PromotionType,
    /// Constituent products and how many units each bundle consumes.
    pub items: Vec<PromotionLineItem>,
}

/// A constituent product of a promotion bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PromotionLineItem {
    pub product_id: String,
    /// Units of this product consumed per bundle sold.
    pub quantity_per_bundle: i64,
}

// =============================================================================
// Write-off (Baja)
// =============================================================================

/// Why stock was written off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum WriteOffReason {
    /// Past its expiration date.
    Expiration,
    /// Broken in handling.
    Breakage,
    /// Manufacturing or supplier defect.
    Defect,
    /// Anything else; see the description field.
    Other,
}

/// A recorded stock reduction for a reason other than sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WriteOff {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub reason: WriteOffReason,
    pub description: String,
    /// `unit price at write-off time × quantity`, frozen.
    pub loss_value_cents: i64,
    /// User who recorded the write-off; preserved across updates.
    pub recorded_by: String,
    pub created_at: DateTime<Utc>,
}

impl WriteOff {
    /// Returns the loss value as a Money value.
    #[inline]
    pub fn loss_value(&self) -> Money {
        Money::from_cents(self.loss_value_cents)
    }
}

// =============================================================================
// Bulk-Item Sale
// =============================================================================

/// A sale of a single weight-based item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BulkSale {
    pub id: String,
    pub bulk_item_id: String,
    pub seller: String,
    pub quantity_grams: i64,
    /// Per-100g price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// `quantity_grams / 100 × unit_price_cents`, rounded to a cent.
    pub total_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Promotion Catalog
// =============================================================================

/// The shape of a promotion's pricing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PromotionType {
    /// Buy one of the primary product, get one of the secondary.
    TwoForOne,
    /// Discount unlocked from `minimum_quantity` units.
    VolumeDiscount,
    /// Flat percentage off.
    PercentDiscount,
    /// Primary + secondary product bundled at a fixed price.
    ComboPack,
}

impl PromotionType {
    /// Stable string form, matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PromotionType::TwoForOne => "two_for_one",
            PromotionType::VolumeDiscount => "volume_discount",
            PromotionType::PercentDiscount => "percent_discount",
            PromotionType::ComboPack => "combo_pack",
        }
    }

    /// Whether this type spans a secondary product.
    pub const fn requires_secondary(&self) -> bool {
        matches!(self, PromotionType::TwoForOne | PromotionType::ComboPack)
    }

    /// Whether this type is defined by a discount value.
    pub const fn requires_discount(&self) -> bool {
        matches!(
            self,
            PromotionType::VolumeDiscount | PromotionType::PercentDiscount
        )
    }
}

impl fmt::Display for PromotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, time-boxed pricing rule over one or two products.
///
/// Referenced by value (snapshot) inside `PromotionLine`; editing or
/// retiring a promotion never alters past sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: PromotionType,
    pub primary_product_id: String,
    /// Absent for single-product promotion types.
    pub secondary_product_id: Option<String>,
    /// Discount magnitude: basis points for percent discounts, cents for
    /// volume discounts. Zero for types without a discount.
    pub discount_value: i64,
    /// Units required to unlock a volume discount (>= 2 there, else 1).
    pub minimum_quantity: i64,
    /// Bundle price in cents.
    pub price_cents: i64,
    pub valid_from: DateTime<Utc>,
    /// Invariant: strictly later than `valid_from`.
    pub valid_to: DateTime<Utc>,
    pub active: bool,
    /// Convenience counter bumped by `increment_sales`; authoritative
    /// statistics come from scanning sales in the reporting layer.
    pub sales_count: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Suppliers & Purchases
// =============================================================================

/// A goods supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
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
    /// Soft-delete flag.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment state of a supplier purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Paid,
    Cancelled,
}

impl Default for PurchaseStatus {
    fn default() -> Self {
        PurchaseStatus::Pending
    }
}

/// An invoiced purchase from a supplier. Purchases record incoming goods on
/// paper only; they do not touch the stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub supplier_id: String,
    pub invoice_number: String,
    pub lines: Vec<PurchaseLine>,
    pub purchased_at: DateTime<Utc>,
    pub total_cents: i64,
    pub payment_method: String,
    pub status: PurchaseStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One invoiced line of a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

// =============================================================================
// Staff Notes & Identity
// =============================================================================

/// Role of an authenticated caller. Session issuance is out of scope; the
/// engine only consumes the resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Admin,
    Seller,
}

/// Authenticated caller identity, as handed in by the (out-of-scope)
/// auth layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub id: String,
    pub role: StaffRole,
}

/// An internal note from a seller to the administrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Id of the seller who wrote the note.
    pub created_by: String,
    pub is_read: bool,
    pub seen_by_admin: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
