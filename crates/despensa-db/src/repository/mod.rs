//! # Repository Module
//!
//! Database repository implementations for Despensa POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Engine flow (despensa-engine)                                      │
//! │       │                                                             │
//! │       │  db.sales().insert(&sale)                                   │
//! │       ▼                                                             │
//! │  SaleRepository                                                     │
//! │  ├── insert(&self, sale)                                            │
//! │  ├── get_by_id(&self, id)                                           │
//! │  └── delete(&self, id)                                              │
//! │       │  SQL                                                        │
//! │       ▼                                                             │
//! │  SQLite                                                             │
//! │                                                                     │
//! │  SQL stays in this module; flows above never build queries.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories persist and fetch records. Stock mutation is NOT a
//! repository concern; that is the [`crate::ledger::StockLedger`].
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - discrete-unit product CRUD
//! - [`BulkItemRepository`] - weight-based item CRUD
//! - [`SaleRepository`] - sale records with embedded lines
//! - [`WriteOffRepository`] - stock write-off records
//! - [`BulkSaleRepository`] - weight-based sale records
//! - [`PromotionRepository`] - promotion catalog
//! - [`SupplierRepository`] - supplier directory
//! - [`PurchaseRepository`] - supplier purchase invoices
//! - [`NoteRepository`] - internal staff notes

pub mod bulk_item;
pub mod bulk_sale;
pub mod note;
pub mod product;
pub mod promotion;
pub mod purchase;
pub mod sale;
pub mod supplier;
pub mod write_off;

pub use bulk_item::BulkItemRepository;
pub use bulk_sale::BulkSaleRepository;
pub use note::NoteRepository;
pub use product::ProductRepository;
pub use promotion::PromotionRepository;
pub use purchase::PurchaseRepository;
pub use sale::SaleRepository;
pub use supplier::SupplierRepository;
pub use write_off::WriteOffRepository;

/// Generates a new record id (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
