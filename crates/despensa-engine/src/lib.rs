//! # despensa-engine: Transaction Flows for Despensa POS
//!
//! Orchestration layer sitting between an interface (HTTP, desktop, CLI;
//! out of scope here) and the persistence layer. Each module is one
//! manager owning one family of operations:
//!
//! - [`sale`] - multi-line sales with promotion bundles and reversal
//! - [`write_off`] - stock write-offs, editable with stock compensation
//! - [`bulk_sale`] - weight-based deli sales
//! - [`promotion`] - the promotion catalog
//! - [`inventory`] - product/bulk-item CRUD and manual stock adjustments
//! - [`purchasing`] - suppliers and purchase invoices
//! - [`notes`] - seller-to-admin messages
//!
//! ## Transaction Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Stock first, record second.                                        │
//! │                                                                     │
//! │  1. validate request          (nothing touched yet)                 │
//! │  2. reserve stock per item    (ledger enforces >= 0 atomically)     │
//! │  3. persist the record                                              │
//! │                                                                     │
//! │  Any failure after step 2 starts releases everything reserved so    │
//! │  far before the error is returned (compensating rollback). There    │
//! │  is no cross-table transaction wrapping stock + record.             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod bulk_sale;
pub mod error;
pub mod inventory;
pub mod notes;
pub mod promotion;
pub mod purchasing;
pub mod sale;
pub mod write_off;

pub use error::{EngineError, EngineResult};

pub use bulk_sale::BulkSaleManager;
pub use inventory::InventoryService;
pub use notes::NoteService;
pub use promotion::PromotionCatalog;
pub use purchasing::PurchasingService;
pub use sale::SaleManager;
pub use write_off::WriteOffManager;
