//! # despensa-db: SQLite Persistence for Despensa POS
//!
//! Local SQLite database layer: connection pool, embedded migrations,
//! repositories and the shared stock ledger.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  despensa-engine ── transaction flows                               │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  ★ despensa-db (THIS CRATE) ★                                       │
//! │    ┌──────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐  │
//! │    │   pool   │ │  migrations  │ │ repositories │ │ stock ledger │  │
//! │    └──────────┘ └──────────────┘ └──────────────┘ └──────────────┘  │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  SQLite (WAL mode, single file)                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why SQLite?
//!
//! One store, one file, no server to run. The whole business fits into a
//! single SQLite database by a comfortable margin, WAL mode keeps reads
//! from blocking the writer, and backups are a file copy.

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use ledger::{LedgerError, StockKind, StockLedger};
pub use pool::{Database, DbConfig};
pub use repository::generate_id;
pub use repository::purchase::PurchaseFilter;
