//! # despensa-core: Pure Business Logic for Despensa POS
//!
//! The heart of the system: every rule that can be expressed as a pure
//! function lives here, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   Despensa POS Architecture                         │
//! │                                                                     │
//! │  HTTP handlers / CLI (out of scope)                                 │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  despensa-engine ── sale / write-off / bulk-sale / promotion flows  │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  ★ despensa-core (THIS CRATE) ★                                     │
//! │    ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────────┐  │
//! │    │  types  │ │  money  │ │ pricing │ │  stock   │ │ validation │  │
//! │    └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────────┘  │
//! │    NO I/O • NO DATABASE • PURE FUNCTIONS                            │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  despensa-db ── SQLite repositories, shared stock ledger            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, WriteOff, Promotion, ...)
//! - [`money`] - Integer-cent Money type (no floating point!)
//! - [`pricing`] - Line-item pricer for unit and weight-based lines
//! - [`stock`] - Stock ledger math (reserve/release, low-stock rule)
//! - [`validation`] - Per-field and cross-field business rules
//! - [`error`] - Domain error types

pub mod error;
pub mod money;
pub mod pricing;
pub mod stock;
pub mod types;
pub mod validation;

pub use error::{ValidationError, ValidationResult};
pub use money::Money;
pub use stock::{InsufficientStock, LowStockWarning};
pub use types::*;

/// Post-sale stock at or below this (but above zero) raises a low-stock
/// warning alongside the successful sale.
pub const LOW_STOCK_THRESHOLD: i64 = 10;
