//! # Error Types
//!
//! Domain error types for despensa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  despensa-core (this file)                                          │
//! │  ├── ValidationError   - per-field and cross-field input failures   │
//! │  └── stock::InsufficientStock - the ledger's only failure mode      │
//! │                                                                     │
//! │  despensa-db                                                        │
//! │  └── DbError           - storage failures                           │
//! │                                                                     │
//! │  despensa-engine                                                    │
//! │  └── EngineError       - the caller-facing taxonomy                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Context in messages (field name, offending value)
//! 3. Errors are enum variants, never bare Strings

use thiserror::Error;

/// Input validation errors.
///
/// Detected before any mutation occurs; an operation that returns one of
/// these has had no effect on stock or stored records.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Invalid format (e.g. malformed UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Promotion validity window is inverted or empty.
    #[error("valid_to must be later than valid_from")]
    InvalidDateRange,

    /// Two-for-one and combo-pack promotions span two products.
    #[error("promotion type '{kind}' requires a secondary product")]
    SecondaryProductRequired { kind: String },

    /// Discount-based promotion types need a real discount.
    #[error("promotion type '{kind}' requires a discount greater than zero")]
    DiscountRequired { kind: String },

    /// Volume discounts only make sense from two units up.
    #[error("volume discounts require a minimum quantity of at least 2")]
    MinimumQuantityTooSmall,
}

/// Convenience alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
