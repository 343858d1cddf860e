//! # Engine Error Types
//!
//! The caller-facing error taxonomy. Interface layers (HTTP, desktop,
//! CLI) map these onto their own status codes; the helpers at the bottom
//! give them the split they need without matching every variant.

use thiserror::Error;

use despensa_core::ValidationError;
use despensa_db::{DbError, LedgerError};

/// Errors surfaced by the transaction flows.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A required request field is empty or absent.
    #[error("missing required fields: {0}")]
    MissingFields(&'static str),

    /// A quantity was zero or negative where a positive one is required.
    #[error("quantity must be positive")]
    InvalidQuantity,

    /// Not enough stock to cover a reservation. Carries the item
    /// description and the quantity currently on hand.
    #[error("insufficient stock for {description}: {available} available")]
    InsufficientStock { description: String, available: i64 },

    /// The caller's role does not permit this operation.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// A business-rule validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unexpected storage failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl EngineError {
    /// Builds a NotFound for an entity/id pair.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// True for the 404-shaped case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound { .. })
    }

    /// True when the caller's request was at fault (the 4xx bucket);
    /// false for storage and other internal failures.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EngineError::Db(_))
    }
}

/// Converts a ledger failure into the engine taxonomy, attaching the
/// human-readable description of the item involved.
pub(crate) fn ledger_error(err: LedgerError, description: &str, id: &str) -> EngineError {
    match err {
        LedgerError::ItemNotFound(entity) => EngineError::NotFound {
            entity,
            id: id.to_string(),
        },
        LedgerError::InsufficientStock { available } => EngineError::InsufficientStock {
            description: description.to_string(),
            available,
        },
        LedgerError::Db(db) => EngineError::Db(db),
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_found = EngineError::not_found("Product", "p1");
        assert!(not_found.is_not_found());
        assert!(not_found.is_client_error());

        let stock = EngineError::InsufficientStock {
            description: "Arroz 1kg".to_string(),
            available: 2,
        };
        assert!(!stock.is_not_found());
        assert!(stock.is_client_error());

        let db = EngineError::Db(DbError::PoolExhausted);
        assert!(!db.is_client_error());
    }

    #[test]
    fn test_messages_are_human_readable() {
        let err = EngineError::InsufficientStock {
            description: "Fideos 500g".to_string(),
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Fideos 500g: 1 available"
        );
    }
}
