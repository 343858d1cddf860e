//! # Stock Ledger Math
//!
//! The pure half of the stock ledger: the non-negative-quantity invariant
//! and the low-stock rule, as plain arithmetic. The database half
//! (`despensa_db::ledger::StockLedger`) applies these rules in a single
//! conditional UPDATE so concurrent sales cannot oversell.
//!
//! ## The Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │   quantity >= 0 at all times                                        │
//! │                                                                     │
//! │   reserve(available, requested)                                     │
//! │        │                                                            │
//! │        ├── requested > available → Err(Insufficient)  (no change)   │
//! │        └── otherwise             → Ok(available - requested)        │
//! │                                                                     │
//! │   release(current, amount) → current + amount  (always succeeds)    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `release` has no upper bound: reversing a transaction against an item
//! whose stock was manually edited in between can credit more than was ever
//! reserved. Known limitation carried over from the original system.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::LOW_STOCK_THRESHOLD;

/// Reservation failure: the requested amount exceeds what is on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient stock: available {available}, requested {requested}")]
pub struct InsufficientStock {
    pub available: i64,
    pub requested: i64,
}

/// Attempts to reserve `requested` units out of `available`.
///
/// Returns the new quantity on success. Fails without any effect when the
/// reservation would drive the quantity negative.
pub fn reserve(available: i64, requested: i64) -> Result<i64, InsufficientStock> {
    if available < requested {
        return Err(InsufficientStock {
            available,
            requested,
        });
    }
    Ok(available - requested)
}

/// Releases `amount` units back onto `current`. Always succeeds.
#[inline]
pub fn release(current: i64, amount: i64) -> i64 {
    current + amount
}

/// Low-stock rule: a quantity in `(0, LOW_STOCK_THRESHOLD]` is worth a
/// warning; zero is already sold out and not warned about.
#[inline]
pub const fn is_low(quantity: i64) -> bool {
    quantity > 0 && quantity <= LOW_STOCK_THRESHOLD
}

/// Non-fatal signal returned alongside a successful sale when an item's
/// post-sale quantity crossed into the low range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockWarning {
    /// Description of the affected item (snapshot).
    pub description: String,
    /// Quantity remaining after the reservation.
    pub stock: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_success() {
        assert_eq!(reserve(5, 3), Ok(2));
        assert_eq!(reserve(5, 5), Ok(0));
        assert_eq!(reserve(5, 0), Ok(5));
    }

    #[test]
    fn test_reserve_insufficient_leaves_no_effect() {
        let err = reserve(2, 3).unwrap_err();
        assert_eq!(err.available, 2);
        assert_eq!(err.requested, 3);
    }

    #[test]
    fn test_release_is_unbounded() {
        assert_eq!(release(2, 3), 5);
        // over-crediting is permitted (documented limitation)
        assert_eq!(release(10, 1000), 1010);
    }

    #[test]
    fn test_quantity_never_negative_across_sequences() {
        // any sequence of reserve/release obeying preconditions keeps qty >= 0
        let mut qty = 7i64;
        for step in [3i64, 2, -4, 1, -1, 5] {
            if step > 0 {
                match reserve(qty, step) {
                    Ok(next) => qty = next,
                    Err(_) => {} // rejected reservation leaves qty untouched
                }
            } else {
                qty = release(qty, -step);
            }
            assert!(qty >= 0);
        }
    }

    #[test]
    fn test_low_stock_boundaries() {
        assert!(!is_low(0)); // sold out, not "low"
        assert!(is_low(1));
        assert!(is_low(10));
        assert!(!is_low(11));
    }
}
