//! # Line-Item Pricer
//!
//! Pure subtotal computation for sale lines. No state, no failure modes:
//! non-numeric input is rejected upstream by deserialization and validation.
//!
//! Two pricing shapes exist in the shop:
//! - discrete products priced per unit (`line_subtotal`)
//! - bulk deli items priced per 100 grams (`weighted_subtotal`)

use crate::money::Money;

/// Subtotal for a discrete product line: `unit_price × quantity`, exact.
///
/// ```rust
/// use despensa_core::money::Money;
/// use despensa_core::pricing::line_subtotal;
///
/// let subtotal = line_subtotal(Money::from_cents(250), 4);
/// assert_eq!(subtotal.cents(), 1000);
/// ```
#[inline]
pub fn line_subtotal(unit_price: Money, quantity: i64) -> Money {
    unit_price.multiply_quantity(quantity)
}

/// Subtotal for a weight-based line: `grams / 100 × price_per_100g`.
///
/// Computed in integer cents, rounded half-up to the nearest cent. 150 g at
/// $3.00/100g is exactly $4.50; 333 g at $1.00/100g rounds 333 → $3.33.
///
/// ```rust
/// use despensa_core::money::Money;
/// use despensa_core::pricing::weighted_subtotal;
///
/// let subtotal = weighted_subtotal(Money::from_cents(300), 150);
/// assert_eq!(subtotal.cents(), 450);
/// ```
pub fn weighted_subtotal(price_per_100g: Money, grams: i64) -> Money {
    // i128 intermediate so large gram counts cannot overflow
    let cents = (price_per_100g.cents() as i128 * grams as i128 + 50) / 100;
    Money::from_cents(cents as i64)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_subtotal_is_exact_product() {
        for (price, qty) in [(0, 0), (1, 1), (250, 4), (1099, 3), (99, 1000)] {
            assert_eq!(
                line_subtotal(Money::from_cents(price), qty).cents(),
                price * qty
            );
        }
    }

    #[test]
    fn test_weighted_subtotal_exact_multiples() {
        // 150g at $3.00/100g = $4.50
        assert_eq!(weighted_subtotal(Money::from_cents(300), 150).cents(), 450);
        // 1000g at $2.50/100g = $25.00
        assert_eq!(weighted_subtotal(Money::from_cents(250), 1000).cents(), 2500);
        // 100g at price = price
        assert_eq!(weighted_subtotal(Money::from_cents(777), 100).cents(), 777);
    }

    #[test]
    fn test_weighted_subtotal_rounds_half_up() {
        // 333g at $1.00/100g = 333.0 cents -> 333
        assert_eq!(weighted_subtotal(Money::from_cents(100), 333).cents(), 333);
        // 150g at $0.01/100g = 1.5 cents -> 2
        assert_eq!(weighted_subtotal(Money::from_cents(1), 150).cents(), 2);
        // 149g at $0.01/100g = 1.49 cents -> 1
        assert_eq!(weighted_subtotal(Money::from_cents(1), 149).cents(), 1);
    }

    #[test]
    fn test_zero_grams_is_free() {
        assert!(weighted_subtotal(Money::from_cents(300), 0).is_zero());
    }
}
