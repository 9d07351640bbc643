//! Type-safe price representation using decimal arithmetic.
//!
//! Prices arrive from the catalog as plain JSON numbers (e.g. `10.99`) and are
//! persisted the same way, but all arithmetic happens on [`Decimal`] so that
//! subtotals never pick up floating-point drift.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Quantity;

/// A unit price in the store's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Total price for `quantity` units.
    #[must_use]
    pub fn line_total(self, quantity: Quantity) -> Self {
        self * quantity
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<Quantity> for Price {
    type Output = Self;

    fn mul(self, rhs: Quantity) -> Self::Output {
        Self(self.0 * Decimal::from(rhs.get()))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        let price = Price::from_cents(1099);
        assert_eq!(serde_json::to_string(&price).unwrap(), "10.99");
    }

    #[test]
    fn test_deserializes_from_number() {
        let price: Price = serde_json::from_str("10.99").unwrap();
        assert_eq!(price, Price::from_cents(1099));

        let whole: Price = serde_json::from_str("10").unwrap();
        assert_eq!(whole.amount(), Decimal::from(10));
    }

    #[test]
    fn test_line_total() {
        let price = Price::from_cents(250);
        let total = price.line_total(Quantity::new(3).unwrap());
        assert_eq!(total, Price::from_cents(750));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(100), Price::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(350));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(1000).to_string(), "$10.00");
        assert_eq!(Price::from_cents(5).to_string(), "$0.05");
    }
}
