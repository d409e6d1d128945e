//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in US dollars.
///
/// The marketplace backend quotes every amount in USD, so the wrapper only
/// carries the decimal amount. Arithmetic stays in `Decimal` to avoid
/// floating-point drift on money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(Decimal::from_parts(
            cents.unsigned_abs() as u32,
            (cents.unsigned_abs() >> 32) as u32,
            0,
            cents < 0,
            2,
        ))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0.round_dp(2))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self {
        Self(self.0 * rhs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        let price = Price::new(Decimal::new(1999, 2));
        assert_eq!(price.display(), "$19.99");
        assert_eq!(price.to_string(), "$19.99");
    }

    #[test]
    fn test_display_rounds() {
        let price = Price::new(Decimal::new(10, 0));
        assert_eq!(price.display(), "$10.00");
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(1050).display(), "$10.50");
        assert_eq!(Price::from_cents(0).display(), "$0.00");
    }

    #[test]
    fn test_add_and_mul() {
        let a = Price::new(Decimal::new(100, 0));
        let tax = a * Decimal::new(1, 1); // 10%
        assert_eq!(tax.display(), "$10.00");
        assert_eq!((a + tax).display(), "$110.00");
    }

    #[test]
    fn test_deserialize_from_number() {
        // Backend JSON carries prices as bare numbers
        let price: Price = serde_json::from_str("49.99").unwrap();
        assert_eq!(price, Price::new(Decimal::new(4999, 2)));
    }
}
