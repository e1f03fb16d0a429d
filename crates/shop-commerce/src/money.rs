//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation so cart and order totals add up
//! exactly. On the wire the backend speaks plain decimal numbers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// A monetary amount in the store's single currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(from = "f64", into = "f64")]
pub struct Money {
    /// Amount in cents.
    pub amount_cents: i64,
}

impl Money {
    /// Create a new Money value from cents.
    pub const fn from_cents(amount_cents: i64) -> Self {
        Self { amount_cents }
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use shop_commerce::Money;
    /// let price = Money::from_decimal(49.99);
    /// assert_eq!(price.amount_cents, 4999);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Self::from_cents((amount * 100.0).round() as i64)
    }

    /// Zero.
    pub const fn zero() -> Self {
        Self::from_cents(0)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }

    /// Multiply by a quantity, returning None on overflow.
    pub fn try_multiply(&self, quantity: i64) -> Option<Money> {
        self.amount_cents.checked_mul(quantity).map(Money::from_cents)
    }

    /// Multiply by a quantity, saturating on overflow.
    pub fn times(&self, quantity: u32) -> Money {
        Money::from_cents(self.amount_cents.saturating_mul(i64::from(quantity)))
    }

    /// Apply a percentage discount (`15.0` means 15% off).
    pub fn discounted(&self, percent: f64) -> Money {
        if percent <= 0.0 {
            return *self;
        }
        let factor = 1.0 - percent.min(100.0) / 100.0;
        Money::from_cents((self.amount_cents as f64 * factor).round() as i64)
    }

    /// Format as a display string (e.g., "49.99").
    pub fn display(&self) -> String {
        format!("{:.2}", self.to_decimal())
    }
}

impl From<f64> for Money {
    fn from(amount: f64) -> Self {
        Money::from_decimal(amount)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> f64 {
        money.to_decimal()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::from_cents(self.amount_cents + other.amount_cents)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::from_cents(self.amount_cents - other.amount_cents)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decimal_rounds() {
        assert_eq!(Money::from_decimal(19.99).amount_cents, 1999);
        assert_eq!(Money::from_decimal(0.1 + 0.2).amount_cents, 30);
    }

    #[test]
    fn test_times_and_sum() {
        let a = Money::from_decimal(10.0).times(2);
        let b = Money::from_decimal(5.0).times(3);
        let total: Money = [a, b].iter().sum();
        assert_eq!(total, Money::from_decimal(35.0));
    }

    #[test]
    fn test_try_multiply_overflow() {
        assert!(Money::from_cents(i64::MAX).try_multiply(2).is_none());
        assert_eq!(
            Money::from_cents(250).try_multiply(4),
            Some(Money::from_cents(1000))
        );
    }

    #[test]
    fn test_discounted() {
        let price = Money::from_decimal(100.0);
        assert_eq!(price.discounted(15.0), Money::from_decimal(85.0));
        assert_eq!(price.discounted(0.0), price);
        assert_eq!(price.discounted(150.0), Money::zero());
    }

    #[test]
    fn test_serde_as_decimal_number() {
        let json = serde_json::to_string(&Money::from_cents(1250)).unwrap();
        assert_eq!(json, "12.5");
        let back: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(back.amount_cents, 1250);
        let int: Money = serde_json::from_str("10").unwrap();
        assert_eq!(int.amount_cents, 1000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
    }
}
