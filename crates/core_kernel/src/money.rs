//! Monetary amounts in minor currency units
//!
//! This module provides a type-safe representation of non-negative monetary
//! values stored as an integer count of cents, avoiding floating-point
//! rounding error in storage and arithmetic.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during amount construction or arithmetic
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount cannot be negative")]
    Negative,

    #[error("amount exceeds the representable range")]
    Overflow,

    #[error("insufficient amount: cannot subtract {subtrahend} from {minuend}")]
    Insufficient { minuend: i64, subtrahend: i64 },
}

/// A non-negative monetary amount, stored as minor units (cents)
///
/// Amounts are immutable and compare by value. The decimal constructor
/// rounds to two decimal places before conversion; anything negative or
/// outside the `i64` cent range is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount {
    cents: i64,
}

impl Amount {
    /// Creates an amount from a decimal value, rounding to 2 decimal places
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative);
        }

        let cents = value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i64())
            .ok_or(AmountError::Overflow)?;

        Ok(Self { cents })
    }

    /// Creates an amount directly from a count of minor units
    pub fn from_cents(cents: i64) -> Result<Self, AmountError> {
        if cents < 0 {
            return Err(AmountError::Negative);
        }

        Ok(Self { cents })
    }

    /// The zero amount
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount as minor units
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the amount as a decimal in major units
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.cents, 2)
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Adds another amount; saturates at the representable maximum
    pub fn add(&self, other: Amount) -> Amount {
        Amount {
            cents: self.cents.saturating_add(other.cents),
        }
    }

    /// Subtracts another amount, failing if the result would go negative
    pub fn checked_sub(&self, other: Amount) -> Result<Amount, AmountError> {
        if self.cents < other.cents {
            return Err(AmountError::Insufficient {
                minuend: self.cents,
                subtrahend: other.cents,
            });
        }

        Ok(Amount {
            cents: self.cents - other.cents,
        })
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Self::from_cents(cents)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> i64 {
        amount.cents
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_from_decimal() {
        let a = Amount::new(dec!(100.50)).unwrap();
        assert_eq!(a.cents(), 10050);
        assert_eq!(a.as_decimal(), dec!(100.50));
    }

    #[test]
    fn test_amount_rounds_to_two_places() {
        let a = Amount::new(dec!(10.005)).unwrap();
        assert_eq!(a.cents(), 1001);

        let b = Amount::new(dec!(10.004)).unwrap();
        assert_eq!(b.cents(), 1000);
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert_eq!(Amount::new(dec!(-0.01)), Err(AmountError::Negative));
        assert_eq!(Amount::from_cents(-1), Err(AmountError::Negative));
    }

    #[test]
    fn test_overflow_rejected() {
        let huge = Decimal::from(i64::MAX);
        assert_eq!(Amount::new(huge), Err(AmountError::Overflow));
    }

    #[test]
    fn test_zero_is_distinguished() {
        assert!(Amount::zero().is_zero());
        assert!(!Amount::from_cents(1).unwrap().is_zero());
    }

    #[test]
    fn test_subtraction_below_zero_fails() {
        let a = Amount::from_cents(100).unwrap();
        let b = Amount::from_cents(150).unwrap();
        assert!(matches!(
            a.checked_sub(b),
            Err(AmountError::Insufficient { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_cents(10050).unwrap().to_string(), "100.50");
        assert_eq!(Amount::from_cents(5).unwrap().to_string(), "0.05");
    }
}
