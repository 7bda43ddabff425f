use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A strictly positive monetary amount.
///
/// Direction (money in vs. money out) lives on the transaction, never in the
/// sign, so every extracted amount is stored as a positive decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Returns `None` for zero or negative values.
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Amount(value.normalize()))
        } else {
            None
        }
    }

    pub fn value(self) -> Decimal {
        self.0
    }

    /// Amounts closer than one cent are treated as the same figure.
    pub fn approx_eq(self, other: Amount) -> bool {
        (self.0 - other.0).abs() < Decimal::new(1, 2)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = String;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value).ok_or_else(|| format!("amount must be positive, got {value}"))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Amount(self.0 + rhs.0)
    }
}
