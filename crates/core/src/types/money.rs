//! Decimal money amounts.
//!
//! Prices are stored as `NUMERIC(9,2)` and handled as [`Decimal`] so totals
//! never pick up binary floating-point error. The payment gateway wants
//! integer minor units (cents), which [`Money::to_minor_units`] produces.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes the shop can charge in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCode {
    #[default]
    Usd,
    Eur,
    Gbp,
    Rub,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Rub => "₽",
        }
    }

    /// Lowercase code as the payment gateway expects it (`"usd"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Eur => "eur",
            Self::Gbp => "gbp",
            Self::Rub => "rub",
        }
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usd" => Ok(Self::Usd),
            "eur" => Ok(Self::Eur),
            "gbp" => Ok(Self::Gbp),
            "rub" => Ok(Self::Rub),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

/// An amount of money in a given currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (dollars, not cents).
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Amount in minor units (cents), rounded half away from zero.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        (self.amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{}{rounded:.2}", self.currency.symbol())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_minor_units() {
        let money = Money::new(Decimal::from_str("12.34").unwrap(), CurrencyCode::Usd);
        assert_eq!(money.to_minor_units(), Some(1234));
    }

    #[test]
    fn test_minor_units_rounds_half_away_from_zero() {
        let money = Money::new(Decimal::from_str("0.005").unwrap(), CurrencyCode::Usd);
        assert_eq!(money.to_minor_units(), Some(1));
    }

    #[test]
    fn test_display_pads_to_two_places() {
        let money = Money::new(Decimal::from(5), CurrencyCode::Usd);
        assert_eq!(money.to_string(), "$5.00");

        let money = Money::new(Decimal::from_str("19.9").unwrap(), CurrencyCode::Eur);
        assert_eq!(money.to_string(), "€19.90");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(CurrencyCode::from_str("USD"), Ok(CurrencyCode::Usd));
        assert_eq!(CurrencyCode::from_str(" rub "), Ok(CurrencyCode::Rub));
        assert!(CurrencyCode::from_str("doge").is_err());
    }

    #[test]
    fn test_is_positive() {
        assert!(!Money::new(Decimal::ZERO, CurrencyCode::Usd).is_positive());
        assert!(Money::new(Decimal::ONE, CurrencyCode::Usd).is_positive());
    }
}
