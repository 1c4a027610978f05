//! Type-safe price representation using decimal arithmetic.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// The amount is kept in the currency's standard unit (e.g. reais, not
/// centavos) and converted to minor units only at the payment-processor
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price from a minor-unit amount (e.g. 499 centavos).
    #[must_use]
    pub fn from_minor_units(minor: i64, currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::new(minor, 2),
            currency_code,
        }
    }

    /// The amount in minor units (centavos/cents), rounded half away from
    /// zero like the processor expects.
    ///
    /// Returns `None` if the amount does not fit in an `i64` after scaling.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        (self.amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }

    /// Format for display (e.g. "R$9.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
}

impl CurrencyCode {
    /// The uppercase ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BRL => "BRL",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }

    /// The display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }
}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units() {
        let price = Price::new(Decimal::new(999, 2), CurrencyCode::BRL);
        assert_eq!(price.minor_units(), Some(999));
    }

    #[test]
    fn test_minor_units_rounds_half_up() {
        // 4.995 * 100 = 499.5, which must round away from zero
        let price = Price::new(Decimal::new(4995, 3), CurrencyCode::BRL);
        assert_eq!(price.minor_units(), Some(500));
    }

    #[test]
    fn test_from_minor_units_round_trip() {
        let price = Price::from_minor_units(499, CurrencyCode::BRL);
        assert_eq!(price.amount, Decimal::new(499, 2));
        assert_eq!(price.minor_units(), Some(499));
    }

    #[test]
    fn test_display() {
        let price = Price::from_minor_units(499, CurrencyCode::BRL);
        assert_eq!(price.display(), "R$4.99");
    }
}
