//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
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

    /// Create a price in the platform's default currency (BRL).
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::BRL)
    }
}

impl fmt::Display for Price {
    /// Format for display, e.g. `R$ 19,99`.
    ///
    /// Brazilian convention: symbol, space, comma as decimal separator.
    /// Amounts with more decimal places are rounded, not truncated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = format!("{:.2}", self.amount.round_dp(2)).replace('.', ",");
        write!(f, "{} {formatted}", self.currency_code.symbol())
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
    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BRL => "BRL",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_brl_display_uses_comma() {
        let price = Price::brl(Decimal::new(1999, 2));
        assert_eq!(price.to_string(), "R$ 19,99");
    }

    #[test]
    fn test_display_pads_to_two_places() {
        let price = Price::brl(Decimal::new(5, 0));
        assert_eq!(price.to_string(), "R$ 5,00");
    }

    #[test]
    fn test_display_rounds_extra_places() {
        // Backend prices arrive as floats, so three-place amounts happen.
        let price = Price::brl(Decimal::new(12_346, 3));
        assert_eq!(price.to_string(), "R$ 12,35");
    }

    #[test]
    fn test_currency_code_symbols() {
        assert_eq!(CurrencyCode::BRL.symbol(), "R$");
        assert_eq!(CurrencyCode::USD.symbol(), "$");
        assert_eq!(CurrencyCode::BRL.code(), "BRL");
    }
}
