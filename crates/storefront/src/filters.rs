//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;

use quitanda_core::Price;

/// Formats a decimal amount as Brazilian currency.
///
/// Usage in templates: `{{ cart.total|brl }}` renders `R$ 59,00`.
#[askama::filter_fn]
pub fn brl(amount: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_brl(&amount.to_string()))
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Render a raw amount as BRL, passing non-numeric input through untouched.
fn format_brl(raw: &str) -> String {
    Decimal::from_str(raw).map_or_else(
        |_| format!("R$ {raw}"),
        |amount| Price::brl(amount).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_brl_formats_with_comma() {
        assert_eq!(format_brl(&Decimal::new(5900, 2).to_string()), "R$ 59,00");
    }

    #[test]
    fn test_brl_pads_whole_amounts() {
        assert_eq!(format_brl("12"), "R$ 12,00");
    }

    #[test]
    fn test_brl_rounds_to_two_places() {
        assert_eq!(format_brl("12.346"), "R$ 12,35");
    }

    #[test]
    fn test_brl_passes_through_non_numeric() {
        assert_eq!(format_brl("gratis"), "R$ gratis");
    }
}
