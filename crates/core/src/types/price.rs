//! Type-safe price representation using decimal arithmetic.
//!
//! The Store API reports prices as JSON numbers. View models carry them as
//! strings, and this module turns those strings back into decimals for
//! display.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::navigation::UnknownValue;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., euros, not cents).
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

    /// Parse a decimal amount string such as `"19.99"` or `"20"`.
    ///
    /// Returns `None` for empty or non-numeric input.
    #[must_use]
    pub fn parse(amount: &str, currency_code: CurrencyCode) -> Option<Self> {
        Decimal::from_str(amount.trim())
            .ok()
            .map(|amount| Self::new(amount, currency_code))
    }

    /// Format for display (e.g., "€19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }

    /// Format an amount string for display, falling back to the raw amount
    /// when it cannot be parsed.
    #[must_use]
    pub fn format_amount(amount: &str, currency_code: &str) -> String {
        let code = currency_code.parse().unwrap_or_default();
        Self::parse(amount, code).map_or_else(
            || format!("{}{amount}", code.symbol()),
            |price| price.display(),
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EUR,
    USD,
    GBP,
    CHF,
}

impl CurrencyCode {
    /// Currency symbol used in formatted prices.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::EUR => "€",
            Self::USD => "$",
            Self::GBP => "£",
            Self::CHF => "CHF ",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EUR => "EUR",
            Self::USD => "USD",
            Self::GBP => "GBP",
            Self::CHF => "CHF",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Self::EUR),
            "USD" => Ok(Self::USD),
            "GBP" => Ok(Self::GBP),
            "CHF" => Ok(Self::CHF),
            _ => Err(UnknownValue::new("currency code", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let price = Price::parse("19.99", CurrencyCode::EUR);
        assert_eq!(price.map(|p| p.display()), Some("€19.99".to_string()));
    }

    #[test]
    fn test_display_pads_whole_amounts() {
        let price = Price::parse("20", CurrencyCode::USD);
        assert_eq!(price.map(|p| p.display()), Some("$20.00".to_string()));
    }

    #[test]
    fn test_display_rounds_to_cents() {
        let price = Price::parse("9.999", CurrencyCode::GBP);
        assert_eq!(price.map(|p| p.display()), Some("£10.00".to_string()));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Price::parse("", CurrencyCode::EUR).is_none());
        assert!(Price::parse("abc", CurrencyCode::EUR).is_none());
    }

    #[test]
    fn test_format_amount_falls_back_to_raw() {
        assert_eq!(Price::format_amount("12.5", "EUR"), "€12.50");
        assert_eq!(Price::format_amount("", "EUR"), "€");
        assert_eq!(Price::format_amount("n/a", "usd"), "$n/a");
    }

    #[test]
    fn test_currency_code_from_str() {
        assert_eq!("eur".parse::<CurrencyCode>().ok(), Some(CurrencyCode::EUR));
        assert_eq!(" CHF ".parse::<CurrencyCode>().ok(), Some(CurrencyCode::CHF));
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
