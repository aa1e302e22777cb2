//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::currency;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
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

    /// Create a price in the store currency.
    #[must_use]
    pub const fn store(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        let places = currency::DECIMAL_PLACES as usize;
        format!(
            "{}{:.places$}",
            self.currency_code.symbol(),
            self.amount.round_dp(currency::DECIMAL_PLACES)
        )
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => currency::SYMBOL,
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => currency::CODE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Price::store(Decimal::new(5, 0)).display(), "$5.00");
        assert_eq!(Price::store(Decimal::new(1999, 2)).display(), "$19.99");
    }

    #[test]
    fn test_display_rounds_extra_places() {
        assert_eq!(Price::store(Decimal::new(10_005, 3)).to_string(), "$10.00");
        assert_eq!(Price::store(Decimal::new(10_015, 3)).to_string(), "$10.02");
    }

    #[test]
    fn test_currency_code() {
        assert_eq!(CurrencyCode::default().code(), "USD");
        assert_eq!(CurrencyCode::USD.symbol(), "$");
    }
}
