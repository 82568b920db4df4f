//! Price conversion
//!
//! Converts raw store prices into the requested currency, optionally
//! including tax. Uses rust_decimal for the arithmetic and renders the
//! fixed-point text the feed expects.

use regex::Regex;
use rust_decimal::prelude::*;
use shared::CurrencyInfo;
use std::sync::LazyLock;

/// Precision ceiling supported by `Decimal`
const MAX_DECIMAL_PLACES: u32 = 28;

/// Leading numeric part of a raw amount ("12.50 EUR" -> "12.50")
static AMOUNT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("valid regex")
});

/// Parse a raw amount, degrading to zero when nothing numeric leads the text
pub fn parse_amount(raw: &str) -> Decimal {
    let Some(found) = AMOUNT_PREFIX.find(raw.trim()) else {
        return Decimal::ZERO;
    };
    let text = found.as_str();

    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str(text.strip_suffix('.').unwrap_or(text))
    };
    parsed.unwrap_or_default()
}

/// Currency rate and tax settings for one feed run
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    currency: CurrencyInfo,
    include_tax: bool,
}

impl CurrencyConverter {
    pub fn new(currency: CurrencyInfo, include_tax: bool) -> Self {
        Self {
            currency,
            include_tax,
        }
    }

    pub fn currency(&self) -> &CurrencyInfo {
        &self.currency
    }

    fn decimal_places(&self) -> u32 {
        self.currency.decimal_places.min(MAX_DECIMAL_PLACES)
    }

    /// Convert parsed amounts
    ///
    /// Returns `None` when the rounded result is not positive, or when the
    /// arithmetic overflows.
    pub fn convert(&self, price: Decimal, tax_rate: Decimal) -> Option<Decimal> {
        let mut amount = price;
        if self.include_tax {
            let multiplier = Decimal::ONE.checked_add(tax_rate / Decimal::ONE_HUNDRED)?;
            amount = amount.checked_mul(multiplier)?;
        }
        amount = amount.checked_mul(self.currency.rate)?;

        let places = self.decimal_places();
        let mut rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
        if rounded <= Decimal::ZERO {
            return None;
        }
        rounded.rescale(places);
        Some(rounded)
    }

    /// Price column text for raw store values; `None` renders as an empty field
    pub fn price(&self, raw_price: Option<&str>, raw_tax_rate: Option<&str>) -> Option<String> {
        let price = raw_price.map(parse_amount).unwrap_or_default();
        let tax_rate = raw_tax_rate.map(parse_amount).unwrap_or_default();
        self.convert(price, tax_rate).map(|amount| amount.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn eur() -> CurrencyInfo {
        CurrencyInfo::base("EUR")
    }

    #[test]
    fn test_final_price_includes_tax() {
        let converter = CurrencyConverter::new(eur(), true);
        assert_eq!(converter.price(Some("100"), Some("21")), Some("121.00".to_string()));
    }

    #[test]
    fn test_price_without_tax() {
        let converter = CurrencyConverter::new(eur(), false);
        assert_eq!(converter.price(Some("100"), Some("21")), Some("100.00".to_string()));
    }

    #[test]
    fn test_rate_and_precision() {
        let usd = CurrencyInfo::new("USD", Decimal::new(11, 1), 2);
        let converter = CurrencyConverter::new(usd, false);
        assert_eq!(converter.price(Some("19.99"), None), Some("21.99".to_string()));

        let jpy = CurrencyInfo::new("JPY", Decimal::new(160, 0), 0);
        let converter = CurrencyConverter::new(jpy, false);
        assert_eq!(converter.price(Some("10.5"), None), Some("1680".to_string()));
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        let converter = CurrencyConverter::new(eur(), false);
        assert_eq!(converter.price(Some("0.125"), None), Some("0.13".to_string()));
    }

    #[test]
    fn test_absent_prices() {
        let converter = CurrencyConverter::new(eur(), true);
        assert_eq!(converter.price(None, Some("21")), None);
        assert_eq!(converter.price(Some("0"), Some("21")), None);
        assert_eq!(converter.price(Some("0.0000"), None), None);
        assert_eq!(converter.price(Some("-5"), None), None);
        assert_eq!(converter.price(Some("n/a"), None), None);
        assert_eq!(converter.price(Some("0.001"), None), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50 EUR"), Decimal::new(1250, 2));
        assert_eq!(parse_amount(" 7. "), Decimal::new(7, 0));
        assert_eq!(parse_amount(".5"), Decimal::new(5, 1));
        assert_eq!(parse_amount("1e2"), Decimal::new(100, 0));
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_is_absent() {
        let huge = CurrencyInfo::new("XXX", Decimal::MAX, 2);
        let converter = CurrencyConverter::new(huge, false);
        assert_eq!(converter.price(Some("1000"), None), None);
    }

    #[test]
    fn test_monotonic_in_rate_and_tax() {
        let price = Decimal::new(4999, 2);
        let mut last = Decimal::ZERO;
        for step in 0..50 {
            let rate = Decimal::new(step * 7, 2);
            let converter = CurrencyConverter::new(CurrencyInfo::new("X", rate, 2), true);
            let value = converter.convert(price, Decimal::new(21, 0)).unwrap_or_default();
            assert!(value >= last);
            last = value;
        }

        let converter = CurrencyConverter::new(eur(), true);
        let mut last = Decimal::ZERO;
        for tax in 0..60 {
            let value = converter.convert(price, Decimal::new(tax, 0)).unwrap_or_default();
            assert!(value >= last);
            last = value;
        }
    }
}
