//! Currency Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places used when no currency row is available
pub const DEFAULT_DECIMAL_PLACES: u32 = 2;

/// Currency row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// ISO code, e.g. "EUR"
    pub code: String,
    /// Exchange rate relative to the store's base currency
    pub rate: Decimal,
    pub decimal_places: u32,
}

impl CurrencyInfo {
    pub fn new(code: impl Into<String>, rate: Decimal, decimal_places: u32) -> Self {
        Self {
            code: code.into(),
            rate,
            decimal_places,
        }
    }

    /// Identity conversion (rate 1, two decimals)
    pub fn base(code: impl Into<String>) -> Self {
        Self::new(code, Decimal::ONE, DEFAULT_DECIMAL_PLACES)
    }
}
