//! Decimal money helpers.
//!
//! The backend sends prices as JSON numbers (sometimes as strings). They are
//! read into [`Decimal`] so cart totals do not accumulate float error.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Currency shown when a product does not carry one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A price with its currency code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code as sent by the backend.
    pub currency: String,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Format for display, e.g. `USD 19.99`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {:.2}", self.currency, self.amount.round_dp(2))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Read a decimal from a JSON number or numeric string.
///
/// Returns `None` for anything else (null, objects, unparsable strings).
#[must_use]
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decimal_from_number() {
        assert_eq!(decimal_from_json(&json!(10)), Some(Decimal::new(10, 0)));
        assert_eq!(decimal_from_json(&json!(19.99)), Some(Decimal::new(1999, 2)));
    }

    #[test]
    fn test_decimal_from_string() {
        assert_eq!(decimal_from_json(&json!(" 4.50 ")), Some(Decimal::new(450, 2)));
        assert_eq!(decimal_from_json(&json!("free")), None);
    }

    #[test]
    fn test_decimal_from_other() {
        assert_eq!(decimal_from_json(&json!(null)), None);
        assert_eq!(decimal_from_json(&json!({"amount": 1})), None);
    }

    #[test]
    fn test_price_display() {
        let price = Price::new(Decimal::new(5, 0), DEFAULT_CURRENCY);
        assert_eq!(price.display(), "USD 5.00");
    }
}
