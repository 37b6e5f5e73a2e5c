//! Order records as listed on dashboards and the customer orders page.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::OrderId;

/// An order summary.
///
/// Only the fields the client renders are typed; everything else the backend
/// sends is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub grand_total: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Grand total rounded to whole units, as shown in order tables.
    #[must_use]
    pub fn rounded_total(&self) -> Decimal {
        self.grand_total.round()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_from_backend() {
        let order: Order = serde_json::from_value(json!({
            "_id": "6600aa00bb11cc22dd33ee44",
            "status": "PLACED",
            "grandTotal": 1249.6,
            "createdAt": "2026-03-01T10:00:00.000Z",
            "items": [{"product": "p1", "qty": 2}]
        }))
        .unwrap();
        assert_eq!(order.id.short(), "dd33ee44");
        assert_eq!(order.rounded_total(), Decimal::new(1250, 0));
        assert!(order.created_at.is_some());
        assert!(order.extra.contains_key("items"));
    }
}
