//! Dashboard analytics.
//!
//! Figures are passed through as JSON: their set of fields differs per area
//! and changes with the backend.

use bazaar_core::Role;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use super::{ApiClient, ApiError};

/// Headline figures and monthly series for one dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub kpis: Map<String, Value>,
    #[serde(default)]
    pub monthly: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalyticsSummary {
    /// A headline figure as a number, if present and numeric.
    #[must_use]
    pub fn kpi(&self, name: &str) -> Option<f64> {
        self.kpis.get(name).and_then(Value::as_f64)
    }
}

const fn summary_path(role: Role) -> Option<&'static str> {
    match role {
        Role::SuperAdmin => Some("/api/analytics/superadmin/summary"),
        Role::Admin => Some("/api/analytics/admin/summary"),
        Role::Seller => Some("/api/analytics/seller/summary"),
        Role::Customer => None,
    }
}

impl ApiClient {
    /// Dashboard summary for a staff or seller role.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for customers, who have no dashboard,
    /// or an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn analytics_summary(&self, role: Role) -> Result<AnalyticsSummary, ApiError> {
        let path = summary_path(role)
            .ok_or_else(|| ApiError::Forbidden("Customers have no dashboard".to_string()))?;
        self.get_json(path).await
    }

    /// Category revenue, top creators and top products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn advanced_analytics(&self, limit: u32) -> Result<Value, ApiError> {
        let request = self
            .request(reqwest::Method::GET, "/api/analytics/superadmin/advanced")
            .await?
            .query(&[("limit", limit)]);
        self.send_json(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_summary_paths() {
        assert_eq!(
            summary_path(Role::Seller),
            Some("/api/analytics/seller/summary")
        );
        assert_eq!(summary_path(Role::Customer), None);
    }

    #[test]
    fn test_summary_shape() {
        let summary: AnalyticsSummary = serde_json::from_value(json!({
            "kpis": {"totalRevenue": 1250.5, "totalOrders": 12},
            "monthly": [{"month": "2026-01", "revenue": 100}],
            "lowStock": []
        }))
        .unwrap();
        assert_eq!(summary.kpi("totalRevenue"), Some(1250.5));
        assert_eq!(summary.kpi("missing"), None);
        assert_eq!(summary.monthly.len(), 1);
        assert!(summary.extra.contains_key("lowStock"));
    }
}
