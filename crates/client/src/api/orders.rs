//! Order listings.

use bazaar_core::Order;
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError, ItemsEnvelope};

impl ApiClient {
    /// Most recent orders visible to the signed-in staff account or seller.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn recent_orders(&self, limit: u32) -> Result<Vec<Order>, ApiError> {
        let request = self
            .request(Method::GET, "/api/orders")
            .await?
            .query(&[("limit", limit)]);
        let envelope: ItemsEnvelope<Order> = self.send_json(request).await?;
        Ok(envelope.items)
    }

    /// Orders placed by the signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn customer_orders(&self) -> Result<Vec<Order>, ApiError> {
        let envelope: ItemsEnvelope<Order> = self.get_json("/api/customer/orders").await?;
        Ok(envelope.items)
    }
}
