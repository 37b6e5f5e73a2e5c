//! Platform administration: staff accounts, moderation, users and settings.

use bazaar_core::{
    CommissionUpdate, MaintenanceUpdate, PlatformSettings, Product, ProductStatus, Role,
    SellerStatus, User,
};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};

use super::{ApiClient, ApiError, ItemEnvelope, ItemsEnvelope};

/// Default page size of the user directory.
const USER_LIST_LIMIT: u32 = 100;

/// Body of a new admin account.
#[derive(Clone, Copy, Serialize)]
pub struct NewAdmin<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for NewAdmin<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdmin")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Filters for the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    pub limit: u32,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            role: None,
            q: None,
            limit: USER_LIST_LIMIT,
        }
    }
}

#[derive(Serialize)]
struct StatusQuery<S> {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<S>,
}

fn resource(collection: &str, id: &str, action: &str) -> String {
    format!(
        "/api/superadmin/{collection}/{}/{action}",
        urlencoding::encode(id)
    )
}

impl ApiClient {
    // =========================================================================
    // Admin accounts
    // =========================================================================

    /// Every admin account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admins(&self) -> Result<Vec<User>, ApiError> {
        let envelope: ItemsEnvelope<User> = self.get_json("/api/superadmin/admins").await?;
        Ok(envelope.items)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the account.
    #[instrument(skip(self, admin), fields(username = %admin.username))]
    pub async fn create_admin(&self, admin: &NewAdmin<'_>) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/api/superadmin/admins")
            .await?
            .json(admin);
        self.send_empty(request).await?;
        info!(username = %admin.username, "Admin created");
        Ok(())
    }

    /// Enable or disable an admin account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn toggle_admin(&self, id: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::PATCH, &resource("admins", id, "toggle"))
            .await?;
        self.send_empty(request).await
    }

    // =========================================================================
    // Moderation
    // =========================================================================

    /// Seller accounts, optionally only those with `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn sellers(&self, status: Option<SellerStatus>) -> Result<Vec<User>, ApiError> {
        let request = self
            .request(Method::GET, "/api/superadmin/sellers")
            .await?
            .query(&StatusQuery { status });
        let envelope: ItemsEnvelope<User> = self.send_json(request).await?;
        Ok(envelope.items)
    }

    /// Approve, reject or suspend a seller.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn set_seller_status(&self, id: &str, status: SellerStatus) -> Result<(), ApiError> {
        let request = self
            .request(Method::PATCH, &resource("sellers", id, "status"))
            .await?
            .json(&json!({ "status": status }));
        self.send_empty(request).await?;
        info!(seller_id = %id, status = %status, "Seller status changed");
        Ok(())
    }

    /// Products awaiting or past moderation, optionally only those with `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn moderation_products(
        &self,
        status: Option<ProductStatus>,
    ) -> Result<Vec<Product>, ApiError> {
        let request = self
            .request(Method::GET, "/api/superadmin/products")
            .await?
            .query(&StatusQuery { status });
        let envelope: ItemsEnvelope<Product> = self.send_json(request).await?;
        Ok(envelope.items)
    }

    /// Move a product to another moderation status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn set_product_status(
        &self,
        id: &str,
        status: ProductStatus,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::PATCH, &resource("products", id, "status"))
            .await?
            .json(&json!({ "status": status }));
        self.send_empty(request).await?;
        info!(product_id = %id, status = %status, "Product status changed");
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// User directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn users(&self, query: &UserQuery) -> Result<Vec<User>, ApiError> {
        let request = self
            .request(Method::GET, "/api/superadmin/users")
            .await?
            .query(query);
        let envelope: ItemsEnvelope<User> = self.send_json(request).await?;
        Ok(envelope.items)
    }

    /// Enable or disable a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn toggle_user(&self, id: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::PATCH, &resource("users", id, "toggle"))
            .await?;
        self.send_empty(request).await
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn set_user_role(&self, id: &str, role: Role) -> Result<(), ApiError> {
        let request = self
            .request(Method::PATCH, &resource("users", id, "role"))
            .await?
            .json(&json!({ "role": role }));
        self.send_empty(request).await?;
        info!(user_id = %id, role = %role, "User role changed");
        Ok(())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Current platform settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn platform_settings(&self) -> Result<PlatformSettings, ApiError> {
        let envelope: ItemEnvelope<PlatformSettings> =
            self.get_json("/api/superadmin/settings").await?;
        Ok(envelope.item)
    }

    /// Set the platform commission, in percent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the value.
    #[instrument(skip(self))]
    pub async fn update_commission(
        &self,
        commission_pct: Decimal,
    ) -> Result<PlatformSettings, ApiError> {
        self.patch_settings(&CommissionUpdate { commission_pct })
            .await
    }

    /// Switch maintenance mode and its banner message.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update), fields(enabled = update.maintenance_enabled))]
    pub async fn update_maintenance(
        &self,
        update: &MaintenanceUpdate,
    ) -> Result<PlatformSettings, ApiError> {
        self.patch_settings(update).await
    }

    async fn patch_settings<B: Serialize + Sync>(
        &self,
        body: &B,
    ) -> Result<PlatformSettings, ApiError> {
        let request = self
            .request(Method::PATCH, "/api/superadmin/settings")
            .await?
            .json(body);
        let envelope: ItemEnvelope<PlatformSettings> = self.send_json(request).await?;
        info!("Platform settings updated");
        Ok(envelope.item)
    }
}
