//! Customer account profile.

use bazaar_core::User;
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{ApiClient, ApiError, UserEnvelope};

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountUpdate {
    pub name: String,
    pub phone: String,
}

impl AccountUpdate {
    /// Prefill from the current account.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
        }
    }
}

impl ApiClient {
    /// The signed-in customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn account(&self) -> Result<User, ApiError> {
        let envelope: UserEnvelope<User> = self.get_json("/api/customer/account").await?;
        Ok(envelope.user)
    }

    /// Save the signed-in customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, update))]
    pub async fn update_account(&self, update: &AccountUpdate) -> Result<(), ApiError> {
        let request = self
            .request(Method::PATCH, "/api/customer/account")
            .await?
            .json(update);
        self.send_empty(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_user_fills_blanks() {
        let user: User = serde_json::from_value(json!({"_id": "u1", "name": "Ann"})).unwrap();
        let update = AccountUpdate::from_user(&user);
        assert_eq!(update.name, "Ann");
        assert_eq!(update.phone, "");
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"name": "Ann", "phone": ""})
        );
    }
}
