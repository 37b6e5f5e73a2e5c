//! Account records returned by `/api/me`, login and the user admin pages.

use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::role::Role;
use super::status::SellerStatus;

/// A marketplace account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    /// Only set on seller accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_status: Option<SellerStatus>,
}

const fn default_role() -> Role {
    Role::Customer
}

impl User {
    /// Backend identifier (`_id`, else `id`), for building resource paths.
    #[must_use]
    pub fn account_id(&self) -> Option<&str> {
        self.identity
            .document_id
            .as_deref()
            .or(self.identity.id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// Name to show, falling back to username, then email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.identity.username.as_deref())
            .or(self.identity.email.as_deref())
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_from_backend() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Sam",
            "email": "sam@example.com",
            "role": "SELLER",
            "sellerStatus": "PENDING"
        }))
        .unwrap();
        assert_eq!(user.role, Role::Seller);
        assert_eq!(user.account_id(), Some("u1"));
        assert_eq!(user.identity.stable_id(), Some("u1"));
        assert_eq!(user.seller_status, Some(SellerStatus::Pending));
        assert!(!user.disabled);
    }

    #[test]
    fn test_missing_role_defaults_to_customer() {
        let user: User = serde_json::from_value(json!({"username": "kim"})).unwrap();
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.display_name(), "kim");
        assert_eq!(user.account_id(), None);
    }
}
