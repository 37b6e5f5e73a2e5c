//! Identity namespaces for locally persisted lists.
//!
//! Cart and wishlist contents are stored per identity under
//! `<kind>_<identityId>`. The identity ID is the first present, non-empty
//! value of `id`, `_id`, `email`, `username`; visitors without one share the
//! `guest` namespace.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Namespace used when no identity can be resolved.
pub const GUEST_NAMESPACE: &str = "guest";

/// Which local list a key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Items with quantities.
    Cart,
    /// Presence-only bookmarks.
    Wishlist,
}

impl ListKind {
    /// Storage key prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Wishlist => "wishlist",
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identifying fields of a signed-in account.
///
/// Deserializes straight from the backend's user object; unrelated fields are
/// ignored. Numeric IDs are accepted and kept in their decimal form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Identity {
    /// Identity known only by email.
    #[must_use]
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Identity known by its account ID.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// The stable identifier used for namespacing, if any field is usable.
    #[must_use]
    pub fn stable_id(&self) -> Option<&str> {
        [&self.id, &self.document_id, &self.email, &self.username]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }
}

/// Storage key for `kind` under `identity`.
///
/// Pure function of its inputs.
///
/// ```
/// use bazaar_core::{Identity, ListKind, namespace_key};
///
/// assert_eq!(namespace_key(None, ListKind::Wishlist), "wishlist_guest");
/// let shopper = Identity::with_email("a@x.com");
/// assert_eq!(namespace_key(Some(&shopper), ListKind::Cart), "cart_a@x.com");
/// ```
#[must_use]
pub fn namespace_key(identity: Option<&Identity>, kind: ListKind) -> String {
    let id = identity
        .and_then(Identity::stable_id)
        .unwrap_or(GUEST_NAMESPACE);
    format!("{}_{id}", kind.as_str())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_guest_namespace() {
        assert_eq!(namespace_key(None, ListKind::Cart), "cart_guest");
        assert_eq!(
            namespace_key(Some(&Identity::default()), ListKind::Wishlist),
            "wishlist_guest"
        );
    }

    #[test]
    fn test_preference_order() {
        let identity = Identity {
            id: Some("u1".into()),
            document_id: Some("doc".into()),
            email: Some("a@x.com".into()),
            username: Some("alice".into()),
        };
        assert_eq!(namespace_key(Some(&identity), ListKind::Cart), "cart_u1");

        let identity = Identity {
            id: None,
            ..identity
        };
        assert_eq!(namespace_key(Some(&identity), ListKind::Cart), "cart_doc");
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let identity = Identity {
            id: Some(String::new()),
            document_id: Some(String::new()),
            email: None,
            username: Some("alice".into()),
        };
        assert_eq!(namespace_key(Some(&identity), ListKind::Cart), "cart_alice");
    }

    #[test]
    fn test_email_only_identity() {
        let identity: Identity = serde_json::from_value(json!({"email": "a@x.com"})).unwrap();
        assert_eq!(namespace_key(Some(&identity), ListKind::Cart), "cart_a@x.com");
    }

    #[test]
    fn test_distinct_identities_get_distinct_keys() {
        let a = Identity::with_id("a");
        let b = Identity::with_id("b");
        assert_ne!(
            namespace_key(Some(&a), ListKind::Cart),
            namespace_key(Some(&b), ListKind::Cart)
        );
    }

    #[test]
    fn test_deserialize_backend_user() {
        let identity: Identity = serde_json::from_value(json!({
            "_id": "65f1c0ffee",
            "name": "Alice",
            "role": "CUSTOMER",
            "email": "alice@example.com"
        }))
        .unwrap();
        assert_eq!(identity.stable_id(), Some("65f1c0ffee"));
    }

    #[test]
    fn test_numeric_id() {
        let identity: Identity = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(identity.stable_id(), Some("42"));
    }
}
