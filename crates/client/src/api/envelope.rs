//! Response envelopes used by the backend.

use serde::Deserialize;

/// `{ "item": ... }`
#[derive(Debug, Deserialize)]
pub struct ItemEnvelope<T> {
    pub item: T,
}

/// `{ "items": [...] }`; a missing array reads as empty.
#[derive(Debug, Deserialize)]
pub struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// `{ "user": ... }`
#[derive(Debug, Deserialize)]
pub struct UserEnvelope<T> {
    pub user: T,
}

/// `{ "message": ... }` as sent with error responses.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

/// Nested error shape (`{"error": {"message": ...}}` or `{"error": "..."}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Text(String),
    Object {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Best human-readable message in an error body, if any.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let parsed: MessageBody = serde_json::from_str(body).ok()?;
    let nested = match parsed.error {
        Some(ErrorDetail::Text(text)) => Some(text),
        Some(ErrorDetail::Object { message }) => message,
        None => None,
    };
    parsed
        .message
        .or(nested)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_shapes() {
        assert_eq!(
            server_message(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            server_message(r#"{"error":{"message":"Invalid API v1 key."}}"#).as_deref(),
            Some("Invalid API v1 key.")
        );
        assert_eq!(server_message(r#"{"error":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(server_message(r#"{"message":"  "}"#), None);
        assert_eq!(server_message("<html>502</html>"), None);
    }

    #[test]
    fn test_items_default_empty() {
        let envelope: ItemsEnvelope<u32> = serde_json::from_str("{}").unwrap_or(ItemsEnvelope {
            items: vec![1],
        });
        assert!(envelope.items.is_empty());
    }
}
