//! Errors from the marketplace REST API.

use thiserror::Error;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// The request path could not be turned into a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// 401: missing, expired or rejected token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403: signed in, but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404: resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 429: rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Response status code.
        status: u16,
        /// Server-provided message, or the status reason.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A successful response lacked a required field.
    #[error("Response missing field: {0}")]
    MissingField(&'static str),
}

impl ApiError {
    /// HTTP status, when the failure came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::RateLimited(_) => Some(429),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short message for a transient notice.
    ///
    /// Server-provided messages are shown as-is; transport and parsing
    /// details are not.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Status { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            Self::RateLimited(secs) => format!("Too many requests, try again in {secs}s"),
            Self::Request(_) => "Network error, please try again".to_string(),
            _ => fallback.to_string(),
        }
    }
}
