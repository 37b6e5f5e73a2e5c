//! Marketplace REST API client.
//!
//! [`ApiClient`] owns the HTTP connection pool, the base URL and the bearer
//! token of the signed-in account. Every request goes through
//! [`ApiClient::request`], which attaches `Authorization: Bearer <token>`
//! whenever a token is held, and is completed by one of the `send_*`
//! helpers, which map non-2xx responses to [`ApiError`].
//!
//! Endpoint groups live in their own files as further `impl ApiClient`
//! blocks.

mod account;
mod analytics;
mod auth;
mod catalog;
mod envelope;
mod error;
mod orders;
mod reports;
mod superadmin;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ApiConfig;

pub use account::AccountUpdate;
pub use analytics::AnalyticsSummary;
pub use auth::{AuthResponse, Credentials, ForgotPasswordResponse, SignupRequest};
pub use catalog::{ImageFile, ManageQuery, ProductQuery, MAX_PAGE_SIZE};
pub use envelope::{ItemEnvelope, ItemsEnvelope, UserEnvelope};
pub use error::ApiError;
pub use reports::Report;
pub use superadmin::{NewAdmin, UserQuery};

/// Longest slice of a response body that goes into a log line.
const LOG_BODY_LIMIT: usize = 500;

/// Client for the marketplace backend.
///
/// Cheap to clone; clones share the connection pool and the token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<SecretString>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bazaar-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                token: RwLock::new(None),
            }),
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Attach `token` to every following request.
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Stop attaching a token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a token is currently attached.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Absolute URL of an API path such as `/api/products`.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is not a valid URL.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{path}", self.inner.base_url))?)
    }

    // =========================================================================
    // Request execution
    // =========================================================================

    /// Start a request, with the bearer token when one is held.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not form a valid URL.
    pub async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        let builder = self.inner.client.request(method, url);
        let token = self.inner.token.read().await;
        Ok(match token.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    /// Send and check the status, returning the successful response.
    async fn send_checked(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            debug!(status = %status, url = %response.url(), "API request succeeded");
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            warn!(retry_after, "API rate limited");
            return Err(ApiError::RateLimited(retry_after));
        }

        let url = response.url().clone();
        // Body read failures should not mask the status.
        let body = response.text().await.unwrap_or_default();
        let message = envelope::server_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

        warn!(
            status = %status,
            url = %url,
            body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
            "API returned non-success status"
        );

        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Send and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send_checked(request).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            error!(
                error = %e,
                body = %text.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send and discard the body.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send_checked(request).await?;
        Ok(())
    }

    /// Send and return the raw body.
    async fn send_bytes(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = self.send_checked(request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// `GET path` decoded as JSON.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path).await?;
        self.send_json(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base.to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_paths() {
        let api = client("https://api.example.com/");
        assert_eq!(api.base_url(), "https://api.example.com");
        assert_eq!(
            api.url("/api/products").unwrap().as_str(),
            "https://api.example.com/api/products"
        );
        assert_eq!(
            api.url("api/me").unwrap().as_str(),
            "https://api.example.com/api/me"
        );
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let api = client("https://api.example.com");
        assert!(!api.has_token().await);
        api.set_token(SecretString::from("t0k3n")).await;
        assert!(api.has_token().await);

        let request = api
            .request(Method::GET, "/api/me")
            .await
            .unwrap()
            .build()
            .unwrap();
        let header = request.headers().get(reqwest::header::AUTHORIZATION).unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer t0k3n");

        api.clear_token().await;
        let request = api
            .request(Method::GET, "/api/me")
            .await
            .unwrap()
            .build()
            .unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_clones_share_token() {
        let api = client("https://api.example.com");
        let clone = api.clone();
        api.set_token(SecretString::from("shared")).await;
        assert!(clone.has_token().await);
    }

    #[test]
    fn test_debug_hides_token() {
        let api = client("https://api.example.com");
        let debug = format!("{api:?}");
        assert!(debug.contains("api.example.com"));
        assert!(!debug.contains("token"));
    }
}
