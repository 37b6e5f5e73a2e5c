//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BAZAAR_API_BASE_URL` - Marketplace backend (default: hosted backend)
//! - `BAZAAR_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `BAZAAR_STORAGE_PATH` - Local key-value store file (default: `.bazaar/storage.json`)
//! - `BAZAAR_STORAGE_QUOTA_BYTES` - Local store size limit (default: 5 MiB)
//! - `IMGBB_API_KEY` - Image hosting key for product photo uploads
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Backend used when `BAZAAR_API_BASE_URL` is not set.
pub const DEFAULT_API_BASE_URL: &str = "https://affiliate-backend-8gbe.onrender.com";

/// Browser-like local storage limit.
pub const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

const DEFAULT_STORAGE_PATH: &str = ".bazaar/storage.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Full client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Local key-value store settings
    pub storage: StorageConfig,
    /// ImgBB key for direct image uploads
    pub imgbb_api_key: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Settings for a given base URL with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not an absolute http(s) URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url("BAZAAR_API_BASE_URL", base_url)?,
            ..Self::default()
        })
    }
}

/// Local key-value store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// File holding every stored key
    pub path: PathBuf,
    /// Maximum total size of keys and values
    pub quota_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORAGE_PATH),
            quota_bytes: DEFAULT_STORAGE_QUOTA_BYTES,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = match get("BAZAAR_API_BASE_URL") {
            Some(raw) => normalize_base_url("BAZAAR_API_BASE_URL", &raw)?,
            None => DEFAULT_API_BASE_URL.to_string(),
        };
        let timeout_secs = parse_or_default(
            "BAZAAR_REQUEST_TIMEOUT_SECS",
            get("BAZAAR_REQUEST_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let quota_bytes = parse_or_default(
            "BAZAAR_STORAGE_QUOTA_BYTES",
            get("BAZAAR_STORAGE_QUOTA_BYTES"),
            DEFAULT_STORAGE_QUOTA_BYTES,
        )?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            storage: StorageConfig {
                path: get("BAZAAR_STORAGE_PATH")
                    .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from),
                quota_bytes,
            },
            imgbb_api_key: get("IMGBB_API_KEY")
                .map(|key| SecretString::from(key.trim().to_owned())),
            sentry_dsn: get("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate an http(s) base URL and strip its trailing slash.
fn normalize_base_url(var_name: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Parse an optional variable, falling back to a default when unset.
fn parse_or_default<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.storage, StorageConfig::default());
        assert!(config.imgbb_api_key.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let config = load(&[("BAZAAR_API_BASE_URL", "http://localhost:4000/")]).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:4000");
    }

    #[test]
    fn test_base_url_rejects_other_schemes() {
        let err = load(&[("BAZAAR_API_BASE_URL", "ftp://example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(var, _) if var == "BAZAAR_API_BASE_URL"));
        assert!(load(&[("BAZAAR_API_BASE_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_timeout_and_quota() {
        let config = load(&[
            ("BAZAAR_REQUEST_TIMEOUT_SECS", "5"),
            ("BAZAAR_STORAGE_QUOTA_BYTES", "1024"),
            ("BAZAAR_STORAGE_PATH", "/tmp/bazaar.json"),
        ])
        .unwrap();
        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(config.storage.quota_bytes, 1024);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/bazaar.json"));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(load(&[("BAZAAR_REQUEST_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("BAZAAR_REQUEST_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[("BAZAAR_STORAGE_QUOTA_BYTES", "-1")]).is_err());
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = load(&[("IMGBB_API_KEY", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert!(config.imgbb_api_key.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_imgbb_key_is_trimmed() {
        let config = load(&[("IMGBB_API_KEY", " k3y ")]).unwrap();
        assert_eq!(config.imgbb_api_key.unwrap().expose_secret(), "k3y");
    }
}
