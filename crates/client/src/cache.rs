//! Response cache keyed by hierarchical query keys.
//!
//! Reads go through [`QueryCache::get_or_fetch`]; writes that change server
//! state call [`QueryCache::invalidate_prefix`] so that every cached read
//! under the affected key is fetched again next time.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

const DEFAULT_CAPACITY: u64 = 1000;
const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Ordered key segments, e.g. `["superadmin", "settings"]`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Copy with one more segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether `prefix` is this key or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for QueryKey {
    fn from(segments: [S; N]) -> Self {
        Self::new(segments)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Shared cache of JSON-serializable responses.
///
/// Cheap to clone; clones share entries.
#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<QueryKey, Value>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl QueryCache {
    #[must_use]
    pub fn new(max_capacity: u64, time_to_live: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(time_to_live)
            .support_invalidation_closures()
            .build();
        Self { entries }
    }

    /// Cached value for `key`, or the result of `fetch`, which is then
    /// cached. Errors are returned as-is and not cached.
    ///
    /// # Errors
    ///
    /// Returns whatever `fetch` returns on failure.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.entries.get(&key).await {
            match serde_json::from_value(cached) {
                Ok(value) => {
                    debug!(key = %key, "Query cache hit");
                    return Ok(value);
                }
                Err(e) => warn!(key = %key, error = %e, "Cached value has the wrong shape"),
            }
        }

        let value = fetch().await?;
        match serde_json::to_value(&value) {
            Ok(json) => self.entries.insert(key, json).await,
            Err(e) => warn!(key = %key, error = %e, "Value not cached"),
        }
        Ok(value)
    }

    /// Drop one entry.
    pub async fn invalidate(&self, key: &QueryKey) {
        self.entries.invalidate(key).await;
    }

    /// Drop every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &QueryKey) {
        let owned = prefix.clone();
        if let Err(e) = self
            .entries
            .invalidate_entries_if(move |key, _| key.starts_with(&owned))
        {
            warn!(prefix = %prefix, error = %e, "Prefix invalidation failed, clearing cache");
            self.entries.invalidate_all();
        } else {
            debug!(prefix = %prefix, "Query cache invalidated");
        }
    }

    /// Drop everything, e.g. when the signed-in account changes.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}
