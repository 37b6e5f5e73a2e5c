//! Synchronous string key-value storage.
//!
//! [`KeyValueStore`] is the local persistence boundary: the session token,
//! theme preference and every cart/wishlist live behind it. Two backends
//! ship with the crate:
//!
//! - [`MemoryStore`] - process-local, for tests and ephemeral sessions
//! - [`FileStore`] - a JSON file that survives restarts
//!
//! Calls complete before returning, so a caller never observes a partial
//! write. Separate processes sharing one file follow last-write-wins.

mod file;
mod memory;

use std::sync::Arc;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Well-known keys outside the list namespaces.
pub mod keys {
    /// Raw bearer token of the signed-in account.
    pub const TOKEN: &str = "token";

    /// Colour theme preference (`dark` or `light`).
    pub const THEME: &str = "theme";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend cannot be used at all (disabled, unreadable, poisoned).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The write would exceed the backend's size limit.
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Size the store would have after the write.
        needed: usize,
        /// Configured limit.
        quota: usize,
    },

    /// Filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a valid store.
    #[error("storage file is corrupt: {0}")]
    Corrupt(String),
}

impl StorageError {
    /// Short message suitable for a transient notice.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => "Storage is full, could not save",
            _ => "Could not save, storage is unavailable",
        }
    }
}

/// String key-value storage with browser `localStorage` semantics.
///
/// All methods take `&self`; implementations use interior mutability.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read a value. Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written or is full.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to a store, used by the session and list store alike.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Total size a map of entries occupies against a quota.
pub(crate) fn stored_size<'a, I>(entries: I) -> usize
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    entries.into_iter().map(|(k, v)| k.len() + v.len()).sum()
}
