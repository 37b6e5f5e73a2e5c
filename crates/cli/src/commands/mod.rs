//! Command implementations.
//!
//! Every command runs against a [`Context`]: the restored session, the local
//! store and the helpers layered on top of them.

pub mod account;
pub mod admin;
pub mod auth;
pub mod catalog;
pub mod lists;
pub mod prefs;

use std::sync::Arc;

use bazaar_client::{
    ApiClient, ApiError, ClientConfig, ConfigError, FileStore, ListStore, Notices, QueryCache,
    Session, SessionError, SharedStore, StorageError, UploadError,
};
use bazaar_core::ValidationErrors;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command needs a signed-in account.
    #[error("Not signed in. Run `bazaar login` first")]
    NotSignedIn,

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Short message for the user, with `fallback` for opaque failures.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(e) => e.user_message(fallback),
            Self::Session(e) => e.user_message(fallback),
            Self::Storage(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Everything a command needs.
#[derive(Debug)]
pub struct Context {
    pub config: ClientConfig,
    pub store: SharedStore,
    pub session: Session,
    pub lists: ListStore,
    pub cache: QueryCache,
    pub notices: Notices,
}

impl Context {
    /// Open the local store and restore the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the HTTP client
    /// cannot be built.
    pub async fn load(config: ClientConfig) -> Result<Self, CliError> {
        let store: SharedStore = Arc::new(FileStore::open(&config.storage)?);
        let api = ApiClient::new(&config.api)?;
        let session = Session::restore(api, store.clone()).await;
        debug!(state = ?session.state(), "Context ready");

        Ok(Self {
            lists: ListStore::new(store.clone()),
            store,
            session,
            cache: QueryCache::default(),
            notices: Notices::default(),
            config,
        })
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        self.session.api()
    }

    /// Fail unless someone is signed in.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotSignedIn`] for guests.
    pub fn require_user(&self) -> Result<&bazaar_core::User, CliError> {
        self.session.user().ok_or(CliError::NotSignedIn)
    }
}

/// Print rows as aligned columns.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    println!("{}", render_row(headers.iter().copied(), &widths));
    for row in rows {
        println!("{}", render_row(row.iter().map(String::as_str), &widths));
    }
    if rows.is_empty() {
        println!("(none)");
    }
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_storage_errors() {
        let err = CliError::Storage(StorageError::QuotaExceeded {
            needed: 10,
            quota: 5,
        });
        assert_eq!(err.user_message("x"), "Storage is full, could not save");
        assert_eq!(
            CliError::NotSignedIn.user_message("x"),
            "Not signed in. Run `bazaar login` first"
        );
    }

    #[test]
    fn test_render_row_pads_columns() {
        let row = render_row(["id", "title"].into_iter(), &[4, 5]);
        assert_eq!(row, "id    title");
    }
}
