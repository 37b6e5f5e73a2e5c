//! The signed-in account.
//!
//! A [`Session`] is built once per process from the local store and the API
//! client. It owns the token lifecycle: restoring it at startup, saving it
//! after a sign-in and tearing it down on logout. Everything that depends on
//! who is signed in (list namespaces, route decisions) reads from here.

use bazaar_core::{Identity, ListKind, Role, User, namespace_key};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError, AuthResponse, Credentials, SignupRequest};
use crate::storage::{SharedStore, StorageError, keys};

/// Errors from session transitions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("signed in, but the token could not be saved: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Short message for a transient notice.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(e) => e.user_message(fallback),
            Self::Storage(e) => e.user_message().to_string(),
        }
    }
}

/// Where the session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Stored token not checked yet.
    Restoring,
    /// No one signed in.
    Anonymous,
    /// Token accepted by the backend.
    SignedIn(User),
}

/// Token and account of the current user.
#[derive(Debug)]
pub struct Session {
    api: ApiClient,
    store: SharedStore,
    state: SessionState,
}

impl Session {
    /// A session that has not looked at the store yet.
    #[must_use]
    pub const fn new(api: ApiClient, store: SharedStore) -> Self {
        Self {
            api,
            store,
            state: SessionState::Restoring,
        }
    }

    /// Build a session and restore any stored token.
    pub async fn restore(api: ApiClient, store: SharedStore) -> Self {
        let mut session = Self::new(api, store);
        session.refresh().await;
        session
    }

    /// Re-check the stored token against `/api/me`.
    ///
    /// A token the backend does not accept is removed. Never fails: the
    /// worst outcome is an anonymous session.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) {
        let token = match self.store.get_item(keys::TOKEN) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                self.api.clear_token().await;
                self.state = SessionState::Anonymous;
                return;
            }
            Err(e) => {
                warn!(error = %e, "Could not read stored token");
                self.api.clear_token().await;
                self.state = SessionState::Anonymous;
                return;
            }
        };

        self.api.set_token(SecretString::from(token)).await;
        match self.api.me().await {
            Ok(user) => {
                info!(user = %user.display_name(), role = %user.role, "Session restored");
                self.state = SessionState::SignedIn(user);
            }
            Err(e) => {
                warn!(error = %e, "Stored token rejected, signing out");
                self.teardown().await;
            }
        }
    }

    /// Sign in with an email or username.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the credentials or the token
    /// cannot be stored. The session is unchanged on error.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, login: &str, password: &str) -> Result<User, SessionError> {
        let auth = self.api.login(&Credentials::new(login, password)).await?;
        self.accept(auth).await
    }

    /// Create a customer account and sign in.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created or the token cannot
    /// be stored.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let auth = self
            .api
            .signup(&SignupRequest {
                name,
                email,
                password,
            })
            .await?;
        self.accept(auth).await
    }

    /// Ask for a sign-up code. Does not change the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses to send the code.
    #[instrument(skip(self, password))]
    pub async fn request_signup_otp(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        self.api
            .request_signup_otp(&SignupRequest {
                name,
                email,
                password,
            })
            .await?;
        Ok(())
    }

    /// Confirm a sign-up code and sign in.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is rejected or the token cannot be
    /// stored.
    #[instrument(skip(self, code))]
    pub async fn verify_signup_otp(
        &mut self,
        email: &str,
        code: &str,
    ) -> Result<User, SessionError> {
        let auth = self.api.verify_signup_otp(email, code).await?;
        self.accept(auth).await
    }

    /// Sign out: forget the token locally and in the client.
    ///
    /// Lists stay in the store under their namespaces.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) {
        if let SessionState::SignedIn(user) = &self.state {
            info!(user = %user.display_name(), "Signing out");
        }
        self.teardown().await;
    }

    async fn accept(&mut self, auth: AuthResponse) -> Result<User, SessionError> {
        self.store
            .set_item(keys::TOKEN, auth.token.expose_secret())?;
        self.api.set_token(auth.token).await;
        info!(user = %auth.user.display_name(), role = %auth.user.role, "Signed in");
        self.state = SessionState::SignedIn(auth.user.clone());
        Ok(auth.user)
    }

    async fn teardown(&mut self) {
        if let Err(e) = self.store.remove_item(keys::TOKEN) {
            warn!(error = %e, "Could not remove stored token");
        }
        self.api.clear_token().await;
        self.state = SessionState::Anonymous;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether the stored token is still being checked.
    #[must_use]
    pub const fn is_restoring(&self) -> bool {
        matches!(self.state, SessionState::Restoring)
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    /// Identity used to namespace lists. `None` for guests.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.user().map(|user| &user.identity)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }

    /// Storage key of the current identity's list of `kind`.
    #[must_use]
    pub fn list_key(&self, kind: ListKind) -> String {
        namespace_key(self.identity(), kind)
    }

    /// API client carrying this session's token.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ApiConfig;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn offline_session(store: Arc<MemoryStore>) -> Session {
        // Port 9 (discard) on loopback: nothing answers, requests fail fast.
        let api = ApiClient::new(&ApiConfig::with_base_url("http://127.0.0.1:9").unwrap()).unwrap();
        Session::new(api, store)
    }

    #[test]
    fn test_new_session_is_restoring_guest() {
        let session = offline_session(Arc::new(MemoryStore::new()));
        assert!(session.is_restoring());
        assert_eq!(session.role(), None);
        assert_eq!(session.list_key(ListKind::Cart), "cart_guest");
    }

    #[tokio::test]
    async fn test_refresh_without_token_is_anonymous() {
        let mut session = offline_session(Arc::new(MemoryStore::new()));
        session.refresh().await;
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert!(!session.api().has_token().await);
    }

    #[tokio::test]
    async fn test_refresh_with_unreachable_backend_drops_token() {
        let store = Arc::new(MemoryStore::new());
        store.set_item(keys::TOKEN, "stale").unwrap();
        let mut session = offline_session(store.clone());
        session.refresh().await;
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert_eq!(store.get_item(keys::TOKEN).unwrap(), None);
        assert!(!session.api().has_token().await);
    }

    #[tokio::test]
    async fn test_unreadable_store_is_anonymous() {
        let store = Arc::new(MemoryStore::new());
        store.set_disabled(true);
        let mut session = offline_session(store);
        session.refresh().await;
        assert_eq!(session.state(), &SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let store = Arc::new(MemoryStore::new());
        store.set_item(keys::TOKEN, "abc").unwrap();
        let mut session = offline_session(store.clone());
        session.api().set_token(SecretString::from("abc")).await;
        session.logout().await;
        assert_eq!(store.get_item(keys::TOKEN).unwrap(), None);
        assert!(!session.api().has_token().await);
        assert_eq!(session.state(), &SessionState::Anonymous);
    }
}
