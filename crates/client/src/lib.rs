//! Bazaar client library.
//!
//! Everything a Bazaar front end needs besides rendering: the session and its
//! token, bearer-authenticated REST calls, the local cart and wishlist, the
//! route guard, a response cache and transient notices.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod config;
pub mod guard;
pub mod lists;
pub mod notices;
pub mod session;
pub mod storage;
pub mod theme;
pub mod uploads;

pub use api::{ApiClient, ApiError};
pub use cache::{QueryCache, QueryKey};
pub use config::{ClientConfig, ConfigError};
pub use guard::{GuardDecision, RouteGuard, Visitor, post_login_redirect};
pub use lists::ListStore;
pub use notices::Notices;
pub use session::{Session, SessionError, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore, StorageError};
pub use theme::Theme;
pub use uploads::{ImageUploader, UploadError, UploadProgress};
