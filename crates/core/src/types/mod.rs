//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for the marketplace domain.

pub mod email;
pub mod id;
pub mod identity;
pub mod list;
pub mod order;
pub mod price;
pub mod product;
pub mod role;
pub mod settings;
pub mod status;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{GUEST_NAMESPACE, Identity, ListKind, namespace_key};
pub use list::{ListDecodeError, ListEntry, PersistedList, ProductSnapshot, SnapshotError};
pub use order::Order;
pub use price::{Price, decimal_from_json};
pub use product::{
    Category, FieldError, MAX_TAGS, Product, ProductDraft, ProductPage, ValidationErrors,
    normalize_tags,
};
pub use role::{Role, RoleParseError};
pub use settings::{CommissionUpdate, MaintenanceUpdate, PlatformSettings};
pub use status::{ProductStatus, SellerStatus, StatusParseError};
pub use user::User;
