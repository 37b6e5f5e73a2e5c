//! Bazaar Core - Shared types library.
//!
//! This crate provides the types used across all Bazaar components:
//! - `client` - Session, HTTP dispatch, local cart/wishlist store, route guard
//! - `cli` - Command-line front end for shoppers, sellers and administrators
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. The cart/wishlist transformations live here so
//! they can be tested without any storage backend.
//!
//! # Modules
//!
//! - [`types`] - IDs, roles, statuses, catalog records, identities and
//!   persisted lists

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
