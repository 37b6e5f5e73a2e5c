//! Cart and wishlist persistence.
//!
//! [`ListStore`] pairs the pure list transformations from `bazaar-core` with
//! a [`KeyValueStore`]. Reads never fail: a missing, unreadable or malformed
//! value is an empty list. Every mutation loads, transforms and writes the
//! whole list back in one storage write; a failed write leaves the stored
//! list as it was and is returned to the caller to show as a notice.

use bazaar_core::{Identity, ListKind, PersistedList, ProductSnapshot, namespace_key};
use tracing::{debug, warn};

use crate::storage::{SharedStore, StorageError};

/// Per-identity cart and wishlist access.
#[derive(Debug, Clone)]
pub struct ListStore {
    store: SharedStore,
}

impl ListStore {
    /// Lists kept in `store`.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Storage key for `kind` under `identity` (guest when `None`).
    #[must_use]
    pub fn key(identity: Option<&Identity>, kind: ListKind) -> String {
        namespace_key(identity, kind)
    }

    /// Read the list stored under `key`.
    ///
    /// Absent keys, storage failures and malformed values all yield an empty
    /// list.
    #[must_use]
    pub fn load(&self, key: &str) -> PersistedList {
        let raw = match self.store.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return PersistedList::new(),
            Err(e) => {
                warn!(key, error = %e, "Storage read failed, treating list as empty");
                return PersistedList::new();
            }
        };

        PersistedList::from_json(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "Malformed stored list, treating as empty");
            PersistedList::new()
        })
    }

    /// Overwrite the list stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn save(&self, key: &str, list: &PersistedList) -> Result<(), StorageError> {
        let raw = list
            .to_json()
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.store.set_item(key, &raw)?;
        debug!(key, entries = list.len(), "List saved");
        Ok(())
    }

    /// Add a product or bump its quantity, then persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn add_or_increment(
        &self,
        key: &str,
        product: ProductSnapshot,
    ) -> Result<PersistedList, StorageError> {
        let list = self.load(key).add_or_increment(product);
        self.save(key, &list)?;
        Ok(list)
    }

    /// Remove a product, then persist. Absent products are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn remove(&self, key: &str, product_id: &str) -> Result<PersistedList, StorageError> {
        let list = self.load(key).remove(product_id);
        self.save(key, &list)?;
        Ok(list)
    }

    /// Flip a product's presence, then persist.
    ///
    /// Returns the new list and whether the product is present afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn toggle(
        &self,
        key: &str,
        product: ProductSnapshot,
        default_quantity: Option<u32>,
    ) -> Result<(PersistedList, bool), StorageError> {
        let (list, present) = self.load(key).toggle(product, default_quantity);
        self.save(key, &list)?;
        Ok((list, present))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn snapshot(id: &str) -> ProductSnapshot {
        ProductSnapshot::from_value(json!({"id": id, "price": 10})).unwrap()
    }

    fn setup() -> (Arc<MemoryStore>, ListStore) {
        let memory = Arc::new(MemoryStore::new());
        let lists = ListStore::new(memory.clone());
        (memory, lists)
    }

    #[test]
    fn test_never_written_key_is_empty() {
        let (_, lists) = setup();
        assert!(lists.load("cart_nobody").is_empty());
    }

    #[test]
    fn test_malformed_values_are_empty() {
        let (memory, lists) = setup();
        memory.set_item("cart_a", "not json").unwrap();
        memory.set_item("cart_b", "{}").unwrap();
        assert!(lists.load("cart_a").is_empty());
        assert!(lists.load("cart_b").is_empty());
    }

    #[test]
    fn test_malformed_value_is_overwritten_by_next_write() {
        let (memory, lists) = setup();
        memory.set_item("cart_a", "{}").unwrap();
        lists.add_or_increment("cart_a", snapshot("p1")).unwrap();
        assert_eq!(lists.load("cart_a").len(), 1);
    }

    #[test]
    fn test_read_failure_is_empty() {
        let (memory, lists) = setup();
        lists.add_or_increment("cart_a", snapshot("p1")).unwrap();
        memory.set_disabled(true);
        assert!(lists.load("cart_a").is_empty());
    }

    #[test]
    fn test_write_failure_is_returned_and_nothing_changes() {
        let (memory, lists) = setup();
        lists.add_or_increment("cart_a", snapshot("p1")).unwrap();
        memory.set_disabled(true);
        assert!(lists.add_or_increment("cart_a", snapshot("p2")).is_err());
        memory.set_disabled(false);
        let list = lists.load("cart_a");
        assert_eq!(list.len(), 1);
        assert!(list.contains("p1"));
    }

    #[test]
    fn test_quota_failure_is_returned() {
        let lists = ListStore::new(Arc::new(MemoryStore::with_quota(8)));
        let err = lists.add_or_increment("cart_a", snapshot("p1")).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(err.user_message(), "Storage is full, could not save");
    }

    #[test]
    fn test_mutations_persist_immediately() {
        let (memory, lists) = setup();
        lists.add_or_increment("cart_a", snapshot("p1")).unwrap();
        lists.add_or_increment("cart_a", snapshot("p1")).unwrap();
        let raw = memory.get_item("cart_a").unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, json!([{"product": {"id": "p1", "price": 10}, "quantity": 2}]));

        lists.remove("cart_a", "p1").unwrap();
        assert_eq!(memory.get_item("cart_a").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_toggle_round_trip() {
        let (_, lists) = setup();
        let (_, present) = lists.toggle("wishlist_a", snapshot("p1"), None).unwrap();
        assert!(present);
        let (list, present) = lists.toggle("wishlist_a", snapshot("p1"), None).unwrap();
        assert!(!present);
        assert!(list.is_empty());
    }

    #[test]
    fn test_identities_are_isolated() {
        let (_, lists) = setup();
        let alice = Identity::with_id("alice");
        let bob = Identity::with_id("bob");
        let alice_key = ListStore::key(Some(&alice), ListKind::Cart);
        let bob_key = ListStore::key(Some(&bob), ListKind::Cart);

        lists.add_or_increment(&alice_key, snapshot("p1")).unwrap();
        lists.add_or_increment(&bob_key, snapshot("p2")).unwrap();
        lists.remove(&bob_key, "p2").unwrap();

        let alice_list = lists.load(&alice_key);
        assert_eq!(alice_list.len(), 1);
        assert!(alice_list.contains("p1"));
        assert!(lists.load(&bob_key).is_empty());
    }
}
