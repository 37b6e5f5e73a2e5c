//! Locally persisted cart and wishlist lists.
//!
//! A [`PersistedList`] is an ordered sequence of [`ListEntry`] values, unique
//! by product ID. The transformations here are pure: they take a list by
//! value and hand back the new list. Reading and writing storage is the
//! client crate's job.
//!
//! Product snapshots are copied verbatim at add time and never revalidated,
//! so price and stock can drift from the server's record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::price::decimal_from_json;

/// Errors building a [`ProductSnapshot`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The value is not a JSON object.
    #[error("product snapshot must be a JSON object")]
    NotAnObject,
    /// Neither `id` nor `_id` holds a usable identifier.
    #[error("product snapshot has no id or _id")]
    MissingId,
}

/// Errors decoding a stored list.
#[derive(thiserror::Error, Debug)]
pub enum ListDecodeError {
    /// The stored text is not JSON.
    #[error("stored list is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The stored JSON is not an array.
    #[error("stored list is not an array")]
    NotAnArray,
}

/// Server product record frozen at the moment it was added.
///
/// The full object is kept so it serializes back exactly as received. The
/// identifier is read from `id`, falling back to `_id`; strings and numbers
/// are both accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ProductSnapshot {
    id: String,
    fields: Map<String, Value>,
}

impl ProductSnapshot {
    /// Field holding the price.
    const PRICE: &'static str = "price";

    /// Wrap a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object or has no identifier.
    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            _ => Err(SnapshotError::NotAnObject),
        }
    }

    /// Product identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Product title, when present.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    /// Price at add time, when present and numeric.
    #[must_use]
    pub fn price(&self) -> Option<Decimal> {
        self.fields.get(Self::PRICE).and_then(decimal_from_json)
    }

    /// Currency at add time, when present.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.fields.get("currency").and_then(Value::as_str)
    }

    /// Any other field of the snapshot.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// All fields as received.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for ProductSnapshot {
    type Error = SnapshotError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = ["id", "_id"]
            .into_iter()
            .filter_map(|key| match fields.get(key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .next()
            .ok_or(SnapshotError::MissingId)?;

        Ok(Self { id, fields })
    }
}

impl From<ProductSnapshot> for Map<String, Value> {
    fn from(snapshot: ProductSnapshot) -> Self {
        snapshot.fields
    }
}

/// One line of a cart or wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub product: ProductSnapshot,
    /// Present for cart lines; wishlist entries carry presence only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl ListEntry {
    /// Identifier of the entry's product.
    #[must_use]
    pub fn product_id(&self) -> &str {
        self.product.id()
    }
}

/// Ordered cart or wishlist contents, unique by product ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedList(Vec<ListEntry>);

impl PersistedList {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Decode stored text.
    ///
    /// Array elements that are not valid entries are dropped, so one bad
    /// line does not cost the shopper the rest of the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or not a JSON array.
    pub fn from_json(raw: &str) -> Result<Self, ListDecodeError> {
        let Value::Array(items) = serde_json::from_str::<Value>(raw)? else {
            return Err(ListDecodeError::NotAnArray);
        };

        Ok(Self(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<ListEntry>(item).ok())
                .collect(),
        ))
    }

    /// Encode for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ListEntry] {
        &self.0
    }

    /// Iterate over entries.
    pub fn iter(&self) -> std::slice::Iter<'_, ListEntry> {
        self.0.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a product is in the list.
    #[must_use]
    pub fn contains(&self, product_id: &str) -> bool {
        self.position(product_id).is_some()
    }

    /// Entry for a product, if present.
    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<&ListEntry> {
        self.0.iter().find(|entry| entry.product_id() == product_id)
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.0
            .iter()
            .position(|entry| entry.product_id() == product_id)
    }

    /// Add a product, or bump its quantity by one if already present.
    ///
    /// A new entry starts at quantity 1. An existing entry without a
    /// quantity counts as 1 before the increment.
    #[must_use]
    pub fn add_or_increment(mut self, product: ProductSnapshot) -> Self {
        match self.position(product.id()) {
            Some(index) => {
                if let Some(entry) = self.0.get_mut(index) {
                    entry.quantity = Some(entry.quantity.unwrap_or(1).saturating_add(1));
                }
            }
            None => self.0.push(ListEntry {
                product,
                quantity: Some(1),
            }),
        }
        self
    }

    /// Drop the entry for a product. Absent IDs leave the list unchanged.
    #[must_use]
    pub fn remove(mut self, product_id: &str) -> Self {
        self.0.retain(|entry| entry.product_id() != product_id);
        self
    }

    /// Remove the product if present, otherwise append it with
    /// `default_quantity`.
    ///
    /// Returns the new list and whether the product is present afterwards.
    #[must_use]
    pub fn toggle(self, product: ProductSnapshot, default_quantity: Option<u32>) -> (Self, bool) {
        if self.contains(product.id()) {
            let id = product.id().to_owned();
            (self.remove(&id), false)
        } else {
            let mut list = self;
            list.0.push(ListEntry {
                product,
                quantity: default_quantity,
            });
            (list, true)
        }
    }

    /// Sum of `price * quantity`. Missing prices or quantities count as zero.
    ///
    /// Saturates at [`Decimal::MAX`] instead of overflowing.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.0
            .iter()
            .map(|entry| {
                let price = entry.product.price().unwrap_or_default();
                price
                    .checked_mul(Decimal::from(entry.quantity.unwrap_or(0)))
                    .unwrap_or(Decimal::MAX)
            })
            .fold(Decimal::ZERO, |total, line| {
                total.checked_add(line).unwrap_or(Decimal::MAX)
            })
    }

    /// Total number of units across entries.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.0
            .iter()
            .map(|entry| u64::from(entry.quantity.unwrap_or(0)))
            .sum()
    }
}

impl<'a> IntoIterator for &'a PersistedList {
    type Item = &'a ListEntry;
    type IntoIter = std::slice::Iter<'a, ListEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<ListEntry> for PersistedList {
    fn from_iter<I: IntoIterator<Item = ListEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product(id: &str, price: i64) -> ProductSnapshot {
        ProductSnapshot::from_value(json!({"id": id, "price": price, "title": id})).unwrap()
    }

    #[test]
    fn test_snapshot_requires_id() {
        assert_eq!(
            ProductSnapshot::from_value(json!({"title": "x"})),
            Err(SnapshotError::MissingId)
        );
        assert_eq!(
            ProductSnapshot::from_value(json!(["p1"])),
            Err(SnapshotError::NotAnObject)
        );
    }

    #[test]
    fn test_snapshot_id_fallback() {
        let snapshot = ProductSnapshot::from_value(json!({"_id": "abc", "id": ""})).unwrap();
        assert_eq!(snapshot.id(), "abc");
        let snapshot = ProductSnapshot::from_value(json!({"id": 7})).unwrap();
        assert_eq!(snapshot.id(), "7");
    }

    #[test]
    fn test_snapshot_serializes_verbatim() {
        let raw = json!({"_id": "p9", "price": 12.5, "images": ["a.png"], "extra": {"k": 1}});
        let snapshot = ProductSnapshot::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&snapshot).unwrap(), raw);
    }

    #[test]
    fn test_add_twice_increments() {
        let list = PersistedList::new()
            .add_or_increment(product("p1", 10))
            .add_or_increment(product("p1", 10));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("p1").unwrap().quantity, Some(2));
    }

    #[test]
    fn test_add_keeps_order() {
        let list = PersistedList::new()
            .add_or_increment(product("a", 1))
            .add_or_increment(product("b", 1))
            .add_or_increment(product("a", 1));
        let ids: Vec<_> = list.iter().map(ListEntry::product_id).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_add_increments_presence_only_entry() {
        let (list, _) = PersistedList::new().toggle(product("p1", 3), None);
        let list = list.add_or_increment(product("p1", 3));
        assert_eq!(list.get("p1").unwrap().quantity, Some(2));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let list = PersistedList::new().add_or_increment(product("p1", 10));
        let once = list.clone().remove("p1");
        let twice = once.clone().remove("p1");
        assert!(once.is_empty());
        assert_eq!(once, twice);

        let untouched = list.clone().remove("zzz");
        assert_eq!(untouched, list);
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let start = PersistedList::new().add_or_increment(product("keep", 1));
        let (added, present) = start.clone().toggle(product("p1", 10), None);
        assert!(present);
        assert!(added.contains("p1"));
        assert_eq!(added.get("p1").unwrap().quantity, None);

        let (removed, present) = added.toggle(product("p1", 10), None);
        assert!(!present);
        assert_eq!(removed, start);
    }

    #[test]
    fn test_toggle_with_default_quantity() {
        let (list, _) = PersistedList::new().toggle(product("p1", 10), Some(1));
        assert_eq!(list.get("p1").unwrap().quantity, Some(1));
    }

    #[test]
    fn test_from_json_rejects_non_arrays() {
        assert!(matches!(
            PersistedList::from_json("not json"),
            Err(ListDecodeError::Json(_))
        ));
        assert!(matches!(
            PersistedList::from_json("{}"),
            Err(ListDecodeError::NotAnArray)
        ));
    }

    #[test]
    fn test_from_json_drops_bad_elements() {
        let raw = r#"[{"product":{"id":"p1"},"quantity":2}, 5, {"product":{"title":"no id"}}, {"quantity":1}]"#;
        let list = PersistedList::from_json(raw).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("p1").unwrap().quantity, Some(2));
    }

    #[test]
    fn test_wishlist_shape_omits_quantity() {
        let (list, _) = PersistedList::new().toggle(product("p1", 10), None);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json,
            json!([{"product": {"id": "p1", "price": 10, "title": "p1"}}])
        );
    }

    #[test]
    fn test_subtotal_and_count() {
        let list = PersistedList::new()
            .add_or_increment(product("a", 10))
            .add_or_increment(product("a", 10))
            .add_or_increment(product("b", 5));
        assert_eq!(list.subtotal(), Decimal::new(25, 0));
        assert_eq!(list.item_count(), 3);
    }

    #[test]
    fn test_subtotal_ignores_missing_price() {
        let no_price = ProductSnapshot::from_value(json!({"id": "x"})).unwrap();
        let list = PersistedList::new().add_or_increment(no_price);
        assert_eq!(list.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_saturates_on_overflow() {
        let huge = ProductSnapshot::from_value(
            json!({"id": "p1", "price": "79228162514264337593543950335"}),
        )
        .unwrap();
        let list = PersistedList::new()
            .add_or_increment(huge.clone())
            .add_or_increment(huge)
            .add_or_increment(product("b", 5));
        assert_eq!(list.subtotal(), Decimal::MAX);
    }
}
