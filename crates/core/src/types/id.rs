//! Newtype IDs for type-safe entity references.
//!
//! The marketplace backend hands out opaque string identifiers (document IDs),
//! so every ID wraps a `String`. Use the `define_id!` macro to create wrappers
//! that prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`, `short()`
/// - `From<String>`, `From<&str>` and `AsRef<str>` implementations
///
/// # Example
///
/// ```rust
/// # use bazaar_core::define_id;
/// define_id!(CouponId);
/// define_id!(ShipmentId);
///
/// let coupon = CouponId::new("c-1");
/// let shipment = ShipmentId::new("c-1");
///
/// // These are different types, so this won't compile:
/// // let _: CouponId = shipment;
/// assert_eq!(coupon.as_str(), shipment.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Last eight characters, used when listing IDs in tables.
            #[must_use]
            pub fn short(&self) -> &str {
                let start = self
                    .0
                    .char_indices()
                    .rev()
                    .nth(7)
                    .map_or(0, |(i, _)| i);
                self.0.get(start..).unwrap_or(&self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_takes_last_eight_chars() {
        let id = OrderId::new("65f1c0ffee1234abcd");
        assert_eq!(id.short(), "1234abcd");
    }

    #[test]
    fn test_short_on_short_id() {
        let id = OrderId::new("abc");
        assert_eq!(id.short(), "abc");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProductId::new("p1");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"p1\"");
    }
}
