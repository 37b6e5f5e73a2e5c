//! Marketplace roles.
//!
//! [`Role`] is the single closed set of roles shared by the route guard, the
//! API types and the CLI. Each role knows its home route and the login route
//! of its dashboard area.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known role.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected SUPER_ADMIN, ADMIN, SELLER or CUSTOMER)")]
pub struct RoleParseError(pub String);

/// Role of a signed-in account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform owner: admins, commission, platform controls.
    SuperAdmin,
    /// Moderates sellers and products.
    Admin,
    /// Lists products and fulfils orders.
    Seller,
    /// Shops, keeps a cart and a wishlist.
    Customer,
}

impl Role {
    /// Every role, most privileged first.
    pub const ALL: [Self; 4] = [Self::SuperAdmin, Self::Admin, Self::Seller, Self::Customer];

    /// Wire representation (`SUPER_ADMIN`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Admin => "ADMIN",
            Self::Seller => "SELLER",
            Self::Customer => "CUSTOMER",
        }
    }

    /// Route a signed-in user of this role lands on.
    #[must_use]
    pub const fn home_route(self) -> &'static str {
        match self {
            Self::SuperAdmin => "/superadmin",
            Self::Admin => "/admin",
            Self::Seller => "/seller",
            Self::Customer => "/",
        }
    }

    /// Login page for this role's area.
    #[must_use]
    pub const fn login_route(self) -> &'static str {
        match self {
            Self::SuperAdmin => "/superadmin/login",
            Self::Admin => "/admin/login",
            Self::Seller => "/seller/login",
            Self::Customer => "/login",
        }
    }

    /// Whether the role works in a dashboard rather than the storefront.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin | Self::Seller)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    /// Accepts the wire form in any case, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "SUPER_ADMIN" | "SUPERADMIN" => Ok(Self::SuperAdmin),
            "ADMIN" => Ok(Self::Admin),
            "SELLER" => Ok(Self::Seller),
            "CUSTOMER" => Ok(Self::Customer),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
        let role: Role = serde_json::from_str("\"SELLER\"").unwrap();
        assert_eq!(role, Role::Seller);
    }

    #[test]
    fn test_from_str_variants() {
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("super-admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("Customer".parse::<Role>().unwrap(), Role::Customer);
        assert!("viewer".parse::<Role>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_routes() {
        assert_eq!(Role::Admin.home_route(), "/admin");
        assert_eq!(Role::Customer.home_route(), "/");
        assert_eq!(Role::Seller.login_route(), "/seller/login");
        assert!(!Role::Customer.is_staff());
    }
}
