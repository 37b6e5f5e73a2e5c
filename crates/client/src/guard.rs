//! Role-based route guard.
//!
//! Each dashboard area is owned by one role. Visitors who are not signed in
//! are sent to the area's login page with the path they wanted in `next`;
//! signed-in visitors with another role are sent to their own home.

use bazaar_core::Role;

use crate::session::{Session, SessionState};

/// Query parameter carrying the path to return to after login.
pub const NEXT_PARAM: &str = "next";

/// What the guard knows about the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visitor {
    /// Stored session still being checked.
    Restoring,
    Anonymous,
    SignedIn(Role),
}

impl From<&Session> for Visitor {
    fn from(session: &Session) -> Self {
        match session.state() {
            SessionState::Restoring => Self::Restoring,
            SessionState::Anonymous => Self::Anonymous,
            SessionState::SignedIn(user) => Self::SignedIn(user.role),
        }
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the route.
    Allow,
    /// Wait: the session is still restoring.
    Pending,
    /// Send to a login page; `location` includes the `next` parameter.
    RedirectToLogin { location: String },
    /// Signed in with the wrong role; send to that role's home.
    RedirectHome { location: &'static str },
}

impl GuardDecision {
    /// Where the visitor should be sent, if anywhere.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::RedirectToLogin { location } => Some(location.as_str()),
            Self::RedirectHome { location } => Some(*location),
            Self::Allow | Self::Pending => None,
        }
    }
}

/// A protected subtree of routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedArea {
    /// Route prefixes covered (each matches itself and everything below it).
    pub prefixes: &'static [&'static str],
    pub allowed: &'static [Role],
    pub login_route: &'static str,
}

impl ProtectedArea {
    fn covers(&self, path: &str) -> bool {
        if path == self.login_route {
            return false;
        }
        self.prefixes.iter().any(|prefix| {
            path == *prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Table of protected areas.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    areas: Vec<ProtectedArea>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(vec![
            ProtectedArea {
                prefixes: &["/superadmin"],
                allowed: &[Role::SuperAdmin],
                login_route: Role::SuperAdmin.login_route(),
            },
            ProtectedArea {
                prefixes: &["/admin"],
                allowed: &[Role::Admin],
                login_route: Role::Admin.login_route(),
            },
            ProtectedArea {
                prefixes: &["/seller"],
                allowed: &[Role::Seller],
                login_route: Role::Seller.login_route(),
            },
            ProtectedArea {
                prefixes: &["/orders", "/wishlist", "/account"],
                allowed: &[Role::Customer],
                login_route: Role::Customer.login_route(),
            },
        ])
    }
}

impl RouteGuard {
    #[must_use]
    pub const fn new(areas: Vec<ProtectedArea>) -> Self {
        Self { areas }
    }

    /// The area covering `path`, if it is protected.
    #[must_use]
    pub fn area_for(&self, path: &str) -> Option<&ProtectedArea> {
        let path = path_only(path);
        self.areas.iter().find(|area| area.covers(path))
    }

    /// Decide whether `visitor` may see `path`.
    ///
    /// `path` may carry a query string; it is kept in `next` but ignored for
    /// matching.
    #[must_use]
    pub fn check(&self, path: &str, visitor: Visitor) -> GuardDecision {
        let Some(area) = self.area_for(path) else {
            return GuardDecision::Allow;
        };

        match visitor {
            Visitor::Restoring => GuardDecision::Pending,
            Visitor::Anonymous => GuardDecision::RedirectToLogin {
                location: login_location(area.login_route, path),
            },
            Visitor::SignedIn(role) if area.allowed.contains(&role) => GuardDecision::Allow,
            Visitor::SignedIn(role) => GuardDecision::RedirectHome {
                location: role.home_route(),
            },
        }
    }
}

fn path_only(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// `login_route?next=<url-encoded path>`.
#[must_use]
pub fn login_location(login_route: &str, intended: &str) -> String {
    format!(
        "{login_route}?{NEXT_PARAM}={}",
        urlencoding::encode(intended)
    )
}

/// Where to go after signing in as `role`.
///
/// `next` is honoured only when it decodes to a path on this site (a single
/// leading `/`); anything else falls back to the role's home.
#[must_use]
pub fn post_login_redirect(next: Option<&str>, role: Role) -> String {
    next.and_then(|raw| urlencoding::decode(raw).ok())
        .map(|decoded| decoded.into_owned())
        .filter(|path| is_local_path(path))
        .unwrap_or_else(|| role.home_route().to_string())
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
