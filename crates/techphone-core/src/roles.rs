//! Roles, the static permission matrix, and admin-email reconciliation.

use serde::{Deserialize, Serialize};

/// Accounts whose profiles are forced to [`Role::Admin`] on every login.
///
/// Matching is case-insensitive on the full address. Operational accounts
/// only; customer-facing admin grants go through profile updates instead.
pub const ADMIN_EMAILS: &[&str] = &[
    "admin@techphone.vn",
    "quantri@didongviet.vn",
    "ops@techphone.vn",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Guest,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
            Role::Guest => write!(f, "guest"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    /// Unknown role strings fall back to `Guest` rather than erroring:
    /// profile rows written by older clients carry free-form role values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "user" => Role::User,
            _ => Role::Guest,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageProducts,
    ManageOrders,
    ManageUsers,
    ViewDashboard,
    PlaceOrder,
    ViewOwnOrders,
    BrowseCatalog,
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ManageProducts,
    Permission::ManageOrders,
    Permission::ManageUsers,
    Permission::ViewDashboard,
    Permission::PlaceOrder,
    Permission::ViewOwnOrders,
    Permission::BrowseCatalog,
];

const USER_PERMISSIONS: &[Permission] = &[
    Permission::PlaceOrder,
    Permission::ViewOwnOrders,
    Permission::BrowseCatalog,
];

const GUEST_PERMISSIONS: &[Permission] = &[Permission::PlaceOrder, Permission::BrowseCatalog];

/// True iff `permission` is listed in the static permission set for `role`.
#[must_use]
pub fn has_permission(role: Role, permission: Permission) -> bool {
    let set = match role {
        Role::Admin => ADMIN_PERMISSIONS,
        Role::User => USER_PERMISSIONS,
        Role::Guest => GUEST_PERMISSIONS,
    };
    set.contains(&permission)
}

#[must_use]
pub fn is_admin(role: Role) -> bool {
    role == Role::Admin
}

#[must_use]
pub fn is_user(role: Role) -> bool {
    role == Role::User
}

#[must_use]
pub fn is_guest(role: Role) -> bool {
    role == Role::Guest
}

/// Reconcile a profile's role against the admin-email allowlist.
///
/// Allowlisted emails always resolve to `Admin`. A stored `Admin` role whose
/// email is no longer allowlisted is demoted to `User`; everything else is
/// preserved. Applied on every login so revocations take effect without a
/// separate migration.
#[must_use]
pub fn reconcile_role(email: &str, current: Role) -> Role {
    let email = email.trim().to_lowercase();
    if ADMIN_EMAILS.iter().any(|a| a.eq_ignore_ascii_case(&email)) {
        Role::Admin
    } else if current == Role::Admin {
        Role::User
    } else {
        current
    }
}
