//! # Access Control
//!
//! Closed set of roles mapped to a fixed set of permitted actions.
//!
//! ## Permission Table
//! ```text
//! ┌──────────┬──────────────────────────────────────────────────────────┐
//! │  role    │  permissions                                             │
//! ├──────────┼──────────────────────────────────────────────────────────┤
//! │  admin   │  create, read, update, delete, sell, report              │
//! │  seller  │  read, sell, update-customer                             │
//! │  viewer  │  read, report                                            │
//! │  other   │  (nothing)                                               │
//! └──────────┴──────────────────────────────────────────────────────────┘
//! ```
//!
//! The request layer checks permissions before calling into vendo-db.
//! The sale engine itself never authorizes.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Role
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Seller,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Seller, Role::Viewer];

    /// Parses a stored role name. Matching is exact.
    pub fn parse(name: &str) -> Option<Role> {
        match name {
            "admin" => Some(Role::Admin),
            "seller" => Some(Role::Seller),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
            Role::Viewer => "viewer",
        }
    }

    /// Actions granted to this role.
    pub const fn permissions(&self) -> &'static [Action] {
        match self {
            Role::Admin => &[
                Action::Create,
                Action::Read,
                Action::Update,
                Action::Delete,
                Action::Sell,
                Action::Report,
            ],
            Role::Seller => &[Action::Read, Action::Sell, Action::UpdateCustomer],
            Role::Viewer => &[Action::Read, Action::Report],
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        self.permissions().contains(&action)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Action
// =============================================================================

/// Operations a caller may be permitted to invoke.
///
/// `UpdateCustomer` is narrower than `Update`: it lets sellers correct
/// customer records without touching products or users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Sell,
    Report,
    UpdateCustomer,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Sell => "sell",
            Action::Report => "report",
            Action::UpdateCustomer => "update-customer",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks a stored role name against the permission table.
///
/// Total: any name outside the fixed roles yields `false`.
///
/// ```rust
/// use vendo_core::access::{role_has_permission, Action};
///
/// assert!(role_has_permission("seller", Action::Sell));
/// assert!(!role_has_permission("seller", Action::Delete));
/// assert!(!role_has_permission("root", Action::Read));
/// ```
pub fn role_has_permission(role: &str, action: Action) -> bool {
    Role::parse(role).is_some_and(|role| role.allows(action))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_permissions() {
        for action in [
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::Sell,
            Action::Report,
        ] {
            assert!(role_has_permission("admin", action), "admin: {action}");
        }
        assert!(!role_has_permission("admin", Action::UpdateCustomer));
    }

    #[test]
    fn test_seller_permissions() {
        assert!(role_has_permission("seller", Action::Read));
        assert!(role_has_permission("seller", Action::Sell));
        assert!(role_has_permission("seller", Action::UpdateCustomer));
        assert!(!role_has_permission("seller", Action::Create));
        assert!(!role_has_permission("seller", Action::Report));
    }

    #[test]
    fn test_viewer_permissions() {
        assert!(role_has_permission("viewer", Action::Read));
        assert!(role_has_permission("viewer", Action::Report));
        assert!(!role_has_permission("viewer", Action::Sell));
    }

    #[test]
    fn test_unknown_role_has_nothing() {
        for role in ["", "Admin", "root", "seller "] {
            for action in [Action::Read, Action::Sell, Action::Report] {
                assert!(!role_has_permission(role, action));
            }
        }
    }

    #[test]
    fn test_role_round_trip_names() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(
            serde_json::to_string(&Action::UpdateCustomer).unwrap(),
            "\"update-customer\""
        );
    }
}
