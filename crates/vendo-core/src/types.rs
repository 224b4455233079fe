//! # Domain Types
//!
//! Core domain types used throughout Vendo.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────┐ 1   N ┌─────────────┐ 1   N ┌─────────────┐           │
//! │  │  Customer   │──────►│    Sale     │──────►│  SaleLine   │           │
//! │  │ document_no │       │  sale_date  │       │  quantity   │           │
//! │  └─────────────┘       │  total      │       │  unit_price │ (frozen)  │
//! │  ┌─────────────┐ 1   N │             │       └──────┬──────┘           │
//! │  │    User     │──────►│  seller_id  │              │ N                │
//! │  │  role       │       └─────────────┘       ┌──────┴──────┐           │
//! │  └─────────────┘                             │   Product   │ 1         │
//! │                                              │ price,stock │           │
//! │  ┌─────────────┐                             └─────────────┘           │
//! │  │ AuditEntry  │  append-only, no foreign keys                         │
//! │  └─────────────┘                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All entity keys are SQLite integer row ids.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::access::{Action, Role};
use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
///
/// `document_number` is the unique national identity document (8 digits)
/// and is the key used for lookups from the front desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub document_number: String,
    pub given_names: String,
    pub family_names: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_names, self.family_names)
    }
}

/// Fields accepted when registering or editing a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub document_number: String,
    pub given_names: String,
    pub family_names: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product held in inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name shown to sellers.
    pub name: String,

    pub description: String,

    /// Current unit price in cents.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be taken from stock right now.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Fields accepted when creating or editing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
}

impl NewProduct {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale header.
///
/// `total_cents` always equals the sum of its lines' subtotals once the
/// registering transaction has committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub customer_id: i64,
    pub seller_id: i64,
    pub total_cents: i64,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale.
///
/// Snapshot pattern: `unit_price_cents` is copied from the product when the
/// sale is registered and is never updated afterwards, so later price changes
/// do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
}

impl SaleLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Quantity × captured unit price. Computed, never stored.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// A sale header together with its ordered lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

impl SaleDetail {
    /// Sum of line subtotals; matches `sale.total()` for committed sales.
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(SaleLine::subtotal).sum()
    }
}

// =============================================================================
// User
// =============================================================================

/// A back-office account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,

    /// PHC-format password hash. Never serialized.
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,

    /// Role name as stored. Unknown names grant nothing.
    pub role: String,

    pub display_name: Option<String>,
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Parsed role, or `None` for a name outside the fixed enumeration.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// The acting principal for this account.
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            username: self.username.clone(),
            role: self.role(),
        }
    }
}

/// Fields accepted when creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub display_name: Option<String>,
}

/// Who is performing an operation.
///
/// Passed explicitly into every operation that attributes or authorizes an
/// action; there is no ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub role: Option<Role>,
}

impl Principal {
    /// Principal used by maintenance jobs such as seeding.
    pub fn system() -> Self {
        Principal {
            user_id: 0,
            username: "system".to_string(),
            role: Some(Role::Admin),
        }
    }

    pub fn can(&self, action: Action) -> bool {
        self.role.is_some_and(|role| role.allows(action))
    }
}

// =============================================================================
// Audit
// =============================================================================

/// Kind of state change recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum AuditAction {
    Insert,
    Update,
    Delete,
    Login,
    Logout,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Insert => "INSERT",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity names used as audit targets.
pub mod audit_entity {
    pub const CUSTOMER: &str = "Customer";
    pub const PRODUCT: &str = "Product";
    pub const SALE: &str = "Sale";
    pub const USER: &str = "User";
}

/// An immutable audit log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AuditEntry {
    pub id: i64,
    pub entity: String,
    pub action: AuditAction,
    /// Informational only; not a foreign key.
    pub entity_id: Option<i64>,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
    pub actor: String,
    pub description: String,
}

/// An audit row about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub entity: String,
    pub action: AuditAction,
    pub entity_id: Option<i64>,
    pub actor: String,
    pub description: String,
}

impl NewAuditEntry {
    pub fn new(
        entity: impl Into<String>,
        action: AuditAction,
        entity_id: i64,
        actor: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        NewAuditEntry {
            entity: entity.into(),
            action,
            entity_id: Some(entity_id),
            actor: actor.into(),
            description: description.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i64, unit_price_cents: i64) -> SaleLine {
        SaleLine {
            id: 1,
            sale_id: 1,
            product_id: 1,
            quantity,
            unit_price_cents,
        }
    }

    #[test]
    fn test_line_subtotal() {
        assert_eq!(line(2, 85000).subtotal().cents(), 170000);
        assert_eq!(line(3, 9500).subtotal().cents(), 28500);
    }

    #[test]
    fn test_detail_lines_total() {
        let detail = SaleDetail {
            sale: Sale {
                id: 1,
                sale_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
                customer_id: 1,
                seller_id: 1,
                total_cents: 198500,
            },
            lines: vec![line(2, 85000), line(1, 28500)],
        };
        assert_eq!(detail.lines_total(), detail.sale.total());
    }

    #[test]
    fn test_product_can_sell() {
        let product = Product {
            id: 1,
            name: "Three-seat sofa".to_string(),
            description: "Sturdy fabric".to_string(),
            price_cents: 85000,
            stock: 5,
        };
        assert!(product.can_sell(5));
        assert!(!product.can_sell(6));
    }

    #[test]
    fn test_user_with_unknown_role_has_no_permissions() {
        let user = User {
            id: 3,
            username: "legacy".to_string(),
            password_hash: String::new(),
            role: "superuser".to_string(),
            display_name: None,
            is_active: true,
            created_at: Utc::now(),
        };
        let principal = user.principal();
        assert_eq!(principal.role, None);
        assert!(!principal.can(Action::Read));
    }

    #[test]
    fn test_user_serialization_omits_password_hash() {
        let user = User {
            id: 1,
            username: "admin".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: "admin".to_string(),
            display_name: Some("Administrator".to_string()),
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"admin\""));
    }

    #[test]
    fn test_audit_action_strings() {
        assert_eq!(AuditAction::Insert.to_string(), "INSERT");
        assert_eq!(
            serde_json::to_string(&AuditAction::Logout).unwrap(),
            "\"LOGOUT\""
        );
    }
}
