//! # vendo-core: Pure Business Logic for Vendo
//!
//! Domain types, money, validation, access control and sale planning
//! for the Vendo sales back office. Nothing in here touches a database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendo Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Request / Presentation Layer (external)              │   │
//! │  │    forms ──► role_has_permission ──► filter_order_lines         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ primitives + Principal                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vendo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │  sale   │ │validation│ │ access │  │   │
//! │  │   │Customer │ │  Money  │ │ Outcome │ │  rules   │ │  Role  │  │   │
//! │  │   │  Sale   │ │ (cents) │ │  lines  │ │  checks  │ │ Action │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              vendo-db (Database Layer + Sale Engine)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Customer, Product, Sale, SaleLine, User, AuditEntry)
//! - [`money`] - Money type with integer arithmetic
//! - [`sale`] - Line consolidation and the caller-facing [`SaleOutcome`]
//! - [`access`] - Role → permission table
//! - [`validation`] - Field rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use vendo_core::{role_has_permission, Action, Money, SaleError, SaleOutcome};
//!
//! assert!(role_has_permission("seller", Action::Sell));
//!
//! let outcome = SaleOutcome::from(Err(SaleError::EmptyOrder));
//! assert!(!outcome.is_success());
//! assert_eq!(outcome.total, Money::zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod money;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{role_has_permission, Action, Role};
pub use error::{SaleError, ValidationError};
pub use money::Money;
pub use sale::{LineRequest, OutcomeStatus, SaleOutcome, SaleReceipt};
pub use types::*;
pub use validation::ValidationResult;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency symbol used in audit descriptions unless configured otherwise.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "S/.";

/// Stock level at or below which a product counts as running low.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Maximum quantity of a single product in one order.
///
/// Guards against typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;
