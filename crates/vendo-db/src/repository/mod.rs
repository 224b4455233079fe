//! # Repository Module
//!
//! Database repository implementations for Vendo.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and who calls them                      │
//! │                                                                         │
//! │  Request handler (after the role check)                                │
//! │       │                                                                 │
//! │       │  db.customers().create(&principal, &new_customer)              │
//! │       ▼                                                                 │
//! │  CustomerRepository ── row + audit entry in one transaction           │
//! │  InventoryStore     ── products, conditional stock decrement          │
//! │  SaleRepository     ── sale headers and lines (reads, delete)          │
//! │  UserRepository     ── accounts, argon2 hashes, login/logout audit     │
//! │  AuditLog           ── append-only history                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  SaleEngine borrows the executor-level helpers of InventoryStore,      │
//! │  SaleRepository and AuditLog so a sale is a single transaction.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer CRUD
//! - [`InventoryStore`](product::InventoryStore) - Product CRUD and stock
//! - [`SaleRepository`](sale::SaleRepository) - Sale and line reads
//! - [`UserRepository`](user::UserRepository) - Accounts and sessions
//! - [`AuditLog`](audit::AuditLog) - Audit trail

pub mod audit;
pub mod customer;
pub mod product;
pub mod sale;
pub mod user;
