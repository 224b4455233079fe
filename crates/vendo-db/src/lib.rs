//! # vendo-db: Database Layer for Vendo
//!
//! Storage and the sale transaction engine for a small retail back office.
//! SQLite through sqlx, one file on disk.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Vendo Data Flow                                │
//! │                                                                         │
//! │  Request handler (role already checked with vendo-core::access)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vendo-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  SaleEngine  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │ (engine.rs)  │  │   │
//! │  │   │               │    │ Customers     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Inventory     │◄───│ header+lines │  │   │
//! │  │   │ WAL, FKs,     │    │ Sales, Users  │    │ stock, audit │  │   │
//! │  │   │ busy_timeout  │    │ AuditLog      │    │ one tx       │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              SQLite Database (VENDO_DB_PATH)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`engine`] - Atomic sale registration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vendo_db::{AppConfig, Database};
//! use vendo_core::LineRequest;
//!
//! let config = AppConfig::from_env()?;
//! let db = Database::new(config.db_config())
//!     .await?
//!     .with_currency_symbol(&config.currency_symbol);
//!
//! let outcome = db
//!     .sale_engine()
//!     .register_sale_outcome(customer_id, seller_id, config.today(), &[LineRequest::new(7, 2)])
//!     .await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError};
pub use engine::SaleEngine;
pub use error::{DbError, DbResult, InventoryError};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditLog;
pub use repository::customer::CustomerRepository;
pub use repository::product::InventoryStore;
pub use repository::sale::SaleRepository;
pub use repository::user::{hash_password, verify_password, UserRepository};
