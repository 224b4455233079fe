//! # Database Error Types
//!
//! Error types for database operations and the inventory contract.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├──► repositories return DbResult<T> to the request layer        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InventoryError ← stock check-and-decrement outcome                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleError (vendo-core) ← what the sale engine reports                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use vendo_core::{SaleError, ValidationError};

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Registering a second customer with the same document number
    /// - Creating a second account with the same username
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A sale referencing a non-existent customer or seller
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Deletion refused because other rows still depend on the entity.
    #[error("{entity} {id} cannot be deleted: {reason}")]
    InUse {
        entity: String,
        id: i64,
        reason: String,
    },

    /// Input rejected before reaching SQL.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Password hashing or hash parsing failed.
    #[error("Credential hashing failed: {0}")]
    Credential(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn in_use(entity: impl Into<String>, id: i64, reason: impl Into<String>) -> Self {
        DbError::InUse {
            entity: entity.into(),
            id,
            reason: reason.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Inventory Error
// =============================================================================

/// Why a stock decrement did not apply.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Product {product_id} not found")]
    ProductNotFound { product_id: i64 },

    /// `amount` exceeded the stock on hand at the moment of the decrement.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for InventoryError {
    fn from(err: sqlx::Error) -> Self {
        InventoryError::Db(DbError::from(err))
    }
}

// =============================================================================
// Conversions into SaleError
// =============================================================================

/// Any storage fault inside a sale is a transaction failure.
impl From<DbError> for SaleError {
    fn from(err: DbError) -> Self {
        SaleError::transaction_failed(err)
    }
}

impl From<InventoryError> for SaleError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::ProductNotFound { product_id } => {
                SaleError::ProductNotFound { product_id }
            }
            InventoryError::InsufficientStock {
                product_id,
                requested,
                available,
            } => SaleError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            InventoryError::Db(db_err) => SaleError::from(db_err),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_errors_map_to_sale_errors() {
        let err = InventoryError::InsufficientStock {
            product_id: 3,
            requested: 10,
            available: 5,
        };
        assert_eq!(
            SaleError::from(err),
            SaleError::InsufficientStock {
                product_id: 3,
                requested: 10,
                available: 5
            }
        );

        let err = InventoryError::ProductNotFound { product_id: 9999 };
        assert_eq!(
            SaleError::from(err),
            SaleError::ProductNotFound { product_id: 9999 }
        );
    }

    #[test]
    fn test_db_errors_become_transaction_failures() {
        let err = SaleError::from(DbError::ConnectionFailed("disk full".to_string()));
        match err {
            SaleError::TransactionFailed { cause } => assert!(cause.contains("disk full")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_in_use_message() {
        let err = DbError::in_use("Customer", 4, "customer has 2 sales");
        assert_eq!(
            err.to_string(),
            "Customer 4 cannot be deleted: customer has 2 sales"
        );
    }
}
