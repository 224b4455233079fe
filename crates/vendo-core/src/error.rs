//! # Error Types
//!
//! Domain-specific error types for vendo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vendo-core errors (this file)                                         │
//! │  ├── SaleError        - Outcome of one sale registration               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vendo-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── InventoryError   - Stock check-and-decrement failures             │
//! │                                                                         │
//! │  Flow: DbError / InventoryError → SaleError → SaleOutcome → caller     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Sale Error
// =============================================================================

/// Why a sale registration did not commit.
///
/// Every variant implies a full rollback: no sale header, no line item,
/// no stock change and no audit entry survived the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// The order referenced a product that does not exist.
    #[error("Product {product_id} not found")]
    ProductNotFound { product_id: i64 },

    /// Not enough stock for one of the lines.
    ///
    /// ## User Workflow
    /// ```text
    /// Order: product 7 × 10
    ///      │
    ///      ▼
    /// Check stock: available = 5
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, requested: 10, available: 5 }
    ///      │
    ///      ▼
    /// UI shows: "requested 10, available 5"
    /// ```
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    /// No line with a positive quantity reached the engine.
    #[error("The order must contain at least one product line")]
    EmptyOrder,

    /// Lower-level persistence failure inside the atomic sequence.
    ///
    /// `cause` is for logs only; callers show a generic message.
    #[error("Sale transaction failed: {cause}")]
    TransactionFailed { cause: String },
}

impl SaleError {
    /// Wraps any lower-level fault as a transaction failure.
    pub fn transaction_failed(cause: impl ToString) -> Self {
        SaleError::TransactionFailed {
            cause: cause.to_string(),
        }
    }

    /// Message that is safe to show to an end user.
    ///
    /// Business rejections are shown verbatim; persistence faults are not.
    pub fn user_message(&self) -> String {
        match self {
            SaleError::TransactionFailed { .. } => {
                "The sale could not be registered. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the request-layer helpers before any storage call runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. a document number with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================
