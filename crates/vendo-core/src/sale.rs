//! # Sale Planning
//!
//! Pure pieces of sale registration: turning requested lines into a plan,
//! and shaping the engine's result for callers.
//!
//! ## Flow
//! ```text
//! raw form lines ──► filter_order_lines ──► Vec<LineRequest>
//!                    (validation.rs)              │
//!                                                 ▼
//!                                        consolidate_lines
//!                                        (drop qty ≤ 0, merge ids)
//!                                                 │
//!                                                 ▼
//!                                   SaleEngine::register_sale (vendo-db)
//!                                                 │
//!                                                 ▼
//!                           Result<SaleReceipt, SaleError> ──► SaleOutcome
//!                                                               {status, message,
//!                                                                saleId, total}
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::SaleError;
use crate::money::{serialize_as_decimal, Money};

// =============================================================================
// Line Requests
// =============================================================================

/// One requested (product, quantity) pair.
///
/// Carries no price: unit prices are always read from the product at the
/// moment the sale is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineRequest {
    pub product_id: i64,
    pub quantity: i64,
}

impl LineRequest {
    pub const fn new(product_id: i64, quantity: i64) -> Self {
        LineRequest {
            product_id,
            quantity,
        }
    }
}

/// Normalizes requested lines into one entry per distinct product.
///
/// Lines with a non-positive quantity are dropped. Repeated product ids are
/// merged by summing their quantities, keeping first-seen order.
///
/// ```rust
/// use vendo_core::sale::{consolidate_lines, LineRequest};
///
/// let lines = consolidate_lines(&[
///     LineRequest::new(1, 2),
///     LineRequest::new(2, 0),
///     LineRequest::new(1, 3),
/// ]);
/// assert_eq!(lines, vec![LineRequest::new(1, 5)]);
/// ```
pub fn consolidate_lines(requests: &[LineRequest]) -> Vec<LineRequest> {
    let mut merged: Vec<LineRequest> = Vec::with_capacity(requests.len());

    for request in requests.iter().filter(|r| r.quantity > 0) {
        match merged.iter_mut().find(|m| m.product_id == request.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(request.quantity);
            }
            None => merged.push(*request),
        }
    }

    merged
}

// =============================================================================
// Results
// =============================================================================

/// What a committed sale hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleReceipt {
    pub sale_id: i64,
    pub total: Money,
}

/// Audit description written for a new sale.
pub fn sale_audit_description(customer_id: i64, total: Money, currency_symbol: &str) -> String {
    format!(
        "Sale registered: customer {}, total {}",
        customer_id,
        total.format_with_symbol(currency_symbol)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Caller-facing result of a sale registration.
///
/// ## Shape
/// ```text
/// { "status": "success", "message": "Sale registered successfully", "saleId": 12, "total": 1700.0 }
/// { "status": "error",   "message": "Product 9999 not found",       "saleId": 0,  "total": 0.0 }
/// ```
///
/// `saleId` is 0 and `total` is 0 whenever `status` is `error`.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleOutcome {
    pub status: OutcomeStatus,
    pub message: String,
    pub sale_id: i64,
    #[serde(serialize_with = "serialize_as_decimal")]
    #[ts(type = "number")]
    pub total: Money,
}

impl SaleOutcome {
    pub const SUCCESS_MESSAGE: &'static str = "Sale registered successfully";

    pub fn success(receipt: SaleReceipt) -> Self {
        SaleOutcome {
            status: OutcomeStatus::Success,
            message: Self::SUCCESS_MESSAGE.to_string(),
            sale_id: receipt.sale_id,
            total: receipt.total,
        }
    }

    pub fn failure(error: &SaleError) -> Self {
        SaleOutcome {
            status: OutcomeStatus::Error,
            message: error.user_message(),
            sale_id: 0,
            total: Money::zero(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

impl From<Result<SaleReceipt, SaleError>> for SaleOutcome {
    fn from(result: Result<SaleReceipt, SaleError>) -> Self {
        match result {
            Ok(receipt) => SaleOutcome::success(receipt),
            Err(error) => SaleOutcome::failure(&error),
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
    fn test_consolidate_drops_non_positive() {
        let lines = consolidate_lines(&[
            LineRequest::new(1, 0),
            LineRequest::new(2, -3),
            LineRequest::new(3, 1),
        ]);
        assert_eq!(lines, vec![LineRequest::new(3, 1)]);
    }

    #[test]
    fn test_consolidate_merges_in_first_seen_order() {
        let lines = consolidate_lines(&[
            LineRequest::new(7, 1),
            LineRequest::new(3, 2),
            LineRequest::new(7, 4),
        ]);
        assert_eq!(lines, vec![LineRequest::new(7, 5), LineRequest::new(3, 2)]);
    }

    #[test]
    fn test_consolidate_empty() {
        assert!(consolidate_lines(&[]).is_empty());
    }

    #[test]
    fn test_audit_description() {
        assert_eq!(
            sale_audit_description(4, Money::from_cents(170000), "S/."),
            "Sale registered: customer 4, total S/. 1700.00"
        );
    }

    #[test]
    fn test_success_outcome_shape() {
        let outcome = SaleOutcome::from(Ok(SaleReceipt {
            sale_id: 12,
            total: Money::from_cents(170000),
        }));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Sale registered successfully");
        assert_eq!(json["saleId"], 12);
        assert_eq!(json["total"], 1700.0);
    }

    #[test]
    fn test_error_outcome_shape() {
        let outcome = SaleOutcome::from(Err(SaleError::InsufficientStock {
            product_id: 2,
            requested: 10,
            available: 5,
        }));
        assert!(!outcome.is_success());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["saleId"], 0);
        assert_eq!(json["total"], 0.0);
        assert!(json["message"].as_str().unwrap().contains("available 5"));
    }

    #[test]
    fn test_transaction_failure_outcome_hides_cause() {
        let outcome = SaleOutcome::from(Err(SaleError::transaction_failed(
            "FOREIGN KEY constraint failed",
        )));
        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert!(!outcome.message.contains("FOREIGN KEY"));
    }
}
