//! # Sale Transaction Engine
//!
//! Registers one sale atomically: header, lines, total, stock, audit.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register_sale(customer, seller, date, lines)                          │
//! │                                                                         │
//! │  0. consolidate_lines → empty? ───────────────────────► EmptyOrder     │
//! │                                                                         │
//! │  1. Pre-check (pool, no transaction)                                   │
//! │     for each line: product exists? stock ≥ qty? ──✗──► ProductNotFound │
//! │                                                         InsufficientStock
//! │  ── BEGIN ─────────────────────────────────────────────────────────────│
//! │  2. INSERT sale header (total 0)  ← first statement is a write, so the │
//! │                                     transaction waits for the write    │
//! │                                     lock and sees only committed data  │
//! │  3. for each line: read product, INSERT line with its current price    │
//! │  4. UPDATE sale total = Σ subtotals (checked; overflow aborts)         │
//! │  5. for each line: UPDATE stock = stock - qty WHERE stock >= qty       │
//! │        0 rows ──► ROLLBACK ─────────────────────────► InsufficientStock│
//! │  6. INSERT audit entry (Sale, INSERT, actor = seller's username)       │
//! │  ── COMMIT ────────────────────────────────────────────────────────────│
//! │                                                                         │
//! │  Any storage fault in 2-7 ──► ROLLBACK ──────────► TransactionFailed   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 1 only gives early, precise errors. The conditional decrement in
//! step 5 is what keeps stock non-negative when sellers race.
//!
//! The engine does not authorize; the request layer checks
//! `Action::Sell` before calling in.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info, warn};

use crate::repository::audit::AuditLog;
use crate::repository::product::InventoryStore;
use crate::repository::sale::SaleRepository;
use crate::repository::user::UserRepository;
use vendo_core::sale::{consolidate_lines, sale_audit_description};
use vendo_core::{
    audit_entity, AuditAction, LineRequest, Money, NewAuditEntry, SaleError, SaleOutcome,
    SaleReceipt, DEFAULT_CURRENCY_SYMBOL,
};

#[derive(Debug, Clone)]
pub struct SaleEngine {
    pool: SqlitePool,
    currency_symbol: String,
}

impl SaleEngine {
    pub fn new(pool: SqlitePool) -> Self {
        SaleEngine {
            pool,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// Registers a sale, all-or-nothing.
    ///
    /// ## Returns
    /// * `Ok(SaleReceipt)` - committed; `total` is Σ quantity × current unit price
    /// * `Err(EmptyOrder)` - no line with a positive quantity
    /// * `Err(ProductNotFound)` / `Err(InsufficientStock)` - nothing was written
    /// * `Err(TransactionFailed)` - storage fault; everything rolled back
    pub async fn register_sale(
        &self,
        customer_id: i64,
        seller_id: i64,
        sale_date: NaiveDate,
        requests: &[LineRequest],
    ) -> Result<SaleReceipt, SaleError> {
        let lines = consolidate_lines(requests);
        if lines.is_empty() {
            info!(customer_id, seller_id, "Sale rejected: no positive lines");
            return Err(SaleError::EmptyOrder);
        }

        self.precheck(&lines).await.inspect_err(log_rejection)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!(error = %e, "Could not begin sale transaction");
            SaleError::transaction_failed(e)
        })?;

        match self
            .apply(&mut *tx, customer_id, seller_id, sale_date, &lines)
            .await
        {
            Ok(receipt) => {
                tx.commit().await.map_err(|e| {
                    error!(error = %e, "Sale commit failed");
                    SaleError::transaction_failed(e)
                })?;

                info!(
                    sale_id = receipt.sale_id,
                    customer_id,
                    seller_id,
                    total = %receipt.total,
                    lines = lines.len(),
                    "Sale registered"
                );
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "Sale rollback failed");
                }
                log_rejection(&err);
                Err(err)
            }
        }
    }

    /// Same as [`register_sale`](Self::register_sale), shaped for callers.
    pub async fn register_sale_outcome(
        &self,
        customer_id: i64,
        seller_id: i64,
        sale_date: NaiveDate,
        requests: &[LineRequest],
    ) -> SaleOutcome {
        SaleOutcome::from(
            self.register_sale(customer_id, seller_id, sale_date, requests)
                .await,
        )
    }

    /// Fail-fast validation against committed state.
    async fn precheck(&self, lines: &[LineRequest]) -> Result<(), SaleError> {
        for line in lines {
            let product = InventoryStore::fetch_product(&self.pool, line.product_id)
                .await?
                .ok_or(SaleError::ProductNotFound {
                    product_id: line.product_id,
                })?;

            if !product.can_sell(line.quantity) {
                return Err(SaleError::InsufficientStock {
                    product_id: product.id,
                    requested: line.quantity,
                    available: product.stock,
                });
            }
        }
        Ok(())
    }

    /// Steps 2-6. Every statement goes through `conn`.
    async fn apply(
        &self,
        conn: &mut SqliteConnection,
        customer_id: i64,
        seller_id: i64,
        sale_date: NaiveDate,
        lines: &[LineRequest],
    ) -> Result<SaleReceipt, SaleError> {
        let sale_id = SaleRepository::insert_header(&mut *conn, sale_date, customer_id, seller_id)
            .await?;

        let mut total = Money::zero();
        for line in lines {
            let product = InventoryStore::fetch_product(&mut *conn, line.product_id)
                .await?
                .ok_or(SaleError::ProductNotFound {
                    product_id: line.product_id,
                })?;

            SaleRepository::insert_line(
                &mut *conn,
                sale_id,
                product.id,
                line.quantity,
                product.price_cents,
            )
            .await?;

            total = product
                .price()
                .checked_multiply_quantity(line.quantity)
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or_else(|| {
                    SaleError::transaction_failed(format!(
                        "sale total overflows at product {}",
                        product.id
                    ))
                })?;
        }

        SaleRepository::set_total(&mut *conn, sale_id, total.cents()).await?;

        for line in lines {
            InventoryStore::decrement_stock(&mut *conn, line.product_id, line.quantity).await?;
        }

        // the header insert already proved the seller exists
        let seller = UserRepository::fetch_username(&mut *conn, seller_id)
            .await?
            .ok_or_else(|| SaleError::transaction_failed(format!("seller {seller_id} vanished")))?;

        AuditLog::record(
            &mut *conn,
            &NewAuditEntry::new(
                audit_entity::SALE,
                AuditAction::Insert,
                sale_id,
                &seller,
                sale_audit_description(customer_id, total, &self.currency_symbol),
            ),
        )
        .await?;

        Ok(SaleReceipt { sale_id, total })
    }
}

fn log_rejection(err: &SaleError) {
    match err {
        SaleError::TransactionFailed { cause } => {
            error!(cause = %cause, "Sale transaction failed");
        }
        SaleError::InsufficientStock {
            product_id,
            requested,
            available,
        } => {
            warn!(product_id, requested, available, "Sale rejected: insufficient stock");
        }
        SaleError::ProductNotFound { product_id } => {
            warn!(product_id, "Sale rejected: unknown product");
        }
        SaleError::EmptyOrder => {
            info!("Sale rejected: empty order");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
