//! # Sale Repository
//!
//! Sale headers and their line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. REGISTER (SaleEngine, one transaction)                             │
//! │     └── insert_header() → Sale { total: 0 }                            │
//! │     └── insert_line()   → SaleLine (price captured from product)       │
//! │     └── set_total()     → Σ subtotals                                  │
//! │                                                                         │
//! │  2. READ                                                               │
//! │     └── get_by_id(), get_detail(), list(), count()                     │
//! │                                                                         │
//! │  3. (OPTIONAL) DELETE                                                  │
//! │     └── delete() → lines removed by ON DELETE CASCADE, DELETE audit   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line prices are never updated; a trigger rejects any attempt.

use chrono::NaiveDate;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::audit::AuditLog;
use vendo_core::{audit_entity, AuditAction, NewAuditEntry, Principal, Sale, SaleDetail, SaleLine};

const SELECT_SALE: &str = r#"
    SELECT id, sale_date, customer_id, seller_id, total_cents
    FROM sales
"#;

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Writes used by the sale engine (caller owns the transaction)
    // =========================================================================

    /// Inserts a header with a provisional zero total; returns its id.
    pub(crate) async fn insert_header<'e, E>(
        executor: E,
        sale_date: NaiveDate,
        customer_id: i64,
        seller_id: i64,
    ) -> DbResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let id = sqlx::query(
            r#"
            INSERT INTO sales (sale_date, customer_id, seller_id, total_cents)
            VALUES (?1, ?2, ?3, 0)
            "#,
        )
        .bind(sale_date)
        .bind(customer_id)
        .bind(seller_id)
        .execute(executor)
        .await?
        .last_insert_rowid();

        debug!(sale_id = id, customer_id, seller_id, "Sale header inserted");
        Ok(id)
    }

    pub(crate) async fn insert_line<'e, E>(
        executor: E,
        sale_id: i64,
        product_id: i64,
        quantity: i64,
        unit_price_cents: i64,
    ) -> DbResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let id = sqlx::query(
            r#"
            INSERT INTO sale_lines (sale_id, product_id, quantity, unit_price_cents)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price_cents)
        .execute(executor)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub(crate) async fn set_total<'e, E>(executor: E, sale_id: i64, total_cents: i64) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("UPDATE sales SET total_cents = ?2 WHERE id = ?1")
            .bind(sale_id)
            .bind(total_cents)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", sale_id));
        }
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    /// Lines of a sale in insertion order.
    pub async fn get_lines(&self, sale_id: i64) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_cents
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    /// Header plus ordered lines.
    pub async fn get_detail(&self, id: i64) -> DbResult<Option<SaleDetail>> {
        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let lines = self.get_lines(id).await?;
        Ok(Some(SaleDetail { sale, lines }))
    }

    /// All sales, newest date first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "{SELECT_SALE} ORDER BY sale_date DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_lines(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_lines")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes a sale and writes its DELETE audit entry; its lines go with it.
    ///
    /// Stock is not restored.
    pub async fn delete(&self, actor: &Principal, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        AuditLog::record(
            &mut *tx,
            &NewAuditEntry::new(
                audit_entity::SALE,
                AuditAction::Delete,
                id,
                &actor.username,
                format!(
                    "Sale deleted: customer {}, total {}",
                    sale.customer_id,
                    sale.total()
                ),
            ),
        )
        .await?;

        tx.commit().await?;

        info!(sale_id = id, "Sale deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
