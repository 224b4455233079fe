//! # Inventory Store
//!
//! Products and their stock levels.
//!
//! ## Atomic Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two sellers, one unit left                                            │
//! │                                                                         │
//! │  Seller A                          Seller B                            │
//! │  UPDATE products                   UPDATE products                     │
//! │     SET stock = stock - 1             SET stock = stock - 1            │
//! │   WHERE id = 7 AND stock >= 1       WHERE id = 7 AND stock >= 1        │
//! │       │                                 │                              │
//! │       ▼                                 ▼                              │
//! │  rows_affected = 1 ✓               rows_affected = 0                   │
//! │                                         │                              │
//! │                                         ▼                              │
//! │                                    re-read stock → InsufficientStock   │
//! │                                                                         │
//! │  The check and the write are one statement, so stock can never go      │
//! │  below zero regardless of what either caller read earlier.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalogue mutations write their audit entry in the same transaction as
//! the row change.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult, InventoryError};
use crate::repository::audit::AuditLog;
use vendo_core::validation::validate_new_product;
use vendo_core::{audit_entity, AuditAction, NewAuditEntry, NewProduct, Principal, Product};

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, description, price_cents, stock
    FROM products
"#;

/// Repository for products and stock.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    pool: SqlitePool,
}

impl InventoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryStore { pool }
    }

    // =========================================================================
    // Executor-level operations (usable inside a caller's transaction)
    // =========================================================================

    /// Looks up one product through the given executor.
    pub async fn fetch_product<'e, E>(executor: E, id: i64) -> DbResult<Option<Product>>
    where
        E: SqliteExecutor<'e>,
    {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(product)
    }

    /// Takes `amount` units out of stock, or fails without changing anything.
    ///
    /// ## Returns
    /// * `Ok(())` - exactly one row was decremented
    /// * `Err(InsufficientStock)` - stock at the moment of the update was below `amount`
    /// * `Err(ProductNotFound)` - no such product
    pub async fn decrement_stock(
        conn: &mut sqlx::SqliteConnection,
        product_id: i64,
        amount: i64,
    ) -> Result<(), InventoryError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?1
            WHERE id = ?2 AND stock >= ?1
            "#,
        )
        .bind(amount)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 1 {
            debug!(product_id, amount, "Stock decremented");
            return Ok(());
        }

        let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

        match available {
            Some(available) => Err(InventoryError::InsufficientStock {
                product_id,
                requested: amount,
                available,
            }),
            None => Err(InventoryError::ProductNotFound { product_id }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get_product(&self, id: i64) -> DbResult<Option<Product>> {
        Self::fetch_product(&self.pool, id).await
    }

    /// All products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} ORDER BY name, id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Products that can currently be sold (stock > 0).
    pub async fn list_in_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCT} WHERE stock > 0 ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of products with stock at or below `threshold`.
    pub async fn count_low_stock(&self, threshold: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock <= ?1")
            .bind(threshold)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a product and its INSERT audit entry atomically.
    pub async fn create(&self, actor: &Principal, product: &NewProduct) -> DbResult<Product> {
        validate_new_product(product)?;

        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO products (name, description, price_cents, stock)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(product.name.trim())
        .bind(product.description.trim())
        .bind(product.price_cents)
        .bind(product.stock)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        AuditLog::record(
            &mut *tx,
            &NewAuditEntry::new(
                audit_entity::PRODUCT,
                AuditAction::Insert,
                id,
                &actor.username,
                format!(
                    "Product: {}, price: {}, stock: {}",
                    product.name.trim(),
                    product.price(),
                    product.stock
                ),
            ),
        )
        .await?;

        let created = Self::fetch_product(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        tx.commit().await?;

        info!(product_id = id, name = %created.name, "Product created");
        Ok(created)
    }

    /// Replaces a product's editable fields.
    ///
    /// Sales already registered keep their captured line prices.
    pub async fn update(&self, actor: &Principal, id: i64, product: &NewProduct) -> DbResult<Product> {
        validate_new_product(product)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?2, description = ?3, price_cents = ?4, stock = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(product.name.trim())
        .bind(product.description.trim())
        .bind(product.price_cents)
        .bind(product.stock)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        AuditLog::record(
            &mut *tx,
            &NewAuditEntry::new(
                audit_entity::PRODUCT,
                AuditAction::Update,
                id,
                &actor.username,
                format!("Product updated: {}", product.name.trim()),
            ),
        )
        .await?;

        let updated = Self::fetch_product(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        tx.commit().await?;

        info!(product_id = id, "Product updated");
        Ok(updated)
    }

    /// Deletes a product that no sale line references.
    pub async fn delete(&self, actor: &Principal, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let product = Self::fetch_product(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sale_lines WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if references > 0 {
            return Err(DbError::in_use(
                "Product",
                id,
                format!("product appears in {} sale lines", references),
            ));
        }

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        AuditLog::record(
            &mut *tx,
            &NewAuditEntry::new(
                audit_entity::PRODUCT,
                AuditAction::Delete,
                id,
                &actor.username,
                format!("Product deleted: {}", product.name),
            ),
        )
        .await?;

        tx.commit().await?;

        info!(product_id = id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
