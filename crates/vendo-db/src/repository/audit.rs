//! # Audit Log
//!
//! Append-only record of business-relevant state changes.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  mutation (sale, product, customer) inside an open transaction         │
//! │       │                                                                 │
//! │       ├── INSERT/UPDATE/DELETE the entity                              │
//! │       │                                                                 │
//! │       └── AuditLog::record(&mut *tx, entry) ← same transaction         │
//! │                 │                                                       │
//! │                 ├── Ok  → caller commits both                          │
//! │                 └── Err → caller rolls back both                       │
//! │                                                                         │
//! │  Rows are never updated or deleted (enforced by triggers).             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use vendo_core::{AuditEntry, NewAuditEntry};

const SELECT_AUDIT: &str = r#"
    SELECT id, entity, action, entity_id, recorded_at, actor, description
    FROM audit_entries
"#;

/// Read/write access to the audit log.
#[derive(Debug, Clone)]
pub struct AuditLog {
    pool: SqlitePool,
}

impl AuditLog {
    pub fn new(pool: SqlitePool) -> Self {
        AuditLog { pool }
    }

    /// Appends one entry through the given executor.
    ///
    /// Pass `&mut *tx` to make the entry part of a larger atomic unit;
    /// a failure here must roll that unit back.
    pub async fn record<'e, E>(executor: E, entry: &NewAuditEntry) -> DbResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(
            entity = %entry.entity,
            action = %entry.action,
            entity_id = ?entry.entity_id,
            "Recording audit entry"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO audit_entries (entity, action, entity_id, recorded_at, actor, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&entry.entity)
        .bind(entry.action)
        .bind(entry.entity_id)
        .bind(Utc::now())
        .bind(&entry.actor)
        .bind(&entry.description)
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Appends one entry on its own, outside any caller transaction.
    pub async fn append(&self, entry: &NewAuditEntry) -> DbResult<i64> {
        Self::record(&self.pool, entry).await
    }

    /// Most recent entries first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(&format!(
            "{SELECT_AUDIT} ORDER BY id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Entries about one entity, oldest first.
    pub async fn for_entity(&self, entity: &str, entity_id: i64) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(&format!(
            "{SELECT_AUDIT} WHERE entity = ?1 AND entity_id = ?2 ORDER BY id"
        ))
        .bind(entity)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn count(&self) -> DbResult<i64> {
        Self::count_with(&self.pool).await
    }

    pub(crate) async fn count_with<'e, E>(executor: E) -> DbResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_entries")
            .fetch_one(executor)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use vendo_core::{audit_entity, AuditAction};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let db = setup().await;
        let audit = db.audit();

        audit
            .append(&NewAuditEntry::new(
                audit_entity::PRODUCT,
                AuditAction::Insert,
                7,
                "admin",
                "Product: Sofa, price: 850.00, stock: 25",
            ))
            .await
            .unwrap();
        audit
            .append(&NewAuditEntry::new(
                audit_entity::PRODUCT,
                AuditAction::Update,
                7,
                "admin",
                "Product updated: Sofa",
            ))
            .await
            .unwrap();

        assert_eq!(audit.count().await.unwrap(), 2);

        let recent = audit.recent(10).await.unwrap();
        assert_eq!(recent[0].action, AuditAction::Update);
        assert_eq!(recent[1].action, AuditAction::Insert);

        let history = audit.for_entity(audit_entity::PRODUCT, 7).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].description, "Product: Sofa, price: 850.00, stock: 25");
        assert_eq!(history[0].actor, "admin");
        assert_eq!(history[0].entity_id, Some(7));
    }

    #[tokio::test]
    async fn test_recent_respects_limit() {
        let db = setup().await;
        let audit = db.audit();
        for i in 0..5 {
            audit
                .append(&NewAuditEntry::new("Sale", AuditAction::Insert, i, "system", "x"))
                .await
                .unwrap();
        }
        assert_eq!(audit.recent(3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_entries_cannot_be_changed() {
        let db = setup().await;
        db.audit()
            .append(&NewAuditEntry::new("Sale", AuditAction::Insert, 1, "system", "x"))
            .await
            .unwrap();

        let update: Result<_, DbError> = sqlx::query("UPDATE audit_entries SET actor = 'mallory'")
            .execute(db.pool())
            .await
            .map_err(DbError::from);
        assert!(update.is_err());

        let delete: Result<_, DbError> = sqlx::query("DELETE FROM audit_entries")
            .execute(db.pool())
            .await
            .map_err(DbError::from);
        assert!(delete.is_err());

        assert_eq!(db.audit().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_inside_rolled_back_transaction_leaves_nothing() {
        let db = setup().await;

        let mut tx = db.pool().begin().await.unwrap();
        AuditLog::record(
            &mut *tx,
            &NewAuditEntry::new("Sale", AuditAction::Insert, 1, "system", "x"),
        )
        .await
        .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(db.audit().count().await.unwrap(), 0);
    }
}
