//! # Customer Repository
//!
//! Customer registration, edits and guarded deletion.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::audit::AuditLog;
use vendo_core::validation::validate_new_customer;
use vendo_core::{audit_entity, AuditAction, Customer, NewAuditEntry, NewCustomer, Principal};

const SELECT_CUSTOMER: &str = r#"
    SELECT id, document_number, given_names, family_names, address, phone
    FROM customers
"#;

/// Empty optional text is stored as NULL.
fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    async fn fetch<'e, E>(executor: E, id: i64) -> DbResult<Option<Customer>>
    where
        E: SqliteExecutor<'e>,
    {
        let customer =
            sqlx::query_as::<_, Customer>(&format!("{SELECT_CUSTOMER} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(customer)
    }

    async fn document_taken<'e, E>(executor: E, document: &str, except_id: i64) -> DbResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let taken: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers WHERE document_number = ?1 AND id != ?2",
        )
        .bind(document)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        Self::fetch(&self.pool, id).await
    }

    pub async fn get_by_document(&self, document_number: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "{SELECT_CUSTOMER} WHERE document_number = ?1"
        ))
        .bind(document_number.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    /// All customers ordered by family then given names.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "{SELECT_CUSTOMER} ORDER BY family_names, given_names, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Registers a customer.
    ///
    /// ## Errors
    /// * `Validation` - a field breaks the customer rules
    /// * `UniqueViolation` - the document number is already registered
    pub async fn create(&self, actor: &Principal, customer: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(customer)?;
        let document = customer.document_number.trim();

        let mut tx = self.pool.begin().await?;

        if Self::document_taken(&mut *tx, document, 0).await? {
            return Err(DbError::duplicate("document_number", document));
        }

        let id = sqlx::query(
            r#"
            INSERT INTO customers (document_number, given_names, family_names, address, phone)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(document)
        .bind(customer.given_names.trim())
        .bind(customer.family_names.trim())
        .bind(normalize(&customer.address))
        .bind(normalize(&customer.phone))
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        AuditLog::record(
            &mut *tx,
            &NewAuditEntry::new(
                audit_entity::CUSTOMER,
                AuditAction::Insert,
                id,
                &actor.username,
                format!(
                    "Customer: {} {}, document: {}",
                    customer.given_names.trim(),
                    customer.family_names.trim(),
                    document
                ),
            ),
        )
        .await?;

        let created = Self::fetch(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        tx.commit().await?;

        info!(customer_id = id, "Customer registered");
        Ok(created)
    }

    /// Updates a customer in place.
    ///
    /// The document number may change only to one no other customer holds.
    pub async fn update(
        &self,
        actor: &Principal,
        id: i64,
        customer: &NewCustomer,
    ) -> DbResult<Customer> {
        validate_new_customer(customer)?;
        let document = customer.document_number.trim();

        let mut tx = self.pool.begin().await?;

        if Self::document_taken(&mut *tx, document, id).await? {
            return Err(DbError::duplicate("document_number", document));
        }

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET document_number = ?2, given_names = ?3, family_names = ?4, address = ?5, phone = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(document)
        .bind(customer.given_names.trim())
        .bind(customer.family_names.trim())
        .bind(normalize(&customer.address))
        .bind(normalize(&customer.phone))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        AuditLog::record(
            &mut *tx,
            &NewAuditEntry::new(
                audit_entity::CUSTOMER,
                AuditAction::Update,
                id,
                &actor.username,
                format!("Customer updated: {}", document),
            ),
        )
        .await?;

        let updated = Self::fetch(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        tx.commit().await?;

        info!(customer_id = id, "Customer updated");
        Ok(updated)
    }

    /// Deletes a customer who owns no sales.
    pub async fn delete(&self, actor: &Principal, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let customer = Self::fetch(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE customer_id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if sales > 0 {
            return Err(DbError::in_use(
                "Customer",
                id,
                format!("customer has {} registered sales", sales),
            ));
        }

        sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        AuditLog::record(
            &mut *tx,
            &NewAuditEntry::new(
                audit_entity::CUSTOMER,
                AuditAction::Delete,
                id,
                &actor.username,
                format!("Customer deleted: {}", customer.document_number),
            ),
        )
        .await?;

        tx.commit().await?;

        info!(customer_id = id, "Customer deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn lucia() -> NewCustomer {
        NewCustomer {
            document_number: "45781236".to_string(),
            given_names: "Lucía".to_string(),
            family_names: "Quispe Mamani".to_string(),
            address: Some("Av. Los Próceres 120".to_string()),
            phone: Some("987654321".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let db = setup().await;
        let repo = db.customers();

        let created = repo.create(&Principal::system(), &lucia()).await.unwrap();
        assert_eq!(created.full_name(), "Lucía Quispe Mamani");

        let by_doc = repo.get_by_document("45781236").await.unwrap().unwrap();
        assert_eq!(by_doc, created);
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), Some(created));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_blank_optional_fields_are_null() {
        let db = setup().await;
        let mut c = lucia();
        c.address = Some("   ".to_string());
        c.phone = None;

        let created = db.customers().create(&Principal::system(), &c).await.unwrap();
        assert_eq!(created.address, None);
        assert_eq!(created.phone, None);
    }

    #[tokio::test]
    async fn test_duplicate_document_rejected() {
        let db = setup().await;
        let repo = db.customers();
        repo.create(&Principal::system(), &lucia()).await.unwrap();

        let mut other = lucia();
        other.given_names = "Rosa".to_string();
        let err = repo.create(&Principal::system(), &other).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_cannot_steal_document() {
        let db = setup().await;
        let repo = db.customers();
        let actor = Principal::system();
        repo.create(&actor, &lucia()).await.unwrap();

        let mut second = lucia();
        second.document_number = "70112233".to_string();
        let second = repo.create(&actor, &second).await.unwrap();

        let mut edit = lucia();
        edit.given_names = "Rosa".to_string();
        let err = repo.update(&actor, second.id, &edit).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // keeping its own document is fine
        edit.document_number = "70112233".to_string();
        let updated = repo.update(&actor, second.id, &edit).await.unwrap();
        assert_eq!(updated.given_names, "Rosa");
    }

    #[tokio::test]
    async fn test_delete_is_audited() {
        let db = setup().await;
        let repo = db.customers();
        let actor = Principal::system();
        let created = repo.create(&actor, &lucia()).await.unwrap();

        repo.delete(&actor, created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());

        let history = db
            .audit()
            .for_entity(audit_entity::CUSTOMER, created.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].action, AuditAction::Delete);
    }

    #[tokio::test]
    async fn test_delete_missing_customer() {
        let db = setup().await;
        let err = db
            .customers()
            .delete(&Principal::system(), 77)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_invalid_document_rejected() {
        let db = setup().await;
        let mut c = lucia();
        c.document_number = "1234".to_string();
        let err = db.customers().create(&Principal::system(), &c).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
