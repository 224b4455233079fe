//! # User Repository
//!
//! Back-office accounts, password verification and session audit.
//!
//! ## Login Flow
//! ```text
//! authenticate(username, password)
//!      │
//!      ├── no such user / inactive ──────────► Ok(None)
//!      ├── hash does not verify ────────────► Ok(None)
//!      │
//!      └── verified ──► LOGIN audit entry ──► Ok(Some(user))
//!                                               │
//!                                               ▼
//!                                       user.principal() travels with
//!                                       every later call
//! ```
//!
//! Passwords are stored as argon2 PHC strings.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::rand_core::OsRng;
use password_hash::SaltString;
use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::audit::AuditLog;
use vendo_core::validation::{validate_display_name, validate_password, validate_username};
use vendo_core::{audit_entity, AuditAction, NewAuditEntry, NewUser, Principal, User};

const SELECT_USER: &str = r#"
    SELECT id, username, password_hash, role, display_name, is_active, created_at
    FROM users
"#;

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Credential(e.to_string()))?;
    Ok(hash.to_string())
}

/// Checks a password against a stored hash. Unparseable hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    async fn fetch_by_username<'e, E>(executor: E, username: &str) -> DbResult<Option<User>>
    where
        E: SqliteExecutor<'e>,
    {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE username = ?1"))
            .bind(username)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    /// Username for `id`, read through the given executor.
    pub(crate) async fn fetch_username<'e, E>(executor: E, id: i64) -> DbResult<Option<String>>
    where
        E: SqliteExecutor<'e>,
    {
        let username: Option<String> =
            sqlx::query_scalar("SELECT username FROM users WHERE id = ?1")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(username)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        Self::fetch_by_username(&self.pool, username.trim()).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Creates an account with a freshly hashed password.
    pub async fn create(&self, user: &NewUser) -> DbResult<User> {
        let username = user.username.trim();
        validate_username(username)?;
        validate_password(&user.password)?;
        validate_display_name(user.display_name.as_deref())?;

        if Self::fetch_by_username(&self.pool, username).await?.is_some() {
            return Err(DbError::duplicate("username", username));
        }

        let password_hash = hash_password(&user.password)?;

        let id = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, display_name, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(user.role.as_str())
        .bind(&user.display_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(user_id = id, username = %username, role = %user.role, "User created");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Verifies credentials and records the login.
    ///
    /// Returns `Ok(None)` for unknown users, inactive accounts and wrong
    /// passwords alike.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let Some(user) = Self::fetch_by_username(&self.pool, username.trim()).await? else {
            warn!(username = %username, "Login attempt for unknown user");
            return Ok(None);
        };

        if !user.is_active || !verify_password(password, &user.password_hash) {
            warn!(username = %user.username, "Login refused");
            return Ok(None);
        }

        AuditLog::record(
            &self.pool,
            &NewAuditEntry::new(
                audit_entity::USER,
                AuditAction::Login,
                user.id,
                &user.username,
                format!("Login: {}", user.username),
            ),
        )
        .await?;

        info!(user_id = user.id, "User logged in");
        Ok(Some(user))
    }

    pub async fn record_logout(&self, principal: &Principal) -> DbResult<()> {
        AuditLog::record(
            &self.pool,
            &NewAuditEntry::new(
                audit_entity::USER,
                AuditAction::Logout,
                principal.user_id,
                &principal.username,
                format!("Logout: {}", principal.username),
            ),
        )
        .await?;

        info!(user_id = principal.user_id, "User logged out");
        Ok(())
    }

    pub async fn set_active(&self, id: i64, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }
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
    use vendo_core::{Action, Role};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn seller() -> NewUser {
        NewUser {
            username: "seller1".to_string(),
            password: "Seller123!".to_string(),
            role: Role::Seller,
            display_name: Some("Ana Torres".to_string()),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Secret123", &hash));
        assert!(!verify_password("secret123", &hash));
        assert!(!verify_password("Secret123", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let db = setup().await;
        let users = db.users();

        let created = users.create(&seller()).await.unwrap();
        assert_eq!(created.role(), Some(Role::Seller));
        assert!(created.is_active);
        assert_ne!(created.password_hash, "Seller123!");

        let logged_in = users
            .authenticate("seller1", "Seller123!")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(logged_in.id, created.id);

        let principal = logged_in.principal();
        assert!(principal.can(Action::Sell));
        assert!(!principal.can(Action::Delete));

        let history = db
            .audit()
            .for_entity(audit_entity::USER, created.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, AuditAction::Login);
        assert_eq!(history[0].actor, "seller1");
    }

    #[tokio::test]
    async fn test_failed_logins_are_not_audited_as_login() {
        let db = setup().await;
        let users = db.users();
        let created = users.create(&seller()).await.unwrap();

        assert!(users.authenticate("seller1", "wrong").await.unwrap().is_none());
        assert!(users.authenticate("nobody", "Seller123!").await.unwrap().is_none());

        users.set_active(created.id, false).await.unwrap();
        assert!(users
            .authenticate("seller1", "Seller123!")
            .await
            .unwrap()
            .is_none());

        assert_eq!(db.audit().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_logout_is_audited() {
        let db = setup().await;
        let users = db.users();
        let created = users.create(&seller()).await.unwrap();

        users.record_logout(&created.principal()).await.unwrap();

        let recent = db.audit().recent(1).await.unwrap();
        assert_eq!(recent[0].action, AuditAction::Logout);
        assert_eq!(recent[0].entity_id, Some(created.id));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = setup().await;
        let users = db.users();
        users.create(&seller()).await.unwrap();

        let err = users.create(&seller()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_active_missing_user() {
        let db = setup().await;
        let err = db.users().set_active(99, false).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
