//! Fixtures shared by the unit tests.

use chrono::Utc;

use crate::pool::Database;
use vendo_core::{NewCustomer, NewProduct, Principal};

/// Inserts a seller directly; argon2 hashing would slow every test down.
pub(crate) async fn seed_seller(db: &Database) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, role, display_name, is_active, created_at)
        VALUES ('seller1', 'unused', 'seller', 'Ana Torres', 1, ?1)
        "#,
    )
    .bind(Utc::now())
    .execute(db.pool())
    .await
    .unwrap()
    .last_insert_rowid()
}

pub(crate) async fn seed_customer(db: &Database) -> i64 {
    db.customers()
        .create(
            &Principal::system(),
            &NewCustomer {
                document_number: "45781236".to_string(),
                given_names: "Lucía".to_string(),
                family_names: "Quispe Mamani".to_string(),
                address: None,
                phone: None,
            },
        )
        .await
        .unwrap()
        .id
}

pub(crate) async fn seed_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> i64 {
    db.products()
        .create(
            &Principal::system(),
            &NewProduct {
                name: name.to_string(),
                description: format!("{name} for the showroom"),
                price_cents,
                stock,
            },
        )
        .await
        .unwrap()
        .id
}
