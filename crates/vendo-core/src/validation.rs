//! # Validation Module
//!
//! Input validation for the request layer and the repositories.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request layer (outside this workspace)                       │
//! │  ├── Form parsing into primitives                                      │
//! │  └── filter_order_lines: drop quantity ≤ 0                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repositories / sale engine (vendo-db)                        │
//! │  └── THIS MODULE: field rules before any write                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (quantity > 0)                          │
//! │  ├── UNIQUE document number / username                                 │
//! │  └── Foreign keys, immutable-price and append-only triggers            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vendo_core::validation::{validate_document_number, validate_quantity};
//!
//! validate_document_number("45781236").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::sale::LineRequest;
use crate::types::{NewCustomer, NewProduct};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const DOCUMENT_NUMBER_LEN: usize = 8;
pub const MAX_PERSON_NAME_LEN: usize = 50;
pub const MAX_ADDRESS_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 9;
pub const MAX_PRODUCT_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 100;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_DISPLAY_NAME_LEN: usize = 120;
pub const MIN_PASSWORD_LEN: usize = 8;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn at_most(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Customer Validators
// =============================================================================

/// Validates a national identity document number.
///
/// ## Rules
/// - Exactly 8 characters
/// - ASCII digits only
///
/// ```rust
/// use vendo_core::validation::validate_document_number;
///
/// assert!(validate_document_number("45781236").is_ok());
/// assert!(validate_document_number("4578123").is_err());
/// assert!(validate_document_number("4578123A").is_err());
/// ```
pub fn validate_document_number(document: &str) -> ValidationResult<()> {
    let document = document.trim();
    required("document_number", document)?;

    if document.len() != DOCUMENT_NUMBER_LEN || !document.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "document_number".to_string(),
            reason: format!("must be exactly {} digits", DOCUMENT_NUMBER_LEN),
        });
    }

    Ok(())
}

/// Validates given or family names (required, at most 50 characters).
pub fn validate_person_name(field: &str, name: &str) -> ValidationResult<()> {
    required(field, name)?;
    at_most(field, name, MAX_PERSON_NAME_LEN)
}

/// Validates an optional phone number (digits only, at most 9).
pub fn validate_phone(phone: Option<&str>) -> ValidationResult<()> {
    let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    at_most("phone", phone, MAX_PHONE_LEN)?;
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Validates all customer fields.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_document_number(&customer.document_number)?;
    validate_person_name("given_names", &customer.given_names)?;
    validate_person_name("family_names", &customer.family_names)?;
    if let Some(address) = &customer.address {
        at_most("address", address, MAX_ADDRESS_LEN)?;
    }
    validate_phone(customer.phone.as_deref())
}

// =============================================================================
// Product Validators
// =============================================================================

pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name", name)?;
    at_most("name", name, MAX_PRODUCT_NAME_LEN)
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (giveaways)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    required("description", &product.description)?;
    at_most("description", &product.description, MAX_DESCRIPTION_LEN)?;
    validate_price_cents(product.price_cents)?;
    validate_stock(product.stock)
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates a single line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Turns submitted `(product_id, quantity)` pairs into line requests.
///
/// ## Two Kinds of "Empty"
/// ```text
/// []                      → Err(Required { field: "lines" })   nothing submitted
/// [(1, 0), (2, -1)]       → Ok([])                             nothing valid submitted
///                                                              (engine answers EmptyOrder)
/// [(1, 0), (2, 3)]        → Ok([LineRequest { 2, 3 }])
/// ```
///
/// Non-positive quantities are skipped silently; they are not an error.
/// A quantity above `MAX_ITEM_QUANTITY` is.
pub fn filter_order_lines(raw: &[(i64, i64)]) -> ValidationResult<Vec<LineRequest>> {
    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    raw.iter()
        .filter(|(_, quantity)| *quantity > 0)
        .map(|&(product_id, quantity)| -> ValidationResult<LineRequest> {
            validate_quantity(quantity)?;
            Ok(LineRequest::new(product_id, quantity))
        })
        .collect()
}

// =============================================================================
// Account Validators
// =============================================================================

pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();
    required("username", username)?;
    at_most("username", username, MAX_USERNAME_LEN)?;

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, hyphens and underscores"
                .to_string(),
        });
    }

    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: format!("must be at least {} characters", MIN_PASSWORD_LEN),
        });
    }
    Ok(())
}

pub fn validate_display_name(display_name: Option<&str>) -> ValidationResult<()> {
    match display_name {
        Some(name) => at_most("display_name", name, MAX_DISPLAY_NAME_LEN),
        None => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> NewCustomer {
        NewCustomer {
            document_number: "45781236".to_string(),
            given_names: "Lucía".to_string(),
            family_names: "Quispe Mamani".to_string(),
            address: Some("Av. Los Próceres 120".to_string()),
            phone: Some("987654321".to_string()),
        }
    }

    #[test]
    fn test_validate_document_number() {
        assert!(validate_document_number("45781236").is_ok());
        assert!(validate_document_number(" 45781236 ").is_ok());

        assert!(matches!(
            validate_document_number(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_document_number("457812365").is_err());
        assert!(validate_document_number("4578-236").is_err());
    }

    #[test]
    fn test_validate_new_customer() {
        assert!(validate_new_customer(&customer()).is_ok());

        let mut c = customer();
        c.given_names = "  ".to_string();
        assert!(validate_new_customer(&c).is_err());

        let mut c = customer();
        c.address = Some("x".repeat(101));
        assert!(matches!(
            validate_new_customer(&c),
            Err(ValidationError::TooLong { max: 100, .. })
        ));

        let mut c = customer();
        c.phone = Some("98765432a".to_string());
        assert!(validate_new_customer(&c).is_err());

        let mut c = customer();
        c.phone = None;
        c.address = None;
        assert!(validate_new_customer(&c).is_ok());
    }

    #[test]
    fn test_validate_new_product() {
        let product = NewProduct {
            name: "Three-seat sofa".to_string(),
            description: "Grey fabric".to_string(),
            price_cents: 85000,
            stock: 25,
        };
        assert!(validate_new_product(&product).is_ok());

        let mut p = product.clone();
        p.stock = -1;
        assert!(validate_new_product(&p).is_err());

        let mut p = product.clone();
        p.price_cents = -100;
        assert!(validate_new_product(&p).is_err());

        let mut p = product;
        p.description = String::new();
        assert!(validate_new_product(&p).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_filter_order_lines_nothing_submitted() {
        assert_eq!(
            filter_order_lines(&[]),
            Err(ValidationError::Required {
                field: "lines".to_string()
            })
        );
    }

    #[test]
    fn test_filter_order_lines_nothing_valid() {
        assert_eq!(filter_order_lines(&[(1, 0), (2, -4)]), Ok(vec![]));
    }

    #[test]
    fn test_filter_order_lines_keeps_positive() {
        assert_eq!(
            filter_order_lines(&[(1, 0), (2, 3), (5, 1)]),
            Ok(vec![LineRequest::new(2, 3), LineRequest::new(5, 1)])
        );
    }

    #[test]
    fn test_filter_order_lines_caps_quantity() {
        assert_eq!(
            filter_order_lines(&[(1, 0), (2, MAX_ITEM_QUANTITY + 1)]),
            Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_ITEM_QUANTITY,
            })
        );
        assert_eq!(
            filter_order_lines(&[(2, MAX_ITEM_QUANTITY)]),
            Ok(vec![LineRequest::new(2, MAX_ITEM_QUANTITY)])
        );
    }

    #[test]
    fn test_validate_account_fields() {
        assert!(validate_username("seller.one").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_password("Seller123!").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_display_name(Some(&"x".repeat(121))).is_err());
    }
}
