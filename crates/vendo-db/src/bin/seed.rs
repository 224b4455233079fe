//! # Seed Data Generator
//!
//! Populates an empty database with demo accounts, customers, products
//! and a month of historical sales.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by VENDO_DB_PATH (default ./vendo.db)
//! cargo run -p vendo-db --bin seed
//!
//! # Specify database path
//! cargo run -p vendo-db --bin seed -- --db ./data/vendo.db
//! ```
//!
//! ## Generated Data
//! - Accounts: `admin`, `seller1`, `seller2` and a read-only `viewer`
//! - Customers with unique 8-digit document numbers
//! - Furniture and home products with varied stock
//! - Historical sales dated 1 to 30 days back, registered through the
//!   sale engine so stock and audit stay consistent
//!
//! Nothing is written if any account already exists.

use chrono::Duration;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vendo_core::{LineRequest, NewCustomer, NewProduct, NewUser, Principal, Role};
use vendo_db::{AppConfig, Database};

const USERS: &[(&str, &str, Role, &str)] = &[
    ("admin", "Admin123!", Role::Admin, "Store Administrator"),
    ("seller1", "Seller123!", Role::Seller, "Ana Torres"),
    ("seller2", "Seller123!", Role::Seller, "Luis Ramos"),
    ("viewer", "Viewer123!", Role::Viewer, "Front Desk"),
];

/// (document, given names, family names, address, phone)
const CUSTOMERS: &[(&str, &str, &str, &str, &str)] = &[
    ("45781236", "Lucía", "Quispe Mamani", "Av. Los Próceres 120", "987654321"),
    ("70112233", "Jorge", "Salazar Ríos", "Jr. Ucayali 455", "912345678"),
    ("41236987", "María", "Huamán Flores", "Calle Las Begonias 87", "956123478"),
    ("72589634", "Carlos", "Mendoza Paredes", "Av. Arequipa 2310", "934567812"),
    ("46987123", "Rosa", "Condori Vargas", "Psje. Los Olivos 14", "978456123"),
    ("73214569", "Pedro", "Castillo Núñez", "Av. Brasil 1502", "923456781"),
    ("40875312", "Elena", "Rojas Gutiérrez", "Jr. Junín 310", "945612378"),
    ("71458963", "Miguel", "Chávez León", "Calle Colón 221", "967812345"),
];

/// (name, description, price in cents, stock)
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Three-seat sofa", "Grey fabric, solid pine frame", 85000, 25),
    ("Armchair", "Velvet upholstery, oak legs", 42000, 18),
    ("Dining table", "Six seats, tempered glass top", 120000, 8),
    ("Dining chair", "Stackable, beech wood", 12000, 60),
    ("Queen bed frame", "Upholstered headboard", 98000, 10),
    ("Wardrobe", "Three doors with mirror", 150000, 6),
    ("Bookshelf", "Five shelves, walnut finish", 35000, 20),
    ("Coffee table", "Round, marble effect", 28000, 15),
    ("Floor lamp", "Adjustable arm, warm LED", 9500, 40),
    ("Nightstand", "Two drawers, white lacquer", 18000, 30),
    ("Office desk", "120 cm, cable tray", 46000, 12),
    ("Office chair", "Mesh back, lumbar support", 38000, 9),
];

/// (days ago, customer index, seller index, [(product index, quantity)])
const HISTORICAL_SALES: &[(i64, usize, usize, &[(usize, i64)])] = &[
    (1, 0, 1, &[(0, 1), (2, 1), (6, 1)]),
    (2, 1, 2, &[(1, 1), (4, 1)]),
    (3, 2, 0, &[(8, 2), (9, 2), (3, 4)]),
    (4, 3, 1, &[(10, 1), (11, 1)]),
    (5, 4, 2, &[(3, 6), (7, 1)]),
    (7, 5, 0, &[(0, 1), (1, 2), (7, 1), (8, 1)]),
    (10, 6, 1, &[(5, 1), (9, 1)]),
    (12, 7, 2, &[(4, 1), (8, 1)]),
    (14, 0, 0, &[(6, 2), (10, 1)]),
    (15, 1, 1, &[(3, 2), (2, 1)]),
    (20, 2, 2, &[(11, 1), (8, 3)]),
    (22, 3, 0, &[(0, 1), (7, 1)]),
    (25, 4, 1, &[(5, 1)]),
    (28, 5, 2, &[(9, 2), (6, 1), (1, 1)]),
    (30, 6, 0, &[(10, 1), (11, 1), (8, 1)]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = AppConfig::from_env()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vendo Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $VENDO_DB_PATH or ./vendo.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    println!("🌱 Vendo Seed Data Generator");
    println!("============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config.db_config())
        .await?
        .with_currency_symbol(config.currency_symbol.clone());

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.users().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} accounts", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Accounts
    let mut user_ids = Vec::with_capacity(USERS.len());
    for (username, password, role, display_name) in USERS {
        let user = db
            .users()
            .create(&NewUser {
                username: username.to_string(),
                password: password.to_string(),
                role: *role,
                display_name: Some(display_name.to_string()),
            })
            .await?;
        user_ids.push(user.id);
    }
    println!("✓ Created {} accounts", user_ids.len());

    let actor = Principal::system();

    // Customers
    let mut customer_ids = Vec::with_capacity(CUSTOMERS.len());
    for (document, given, family, address, phone) in CUSTOMERS {
        let customer = db
            .customers()
            .create(
                &actor,
                &NewCustomer {
                    document_number: document.to_string(),
                    given_names: given.to_string(),
                    family_names: family.to_string(),
                    address: Some(address.to_string()),
                    phone: Some(phone.to_string()),
                },
            )
            .await?;
        customer_ids.push(customer.id);
    }
    println!("✓ Created {} customers", customer_ids.len());

    // Products
    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for (name, description, price_cents, stock) in PRODUCTS {
        let product = db
            .products()
            .create(
                &actor,
                &NewProduct {
                    name: name.to_string(),
                    description: description.to_string(),
                    price_cents: *price_cents,
                    stock: *stock,
                },
            )
            .await?;
        product_ids.push(product.id);
    }
    println!("✓ Created {} products", product_ids.len());

    // Historical sales (only the three selling accounts)
    println!();
    println!("Registering historical sales...");

    let engine = db.sale_engine();
    let today = config.today();
    let mut registered = 0;
    let mut last_outcome = None;

    for (days_ago, customer_idx, seller_idx, lines) in HISTORICAL_SALES {
        let requests: Vec<LineRequest> = lines
            .iter()
            .map(|(product_idx, quantity)| LineRequest::new(product_ids[*product_idx], *quantity))
            .collect();

        let outcome = engine
            .register_sale_outcome(
                customer_ids[*customer_idx],
                user_ids[*seller_idx],
                today - Duration::days(*days_ago),
                &requests,
            )
            .await;

        if outcome.is_success() {
            registered += 1;
        } else {
            eprintln!("  Sale {} days ago failed: {}", days_ago, outcome.message);
        }
        last_outcome = Some(outcome);
    }

    println!("✓ Registered {} of {} sales", registered, HISTORICAL_SALES.len());
    if let Some(outcome) = last_outcome {
        println!("  Last outcome: {}", serde_json::to_string(&outcome)?);
    }

    let low_stock = db
        .products()
        .count_low_stock(vendo_core::LOW_STOCK_THRESHOLD)
        .await?;
    println!("  Products at or below {} units: {}", vendo_core::LOW_STOCK_THRESHOLD, low_stock);
    println!("  Audit entries: {}", db.audit().count().await?);

    info!(registered, "Seed complete");
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vendo=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
