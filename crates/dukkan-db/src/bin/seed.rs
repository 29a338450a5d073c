//! # Seed Data Loader
//!
//! Prepares a development database: the default administrator plus the
//! sample catalog the store ships with.
//!
//! ## Usage
//! ```bash
//! # Seed ./dukkan_dev.db
//! cargo run -p dukkan-db --bin seed
//!
//! # Specify database path
//! cargo run -p dukkan-db --bin seed -- --db ./data/pos.db
//!
//! # Choose the administrator password
//! DUKKAN_ADMIN_PASSWORD=s3cret cargo run -p dukkan-db --bin seed
//! ```
//!
//! Products whose code already exists are left untouched, so the loader can
//! be run repeatedly against the same file.

use dukkan_core::ProductInput;
use dukkan_db::{Database, DbConfig};
use std::env;

/// Sample catalog: (code, name, price cents, cost cents, on hand)
const SAMPLE_PRODUCTS: &[(&str, &str, i64, i64, i64)] = &[
    ("P001", "لابتوب HP", 299_999, 250_000, 10),
    ("P002", "ماوس لوجيتك", 9_999, 7_000, 20),
    ("P003", "كيبورد ميكانيكي", 29_999, 20_000, 15),
];

const DEFAULT_DB_PATH: &str = "./dukkan_dev.db";
const DEFAULT_ADMIN_PASSWORD: &str = "password";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = DEFAULT_DB_PATH.to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Dukkan POS Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: {DEFAULT_DB_PATH})");
                println!("  -h, --help         Show this help message");
                println!();
                println!("Environment:");
                println!("  DUKKAN_ADMIN_PASSWORD  Password for a newly created admin account");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Dukkan POS Seed Data Loader");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let password =
        env::var("DUKKAN_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
    match db.users().ensure_default_admin(&password).await? {
        Some(admin) => println!("✓ Created administrator '{}'", admin.username),
        None => println!("✓ Users already present, administrator left as is"),
    }

    println!();
    println!("Loading sample products...");

    let mut inserted = 0;
    for (code, name, price_cents, cost_cents, quantity) in SAMPLE_PRODUCTS {
        if db.products().get_by_code(code).await?.is_some() {
            println!("  {} already exists, skipping", code);
            continue;
        }

        let input = ProductInput {
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            price_cents: *price_cents,
            cost_cents: *cost_cents,
            quantity: *quantity,
            category: None,
            image_path: None,
        };

        if let Err(e) = db.products().create(&input).await {
            eprintln!("Failed to insert {}: {}", code, e);
            continue;
        }

        inserted += 1;
    }

    println!();
    println!("✓ Inserted {} products ({} in catalog)", inserted, db.products().count().await?);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
