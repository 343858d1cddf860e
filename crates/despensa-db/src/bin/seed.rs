//! # Seed Data Generator
//!
//! Populates the database with development data: shelf products across
//! the store's categories, a few deli items, one promotion and one
//! supplier.
//!
//! ## Usage
//! ```bash
//! cargo run -p despensa-db --bin seed
//!
//! # Specify database path
//! cargo run -p despensa-db --bin seed -- --db ./data/despensa.db
//! ```

use chrono::{Duration, Utc};
use std::env;

use despensa_core::{BulkItem, Product, Promotion, PromotionType, Supplier};
use despensa_db::{generate_id, Database, DbConfig};

/// (category, [(description, price_cents, stock)])
const PRODUCTS: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "almacen",
        &[
            ("Arroz largo fino 1kg", 1800, 24),
            ("Fideos guiseros 500g", 950, 30),
            ("Yerba mate 1kg", 4200, 18),
            ("Azúcar 1kg", 1100, 40),
            ("Harina 000 1kg", 850, 35),
            ("Aceite de girasol 900ml", 2300, 15),
            ("Puré de tomate 520g", 780, 28),
            ("Lentejas 400g", 1250, 12),
        ],
    ),
    (
        "bebidas",
        &[
            ("Gaseosa cola 2.25L", 2800, 20),
            ("Agua mineral 2L", 900, 36),
            ("Jugo de naranja 1L", 1500, 14),
            ("Soda 2L", 1100, 22),
            ("Cerveza rubia 1L", 2400, 16),
        ],
    ),
    (
        "limpieza",
        &[
            ("Lavandina 1L", 950, 20),
            ("Detergente 750ml", 1400, 18),
            ("Jabón en polvo 800g", 2600, 10),
        ],
    ),
    (
        "lacteos",
        &[
            ("Leche entera 1L", 1350, 25),
            ("Yogur bebible 1L", 1900, 12),
            ("Queso cremoso 300g", 3200, 8),
            ("Manteca 200g", 1700, 10),
        ],
    ),
];

/// (name, price_per_100g_cents, stock_grams)
const BULK_ITEMS: &[(&str, i64, i64)] = &[
    ("Jamón cocido", 450, 3000),
    ("Salame Milán", 520, 2500),
    ("Queso de máquina", 380, 4000),
    ("Mortadela", 290, 2000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./despensa_dev.db");

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
                println!("Despensa POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./despensa_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Despensa POS Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating data...");

    let now = Utc::now();
    let mut barcode_seed = 1000u64;
    let mut first_two_ids: Vec<String> = Vec::new();

    for (category, items) in PRODUCTS {
        for (description, price_cents, stock) in *items {
            barcode_seed += 1;
            let product = Product {
                id: generate_id(),
                category: category.to_string(),
                description: description.to_string(),
                barcode: Some(format!("779{:010}", barcode_seed)),
                price_cents: *price_cents,
                stock: *stock,
                created_at: now,
                updated_at: now,
            };
            if first_two_ids.len() < 2 {
                first_two_ids.push(product.id.clone());
            }
            db.products().insert(&product).await?;
        }
    }
    println!("  ✓ {} products", db.products().count().await?);

    for (name, price_per_100g_cents, stock_grams) in BULK_ITEMS {
        db.bulk_items()
            .insert(&BulkItem {
                id: generate_id(),
                name: name.to_string(),
                price_per_100g_cents: *price_per_100g_cents,
                stock_grams: *stock_grams,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("  ✓ {} bulk items", BULK_ITEMS.len());

    // One 2x1 over the first two seeded products
    db.promotions()
        .insert(&Promotion {
            id: generate_id(),
            name: "2x1 Almacén".to_string(),
            description: "Lleva dos productos de almacén al precio de uno".to_string(),
            kind: PromotionType::TwoForOne,
            primary_product_id: first_two_ids[0].clone(),
            secondary_product_id: Some(first_two_ids[1].clone()),
            discount_value: 0,
            minimum_quantity: 1,
            price_cents: 1800,
            valid_from: now,
            valid_to: now + Duration::days(30),
            active: true,
            sales_count: 0,
            created_at: now,
        })
        .await?;
    println!("  ✓ 1 promotion");

    db.suppliers()
        .insert(&Supplier {
            id: generate_id(),
            name: "Distribuidora Norte".to_string(),
            contact: "Carlos Medina".to_string(),
            phone: "11-5555-0000".to_string(),
            email: "ventas@norte.example".to_string(),
            category: "almacen".to_string(),
            payment_terms: "30 días".to_string(),
            address: Some("Av. San Martín 1200".to_string()),
            website: None,
            tax_id: Some("30-11111111-1".to_string()),
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        })
        .await?;
    println!("  ✓ 1 supplier");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
