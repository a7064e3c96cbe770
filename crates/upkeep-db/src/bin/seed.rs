//! # Seed Data Generator
//!
//! Populates the stock ledger with maintenance spare parts for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database from upkeep.toml (or the platform default path)
//! cargo run -p upkeep-db --bin seed
//!
//! # Specify database path
//! cargo run -p upkeep-db --bin seed -- --db ./data/upkeep.db
//!
//! # Skip the sample issue transaction
//! cargo run -p upkeep-db --bin seed -- --no-sample
//! ```
//!
//! ## Generated Parts
//! - Bearings, belts, filters, seals, lubricants and electrical spares
//! - Part number: `{CATEGORY}-{INDEX}`
//! - Opening stock and reorder level varied per part; some start below minimum
//! - Procurement data (vendor, material code, PO) on most parts, so issue
//!   auto-fill has something to copy

use chrono::Utc;
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use upkeep_core::{LineItem, Money, Part, Quantity, StockTransaction, TransactionType};
use upkeep_db::repository::part::generate_part_id;
use upkeep_db::{AppConfig, Database};

/// Spare part categories: (code, vendor, names)
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "BRG",
        "SKF Distribution",
        &[
            "Deep groove ball bearing 6204",
            "Deep groove ball bearing 6305",
            "Pillow block bearing UCP205",
            "Tapered roller bearing 30206",
            "Needle roller bearing NK20/16",
        ],
    ),
    (
        "BLT",
        "Gates Industrial",
        &[
            "V-belt A42",
            "V-belt B55",
            "Timing belt 8M-1200",
            "Poly-V belt 6PK1870",
        ],
    ),
    (
        "FLT",
        "Parker Hannifin",
        &[
            "Hydraulic return filter 10 micron",
            "Compressor air intake filter",
            "AHU pleated panel filter 24x24",
            "Coolant bag filter 25 micron",
        ],
    ),
    (
        "SEL",
        "Trelleborg Sealing",
        &[
            "O-ring kit metric",
            "Shaft seal 35x52x7",
            "Pump mechanical seal 25mm",
        ],
    ),
    (
        "LUB",
        "Shell Lubricants",
        &[
            "Hydraulic oil ISO 46 (L)",
            "Gear oil ISO 220 (L)",
            "Lithium grease EP2 (kg)",
        ],
    ),
    (
        "ELC",
        "",
        &[
            "Contactor 3P 25A",
            "Thermal overload relay 9-13A",
            "Proximity sensor M18 PNP",
            "Fuse 10A gG",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,upkeep=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut sample = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--no-sample" => sample = false,
            "--help" | "-h" => {
                println!("Upkeep Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (overrides config)");
                println!("  -c, --config <PATH>   Path to upkeep.toml");
                println!("      --no-sample       Don't post the sample issue transaction");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = AppConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!(path = %config.database.path.display(), "Seeding stock ledger");
    let db = Database::new(config.db_config()).await?;

    let existing = db.parts().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has parts, skipping seed to avoid duplicates");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = Vec::new();

    for (category_idx, (code, vendor, names)) in CATEGORIES.iter().enumerate() {
        for (idx, name) in names.iter().enumerate() {
            let part = generate_part(code, vendor, name, category_idx * 10 + idx);

            if let Err(e) = db.parts().insert(&part).await {
                error!(part_number = %part.part_number, error = %e, "Failed to insert part");
                continue;
            }
            generated.push(part);
        }
    }

    info!(count = generated.len(), elapsed = ?start.elapsed(), "Parts generated");

    if sample {
        if let Some(part) = generated.iter().find(|p| p.quantity >= Quantity::from_units(2)) {
            post_sample_issue(&db, &config, part).await?;
        }
    }

    let below = db.parts().list_below_min_stock().await?;
    for part in &below {
        info!(
            part_number = %part.part_number,
            on_hand = %part.quantity,
            min = %part.min_stock_level,
            "Below minimum stock"
        );
    }

    info!(parts = generated.len(), below_min = below.len(), "Seed complete");
    Ok(())
}

/// Posts one issue through the normal submission path.
async fn post_sample_issue(
    db: &Database,
    config: &AppConfig,
    part: &Part,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let mut tx = StockTransaction::new(TransactionType::Issue, now);
    tx.description = "Sample issue for preventive maintenance".to_string();
    tx.recipient = Some("Maintenance crew A".to_string());
    tx.items.push(LineItem::from_part(part, Quantity::from_units(2)));

    let posted = db.stock_transactions().submit(&tx, now, &config.validation).await?;
    info!(
        transaction_number = %posted.transaction_number,
        total_cost = %posted.total_cost,
        "Sample issue posted"
    );
    Ok(())
}

/// Generates a single spare part with deterministic data.
fn generate_part(code: &str, vendor: &str, name: &str, seed: usize) -> Part {
    let seed = seed as i64;
    let quantity = (seed * 7 + 3) % 40;
    let min_stock = 2 + seed % 6;
    // 1.50 .. 151.49
    let price_cents = 150 + (seed * 1_337) % 15_000;
    let has_vendor = !vendor.is_empty();

    Part {
        id: generate_part_id(),
        part_number: format!("{}-{:03}", code, seed + 1),
        name: name.to_string(),
        quantity: Quantity::new(Decimal::from(quantity)),
        min_stock_level: Quantity::new(Decimal::from(min_stock)),
        unit_price: Money::from_cents(price_cents),
        material_code: has_vendor.then(|| format!("MAT-{}-{:02}", code, seed % 100)),
        purchase_order_number: has_vendor.then(|| format!("PO-{}", 24_000 + seed)),
        vendor_name: has_vendor.then(|| vendor.to_string()),
        vendor_contact: has_vendor.then(|| "orders@example.com".to_string()),
        supplier: has_vendor.then(|| vendor.to_string()),
    }
}
