//! Service catalog seed script
//!
//! The catalog is static reference data, read-only to the API; this tool is
//! the out-of-band path that populates it. Safe to re-run: existing entries
//! are left untouched.
//!
//! Usage:
//!   DATABASE_URL=... ./seed-services
//!
//! Environment variables:
//!   DATABASE_URL — PostgreSQL connection string (required)

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::env;

const SERVICES: &[(&str, &str)] = &[
    ("Plumbing", "Tap, pipe, and drainage repair or installation"),
    ("Electrical", "Wiring, fittings, and appliance hookups"),
    ("Cleaning", "Home and office deep cleaning"),
    ("Carpentry", "Furniture repair and custom woodwork"),
    ("Painting", "Interior and exterior wall painting"),
    ("Appliance Repair", "Servicing of household appliances"),
    ("Pest Control", "Inspection and treatment for common pests"),
    ("Gardening", "Lawn care, pruning, and planting"),
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL required")?;

    println!("=== Seed Service Catalog ===");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    letushelp_api::db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let mut inserted = 0u64;
    for (name, description) in SERVICES {
        let result = sqlx::query(
            "INSERT INTO services (name, description)
             VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(&pool)
        .await
        .with_context(|| format!("Failed to seed service: {name}"))?;
        inserted += result.rows_affected();
    }

    println!(
        "Seeded {inserted} new services ({} already present)",
        SERVICES.len() as u64 - inserted
    );
    Ok(())
}
