//! Schema lifecycle: idempotent migrations at startup and an explicit,
//! destructive reset for administrators.

use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use std::path::Path;

const CREATE_HISTORIES: &str = include_str!("../../../migrations/0001_create_histories.sql");

/// Apply pending migrations from the workspace `migrations/` directory.
///
/// Migrations only create missing objects; they never drop data.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Drop the history table and recreate it empty.
///
/// Safe to run repeatedly. All history is lost.
pub async fn reset_schema(pool: &PgPool) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin schema reset transaction")?;

    sqlx::raw_sql("DROP TABLE IF EXISTS histories")
        .execute(&mut *tx)
        .await
        .context("Failed to drop histories table")?;

    sqlx::raw_sql(CREATE_HISTORIES)
        .execute(&mut *tx)
        .await
        .context("Failed to create histories table")?;

    tx.commit()
        .await
        .context("Failed to commit schema reset")?;

    tracing::warn!("History table dropped and recreated");
    Ok(())
}
