//! Database setup and initialization

use anyhow::Result;
use imgops_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Setup the connection pool and, unless disabled, apply pending migrations.
///
/// Startup never drops the history table; see `history_admin reset` for that.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(config.database_url())
        .await?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    if config.run_migrations() {
        imgops_db::run_migrations(&pool).await?;
    } else {
        tracing::info!("RUN_MIGRATIONS disabled, skipping migrations");
    }

    Ok(pool)
}
