//! Application setup and initialization
//!
//! Startup order: validate configuration, start telemetry, connect the
//! database (and migrate), build the blob store, assemble the workflow, then
//! the router.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::services::ImageWorkflow;
use crate::state::AppState;
use anyhow::{Context, Result};
use imgops_core::Config;
use imgops_db::PgHistoryStore;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        app_name = config.app_name(),
        environment = config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let blob_store = storage::setup_storage(&config).await?;

    let history_store = Arc::new(PgHistoryStore::new(pool));
    let workflow = ImageWorkflow::new(blob_store, history_store);
    let state = Arc::new(AppState::new(workflow, config.clone()));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
