//! Blob store setup

use anyhow::Result;
use imgops_core::Config;
use imgops_storage::{create_blob_store, BlobStore};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn BlobStore>> {
    tracing::info!("Initializing blob store...");
    let store = create_blob_store(config).await?;
    tracing::info!(
        backend = %store.backend_type(),
        prefix = config.storage_prefix(),
        "Blob store initialized successfully"
    );
    Ok(store)
}
