//! Blob store abstraction trait

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable store for original and transformed images.
///
/// Implementations are shared across request tasks and must be safe to call
/// concurrently.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `public_id` and return a publicly resolvable URL.
    ///
    /// `public_id` must be unique per call; see [`crate::keys`].
    async fn upload(&self, public_id: &str, content_type: &str, data: Bytes)
        -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
