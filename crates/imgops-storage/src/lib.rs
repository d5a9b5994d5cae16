//! Imgops Storage Library
//!
//! Blob store abstraction and its S3 and local filesystem implementations.
//!
//! # Object key format
//!
//! Every backend stores a blob under `{prefix}/{public_id}.{extension}`, where
//! `public_id` is `{operation_prefix}_{uuid}` (for example `resized_3f2c...`)
//! and the extension follows the content type. Keys must not contain `..` or a
//! leading `/`. Key generation lives in the `keys` module so all backends stay
//! consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use factory::create_blob_store;
pub use imgops_core::StorageBackend;
pub use keys::generate_public_id;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{BlobStore, StorageError, StorageResult};
