//! Shared public id and object key generation for blob stores.
//!
//! Public id format: `{operation_prefix}_{uuid}`. Object key format:
//! `{root}/{public_id}.{extension}`.

use crate::{StorageError, StorageResult};
use imgops_core::ImageFormat;
use uuid::Uuid;

/// Generate a unique public id such as `png_8b1f...`.
pub fn generate_public_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4())
}

/// Build the object key for a public id under `root`.
///
/// The extension follows the content type; unknown types are stored without
/// one.
pub fn object_key(root: &str, public_id: &str, content_type: &str) -> StorageResult<String> {
    validate_public_id(public_id)?;

    let name = match ImageFormat::from_mime_type(content_type) {
        Some(format) => format!("{}.{}", public_id, format.extension()),
        None => public_id.to_string(),
    };

    let root = root.trim_matches('/');
    if root.is_empty() {
        Ok(name)
    } else {
        Ok(format!("{}/{}", root, name))
    }
}

fn validate_public_id(public_id: &str) -> StorageResult<()> {
    if public_id.is_empty()
        || public_id.contains("..")
        || public_id.starts_with('/')
        || public_id.contains('\\')
    {
        return Err(StorageError::InvalidKey(format!(
            "Invalid public id: {}",
            public_id
        )));
    }
    Ok(())
}
