//! In-memory blob store for tests
//!
//! Lets workflow and HTTP tests run without S3 or a writable directory, and
//! inject an upload failure on a chosen call or a slow upload.

use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A blob recorded by [`MemoryBlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub public_id: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<Vec<StoredBlob>>>,
    calls: Arc<AtomicUsize>,
    fail_on_call: Option<usize>,
    upload_delay: Option<Duration>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th upload (1-based) with `UploadFailed`.
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            ..Self::default()
        }
    }

    /// Sleep for `delay` before every upload.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            upload_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn url_for(public_id: &str) -> String {
        format!("https://example.com/{}", public_id)
    }

    /// Blobs in upload order
    pub fn blobs(&self) -> Vec<StoredBlob> {
        self.blobs.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    /// Upload attempts, including failed ones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        public_id: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.upload_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on_call == Some(call) {
            return Err(StorageError::UploadFailed(format!(
                "injected failure on upload {}",
                call
            )));
        }

        let mut blobs = self.blobs.lock().unwrap();
        if blobs.iter().any(|b| b.public_id == public_id) {
            return Err(StorageError::UploadFailed(format!(
                "public id already used: {}",
                public_id
            )));
        }
        blobs.push(StoredBlob {
            public_id: public_id.to_string(),
            content_type: content_type.to_string(),
            data,
        });

        Ok(Self::url_for(public_id))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
