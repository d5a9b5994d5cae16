//! Image transform workflow
//!
//! Runs one operation end to end: validate, sniff, decode/transform/encode on
//! the blocking pool, upload the original, upload the result, then record the
//! operation in a single history transaction. Stages run strictly in order and
//! the first failure aborts the rest. Blobs already written when a later stage
//! fails are left in place.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use imgops_core::{
    AppError, ImageFormat, ImageResponse, NewHistoryRecord, OperationKind, TransformRequest,
};
use imgops_db::{insert_in_transaction, HistoryStore};
use imgops_processing::{sniff_format, ImagePipeline, Operation, ProcessedImage};
use imgops_storage::{generate_public_id, BlobStore};

use crate::error::storage_error_to_app;

#[derive(Clone)]
pub struct ImageWorkflow {
    blob_store: Arc<dyn BlobStore>,
    history_store: Arc<dyn HistoryStore>,
}

impl ImageWorkflow {
    pub fn new(blob_store: Arc<dyn BlobStore>, history_store: Arc<dyn HistoryStore>) -> Self {
        Self {
            blob_store,
            history_store,
        }
    }

    /// Execute `request` and return the two public links.
    ///
    /// A history record is committed only when both uploads succeeded.
    #[tracing::instrument(skip(self, request), fields(operation = %request.kind(), size_bytes = request.image().len()))]
    pub async fn execute(&self, request: TransformRequest) -> Result<ImageResponse, AppError> {
        let started = Instant::now();
        let kind = request.kind();

        tracing::debug!(stage = "validating", "Workflow stage");
        request.validate()?;

        let source_format = detect_format(kind, &request.image().data)?;
        let operation = pixel_operation(&request)?;

        let data = request.image().data.clone();
        let processed = process(data.clone(), source_format, operation).await?;

        tracing::debug!(stage = "uploading_original", "Workflow stage");
        let original_link = self
            .upload(kind.original_prefix(), source_format, data)
            .await?;

        tracing::debug!(stage = "uploading_result", "Workflow stage");
        let result_link = self
            .upload(
                kind.result_prefix(),
                processed.result.format,
                processed.data.clone(),
            )
            .await?;

        tracing::debug!(stage = "recording_history", "Workflow stage");
        let record = NewHistoryRecord::new(
            kind,
            &processed.source,
            &processed.result,
            original_link.clone(),
            result_link.clone(),
        );
        let saved = insert_in_transaction(self.history_store.as_ref(), &record).await?;

        tracing::info!(
            history_id = saved.id,
            size_before_mb = saved.size_before_mb,
            size_after_mb = saved.size_after_mb,
            duration_ms = started.elapsed().as_millis() as u64,
            "Image operation committed"
        );

        Ok(ImageResponse {
            original_image_link: original_link,
            result_image_link: result_link,
        })
    }

    async fn upload(
        &self,
        prefix: &str,
        format: ImageFormat,
        data: Bytes,
    ) -> Result<String, AppError> {
        let public_id = generate_public_id(prefix);
        let link = self
            .blob_store
            .upload(&public_id, format.mime_type(), data)
            .await
            .map_err(storage_error_to_app)?;

        tracing::debug!(public_id = %public_id, link = %link, "Blob stored");
        Ok(link)
    }
}

/// Decide the source format from the bytes themselves, never the client header.
fn detect_format(kind: OperationKind, data: &[u8]) -> Result<ImageFormat, AppError> {
    match sniff_format(data) {
        Some(format) if kind.accepts(format) => Ok(format),
        sniffed => {
            tracing::debug!(
                operation = %kind,
                sniffed = ?sniffed,
                "Rejecting image with unsupported content"
            );
            Err(AppError::UnsupportedFormat(
                kind.unsupported_format_message().to_string(),
            ))
        }
    }
}

fn pixel_operation(request: &TransformRequest) -> Result<Operation, AppError> {
    match request {
        TransformRequest::Convert { .. } => Ok(Operation::Convert),
        TransformRequest::Resize { params, .. } => {
            let (width, height) = params.target_dimensions().ok_or_else(|| {
                AppError::Validation(vec!["width_in_pixels and height_in_pixels are required".to_string()])
            })?;
            Ok(Operation::Resize { width, height })
        }
        TransformRequest::Compress { params, .. } => Ok(Operation::Compress {
            quality: params.quality(),
        }),
    }
}

/// Codec work is CPU-bound; keep it off the async workers.
async fn process(
    data: Bytes,
    source_format: ImageFormat,
    operation: Operation,
) -> Result<ProcessedImage, AppError> {
    let processed = tokio::task::spawn_blocking(move || {
        ImagePipeline::run(&data, source_format, operation)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Image processing task failed: {}", e)))??;

    Ok(processed)
}
