//! Multipart extraction for the transform endpoints

use std::collections::HashMap;

use axum::extract::Multipart;
use imgops_core::constants::IMAGE_FIELD;
use imgops_core::{AppError, ImageFormat, OperationKind, UploadedImage};

use crate::error::multipart_error_to_app;

/// The `image` part plus every text field of a transform form.
#[derive(Debug, Default)]
pub struct TransformForm {
    pub image: Option<UploadedImage>,
    fields: HashMap<String, String>,
}

impl TransformForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The uploaded image, checked against the part's declared type.
    ///
    /// This is a cheap early rejection only; the workflow sniffs the bytes
    /// and that check is the one that counts.
    pub fn require_image(&mut self, kind: OperationKind) -> Result<UploadedImage, AppError> {
        let image = self
            .image
            .take()
            .ok_or_else(|| AppError::Validation(vec![format!("'{}' is required", IMAGE_FIELD)]))?;

        check_declared_type(&image, kind)?;
        Ok(image)
    }
}

/// Read the whole form. Only the first `image` part is kept; later ones are
/// drained and ignored.
pub async fn extract_transform_form(mut multipart: Multipart) -> Result<TransformForm, AppError> {
    let mut form = TransformForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error_to_app)?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == IMAGE_FIELD {
            let file_name = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field.bytes().await.map_err(multipart_error_to_app)?;

            if form.image.is_some() {
                tracing::debug!("Ignoring additional image part");
                continue;
            }

            let mut image = UploadedImage::new(data);
            if let Some(content_type) = content_type {
                image = image.with_content_type(content_type);
            }
            if let Some(file_name) = file_name {
                image = image.with_file_name(file_name);
            }
            form.image = Some(image);
        } else if !field_name.is_empty() {
            let value = field.text().await.map_err(multipart_error_to_app)?;
            form.fields.entry(field_name).or_insert(value);
        }
    }

    Ok(form)
}

/// Reject a part whose declared type is not allowed for `kind`.
///
/// The part's content type wins; without one the file extension is used. A
/// part that declares neither is left to the sniffed check.
pub fn check_declared_type(image: &UploadedImage, kind: OperationKind) -> Result<(), AppError> {
    let declared = match (&image.declared_content_type, &image.file_name) {
        (Some(content_type), _) => ImageFormat::from_mime_type(content_type),
        (None, Some(file_name)) => match file_name.rsplit_once('.') {
            Some((_, extension)) => ImageFormat::from_extension(extension),
            None => return Ok(()),
        },
        (None, None) => return Ok(()),
    };

    match declared {
        Some(format) if kind.accepts(format) => Ok(()),
        _ => {
            tracing::debug!(
                operation = %kind,
                declared_content_type = ?image.declared_content_type,
                file_name = ?image.file_name,
                "Rejecting image by declared type"
            );
            Err(AppError::UnsupportedFormat(
                kind.unsupported_format_message().to_string(),
            ))
        }
    }
}
