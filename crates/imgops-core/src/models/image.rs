use std::fmt::{Display, Formatter, Result as FmtResult};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{
    DEFAULT_COMPRESS_QUALITY, MAX_COMPRESS_QUALITY, MAX_DIMENSION_PX, MIN_COMPRESS_QUALITY,
    MIN_DIMENSION_PX,
};
use crate::error::{validation_messages, AppError};

/// Raster formats the service reads and writes. Anything else is rejected
/// at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Parse a MIME type, ignoring parameters such as `; charset=...`.
    /// `image/jpg` is accepted as an alias of `image/jpeg`.
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or(mime_type)
            .trim()
            .to_lowercase();
        match essence.as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Image bytes as received from the client, before any inspection.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Bytes,
    /// Content type the client declared on the multipart part, if any
    pub declared_content_type: Option<String>,
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            declared_content_type: None,
            file_name: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.declared_content_type = Some(content_type.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Target dimensions for a resize. A field that was absent or not an
/// integer is `None` and reported as required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Validate)]
pub struct ResizeParams {
    #[validate(
        required(message = "is required"),
        range(
            min = MIN_DIMENSION_PX,
            max = MAX_DIMENSION_PX,
            message = "must be between 1 and 3000"
        )
    )]
    pub width_in_pixels: Option<i64>,
    #[validate(
        required(message = "is required"),
        range(
            min = MIN_DIMENSION_PX,
            max = MAX_DIMENSION_PX,
            message = "must be between 1 and 3000"
        )
    )]
    pub height_in_pixels: Option<i64>,
}

impl ResizeParams {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width_in_pixels: Some(width),
            height_in_pixels: Some(height),
        }
    }

    pub fn from_form(width: Option<&str>, height: Option<&str>) -> Self {
        Self {
            width_in_pixels: width.and_then(parse_int),
            height_in_pixels: height.and_then(parse_int),
        }
    }

    /// Width and height once both are present and positive.
    pub fn target_dimensions(&self) -> Option<(u32, u32)> {
        let width = u32::try_from(self.width_in_pixels?).ok()?;
        let height = u32::try_from(self.height_in_pixels?).ok()?;
        (width > 0 && height > 0).then_some((width, height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Validate)]
pub struct CompressParams {
    #[validate(range(
        min = MIN_COMPRESS_QUALITY,
        max = MAX_COMPRESS_QUALITY,
        message = "must be between 1 and 99"
    ))]
    pub compress_quality: i64,
}

impl Default for CompressParams {
    fn default() -> Self {
        Self {
            compress_quality: DEFAULT_COMPRESS_QUALITY,
        }
    }
}

impl CompressParams {
    pub fn new(quality: i64) -> Self {
        Self {
            compress_quality: quality,
        }
    }

    /// Missing, unparsable or non-positive values select the default quality.
    /// Values above the maximum are kept so validation can reject them.
    pub fn from_form(quality: Option<&str>) -> Self {
        match quality.and_then(parse_int) {
            Some(q) if q >= 1 => Self::new(q),
            _ => Self::default(),
        }
    }

    /// Encoder quality; only meaningful after validation.
    pub fn quality(&self) -> u8 {
        u8::try_from(self.compress_quality).unwrap_or(DEFAULT_COMPRESS_QUALITY as u8)
    }
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// One transform operation with its input.
#[derive(Debug, Clone)]
pub enum TransformRequest {
    Convert {
        image: UploadedImage,
    },
    Resize {
        image: UploadedImage,
        params: ResizeParams,
    },
    Compress {
        image: UploadedImage,
        params: CompressParams,
    },
}

impl TransformRequest {
    pub fn kind(&self) -> super::OperationKind {
        match self {
            TransformRequest::Convert { .. } => super::OperationKind::Convert,
            TransformRequest::Resize { .. } => super::OperationKind::Resize,
            TransformRequest::Compress { .. } => super::OperationKind::Compress,
        }
    }

    pub fn image(&self) -> &UploadedImage {
        match self {
            TransformRequest::Convert { image }
            | TransformRequest::Resize { image, .. }
            | TransformRequest::Compress { image, .. } => image,
        }
    }

    /// Structural checks that must pass before any decoding starts.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut messages = Vec::new();

        if self.image().is_empty() {
            messages.push("image is required".to_string());
        }

        let params = match self {
            TransformRequest::Convert { .. } => Ok(()),
            TransformRequest::Resize { params, .. } => params.validate(),
            TransformRequest::Compress { params, .. } => params.validate(),
        };
        if let Err(errors) = params {
            messages.extend(validation_messages(&errors));
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(messages))
        }
    }
}

/// Links returned to the client after a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub original_image_link: String,
    pub result_image_link: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub messages: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_upload() -> UploadedImage {
        UploadedImage::new(vec![0x89, b'P', b'N', b'G']).with_content_type("image/png")
    }

    #[test]
    fn test_format_from_mime_type() {
        assert_eq!(
            ImageFormat::from_mime_type("image/png"),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_mime_type("IMAGE/JPG"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_mime_type("image/jpeg; q=0.9"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_mime_type("image/gif"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_extension(".JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("webp"), None);
    }

    #[test]
    fn test_resize_params_missing_fields_are_required() {
        let request = TransformRequest::Resize {
            image: png_upload(),
            params: ResizeParams::from_form(None, Some("abc")),
        };

        match request.validate() {
            Err(AppError::Validation(messages)) => assert_eq!(
                messages,
                vec![
                    "height_in_pixels is required".to_string(),
                    "width_in_pixels is required".to_string()
                ]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_resize_params_bounds() {
        for (w, h, ok) in [(1, 1, true), (3000, 3000, true), (0, 10, false), (10, 3001, false)] {
            let request = TransformRequest::Resize {
                image: png_upload(),
                params: ResizeParams::new(w, h),
            };
            assert_eq!(request.validate().is_ok(), ok, "{}x{}", w, h);
        }
    }

    #[test]
    fn test_resize_target_dimensions() {
        assert_eq!(
            ResizeParams::from_form(Some(" 400 "), Some("300")).target_dimensions(),
            Some((400, 300))
        );
        assert_eq!(ResizeParams::new(-1, 10).target_dimensions(), None);
    }

    #[test]
    fn test_compress_quality_defaults() {
        assert_eq!(CompressParams::from_form(None).compress_quality, 70);
        assert_eq!(CompressParams::from_form(Some("abc")).compress_quality, 70);
        assert_eq!(CompressParams::from_form(Some("0")).compress_quality, 70);
        assert_eq!(CompressParams::from_form(Some("-4")).compress_quality, 70);
        assert_eq!(CompressParams::from_form(Some("35")).compress_quality, 35);
        assert_eq!(CompressParams::from_form(Some("150")).compress_quality, 150);
    }

    #[test]
    fn test_compress_quality_above_max_is_rejected() {
        let request = TransformRequest::Compress {
            image: png_upload(),
            params: CompressParams::from_form(Some("100")),
        };
        match request.validate() {
            Err(AppError::Validation(messages)) => {
                assert_eq!(messages, vec!["compress_quality must be between 1 and 99"])
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_range_limits_follow_constants() {
        assert!(ResizeParams::new(MIN_DIMENSION_PX, MAX_DIMENSION_PX).validate().is_ok());
        assert!(ResizeParams::new(MAX_DIMENSION_PX + 1, MIN_DIMENSION_PX).validate().is_err());
        assert!(ResizeParams::new(MIN_DIMENSION_PX - 1, MIN_DIMENSION_PX).validate().is_err());

        assert!(CompressParams::new(MIN_COMPRESS_QUALITY).validate().is_ok());
        assert!(CompressParams::new(MAX_COMPRESS_QUALITY).validate().is_ok());
        assert!(CompressParams::new(MAX_COMPRESS_QUALITY + 1).validate().is_err());
        assert!(CompressParams::new(MIN_COMPRESS_QUALITY - 1).validate().is_err());
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let request = TransformRequest::Convert {
            image: UploadedImage::new(Vec::new()),
        };
        match request.validate() {
            Err(AppError::Validation(messages)) => {
                assert_eq!(messages, vec!["image is required"])
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
