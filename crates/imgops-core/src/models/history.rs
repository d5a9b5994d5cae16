use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ImageFormat;
use crate::constants::BYTES_PER_MB;

/// Operation recorded in the history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "convert_png_jpeg")]
    Convert,
    #[serde(rename = "resize_image")]
    Resize,
    #[serde(rename = "compress_image")]
    Compress,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Convert => "convert_png_jpeg",
            OperationKind::Resize => "resize_image",
            OperationKind::Compress => "compress_image",
        }
    }

    /// Public id prefix for the uploaded original.
    pub fn original_prefix(&self) -> &'static str {
        match self {
            OperationKind::Convert => "png",
            OperationKind::Resize | OperationKind::Compress => "original",
        }
    }

    /// Public id prefix for the transformed result.
    pub fn result_prefix(&self) -> &'static str {
        match self {
            OperationKind::Convert => "jpeg",
            OperationKind::Resize => "resized",
            OperationKind::Compress => "compressed",
        }
    }

    pub fn accepts(&self, format: ImageFormat) -> bool {
        match self {
            OperationKind::Convert => format == ImageFormat::Png,
            OperationKind::Resize | OperationKind::Compress => true,
        }
    }

    /// Message returned when the input format is not accepted.
    pub fn unsupported_format_message(&self) -> &'static str {
        match self {
            OperationKind::Convert => "PNG required",
            OperationKind::Resize | OperationKind::Compress => "PNG, JPG or JPEG required",
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "convert_png_jpeg" => Ok(OperationKind::Convert),
            "resize_image" => Ok(OperationKind::Resize),
            "compress_image" => Ok(OperationKind::Compress),
            _ => Err(anyhow::anyhow!("Invalid operation type: {}", s)),
        }
    }
}

/// Format, size and dimensions of one side of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSummary {
    pub format: ImageFormat,
    pub size_bytes: usize,
    pub width: u32,
    pub height: u32,
}

impl ImageSummary {
    pub fn size_in_mb(&self) -> f64 {
        size_in_mb(self.size_bytes)
    }
}

/// Byte length expressed in megabytes, unrounded.
pub fn size_in_mb(size_bytes: usize) -> f64 {
    size_bytes as f64 / BYTES_PER_MB
}

/// A persisted history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i32,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub operation: OperationKind,
    pub extension_before: String,
    pub extension_after: String,
    pub size_before_mb: f64,
    pub size_after_mb: f64,
    pub width_before_px: i32,
    pub height_before_px: i32,
    pub width_after_px: i32,
    pub height_after_px: i32,
    pub image_link_before: String,
    pub image_link_after: String,
}

/// A history row before the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub operation: OperationKind,
    pub extension_before: String,
    pub extension_after: String,
    pub size_before_mb: f64,
    pub size_after_mb: f64,
    pub width_before_px: i32,
    pub height_before_px: i32,
    pub width_after_px: i32,
    pub height_after_px: i32,
    pub image_link_before: String,
    pub image_link_after: String,
}

impl NewHistoryRecord {
    pub fn new(
        operation: OperationKind,
        before: &ImageSummary,
        after: &ImageSummary,
        image_link_before: String,
        image_link_after: String,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            extension_before: before.format.mime_type().to_string(),
            extension_after: after.format.mime_type().to_string(),
            size_before_mb: before.size_in_mb(),
            size_after_mb: after.size_in_mb(),
            width_before_px: to_px(before.width),
            height_before_px: to_px(before.height),
            width_after_px: to_px(after.width),
            height_after_px: to_px(after.height),
            image_link_before,
            image_link_after,
        }
    }

    pub fn into_record(self, id: i32) -> HistoryRecord {
        HistoryRecord {
            id,
            timestamp: self.timestamp,
            operation: self.operation,
            extension_before: self.extension_before,
            extension_after: self.extension_after,
            size_before_mb: self.size_before_mb,
            size_after_mb: self.size_after_mb,
            width_before_px: self.width_before_px,
            height_before_px: self.height_before_px,
            width_after_px: self.width_after_px,
            height_after_px: self.height_after_px,
            image_link_before: self.image_link_before,
            image_link_after: self.image_link_after,
        }
    }
}

fn to_px(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_round_trips_through_str() {
        for kind in [
            OperationKind::Convert,
            OperationKind::Resize,
            OperationKind::Compress,
        ] {
            assert_eq!(kind.as_str().parse::<OperationKind>().unwrap(), kind);
        }
        assert!("rotate_image".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(OperationKind::Convert.original_prefix(), "png");
        assert_eq!(OperationKind::Convert.result_prefix(), "jpeg");
        assert_eq!(OperationKind::Resize.original_prefix(), "original");
        assert_eq!(OperationKind::Resize.result_prefix(), "resized");
        assert_eq!(OperationKind::Compress.result_prefix(), "compressed");
    }

    #[test]
    fn test_convert_only_accepts_png() {
        assert!(OperationKind::Convert.accepts(ImageFormat::Png));
        assert!(!OperationKind::Convert.accepts(ImageFormat::Jpeg));
        assert!(OperationKind::Compress.accepts(ImageFormat::Jpeg));
    }

    #[test]
    fn test_size_in_mb_is_not_rounded() {
        assert_eq!(size_in_mb(1_048_576), 1.0);
        assert_eq!(size_in_mb(524_288), 0.5);
        assert!((size_in_mb(1000) - 0.000_953_674_316_406_25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_record_from_summaries() {
        let before = ImageSummary {
            format: ImageFormat::Png,
            size_bytes: 2_097_152,
            width: 800,
            height: 600,
        };
        let after = ImageSummary {
            format: ImageFormat::Jpeg,
            size_bytes: 524_288,
            width: 800,
            height: 600,
        };

        let record = NewHistoryRecord::new(
            OperationKind::Convert,
            &before,
            &after,
            "https://cdn.example.com/png_1".to_string(),
            "https://cdn.example.com/jpeg_1".to_string(),
        );

        assert_eq!(record.extension_before, "image/png");
        assert_eq!(record.extension_after, "image/jpeg");
        assert_eq!(record.size_before_mb, 2.0);
        assert_eq!(record.size_after_mb, 0.5);
        assert_eq!(record.width_after_px, 800);

        let stored = record.into_record(7);
        assert_eq!(stored.id, 7);
        assert_eq!(stored.operation, OperationKind::Convert);
    }

    #[test]
    fn test_record_serializes_operation_as_type() {
        let summary = ImageSummary {
            format: ImageFormat::Jpeg,
            size_bytes: 1024,
            width: 4,
            height: 4,
        };
        let record = NewHistoryRecord::new(
            OperationKind::Compress,
            &summary,
            &summary,
            "a".to_string(),
            "b".to_string(),
        )
        .into_record(1);

        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["type"], "compress_image");
        assert!(json.get("operation").is_none());
    }
}
