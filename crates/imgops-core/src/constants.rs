//! Limits and defaults for the transform endpoints.

/// Smallest accepted target dimension in pixels.
pub const MIN_DIMENSION_PX: i64 = 1;

/// Largest accepted target dimension in pixels.
pub const MAX_DIMENSION_PX: i64 = 3000;

pub const MIN_COMPRESS_QUALITY: i64 = 1;
pub const MAX_COMPRESS_QUALITY: i64 = 99;

/// Quality used when the client omits `compress_quality` or sends a value below 1.
pub const DEFAULT_COMPRESS_QUALITY: i64 = 70;

/// Bytes per megabyte when reporting sizes in history records.
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";
pub const WIDTH_FIELD: &str = "width_in_pixels";
pub const HEIGHT_FIELD: &str = "height_in_pixels";
pub const QUALITY_FIELD: &str = "compress_quality";
