//! Decode, transform and encode chained for a single operation

use bytes::Bytes;
use image::GenericImageView;
use imgops_core::{ImageFormat, ImageSummary};

use crate::codec::ImageCodec;
use crate::error::CodecResult;
use crate::transform::TransformEngine;

/// JPEG quality for PNG to JPEG conversion.
pub const CONVERT_JPEG_QUALITY: u8 = 75;

/// JPEG quality when a resized JPEG is written back.
pub const RESIZE_JPEG_QUALITY: u8 = 95;

/// Pixel work requested for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Re-encode a PNG as JPEG
    Convert,
    Resize { width: u32, height: u32 },
    /// Re-encode in the source format with the given JPEG quality
    Compress { quality: u8 },
}

impl Operation {
    fn output_format(&self, source: ImageFormat) -> ImageFormat {
        match self {
            Operation::Convert => ImageFormat::Jpeg,
            Operation::Resize { .. } | Operation::Compress { .. } => source,
        }
    }

    fn quality(&self) -> u8 {
        match self {
            Operation::Convert => CONVERT_JPEG_QUALITY,
            Operation::Resize { .. } => RESIZE_JPEG_QUALITY,
            Operation::Compress { quality } => *quality,
        }
    }
}

/// Output of a pipeline run
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub source: ImageSummary,
    pub result: ImageSummary,
    pub data: Bytes,
}

pub struct ImagePipeline;

impl ImagePipeline {
    /// Run `operation` over `data`, already sniffed as `source_format`.
    pub fn run(
        data: &[u8],
        source_format: ImageFormat,
        operation: Operation,
    ) -> CodecResult<ProcessedImage> {
        tracing::debug!(stage = "decoding", format = %source_format, size_bytes = data.len(), "Pipeline stage");
        let decoded = ImageCodec::decode(data, source_format)?;
        let (src_width, src_height) = decoded.dimensions();

        let transformed = match operation {
            Operation::Resize { width, height } => {
                tracing::debug!(stage = "transforming", width, height, "Pipeline stage");
                TransformEngine::resize(&decoded, width, height)?
            }
            Operation::Convert | Operation::Compress { .. } => decoded,
        };

        let output_format = operation.output_format(source_format);
        tracing::debug!(stage = "encoding", format = %output_format, quality = operation.quality(), "Pipeline stage");
        let encoded = ImageCodec::encode(&transformed, output_format, Some(operation.quality()))?;
        let (width, height) = ImageCodec::dimensions_of(&encoded)?;

        Ok(ProcessedImage {
            source: ImageSummary {
                format: source_format,
                size_bytes: data.len(),
                width: src_width,
                height: src_height,
            },
            result: ImageSummary {
                format: output_format,
                size_bytes: encoded.len(),
                width,
                height,
            },
            data: encoded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::format::sniff_format;
    use image::{DynamicImage, Rgb, RgbImage};

    fn noisy(width: u32, height: u32, format: ImageFormat) -> Bytes {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(31).wrapping_add(y.wrapping_mul(17)) as u8;
            Rgb([v, v.wrapping_mul(3), (x ^ y) as u8])
        });
        ImageCodec::encode(&DynamicImage::ImageRgb8(img), format, Some(90)).unwrap()
    }

    #[test]
    fn test_convert_png_to_jpeg() {
        let png = noisy(40, 30, ImageFormat::Png);
        let out = ImagePipeline::run(&png, ImageFormat::Png, Operation::Convert).unwrap();

        assert_eq!(sniff_format(&out.data), Some(ImageFormat::Jpeg));
        assert_eq!(out.result.format, ImageFormat::Jpeg);
        assert_eq!((out.source.width, out.source.height), (40, 30));
        assert_eq!((out.result.width, out.result.height), (40, 30));
        assert_eq!(out.source.size_bytes, png.len());
        assert_eq!(out.result.size_bytes, out.data.len());
    }

    #[test]
    fn test_convert_encodes_at_convert_quality() {
        let png = noisy(64, 64, ImageFormat::Png);
        let out = ImagePipeline::run(&png, ImageFormat::Png, Operation::Convert).unwrap();

        let decoded = ImageCodec::decode(&png, ImageFormat::Png).unwrap();
        let expected =
            ImageCodec::encode(&decoded, ImageFormat::Jpeg, Some(CONVERT_JPEG_QUALITY)).unwrap();
        assert_eq!(out.data, expected);

        let resize_quality =
            ImageCodec::encode(&decoded, ImageFormat::Jpeg, Some(RESIZE_JPEG_QUALITY)).unwrap();
        assert!(out.data.len() < resize_quality.len());
    }

    #[test]
    fn test_resize_keeps_source_format() {
        let jpeg = noisy(800, 600, ImageFormat::Jpeg);
        let out = ImagePipeline::run(
            &jpeg,
            ImageFormat::Jpeg,
            Operation::Resize {
                width: 400,
                height: 300,
            },
        )
        .unwrap();

        assert_eq!(out.result.format, ImageFormat::Jpeg);
        assert_eq!(ImageCodec::dimensions_of(&out.data).unwrap(), (400, 300));
    }

    #[test]
    fn test_compress_monotonic_in_quality() {
        let jpeg = noisy(200, 200, ImageFormat::Jpeg);
        let low = ImagePipeline::run(&jpeg, ImageFormat::Jpeg, Operation::Compress { quality: 5 })
            .unwrap();
        let high = ImagePipeline::run(&jpeg, ImageFormat::Jpeg, Operation::Compress { quality: 99 })
            .unwrap();

        assert!(high.data.len() >= low.data.len());
        assert_eq!((high.result.width, high.result.height), (200, 200));
    }

    #[test]
    fn test_compress_png_stays_png() {
        let png = noisy(20, 20, ImageFormat::Png);
        let out =
            ImagePipeline::run(&png, ImageFormat::Png, Operation::Compress { quality: 10 }).unwrap();
        assert_eq!(sniff_format(&out.data), Some(ImageFormat::Png));
    }

    #[test]
    fn test_mismatched_format_fails_to_decode() {
        let jpeg = noisy(10, 10, ImageFormat::Jpeg);
        let err = ImagePipeline::run(&jpeg, ImageFormat::Png, Operation::Convert).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }
}
