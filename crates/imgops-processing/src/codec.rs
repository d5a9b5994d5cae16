use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageReader};
use imgops_core::ImageFormat;

use crate::error::{CodecError, CodecResult};
use crate::format::sniff_format;

/// PNG and JPEG decoding and encoding
pub struct ImageCodec;

impl ImageCodec {
    /// Decode `data`, which must actually be in `declared` format.
    pub fn decode(data: &[u8], declared: ImageFormat) -> CodecResult<DynamicImage> {
        match sniff_format(data) {
            Some(actual) if actual == declared => {}
            Some(actual) => {
                return Err(CodecError::Decode(format!(
                    "content is {} but {} was declared",
                    actual, declared
                )))
            }
            None => {
                return Err(CodecError::Decode(format!(
                    "content is not a {} image",
                    declared
                )))
            }
        }

        image::load_from_memory_with_format(data, to_image_format(declared))
            .map_err(|e| CodecError::Decode(e.to_string()))
    }

    /// Read width and height from the image header without decoding pixels.
    pub fn dimensions_of(data: &[u8]) -> CodecResult<(u32, u32)> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| CodecError::Decode(e.to_string()))
    }

    /// Encode `img` as `format`.
    ///
    /// `quality` (1-99) applies to JPEG only; PNG output is lossless and
    /// ignores it. JPEG without a quality uses the encoder default.
    pub fn encode(img: &DynamicImage, format: ImageFormat, quality: Option<u8>) -> CodecResult<Bytes> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(CodecError::Encode(format!(
                "cannot encode an empty {}x{} image",
                width, height
            )));
        }

        let mut buffer = Cursor::new(Vec::new());

        match format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                let encoder = match quality {
                    Some(q) => JpegEncoder::new_with_quality(&mut buffer, q.clamp(1, 100)),
                    None => JpegEncoder::new(&mut buffer),
                };
                rgb.write_with_encoder(encoder)
                    .map_err(|e| CodecError::Encode(e.to_string()))?;
            }
            ImageFormat::Png => {
                img.write_to(&mut buffer, image::ImageFormat::Png)
                    .map_err(|e| CodecError::Encode(e.to_string()))?;
            }
        }

        Ok(Bytes::from(buffer.into_inner()))
    }
}

fn to_image_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x ^ y) & 0xFF) as u8,
            ])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_png_round_trip_keeps_dimensions() {
        let png = ImageCodec::encode(&gradient(64, 48), ImageFormat::Png, None).unwrap();
        assert_eq!(sniff_format(&png), Some(ImageFormat::Png));
        assert_eq!(ImageCodec::dimensions_of(&png).unwrap(), (64, 48));

        let decoded = ImageCodec::decode(&png, ImageFormat::Png).unwrap();
        assert_eq!(decoded.dimensions(), (64, 48));
    }

    #[test]
    fn test_jpeg_encode_drops_alpha() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 128])));
        let jpeg = ImageCodec::encode(&rgba, ImageFormat::Jpeg, Some(80)).unwrap();
        assert_eq!(sniff_format(&jpeg), Some(ImageFormat::Jpeg));
        assert_eq!(ImageCodec::dimensions_of(&jpeg).unwrap(), (10, 10));
    }

    #[test]
    fn test_png_ignores_quality() {
        let img = gradient(32, 32);
        let a = ImageCodec::encode(&img, ImageFormat::Png, Some(10)).unwrap();
        let b = ImageCodec::encode(&img, ImageFormat::Png, Some(90)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_higher_jpeg_quality_is_not_smaller() {
        let img = gradient(256, 256);
        let low = ImageCodec::encode(&img, ImageFormat::Jpeg, Some(10)).unwrap();
        let high = ImageCodec::encode(&img, ImageFormat::Jpeg, Some(95)).unwrap();
        assert!(high.len() >= low.len(), "{} < {}", high.len(), low.len());
    }

    #[test]
    fn test_decode_rejects_mismatched_magic_bytes() {
        let jpeg = ImageCodec::encode(&gradient(8, 8), ImageFormat::Jpeg, None).unwrap();
        let err = ImageCodec::decode(&jpeg, ImageFormat::Png).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));

        let err = ImageCodec::decode(b"not an image", ImageFormat::Jpeg).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_decode_truncated_png_fails() {
        let png = ImageCodec::encode(&gradient(16, 16), ImageFormat::Png, None).unwrap();
        let truncated = &png[..png.len() / 2];
        assert!(matches!(
            ImageCodec::decode(truncated, ImageFormat::Png),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn test_dimensions_of_corrupt_header_fails() {
        assert!(ImageCodec::dimensions_of(b"\x89PNG\r\n\x1a\ngarbage").is_err());
    }

    #[test]
    fn test_encode_empty_image_fails() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            ImageCodec::encode(&empty, ImageFormat::Png, None),
            Err(CodecError::Encode(_))
        ));
    }
}
