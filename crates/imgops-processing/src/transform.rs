use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::error::{CodecError, CodecResult};

/// Pixel transforms applied between decode and encode
pub struct TransformEngine;

impl TransformEngine {
    /// Resample to exactly `width` x `height` with linear interpolation.
    /// Aspect ratio is not preserved.
    pub fn resize(img: &DynamicImage, width: u32, height: u32) -> CodecResult<DynamicImage> {
        let (src_width, src_height) = img.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(CodecError::Transform("source image is empty".to_string()));
        }
        if width == 0 || height == 0 {
            return Err(CodecError::Transform(format!(
                "invalid target size {}x{}",
                width, height
            )));
        }

        Ok(img.resize_exact(width, height, FilterType::Triangle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_resize_exact_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(800, 600, Rgba([255, 0, 0, 255])));

        for (w, h) in [(400, 300), (1, 1), (1000, 10), (3000, 2)] {
            let resized = TransformEngine::resize(&img, w, h).unwrap();
            assert_eq!(resized.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_resize_does_not_keep_aspect_ratio() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(100, 100));
        let resized = TransformEngine::resize(&img, 300, 20).unwrap();
        assert_eq!(resized.dimensions(), (300, 20));
    }

    #[test]
    fn test_resize_empty_source_fails() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert!(matches!(
            TransformEngine::resize(&img, 10, 10),
            Err(CodecError::Transform(_))
        ));
    }
}
