//! Test fixtures: real PNG and JPEG bytes generated with the `image` crate.

use axum_test::multipart::{MultipartForm, Part};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("encode fixture");
    out.into_inner()
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

/// Decoded dimensions of `bytes`.
pub fn dimensions_of(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).expect("decode result");
    (img.width(), img.height())
}

pub fn image_part(data: Vec<u8>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name)
        .mime_type(mime_type)
}

pub fn png_form(width: u32, height: u32) -> MultipartForm {
    MultipartForm::new().add_part(
        "image",
        image_part(create_test_png(width, height), "image.png", "image/png"),
    )
}

pub fn jpeg_form(width: u32, height: u32) -> MultipartForm {
    MultipartForm::new().add_part(
        "image",
        image_part(create_test_jpeg(width, height), "photo.jpg", "image/jpeg"),
    )
}
