//! Data models for the application

mod history;
mod image;

pub use history::*;
pub use image::*;
