//! Imgops Processing Library
//!
//! Pixel-level work for the transform service: format sniffing, PNG/JPEG
//! decode and encode, resampling, and the pipeline that chains them for one
//! operation. Everything here is synchronous and CPU-bound; callers on an
//! async runtime should run it on the blocking pool.

pub mod codec;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod transform;

pub use codec::ImageCodec;
pub use error::{CodecError, CodecResult};
pub use format::sniff_format;
pub use pipeline::{ImagePipeline, Operation, ProcessedImage};
pub use transform::TransformEngine;
