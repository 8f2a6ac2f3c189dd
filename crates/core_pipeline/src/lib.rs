//! Core pipeline for dish2recipe
//!
//! This crate provides the data contract between the remote models and the
//! rest of the application: typed records for food identification and recipe
//! suggestions, the parser that turns raw model text into those records,
//! and the codec that prepares uploaded images for transport.

pub mod image_codec;
pub mod parser;
pub mod types;

pub use image_codec::{encode_image, ImageError, ImageMime, TransportPayload, UploadedImage};
pub use parser::{parse_model_text, strip_code_fence, ModelShape, ParseError, ParseFailure};
pub use types::*;
