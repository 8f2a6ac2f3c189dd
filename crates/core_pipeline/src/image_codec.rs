//! Image codec
//!
//! Validates uploaded images and turns them into a base64 payload that can be
//! embedded inline in a vision model request. Only JPEG and PNG are accepted;
//! the format is sniffed from the bytes, not trusted from the upload.

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use serde::Serialize;
use std::fmt;

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImageMime {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
}

impl ImageMime {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    /// Map a declared content type (or bare extension) to a supported format
    pub fn from_declared(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" | "jpeg" | "jpg" => Some(ImageMime::Jpeg),
            "image/png" | "png" => Some(ImageMime::Png),
            _ => None,
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons an upload is refused before it reaches the pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("uploaded image is empty")]
    Empty,
    #[error("unsupported image format (expected JPEG or PNG)")]
    UnsupportedFormat,
    #[error("declared type {declared} does not match image content ({detected})")]
    MimeMismatch {
        declared: String,
        detected: ImageMime,
    },
}

/// An image that passed boundary validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    mime: ImageMime,
}

impl UploadedImage {
    /// Validate raw upload bytes
    ///
    /// # Arguments
    /// * `bytes` - File content as uploaded
    /// * `declared_mime` - Content type reported by the client, if any
    ///
    /// # Errors
    /// * `ImageError::Empty` for zero-length input
    /// * `ImageError::UnsupportedFormat` if the bytes are not JPEG or PNG
    /// * `ImageError::MimeMismatch` if the client declared a non-JPEG/PNG type
    pub fn from_bytes(bytes: Vec<u8>, declared_mime: Option<&str>) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let mime = match image::guess_format(&bytes) {
            Ok(ImageFormat::Jpeg) => ImageMime::Jpeg,
            Ok(ImageFormat::Png) => ImageMime::Png,
            _ => return Err(ImageError::UnsupportedFormat),
        };

        // Browsers sometimes send octet-stream; only reject a declared type
        // that names some other image format.
        if let Some(declared) = declared_mime.filter(|d| d.starts_with("image/")) {
            if ImageMime::from_declared(declared).is_none() {
                return Err(ImageError::MimeMismatch {
                    declared: declared.to_string(),
                    detected: mime,
                });
            }
        }

        Ok(Self { bytes, mime })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encode for transport
    pub fn encode(&self) -> TransportPayload {
        encode_image(&self.bytes, self.mime)
    }
}

/// Base64 image data ready to embed in a model request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportPayload {
    pub mime_type: ImageMime,
    /// Standard base64, no line breaks
    pub data: String,
}

impl TransportPayload {
    /// Render as a `data:` URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Base64-encode image bytes
pub fn encode_image(bytes: &[u8], mime: ImageMime) -> TransportPayload {
    TransportPayload {
        mime_type: mime,
        data: general_purpose::STANDARD.encode(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_empty_upload_rejected() {
        assert_eq!(
            UploadedImage::from_bytes(Vec::new(), Some("image/png")),
            Err(ImageError::Empty)
        );
    }

    #[test]
    fn test_sniffs_png_and_jpeg() {
        let png = UploadedImage::from_bytes(PNG_MAGIC.to_vec(), None).unwrap();
        assert_eq!(png.mime(), ImageMime::Png);

        let jpeg = UploadedImage::from_bytes(JPEG_MAGIC.to_vec(), Some("image/jpg")).unwrap();
        assert_eq!(jpeg.mime(), ImageMime::Jpeg);
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let gif = b"GIF89a\x01\x00\x01\x00".to_vec();
        assert_eq!(
            UploadedImage::from_bytes(gif, Some("image/gif")),
            Err(ImageError::UnsupportedFormat)
        );
        assert_eq!(
            UploadedImage::from_bytes(b"hello".to_vec(), None),
            Err(ImageError::UnsupportedFormat)
        );
    }

    #[test]
    fn test_declared_mime_mismatch() {
        let err = UploadedImage::from_bytes(PNG_MAGIC.to_vec(), Some("image/webp")).unwrap_err();
        assert!(matches!(err, ImageError::MimeMismatch { .. }));

        // Generic types are ignored in favor of sniffing
        assert!(
            UploadedImage::from_bytes(PNG_MAGIC.to_vec(), Some("application/octet-stream"))
                .is_ok()
        );
    }

    #[test]
    fn test_encode_data_url() {
        let payload = encode_image(b"abc", ImageMime::Png);
        assert_eq!(payload.data, "YWJj");
        assert_eq!(payload.to_data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_from_declared() {
        assert_eq!(ImageMime::from_declared("image/JPEG"), Some(ImageMime::Jpeg));
        assert_eq!(
            ImageMime::from_declared("image/png; charset=binary"),
            Some(ImageMime::Png)
        );
        assert_eq!(ImageMime::from_declared("image/gif"), None);
    }
}
