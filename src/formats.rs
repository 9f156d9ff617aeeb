//! Output encodings addressed by MIME type.
//!
//! Callers name the target encoding the way the upload UI does, with a MIME
//! string such as `image/jpeg`. Short names (`jpeg`, `png`, ...) are accepted
//! too so the same parser serves the command line.

use crate::error::{CompressionError, Result};
use image::ImageFormat;
use std::fmt;
use std::str::FromStr;

/// Supported output image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// JPEG, lossy; the only format that honours the quality factor directly
    Jpeg,
    /// PNG, lossless; quality picks the deflate effort
    Png,
    /// WebP, lossless encoder
    WebP,
    /// GIF, palette based
    Gif,
    /// Uncompressed bitmap
    Bmp,
}

impl OutputFormat {
    /// Canonical MIME type, as reported in `CompressedImage`
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Bmp => "image/bmp",
        }
    }

    /// Returns the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Gif => "gif",
            OutputFormat::Bmp => "bmp",
        }
    }

    /// Convert to the image crate's ImageFormat
    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Gif => ImageFormat::Gif,
            OutputFormat::Bmp => ImageFormat::Bmp,
        }
    }

    /// Whether the encoder maps the quality factor onto lossy compression
    pub fn is_lossy(&self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }

    pub fn all_formats() -> Vec<OutputFormat> {
        vec![
            OutputFormat::Jpeg,
            OutputFormat::Png,
            OutputFormat::WebP,
            OutputFormat::Gif,
            OutputFormat::Bmp,
        ]
    }

    /// Parse a MIME type such as `image/png`
    pub fn from_mime_type(mime_type: &str) -> Result<Self> {
        match mime_type.trim().to_lowercase().as_str() {
            "image/jpeg" => Ok(OutputFormat::Jpeg),
            "image/png" => Ok(OutputFormat::Png),
            "image/webp" => Ok(OutputFormat::WebP),
            "image/gif" => Ok(OutputFormat::Gif),
            "image/bmp" => Ok(OutputFormat::Bmp),
            _ => Err(CompressionError::UnsupportedFormat(mime_type.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

impl FromStr for OutputFormat {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        if s.contains('/') {
            return OutputFormat::from_mime_type(s);
        }
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            "gif" => Ok(OutputFormat::Gif),
            "bmp" => Ok(OutputFormat::Bmp),
            _ => Err(CompressionError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Whether a declared MIME type names an image at all.
///
/// Mirrors the browser check on `File.type`: a plain prefix test, no
/// sniffing of the bytes.
pub fn is_image_mime_type(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}
