use crate::constants::{
    DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_OUTPUT_FORMAT, DEFAULT_PRESERVE_ASPECT_RATIO,
    DEFAULT_QUALITY, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAX_QUALITY,
    MAX_SURFACE_AREA, MAX_SURFACE_DIMENSION, MIN_QUALITY, OXIPNG_PRESET,
    PNG_HIGH_COMPRESSION_QUALITY, PNG_ZOPFLI_QUALITY, ZOPFLI_ITERATIONS,
};
use crate::error::{CompressionError, Result};
use crate::formats::{is_image_mime_type, OutputFormat};
use crate::utils::{calculate_compression_ratio, encode_data_url};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use oxipng::{Deflaters, Options};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::num::NonZeroU8;
use std::sync::Arc;
use tracing::debug;

/// Partially specified compression options.
///
/// Every field is optional; missing fields fall back to the defaults when the
/// options are resolved. Field names follow the JSON object the upload UI
/// builds (`maxWidth`, `outputFormat`, ...), so an options file can be
/// deserialized directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_aspect_ratio: Option<bool>,
}

impl CompressionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn with_max_height(mut self, max_height: u32) -> Self {
        self.max_height = Some(max_height);
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_output_format(mut self, output_format: impl Into<String>) -> Self {
        self.output_format = Some(output_format.into());
        self
    }

    pub fn with_preserve_aspect_ratio(mut self, preserve: bool) -> Self {
        self.preserve_aspect_ratio = Some(preserve);
        self
    }

    /// Layers `other` on top of `self`: fields present in `other` win.
    pub fn overlay(&self, other: &CompressionOptions) -> CompressionOptions {
        CompressionOptions {
            max_width: other.max_width.or(self.max_width),
            max_height: other.max_height.or(self.max_height),
            quality: other.quality.or(self.quality),
            output_format: other
                .output_format
                .clone()
                .or_else(|| self.output_format.clone()),
            preserve_aspect_ratio: other.preserve_aspect_ratio.or(self.preserve_aspect_ratio),
        }
    }

    /// Merges the options over the defaults and validates the result.
    ///
    /// # Returns
    /// * `Ok(CompressionSettings)` - Fully populated settings
    /// * `Err(CompressionError::InvalidQuality)` - quality outside `[0, 1]`
    /// * `Err(CompressionError::InvalidDimensions)` - a zero maximum bound
    /// * `Err(CompressionError::UnsupportedFormat)` - unknown output MIME type
    pub fn resolve(&self) -> Result<CompressionSettings> {
        let quality = self.quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        let max_width = self.max_width.unwrap_or(DEFAULT_MAX_WIDTH);
        let max_height = self.max_height.unwrap_or(DEFAULT_MAX_HEIGHT);
        if max_width == 0 || max_height == 0 {
            return Err(CompressionError::InvalidDimensions(max_width, max_height));
        }

        let output_format = OutputFormat::from_mime_type(
            self.output_format.as_deref().unwrap_or(DEFAULT_OUTPUT_FORMAT),
        )?;

        Ok(CompressionSettings {
            max_width,
            max_height,
            quality,
            output_format,
            preserve_aspect_ratio: self
                .preserve_aspect_ratio
                .unwrap_or(DEFAULT_PRESERVE_ASPECT_RATIO),
        })
    }
}

/// Resolved options, every field populated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionSettings {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: f32,
    pub output_format: OutputFormat,
    pub preserve_aspect_ratio: bool,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
            output_format: OutputFormat::Jpeg,
            preserve_aspect_ratio: DEFAULT_PRESERVE_ASPECT_RATIO,
        }
    }
}

/// An image file handed over by the upload UI.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Display name, used to identify the file in errors
    pub name: String,
    /// Declared MIME type; never checked against the bytes
    pub mime_type: String,
    pub data: Arc<[u8]>,
}

impl SourceImage {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Result of compressing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedImage {
    pub payload: Vec<u8>,
    /// `data:<mime>;base64,...` of exactly `payload`
    pub data_url: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Size reduction in percent; negative when the output grew.
    pub fn compression_ratio(&self) -> f64 {
        calculate_compression_ratio(self.original_size, self.compressed_size)
    }
}

/// Computes the target size of the rendering surface.
///
/// Only the dominant axis is bounded by its own maximum; the other axis is
/// derived from the aspect ratio and may exceed its maximum (a 4000x3000
/// image with bounds 1200x100 becomes 1200x900). Callers rely on these exact
/// dimensions.
///
/// # Arguments
/// * `original_width`, `original_height` - Natural size of the decoded raster
/// * `max_width`, `max_height` - Bounds from the resolved options
/// * `preserve_aspect_ratio` - When false the bounds are returned as-is
///
/// # Returns
/// * `(width, height)` before truncation to whole pixels
pub fn calculate_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
    preserve_aspect_ratio: bool,
) -> (f64, f64) {
    if !preserve_aspect_ratio {
        return (f64::from(max_width), f64::from(max_height));
    }

    if original_width <= max_width && original_height <= max_height {
        return (f64::from(original_width), f64::from(original_height));
    }

    let aspect_ratio = f64::from(original_width) / f64::from(original_height);

    if original_width > original_height {
        let width = f64::from(max_width.min(original_width));
        (width, width / aspect_ratio)
    } else {
        let height = f64::from(max_height.min(original_height));
        (height * aspect_ratio, height)
    }
}

/// Whole-pixel surface size: fractional sizes truncate toward zero, the way
/// a drawing surface treats a fractional width.
pub fn surface_dimensions(width: f64, height: f64) -> (u32, u32) {
    (width.trunc() as u32, height.trunc() as u32)
}

/// Surface size for a decoded raster under the given settings.
pub fn target_surface(raster: &DynamicImage, settings: &CompressionSettings) -> (u32, u32) {
    let (width, height) = calculate_dimensions(
        raster.width(),
        raster.height(),
        settings.max_width,
        settings.max_height,
        settings.preserve_aspect_ratio,
    );
    surface_dimensions(width, height)
}

fn ensure_image_type(file: &SourceImage) -> Result<()> {
    if !is_image_mime_type(&file.mime_type) {
        return Err(CompressionError::UnsupportedType {
            file: file.name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }
    Ok(())
}

/// Decodes the raw bytes into a raster; the format is guessed from content.
pub fn decode_raster(file_name: &str, data: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(data).map_err(|e| CompressionError::Decode {
        file: file_name.to_string(),
        reason: e.to_string(),
    })
}

fn no_output(file_name: &str) -> CompressionError {
    CompressionError::Encode {
        file: file_name.to_string(),
        reason: "encoder produced no output".to_string(),
    }
}

fn validate_surface(file_name: &str, width: u32, height: u32) -> Result<()> {
    // An empty surface can be created but never encodes to anything.
    if width == 0 || height == 0 {
        return Err(no_output(file_name));
    }

    let reason = if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
        Some(format!(
            "side exceeds the {} pixel limit",
            MAX_SURFACE_DIMENSION
        ))
    } else if u64::from(width) * u64::from(height) > MAX_SURFACE_AREA {
        Some(format!("area exceeds the {} pixel limit", MAX_SURFACE_AREA))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CompressionError::Surface {
            file: file_name.to_string(),
            width,
            height,
            reason,
        }),
        None => Ok(()),
    }
}

/// Scales the raster onto a surface of the target size in one pass.
///
/// The raster is consumed; when the size is unchanged it becomes the surface
/// without resampling. A surface with a zero side yields `Encode`, one past
/// the size limits yields `Surface`.
pub fn render_surface(
    file_name: &str,
    raster: DynamicImage,
    width: u32,
    height: u32,
) -> Result<DynamicImage> {
    validate_surface(file_name, width, height)?;

    if raster.width() == width && raster.height() == height {
        debug!(file = file_name, width, height, "surface matches raster, skipping resample");
        return Ok(raster);
    }

    debug!(
        file = file_name,
        from_width = raster.width(),
        from_height = raster.height(),
        width,
        height,
        "rendering surface"
    );
    Ok(raster.resize_exact(width, height, FilterType::Triangle))
}

/// Maps the `[0, 1]` quality factor onto the JPEG encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    ((quality * 100.0).round() as u8).clamp(1, 100)
}

fn png_deflater(quality: f32) -> Deflaters {
    if quality >= PNG_ZOPFLI_QUALITY {
        if let Some(iterations) = NonZeroU8::new(ZOPFLI_ITERATIONS) {
            return Deflaters::Zopfli { iterations };
        }
    }

    if quality >= PNG_HIGH_COMPRESSION_QUALITY {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    }
}

fn encode_jpeg(surface: &DynamicImage, quality: f32) -> std::result::Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(surface.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(
        &mut buffer,
        jpeg_quality(quality),
    ))
    .map_err(|e| e.to_string())?;
    Ok(buffer)
}

fn encode_png(surface: &DynamicImage, quality: f32) -> std::result::Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    let rgba = DynamicImage::ImageRgba8(surface.to_rgba8());
    rgba.write_with_encoder(PngEncoder::new(&mut buffer))
        .map_err(|e| e.to_string())?;

    let mut oxipng_options = Options::from_preset(OXIPNG_PRESET);
    oxipng_options.deflate = png_deflater(quality);

    oxipng::optimize_from_memory(&buffer, &oxipng_options)
        .map_err(|e| format!("PNG optimization failed: {}", e))
}

fn encode_webp(surface: &DynamicImage, _quality: f32) -> std::result::Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    let rgba = DynamicImage::ImageRgba8(surface.to_rgba8());
    rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}

fn encode_generic(
    surface: &DynamicImage,
    format: OutputFormat,
    _quality: f32,
) -> std::result::Result<Vec<u8>, String> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(surface.to_rgba8())
        .write_to(&mut cursor, format.to_image_format())
        .map_err(|e| e.to_string())?;
    Ok(cursor.into_inner())
}

/// Re-encodes the surface.
///
/// The quality factor is always handed to the format's encoder; lossless
/// encoders decide for themselves what to do with it.
pub fn encode_surface(
    file_name: &str,
    surface: &DynamicImage,
    format: OutputFormat,
    quality: f32,
) -> Result<Vec<u8>> {
    let encoded = match format {
        OutputFormat::Jpeg => encode_jpeg(surface, quality),
        OutputFormat::Png => encode_png(surface, quality),
        OutputFormat::WebP => encode_webp(surface, quality),
        OutputFormat::Gif | OutputFormat::Bmp => encode_generic(surface, format, quality),
    }
    .map_err(|reason| CompressionError::Encode {
        file: file_name.to_string(),
        reason,
    })?;

    ensure_encoded(file_name, encoded)
}

fn ensure_encoded(file_name: &str, encoded: Vec<u8>) -> Result<Vec<u8>> {
    if encoded.is_empty() {
        return Err(no_output(file_name));
    }
    Ok(encoded)
}

fn assemble(
    file: &SourceImage,
    payload: Vec<u8>,
    format: OutputFormat,
    width: u32,
    height: u32,
) -> CompressedImage {
    let data_url = encode_data_url(format.mime_type(), &payload);
    let compressed_size = payload.len() as u64;

    debug!(
        file = %file.name,
        original_size = file.size(),
        compressed_size,
        format = format.mime_type(),
        "image compressed"
    );

    CompressedImage {
        payload,
        data_url,
        original_size: file.size(),
        compressed_size,
        format,
        width,
        height,
    }
}

/// Compresses one image.
///
/// Decode and render+encode each run on the blocking pool; the future
/// suspends while they run. The declared type is checked before anything
/// else, so non-images are never decoded.
///
/// # Returns
/// * `Ok(CompressedImage)` - payload, data URL and size accounting
/// * `Err(CompressionError)` - `UnsupportedType`, `Decode`, `Surface`,
///   `Encode`, or an option validation error
pub async fn compress_image(
    file: &SourceImage,
    options: &CompressionOptions,
) -> Result<CompressedImage> {
    ensure_image_type(file)?;
    let settings = options.resolve()?;

    debug!(file = %file.name, size = file.size(), "decoding image");
    let name = file.name.clone();
    let data = Arc::clone(&file.data);
    let raster = tokio::task::spawn_blocking(move || decode_raster(&name, &data))
        .await
        .map_err(|e| CompressionError::Decode {
            file: file.name.clone(),
            reason: format!("decode task failed: {}", e),
        })??;

    let (width, height) = target_surface(&raster, &settings);

    let name = file.name.clone();
    let payload = tokio::task::spawn_blocking(move || {
        let surface = render_surface(&name, raster, width, height)?;
        encode_surface(&name, &surface, settings.output_format, settings.quality)
    })
    .await
    .map_err(|e| CompressionError::Encode {
        file: file.name.clone(),
        reason: format!("encode task failed: {}", e),
    })??;

    Ok(assemble(file, payload, settings.output_format, width, height))
}

/// Same pipeline as [`compress_image`], run on the calling thread.
pub fn compress_image_blocking(
    file: &SourceImage,
    options: &CompressionOptions,
) -> Result<CompressedImage> {
    ensure_image_type(file)?;
    let settings = options.resolve()?;

    let raster = decode_raster(&file.name, &file.data)?;
    let (width, height) = target_surface(&raster, &settings);
    let surface = render_surface(&file.name, raster, width, height)?;
    let payload = encode_surface(
        &file.name,
        &surface,
        settings.output_format,
        settings.quality,
    )?;

    Ok(assemble(file, payload, settings.output_format, width, height))
}
