use crate::error::{CompressionError, Result};
use crate::formats::{is_image_mime_type, OutputFormat};
use crate::processing::{calculate_dimensions, surface_dimensions, CompressionOptions, SourceImage};
use crate::utils::format_file_size;
use image::ImageReader;
use std::io::Cursor;

/// What compressing a file would do, read from the image header only.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub file: String,
    pub declared_type: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub target_width: u32,
    pub target_height: u32,
    pub output_format: OutputFormat,
}

impl ImageInfo {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn will_resize(&self) -> bool {
        (self.width, self.height) != (self.target_width, self.target_height)
    }
}

/// Reads the natural dimensions and plans the surface size without decoding
/// the pixel data.
pub fn inspect_image(file: &SourceImage, options: &CompressionOptions) -> Result<ImageInfo> {
    if !is_image_mime_type(&file.mime_type) {
        return Err(CompressionError::UnsupportedType {
            file: file.name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }
    let settings = options.resolve()?;

    let decode_error = |reason: String| CompressionError::Decode {
        file: file.name.clone(),
        reason,
    };
    let (width, height) = ImageReader::new(Cursor::new(&file.data[..]))
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?
        .into_dimensions()
        .map_err(|e| decode_error(e.to_string()))?;

    let (target_width, target_height) = calculate_dimensions(
        width,
        height,
        settings.max_width,
        settings.max_height,
        settings.preserve_aspect_ratio,
    );
    let (target_width, target_height) = surface_dimensions(target_width, target_height);

    Ok(ImageInfo {
        file: file.name.clone(),
        declared_type: file.mime_type.clone(),
        size: file.size(),
        width,
        height,
        target_width,
        target_height,
        output_format: settings.output_format,
    })
}

pub fn print_image_info(info: &ImageInfo) {
    println!("📋 {}", info.file);
    println!("  🎭 Declared type: {}", info.declared_type);
    println!(
        "  📦 File size: {} ({} bytes)",
        format_file_size(info.size),
        info.size
    );
    println!("  📏 Dimensions: {}x{} pixels", info.width, info.height);
    println!("  📐 Aspect ratio: {:.2}:1", info.aspect_ratio());
    if info.will_resize() {
        println!(
            "  🔄 Will resize to: {}x{} pixels",
            info.target_width, info.target_height
        );
    } else {
        println!("  ✅ Within bounds, size kept");
    }
    println!(
        "  🎯 Output format: {} ({})",
        info.output_format,
        if info.output_format.is_lossy() { "lossy" } else { "lossless" }
    );
}
