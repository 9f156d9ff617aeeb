//! Utility functions for common operations
//!
//! Size formatting and ratio helpers shared by the batch summary and the
//! command line, plus the data URL codec used for previews and for the
//! storage hand-off.

use crate::constants::{DATA_URL_BASE64_MARKER, DATA_URL_SCHEME, PROGRESS_SPINNER_TEMPLATE};
use crate::error::{CompressionError, Result};
use base64::{engine::general_purpose, Engine as _};
use indicatif::{ProgressBar, ProgressStyle};

/// Encode bytes as a `data:<mime>;base64,<payload>` URL
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "{}{}{},{}",
        DATA_URL_SCHEME,
        mime_type,
        DATA_URL_BASE64_MARKER,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Decode a base64 data URL back into its MIME type and bytes
///
/// # Returns
/// * `Ok((mime_type, bytes))` - the declared MIME type and decoded payload
/// * `Err(CompressionError::InvalidDataUrl)` - not a base64 data URL
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix(DATA_URL_SCHEME)
        .ok_or_else(|| CompressionError::InvalidDataUrl("missing data: scheme".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CompressionError::InvalidDataUrl("missing payload separator".to_string()))?;

    let mime_type = header
        .strip_suffix(DATA_URL_BASE64_MARKER)
        .ok_or_else(|| CompressionError::InvalidDataUrl("payload is not base64".to_string()))?;

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| CompressionError::InvalidDataUrl(e.to_string()))?;

    Ok((mime_type.to_string(), bytes))
}

/// Create a progress spinner with consistent styling
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Format file size in human-readable format
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Calculate compression ratio as a percentage
///
/// Positive means the output is smaller, negative means it grew.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}
