use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("{file}: only image files can be compressed (declared type {mime_type:?})")]
    UnsupportedType { file: String, mime_type: String },

    #[error("{file}: failed to decode image: {reason}")]
    Decode { file: String, reason: String },

    #[error("{file}: could not create a {width}x{height} rendering surface: {reason}")]
    Surface {
        file: String,
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("{file}: failed to encode image: {reason}")]
    Encode { file: String, reason: String },

    #[error("Invalid quality value: {0}. Must be between 0 and 1")]
    InvalidQuality(f32),

    #[error("Invalid maximum dimensions: {0}x{1}. Both bounds must be positive")]
    InvalidDimensions(u32, u32),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Batch memory limit exceeded: estimated {0}MB, maximum allowed {1}MB")]
    BatchMemoryLimitExceeded(u64, u64),

    #[error("Batch file count limit exceeded: {0} files, maximum allowed {1}")]
    BatchFileLimitExceeded(usize, usize),

    #[error(
        "Insufficient available memory: estimated batch requires {0}MB, but only {1}MB available"
    )]
    InsufficientMemory(u64, u64),
}

impl CompressionError {
    /// Name of the file a per-file failure belongs to, if any.
    pub fn file(&self) -> Option<&str> {
        match self {
            CompressionError::UnsupportedType { file, .. }
            | CompressionError::Decode { file, .. }
            | CompressionError::Surface { file, .. }
            | CompressionError::Encode { file, .. } => Some(file),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;
