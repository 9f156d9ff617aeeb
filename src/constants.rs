pub const DEFAULT_MAX_WIDTH: u32 = 1200;
pub const DEFAULT_MAX_HEIGHT: u32 = 1200;
pub const DEFAULT_QUALITY: f32 = 0.8;
pub const DEFAULT_OUTPUT_FORMAT: &str = "image/jpeg";
pub const DEFAULT_PRESERVE_ASPECT_RATIO: bool = true;

pub const MIN_QUALITY: f32 = 0.0;
pub const MAX_QUALITY: f32 = 1.0;

// Largest surface a browser canvas will allocate.
pub const MAX_SURFACE_DIMENSION: u32 = 32_767;
pub const MAX_SURFACE_AREA: u64 = 268_435_456;

pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

pub const MAX_BATCH_FILES: usize = 1000;
pub const MAX_BATCH_MEMORY_MIB: u64 = 4096;
pub const MIN_AVAILABLE_MEMORY_MIB: u64 = 256;
pub const LARGE_IMAGE_THRESHOLD_MIB: f64 = 50.0;

pub const PNG_ZOPFLI_QUALITY: f32 = 0.9;
pub const PNG_HIGH_COMPRESSION_QUALITY: f32 = 0.7;
pub const OXIPNG_PRESET: u8 = 2;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;

pub const DATA_URL_SCHEME: &str = "data:";
pub const DATA_URL_BASE64_MARKER: &str = ";base64";

// Share of the listing submission progress bar taken by image uploads.
pub const UPLOAD_PROGRESS_SHARE: f64 = 70.0;
pub const FALLBACK_EXTENSION: &str = "jpg";

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "webp", "bmp", "gif"];
