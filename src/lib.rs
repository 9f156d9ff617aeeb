pub mod batch;
pub mod cli;
pub mod constants;
pub mod error;
pub mod formats;
pub mod info;
pub mod logger;
pub mod processing;
pub mod upload;
pub mod utils;
pub mod validation;

pub use batch::{
    collect_image_files, compress_images, compress_images_sequential, compress_images_settled,
    generate_output_path, is_image_file, validate_batch_limits, BatchFailure, BatchSummary,
};
pub use error::{CompressionError, Result};
pub use formats::{is_image_mime_type, OutputFormat};
pub use info::{inspect_image, print_image_info, ImageInfo};
pub use processing::{
    calculate_dimensions, compress_image, compress_image_blocking, CompressedImage,
    CompressionOptions, CompressionSettings, SourceImage,
};
pub use upload::{storage_object_name, upload_progress, StorageObject};
pub use utils::{decode_data_url, encode_data_url};
pub use validation::load_source_image;
