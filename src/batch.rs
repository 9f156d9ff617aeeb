use crate::constants::{
    LARGE_IMAGE_THRESHOLD_MIB, MAX_BATCH_FILES, MAX_BATCH_MEMORY_MIB, MIN_AVAILABLE_MEMORY_MIB,
    SUPPORTED_IMAGE_EXTENSIONS,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::processing::{compress_image, CompressedImage, CompressionOptions, SourceImage};
use crate::utils::calculate_compression_ratio;
use futures::future::{join_all, try_join_all};
use glob::glob;
use std::path::{Path, PathBuf};
use sysinfo::{MemoryRefreshKind, RefreshKind, System};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Compresses every file concurrently, fail-fast.
///
/// All compressions are started before any is awaited. Element `i` of the
/// output belongs to `files[i]` whatever order they finish in. The first
/// failure abandons the batch; there is no partial result.
pub async fn compress_images(
    files: &[SourceImage],
    options: &CompressionOptions,
) -> Result<Vec<CompressedImage>> {
    options.resolve()?;
    debug!(count = files.len(), "compressing batch");

    try_join_all(files.iter().map(|file| compress_image(file, options))).await
}

/// Same contract as [`compress_images`], one file at a time.
pub async fn compress_images_sequential(
    files: &[SourceImage],
    options: &CompressionOptions,
) -> Result<Vec<CompressedImage>> {
    options.resolve()?;

    let mut compressed = Vec::with_capacity(files.len());
    for file in files {
        compressed.push(compress_image(file, options).await?);
    }
    Ok(compressed)
}

/// Runs every file to completion and keeps each outcome, in input order.
pub async fn compress_images_settled(
    files: &[SourceImage],
    options: &CompressionOptions,
) -> Vec<Result<CompressedImage>> {
    let results = join_all(files.iter().map(|file| compress_image(file, options))).await;

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        warn!(file = err.file().unwrap_or("<batch>"), "{}", err);
    }
    results
}

/// One failed file in a settled batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub index: usize,
    pub file: Option<String>,
    pub message: String,
}

/// Totals over a batch, enough to report "N of M images failed".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total_files: usize,
    pub processed: usize,
    pub failures: Vec<BatchFailure>,
    pub total_original_size: u64,
    pub total_compressed_size: u64,
}

impl BatchSummary {
    pub fn from_results(results: &[Result<CompressedImage>]) -> Self {
        let mut summary = BatchSummary {
            total_files: results.len(),
            ..Default::default()
        };

        for (index, result) in results.iter().enumerate() {
            match result {
                Ok(image) => {
                    summary.processed += 1;
                    summary.total_original_size += image.original_size;
                    summary.total_compressed_size += image.compressed_size;
                }
                Err(e) => summary.failures.push(BatchFailure {
                    index,
                    file: e.file().map(str::to_string),
                    message: e.to_string(),
                }),
            }
        }

        summary
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn compression_ratio(&self) -> f64 {
        calculate_compression_ratio(self.total_original_size, self.total_compressed_size)
    }
}

/// Estimates decoded memory for a source image without decoding it.
///
/// Decoded rasters are typically 3-4x the size of a compressed file and
/// close to 1x for uncompressed formats.
fn estimate_image_memory_usage(file: &SourceImage) -> f64 {
    let size_mib = file.size() as f64 / (1024.0 * 1024.0);

    let multiplier = match file.mime_type.to_lowercase().as_str() {
        "image/jpeg" => 4.0,
        "image/png" => 3.0,
        "image/webp" => 3.5,
        "image/bmp" => 1.2,
        "image/gif" => 2.0,
        _ => 3.0,
    };

    size_mib * multiplier
}

/// Validates batch memory requirements before processing.
///
/// # Returns
/// * `Ok((total_memory_mib, large_image_count))` - Estimated memory usage and count of large images
/// * `Err(CompressionError)` - If file count or memory limits would be exceeded
pub fn validate_batch_limits(files: &[SourceImage]) -> Result<(f64, usize)> {
    if files.len() > MAX_BATCH_FILES {
        return Err(CompressionError::BatchFileLimitExceeded(
            files.len(),
            MAX_BATCH_FILES,
        ));
    }

    let mut total_memory_mib = 0.0;
    let mut large_image_count = 0;
    for file in files {
        let estimate = estimate_image_memory_usage(file);
        total_memory_mib += estimate;
        if estimate > LARGE_IMAGE_THRESHOLD_MIB {
            large_image_count += 1;
        }
    }

    let total_memory_mib_u64 = total_memory_mib.ceil() as u64;
    if total_memory_mib_u64 > MAX_BATCH_MEMORY_MIB {
        return Err(CompressionError::BatchMemoryLimitExceeded(
            total_memory_mib_u64,
            MAX_BATCH_MEMORY_MIB,
        ));
    }

    // sysinfo 0.30+ reports bytes
    let mut sys =
        System::new_with_specifics(RefreshKind::new().with_memory(MemoryRefreshKind::new()));
    sys.refresh_memory();
    let available_mem_mib = sys.available_memory() / (1024 * 1024);
    if total_memory_mib_u64 + MIN_AVAILABLE_MEMORY_MIB > available_mem_mib {
        return Err(CompressionError::InsufficientMemory(
            total_memory_mib_u64,
            available_mem_mib,
        ));
    }

    Ok((total_memory_mib, large_image_count))
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expands an input argument into image file paths.
///
/// The input may be a file, a directory (walked one level deep unless
/// `recursive`) or a glob pattern. Hidden entries are skipped.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        image_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path)
        } else {
            WalkDir::new(input_path).max_depth(1)
        };

        for entry in walker
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                image_files.push(path.to_path_buf());
            }
        }
    } else if let Ok(pattern) = glob(input) {
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
    } else {
        return Err(CompressionError::NoImageFilesFound(input.to_string()));
    }

    Ok(image_files)
}

/// Output path for a compressed file: same stem, extension of the output format.
pub fn generate_output_path(source_name: &str, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_name.to_string());

    output_dir.join(format!("{}.{}", stem, format.extension()))
}
