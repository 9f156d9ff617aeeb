use crate::constants::MAX_FILE_SIZE;
use crate::error::{CompressionError, Result};
use crate::processing::SourceImage;
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// Validate input file path for existence, kind and size
pub fn validate_input_path(path: &Path) -> Result<u64> {
    if !path.exists() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(CompressionError::UnsupportedFormat(format!(
            "Input path is not a file: {}",
            path.display()
        )));
    }

    let size = fs::metadata(path)?.len();
    if size > MAX_FILE_SIZE {
        return Err(CompressionError::FileTooLarge(size, MAX_FILE_SIZE));
    }

    Ok(size)
}

/// Declared MIME type of a file, from its extension only.
///
/// This is the same information a browser puts in `File.type`; the bytes
/// are not inspected.
pub fn sniff_mime_type(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_MIME_TYPE)
}

/// Reads a file from disk into a [`SourceImage`] named after the file.
pub fn load_source_image(path: &Path) -> Result<SourceImage> {
    validate_input_path(path)?;
    let data = fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(SourceImage::new(name, sniff_mime_type(path), data))
}

/// Create the output directory if needed and return it
pub fn prepare_output_dir(path: &Path) -> Result<PathBuf> {
    if path.exists() && !path.is_dir() {
        return Err(CompressionError::DirectoryCreationFailed(path.to_path_buf()));
    }
    fs::create_dir_all(path)
        .map_err(|_| CompressionError::DirectoryCreationFailed(path.to_path_buf()))?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_validate_input_path_not_found() {
        let path = Path::new("nonexistent.jpg");
        let result = validate_input_path(path);
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_input_path_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_input_path(temp_dir.path());
        assert!(matches!(result, Err(CompressionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_sniff_mime_type() {
        assert_eq!(sniff_mime_type(Path::new("car.jpg")), "image/jpeg");
        assert_eq!(sniff_mime_type(Path::new("car.JPEG")), "image/jpeg");
        assert_eq!(sniff_mime_type(Path::new("car.png")), "image/png");
        assert_eq!(sniff_mime_type(Path::new("car.webp")), "image/webp");
        assert_eq!(sniff_mime_type(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(sniff_mime_type(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_load_source_image() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("front.png");
        let mut file = File::create(&test_file).unwrap();
        file.write_all(b"fake image data").unwrap();

        let source = load_source_image(&test_file).unwrap();
        assert_eq!(source.name, "front.png");
        assert_eq!(source.mime_type, "image/png");
        assert_eq!(source.size(), 15);
    }

    #[test]
    fn test_prepare_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("out");
        assert_eq!(prepare_output_dir(&out).unwrap(), out);
        assert!(out.is_dir());

        let file_path = temp_dir.path().join("file.jpg");
        File::create(&file_path).unwrap();
        assert!(matches!(
            prepare_output_dir(&file_path),
            Err(CompressionError::DirectoryCreationFailed(_))
        ));
    }
}
