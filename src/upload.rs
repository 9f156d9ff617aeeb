//! Storage hand-off helpers.
//!
//! The storage uploader receives compressed images either as records or as
//! data URLs and stores each one under a per-owner object name. Nothing here
//! touches the network.

use crate::constants::{FALLBACK_EXTENSION, UPLOAD_PROGRESS_SHARE};
use crate::error::Result;
use crate::processing::CompressedImage;
use crate::utils::decode_data_url;

/// File extension for a MIME type; unknown types are stored as `jpg`.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        _ => FALLBACK_EXTENSION,
    }
}

/// Object key for the `index`-th image of an upload: `{owner}-{timestamp}-{index}.{ext}`
pub fn storage_object_name(
    owner_id: &str,
    timestamp_millis: u128,
    index: usize,
    mime_type: &str,
) -> String {
    format!(
        "{}-{}-{}.{}",
        owner_id,
        timestamp_millis,
        index,
        extension_for_mime(mime_type)
    )
}

/// Upload progress in percent of the whole listing submission.
///
/// Image uploads account for the first 70 points of the bar.
pub fn upload_progress(uploaded: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let share = (uploaded.min(total) as f64 / total as f64) * UPLOAD_PROGRESS_SHARE;
    share.round() as u8
}

/// An image ready to be stored: its object name, content type and bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageObject {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl StorageObject {
    pub fn from_compressed(
        image: &CompressedImage,
        owner_id: &str,
        timestamp_millis: u128,
        index: usize,
    ) -> Self {
        Self {
            name: storage_object_name(owner_id, timestamp_millis, index, image.mime_type()),
            content_type: image.mime_type().to_string(),
            bytes: image.payload.clone(),
        }
    }

    /// Builds the object from a preview data URL, as the upload form keeps them.
    pub fn from_data_url(
        data_url: &str,
        owner_id: &str,
        timestamp_millis: u128,
        index: usize,
    ) -> Result<Self> {
        let (content_type, bytes) = decode_data_url(data_url)?;
        Ok(Self {
            name: storage_object_name(owner_id, timestamp_millis, index, &content_type),
            content_type,
            bytes,
        })
    }
}
