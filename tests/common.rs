#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use listing_squeeze::processing::SourceImage;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A gradient so encoders have real content to work with.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

pub fn transparent_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, _| Rgba([200, 10, 10, (x % 256) as u8]));
    encode(&DynamicImage::ImageRgba8(image), ImageFormat::Png)
}

pub fn png_source(name: &str, width: u32, height: u32) -> SourceImage {
    SourceImage::new(name, "image/png", png_bytes(width, height))
}

pub fn jpeg_source(name: &str, width: u32, height: u32) -> SourceImage {
    SourceImage::new(name, "image/jpeg", jpeg_bytes(width, height))
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(bytes).unwrap();
    path
}

/// A directory with two real photos, a text file and a nested photo.
pub fn create_listing_directory() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "front.png", &png_bytes(64, 48));
    write_file(temp_dir.path(), "rear.jpg", &jpeg_bytes(48, 64));
    write_file(temp_dir.path(), "notes.txt", b"one owner, full service history");

    let nested = temp_dir.path().join("interior");
    std::fs::create_dir(&nested).unwrap();
    write_file(&nested, "dashboard.png", &png_bytes(32, 32));

    temp_dir
}
