mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use common::{create_listing_directory, jpeg_bytes, png_bytes};
use predicates::prelude::*;

fn listing_squeeze() -> Command {
    Command::cargo_bin("listing-squeeze").unwrap()
}

#[test]
fn test_cli_help() {
    listing_squeeze()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compress"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn test_compress_help() {
    listing_squeeze()
        .args(["compress", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--max-width"))
        .stdout(predicate::str::contains("--keep-going"));
}

#[test]
fn test_compress_missing_args() {
    listing_squeeze().arg("compress").assert().failure();
}

#[test]
fn test_compress_single_png_to_jpeg() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("front.png");
    input.write_binary(&png_bytes(2400, 1600)).unwrap();
    let output = temp.child("out");

    listing_squeeze()
        .arg("compress")
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = output.child("front.jpg");
    written.assert(predicate::path::is_file());

    let image = image::open(written.path()).unwrap();
    assert_eq!((image.width(), image.height()), (1200, 800));
}

#[test]
fn test_compress_reports_each_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("front.png");
    input.write_binary(&png_bytes(64, 48)).unwrap();

    listing_squeeze()
        .arg("compress")
        .arg(input.path())
        .arg("-o")
        .arg(temp.child("out").path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ front.png ->"));
}

#[test]
fn test_compress_directory_with_format_and_bounds() {
    let dir = create_listing_directory();
    let output = dir.path().join("out");

    listing_squeeze()
        .arg("compress")
        .arg(dir.path())
        .arg("-o")
        .arg(&output)
        .args(["-f", "webp", "-W", "32", "-H", "32"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch Summary"));

    assert!(output.join("front.webp").is_file());
    assert!(output.join("rear.webp").is_file());
    // Not recursive, and text files are skipped.
    assert!(!output.join("dashboard.webp").exists());
    assert!(!output.join("notes.webp").exists());
}

#[test]
fn test_compress_recursive_with_owner_names() {
    let dir = create_listing_directory();
    let output = dir.path().join("out");

    listing_squeeze()
        .arg("compress")
        .arg(dir.path())
        .arg("-o")
        .arg(&output)
        .args(["-r", "--owner", "dealer42", "--sequential"])
        .assert()
        .success();

    let names: Vec<String> = std::fs::read_dir(&output)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 3);
    assert!(names
        .iter()
        .all(|name| name.starts_with("dealer42-") && name.ends_with(".jpg")));
}

#[test]
fn test_compress_non_image_file_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("notes.txt");
    input.write_str("not an image").unwrap();

    listing_squeeze()
        .arg("compress")
        .arg(input.path())
        .arg("-o")
        .arg(temp.child("out").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("only image files can be compressed"));
}

#[test]
fn test_compress_keep_going_reports_failures() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("good.jpg").write_binary(&jpeg_bytes(40, 30)).unwrap();
    temp.child("broken.png").write_binary(b"garbage").unwrap();
    let output = temp.child("out");

    listing_squeeze()
        .arg("compress")
        .arg(temp.child("good.jpg").path())
        .arg(temp.child("broken.png").path())
        .arg("-o")
        .arg(output.path())
        .arg("--keep-going")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 images failed"));

    output.child("good.jpg").assert(predicate::path::is_file());
    output.child("broken.jpg").assert(predicate::path::missing());
}

#[test]
fn test_compress_invalid_quality() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("front.png");
    input.write_binary(&png_bytes(10, 10)).unwrap();

    listing_squeeze()
        .arg("compress")
        .arg(input.path())
        .arg("-o")
        .arg(temp.child("out").path())
        .args(["-q", "85"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quality value"));
}

#[test]
fn test_compress_nonexistent_input() {
    let temp = assert_fs::TempDir::new().unwrap();

    listing_squeeze()
        .args(["compress", "nonexistent.jpg", "-o"])
        .arg(temp.child("out").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No image files found"));
}

#[test]
fn test_info_reports_planned_size() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("hero.jpg");
    input.write_binary(&jpeg_bytes(2400, 1200)).unwrap();

    listing_squeeze()
        .arg("info")
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2400x1200"))
        .stdout(predicate::str::contains("1200x600"));
}

#[test]
fn test_info_nonexistent_file() {
    listing_squeeze()
        .args(["info", "nonexistent.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}
