use listing_squeeze::batch::is_image_file;
use listing_squeeze::formats::{is_image_mime_type, OutputFormat};
use listing_squeeze::processing::{calculate_dimensions, surface_dimensions, CompressionOptions};
use listing_squeeze::upload::upload_progress;
use proptest::prelude::*;
use std::path::Path;

proptest! {
    #[test]
    fn images_within_bounds_keep_their_size(
        max_width in 1u32..=4000u32,
        max_height in 1u32..=4000u32,
        width_frac in 0.01f64..=1.0,
        height_frac in 0.01f64..=1.0,
    ) {
        let width = ((f64::from(max_width) * width_frac) as u32).max(1);
        let height = ((f64::from(max_height) * height_frac) as u32).max(1);

        let (w, h) = calculate_dimensions(width, height, max_width, max_height, true);
        prop_assert_eq!(surface_dimensions(w, h), (width, height));
    }

    #[test]
    fn landscape_keeps_aspect_ratio(
        width in 2u32..=10000u32,
        height in 1u32..=10000u32,
        max_width in 1u32..=4000u32,
        max_height in 1u32..=4000u32,
    ) {
        prop_assume!(width > height);

        let (w, h) = calculate_dimensions(width, height, max_width, max_height, true);
        let expected = f64::from(width) / f64::from(height);
        prop_assert!(((w / h) - expected).abs() / expected <= 0.01);

        // Truncation to whole pixels costs at most one pixel on the short side.
        let (sw, sh) = surface_dimensions(w, h);
        if sh >= 100 {
            let actual = f64::from(sw) / f64::from(sh);
            prop_assert!((actual - expected).abs() / expected <= 0.01);
        }
    }

    #[test]
    fn dominant_axis_never_exceeds_its_bound(
        width in 1u32..=10000u32,
        height in 1u32..=10000u32,
        max_width in 1u32..=4000u32,
        max_height in 1u32..=4000u32,
    ) {
        let (w, h) = calculate_dimensions(width, height, max_width, max_height, true);
        if width > height {
            prop_assert!(w <= f64::from(max_width));
        } else if width > max_width || height > max_height {
            prop_assert!(h <= f64::from(max_height));
        }
        // Never upscaled.
        prop_assert!(w <= f64::from(width) + 1e-9);
        prop_assert!(h <= f64::from(height) + 1e-9);
    }

    #[test]
    fn distortion_mode_returns_bounds(
        width in 1u32..=10000u32,
        height in 1u32..=10000u32,
        max_width in 1u32..=4000u32,
        max_height in 1u32..=4000u32,
    ) {
        let dimensions = calculate_dimensions(width, height, max_width, max_height, false);
        prop_assert_eq!(dimensions, (f64::from(max_width), f64::from(max_height)));
    }

    #[test]
    fn quality_outside_unit_range_is_rejected(quality in -2.0f32..3.0f32) {
        let result = CompressionOptions::new().with_quality(quality).resolve();
        prop_assert_eq!(result.is_ok(), (0.0..=1.0).contains(&quality));
    }

    #[test]
    fn overlay_prefers_the_top_layer(
        base_width in prop::option::of(1u32..=5000u32),
        top_width in prop::option::of(1u32..=5000u32),
        base_quality in prop::option::of(0.0f32..=1.0),
        top_quality in prop::option::of(0.0f32..=1.0),
    ) {
        let base = CompressionOptions {
            max_width: base_width,
            quality: base_quality,
            ..Default::default()
        };
        let top = CompressionOptions {
            max_width: top_width,
            quality: top_quality,
            ..Default::default()
        };

        let merged = base.overlay(&top);
        prop_assert_eq!(merged.max_width, top_width.or(base_width));
        prop_assert_eq!(merged.quality, top_quality.or(base_quality));

        let settings = merged.resolve().unwrap();
        prop_assert_eq!(settings.max_width, top_width.or(base_width).unwrap_or(1200));
        prop_assert_eq!(settings.output_format, OutputFormat::Jpeg);
    }

    #[test]
    fn only_image_mime_types_are_accepted(subtype in "[a-z0-9.+-]{1,12}") {
        let image_type = format!("image/{}", subtype);
        prop_assert!(is_image_mime_type(&image_type));
        for prefix in ["text/", "application/", "video/"] {
            let other_type = format!("{}{}", prefix, subtype);
            prop_assert!(!is_image_mime_type(&other_type));
        }
    }

    #[test]
    fn upload_progress_stays_within_upload_share(
        (total, uploaded) in (1usize..=500).prop_flat_map(|total| (Just(total), 0..=total))
    ) {
        let progress = upload_progress(uploaded, total);
        prop_assert!(progress <= 70);
        if uploaded == total {
            prop_assert_eq!(progress, 70);
        }
    }

    #[test]
    fn is_image_file_recognizes_extensions(
        extension in prop::sample::select(&["jpg", "jpeg", "JPG", "png", "webp", "bmp", "gif", "tiff", "txt", "pdf"])
    ) {
        let filename = format!("photo.{}", extension);
        let expected = matches!(
            extension.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif"
        );
        prop_assert_eq!(is_image_file(Path::new(&filename)), expected);
    }
}
