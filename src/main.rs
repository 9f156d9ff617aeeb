use anyhow::{bail, Context};
use clap::Parser;
use listing_squeeze::batch::{
    collect_image_files, compress_images, compress_images_sequential, compress_images_settled,
    generate_output_path, validate_batch_limits, BatchSummary,
};
use listing_squeeze::cli::{Args, Commands, CompressArgs, OptionArgs};
use listing_squeeze::error::CompressionError;
use listing_squeeze::info::{inspect_image, print_image_info};
use listing_squeeze::logger::init_logging;
use listing_squeeze::processing::{CompressedImage, SourceImage};
use listing_squeeze::upload::{upload_progress, StorageObject};
use listing_squeeze::utils::{create_progress_spinner, format_file_size};
use listing_squeeze::validation::{load_source_image, prepare_output_dir};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.quiet, args.verbose);

    match args.command {
        Commands::Compress(compress) => run_compress(compress, args.quiet),
        Commands::Info { input, options } => show_image_info(&input, &options),
    }
}

fn run_compress(args: CompressArgs, quiet: bool) -> anyhow::Result<()> {
    let options = args.options.to_options()?;
    let settings = options.resolve()?;

    let mut paths = Vec::new();
    for input in &args.inputs {
        paths.extend(collect_image_files(input, args.recursive)?);
    }
    if paths.is_empty() {
        return Err(CompressionError::NoImageFilesFound(args.inputs.join(", ")).into());
    }

    let sources = paths
        .iter()
        .map(|path| load_source_image(path))
        .collect::<Result<Vec<_>, _>>()?;

    let (estimated_mib, large_images) = validate_batch_limits(&sources)?;
    debug!(
        files = sources.len(),
        estimated_mib, large_images, "batch limits checked"
    );
    if large_images > 0 {
        warn!("{} large image(s) in batch, memory use may peak", large_images);
    }

    let output_dir = prepare_output_dir(&args.output)?;
    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(threads)
        .build()
        .context("failed to start runtime")?;

    info!(
        files = sources.len(),
        format = %settings.output_format,
        max_width = settings.max_width,
        max_height = settings.max_height,
        "compressing"
    );

    let spinner = (!quiet).then(|| {
        create_progress_spinner(&format!("Compressing {} image(s)...", sources.len()))
    });
    if let Some(pb) = &spinner {
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
    }

    let results: Vec<Result<CompressedImage, CompressionError>> = if args.keep_going {
        runtime.block_on(compress_images_settled(&sources, &options))
    } else {
        let compressed = if args.sequential {
            runtime.block_on(compress_images_sequential(&sources, &options))
        } else {
            runtime.block_on(compress_images(&sources, &options))
        };
        match compressed {
            Ok(images) => images.into_iter().map(Ok).collect(),
            Err(e) => {
                if let Some(pb) = &spinner {
                    pb.finish_and_clear();
                }
                return Err(e.into());
            }
        }
    };

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    write_outputs(
        &sources,
        &results,
        &output_dir,
        args.owner.as_deref(),
        quiet,
    )?;

    let summary = BatchSummary::from_results(&results);
    if !quiet {
        print_summary(&summary);
    }

    if summary.failed() > 0 {
        bail!(
            "{} of {} images failed",
            summary.failed(),
            summary.total_files
        );
    }

    Ok(())
}

fn write_outputs(
    sources: &[SourceImage],
    results: &[Result<CompressedImage, CompressionError>],
    output_dir: &Path,
    owner: Option<&str>,
    quiet: bool,
) -> anyhow::Result<()> {
    let timestamp_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let total = results.iter().filter(|r| r.is_ok()).count();

    let mut written = 0;
    for (index, (source, result)) in sources.iter().zip(results).enumerate() {
        let Ok(image) = result else {
            continue;
        };

        let output_path = match owner {
            Some(owner_id) => {
                let object = StorageObject::from_compressed(image, owner_id, timestamp_millis, index);
                output_dir.join(object.name)
            }
            None => generate_output_path(&source.name, output_dir, image.format),
        };

        fs::write(&output_path, &image.payload)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        written += 1;

        debug!(
            file = %source.name,
            output = %output_path.display(),
            width = image.width,
            height = image.height,
            progress = upload_progress(written, total),
            "written"
        );
        if !quiet {
            println!(
                "✅ {} -> {} ({} -> {}, {:.1}% smaller)",
                source.name,
                output_path.display(),
                format_file_size(image.original_size),
                format_file_size(image.compressed_size),
                image.compression_ratio()
            );
        }
    }

    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!("\n📊 Batch Summary:");
    println!("  Total files: {}", summary.total_files);
    println!("  Processed: {}", summary.processed);
    println!("  Failed: {}", summary.failed());
    println!(
        "  Total size: {} -> {}",
        format_file_size(summary.total_original_size),
        format_file_size(summary.total_compressed_size)
    );
    println!("  Compression ratio: {:.1}%", summary.compression_ratio());

    for failure in &summary.failures {
        eprintln!("  ❌ #{}: {}", failure.index, failure.message);
    }
}

fn show_image_info(input: &Path, options: &OptionArgs) -> anyhow::Result<()> {
    let options = options.to_options()?;
    let source = load_source_image(input)?;
    let info = inspect_image(&source, &options)?;
    print_image_info(&info);
    Ok(())
}
