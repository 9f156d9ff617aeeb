use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::processing::CompressionOptions;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "listing-squeeze",
    about = "Compress listing photos before upload: bounded resize, re-encode, size report",
    long_about = "listing-squeeze prepares car listing photos for upload. Each image is decoded, \
                  scaled down to fit the configured bounds, re-encoded (JPEG by default) and \
                  written out, with before/after sizes reported per file and for the batch.",
    version,
    after_help = "EXAMPLES:\n  \
    listing-squeeze compress front.jpg rear.jpg -o ./upload\n  \
    listing-squeeze compress ./photos -r -o ./upload --max-width 800 -q 0.7\n  \
    listing-squeeze compress \"./photos/*.png\" -o ./upload -f webp --keep-going\n  \
    listing-squeeze info front.jpg --options listing.json"
)]
pub struct Args {
    #[arg(short = 'v', long, global = true, help = "Log each pipeline stage")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Only print errors"
    )]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Compress one or more images",
        long_about = "Compress images from files, directories or glob patterns. All images are \
                      compressed concurrently; by default the first failure aborts the batch."
    )]
    Compress(CompressArgs),

    #[command(
        about = "Show dimensions and the planned output size of an image",
        long_about = "Read an image header and report its size, dimensions and the surface size \
                      compression would produce under the given options."
    )]
    Info {
        #[arg(help = "Image file path to analyze")]
        input: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct CompressArgs {
    #[arg(
        required = true,
        num_args = 1..,
        help = "Input files, directories or glob patterns"
    )]
    pub inputs: Vec<String>,

    #[arg(short = 'o', long, help = "Output directory")]
    pub output: PathBuf,

    #[command(flatten)]
    pub options: OptionArgs,

    #[arg(short = 'r', long, help = "Recurse into input directories")]
    pub recursive: bool,

    #[arg(long, help = "Compress one image at a time")]
    pub sequential: bool,

    #[arg(
        long,
        conflicts_with = "sequential",
        help = "Compress every image even if some fail, then report the failures"
    )]
    pub keep_going: bool,

    #[arg(
        long,
        value_name = "ID",
        help = "Name outputs as storage objects: {owner}-{timestamp}-{index}.{ext}"
    )]
    pub owner: Option<String>,

    #[arg(
        short = 'j',
        long,
        help = "Maximum number of decode/encode threads (default: number of CPUs)"
    )]
    pub threads: Option<usize>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct OptionArgs {
    #[arg(short = 'W', long, help = "Maximum output width in pixels (default: 1200)")]
    pub max_width: Option<u32>,

    #[arg(short = 'H', long, help = "Maximum output height in pixels (default: 1200)")]
    pub max_height: Option<u32>,

    #[arg(
        short = 'q',
        long,
        help = "Quality from 0 to 1 (default: 0.8)",
        long_help = "Quality factor from 0.0 to 1.0. JPEG maps it to its 1-100 scale; \
                     for PNG it selects the deflate effort; other formats ignore it."
    )]
    pub quality: Option<f32>,

    #[arg(
        short = 'f',
        long,
        help = "Output format (jpeg, png, webp, gif, bmp or a MIME type)"
    )]
    pub format: Option<String>,

    #[arg(long, help = "Stretch to exactly the maximum size, ignoring aspect ratio")]
    pub stretch: bool,

    #[arg(
        long,
        value_name = "FILE",
        help = "JSON options file (maxWidth, maxHeight, quality, outputFormat, preserveAspectRatio)"
    )]
    pub options: Option<PathBuf>,
}

impl OptionArgs {
    /// Options file first, flags layered on top.
    pub fn to_options(&self) -> Result<CompressionOptions> {
        let base = match &self.options {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                serde_json::from_str::<CompressionOptions>(&text).map_err(|e| {
                    CompressionError::InvalidOptions(format!("{}: {}", path.display(), e))
                })?
            }
            None => CompressionOptions::default(),
        };

        let output_format = self
            .format
            .as_deref()
            .map(|f| f.parse::<OutputFormat>())
            .transpose()?
            .map(|f| f.mime_type().to_string());

        let flags = CompressionOptions {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: self.quality,
            output_format,
            preserve_aspect_ratio: self.stretch.then_some(false),
        };

        Ok(base.overlay(&flags))
    }
}
