//! Background carving CLI tool
//!
//! Command-line interface for carving the largest foreground region out
//! of a photograph using the unified processor.

use super::config::CliConfigBuilder;
use crate::{config::OutputFormat, processor::CarveProcessor};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Background carving CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgcarve")]
pub struct Cli {
    /// Input image file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file [default: <input stem>.cutout.<ext>]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CliOutputFormat::Png)]
    pub format: CliOutputFormat,

    /// Number of chunks to partition the image into, rounded down to a
    /// perfect square (0 = no chunking)
    #[arg(short, long, default_value_t = crate::config::default_chunk_count())]
    pub chunks: u32,

    /// Background classification threshold (Euclidean distance in 16-bit
    /// channel space)
    #[arg(short, long, default_value_t = crate::config::DEFAULT_BACKGROUND_THRESHOLD)]
    pub threshold: f64,

    /// Label chunks on the current thread instead of one worker per chunk
    #[arg(long)]
    pub serial: bool,

    /// JPEG quality (0-100)
    #[arg(long, default_value_t = 90)]
    pub jpeg_quality: u8,

    /// WebP quality (0-100)
    #[arg(long, default_value_t = 85)]
    pub webp_quality: u8,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print a machine-readable JSON summary to stdout
    #[arg(long)]
    pub json: bool,
}

/// Output format selection for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliOutputFormat {
    /// PNG with alpha channel (recommended)
    Png,
    /// JPEG (transparency flattened)
    Jpeg,
    /// WebP with alpha channel
    Webp,
    /// Raw RGBA8 pixel data
    Rgba8,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Png => Self::Png,
            CliOutputFormat::Jpeg => Self::Jpeg,
            CliOutputFormat::Webp => Self::WebP,
            CliOutputFormat::Rgba8 => Self::Rgba8,
        }
    }
}

impl CliOutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Rgba8 => "rgba8",
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bgcarve={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn default_output_path(input: &std::path::Path, format: CliOutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{}.cutout.{}", stem, format.extension()))
}

/// CLI entry point
///
/// # Errors
///
/// Returns an error for invalid arguments, unreadable inputs, and
/// encoding failures.
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = CliConfigBuilder::from_cli(&cli)?;
    let processor = CarveProcessor::new(config.clone());

    let mut result = processor
        .process_file(&cli.input)
        .with_context(|| format!("failed to process '{}'", cli.input.display()))?;

    if !result.has_foreground() {
        warn!("no foreground region detected; nothing to write");
        if cli.json {
            print_json_summary(&result, None)?;
        } else {
            println!("No foreground region detected in '{}'", cli.input.display());
        }
        return Ok(());
    }

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input, cli.format));

    let quality = match config.output_format {
        OutputFormat::Jpeg => config.jpeg_quality,
        OutputFormat::WebP => config.webp_quality,
        _ => 100,
    };

    let encode_start = Instant::now();
    result
        .save(&output_path, config.output_format, quality)
        .with_context(|| format!("failed to write '{}'", output_path.display()))?;
    let encode_ms = encode_start.elapsed().as_millis() as u64;
    result.metadata.timings.image_encode_ms = Some(encode_ms);
    result.metadata.timings.total_ms += encode_ms;

    info!(
        output = %output_path.display(),
        encode_ms,
        "wrote carved output"
    );

    if cli.json {
        print_json_summary(&result, Some(&output_path))?;
    } else {
        let (width, height) = result.dimensions();
        println!(
            "{} -> {} ({}x{}, {} pixels, {} merged regions)",
            cli.input.display(),
            output_path.display(),
            width,
            height,
            result.region.pixels,
            result.region.merged_ids
        );
        println!("{}", result.timing_summary());
    }

    Ok(())
}

fn print_json_summary(
    result: &crate::types::CarveResult,
    output_path: Option<&std::path::Path>,
) -> Result<()> {
    let summary = serde_json::json!({
        "input": &result.input_path,
        "output": output_path.map(|p| p.display().to_string()),
        "original_dimensions": result.original_dimensions,
        "region": &result.region,
        "timings": &result.metadata.timings,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
