#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # bgcarve
//!
//! Background removal by dominant-color estimation and parallel
//! connected-component labeling.
//!
//! The library detects a photograph's background as its most frequent
//! color, partitions the pixel grid into chunks, flood-fills each chunk
//! concurrently into labeled regions, reconciles region identities across
//! chunk boundaries with a weighted union-find, and keeps only the single
//! largest connected foreground region — everything else becomes
//! transparent.
//!
//! ## Features
//!
//! - **Chunked parallel labeling**: one worker per chunk, no locks on the
//!   pixel grid, collision-free identifiers from one atomic counter
//! - **Boundary-only merging**: only pixels straddling chunk boundaries
//!   are re-inspected after labeling
//! - **Format Support**: JPEG, PNG, BMP input; PNG, JPEG, WebP, raw RGBA
//!   output
//! - **CLI Integration**: optional command-line interface (enable with
//!   the `cli` feature)
//! - **Async and Sync APIs**: process files, byte slices, or any
//!   `AsyncRead` stream
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgcarve::{carve_from_image, CarveConfig};
//!
//! # fn example() -> bgcarve::Result<()> {
//! let image = image::open("photo.jpg")?;
//! let config = CarveConfig::builder().chunk_count(16).build()?;
//! let result = carve_from_image(&image, &config)?;
//! result.save_png("cutout.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Stream-based usage
//!
//! ```rust,no_run
//! use bgcarve::{carve_from_reader, CarveConfig};
//! use tokio::fs::File;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let file = File::open("photo.jpg").await?;
//! let config = CarveConfig::builder().build()?;
//! let result = carve_from_reader(file, &config).await?;
//! result.save_png("cutout.png")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
#[cfg(feature = "cli")]
pub mod cli;
pub mod error;
pub mod processor;
pub mod segmentation;
pub mod services;
pub mod types;

// Internal imports for lib functions
use tokio::io::AsyncRead;

// Public API exports
pub use config::{default_chunk_count, CarveConfig, CarveConfigBuilder, OutputFormat,
    DEFAULT_BACKGROUND_THRESHOLD};
pub use error::{BgCarveError, Result};
pub use processor::CarveProcessor;
pub use segmentation::{
    segment_largest_foreground, BackgroundColor, Bounds, GridLayout, PixelBuffer, PixelTag,
    RegionForest, Segmentation, SegmentationOptions,
};
pub use services::ImageIOService;
pub use types::{CarveResult, ProcessingMetadata, ProcessingTimings, RegionSummary};

/// Carve the largest foreground region out of a decoded image.
///
/// The most flexible entry point for in-memory processing: no file I/O,
/// no async runtime required.
///
/// # Errors
///
/// Returns `BgCarveError` for zero-area images.
///
/// # Examples
///
/// ```rust,no_run
/// use bgcarve::{carve_from_image, CarveConfig};
///
/// # fn example(img: image::DynamicImage) -> bgcarve::Result<()> {
/// let config = CarveConfig::builder().build()?;
/// let result = carve_from_image(&img, &config)?;
/// println!("kept {} pixels", result.region.pixels);
/// # Ok(())
/// # }
/// ```
pub fn carve_from_image(image: &image::DynamicImage, config: &CarveConfig) -> Result<CarveResult> {
    CarveProcessor::new(config.clone()).process_image(image)
}

/// Carve the largest foreground region out of encoded image bytes.
///
/// Suitable for web servers and memory-based processing where no file is
/// available.
///
/// # Errors
///
/// Returns `BgCarveError` when the bytes cannot be decoded or the image
/// has zero area.
pub async fn carve_from_bytes(image_bytes: &[u8], config: &CarveConfig) -> Result<CarveResult> {
    CarveProcessor::new(config.clone()).process_bytes(image_bytes)
}

/// Carve the largest foreground region out of an async reader stream.
///
/// Accepts any `AsyncRead`, making it suitable for network streams or
/// large files.
///
/// # Errors
///
/// Returns `BgCarveError` when reading or decoding fails, or the image
/// has zero area.
pub async fn carve_from_reader<R: AsyncRead + Unpin>(
    reader: R,
    config: &CarveConfig,
) -> Result<CarveResult> {
    let image = ImageIOService::load_from_reader(reader).await?;
    CarveProcessor::new(config.clone()).process_image(&image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn sample_image() -> DynamicImage {
        let mut img = RgbaImage::from_pixel(12, 12, Rgba([255, 255, 255, 255]));
        for row in 3..9 {
            for col in 3..9 {
                img.put_pixel(col, row, Rgba([200, 30, 30, 255]));
            }
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_carve_from_image() {
        let config = CarveConfig::builder().chunk_count(4).build().unwrap();
        let result = carve_from_image(&sample_image(), &config).unwrap();
        assert_eq!(result.region.pixels, 36);
        assert_eq!(result.dimensions(), (6, 6));
    }

    #[tokio::test]
    async fn test_carve_from_bytes_and_reader_agree() {
        let mut bytes = Vec::new();
        sample_image()
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();

        let config = CarveConfig::builder().chunk_count(4).build().unwrap();
        let from_bytes = carve_from_bytes(&bytes, &config).await.unwrap();
        let from_reader = carve_from_reader(std::io::Cursor::new(bytes), &config)
            .await
            .unwrap();

        assert_eq!(
            from_bytes.image.to_rgba8().as_raw(),
            from_reader.image.to_rgba8().as_raw()
        );
    }
}
