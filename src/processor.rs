//! Unified background carving processor
//!
//! The `CarveProcessor` consolidates the business logic shared by the
//! library API and the CLI: decode the input, run the segmentation
//! engine, and assemble a `CarveResult` with timings and metadata.

use crate::{
    config::CarveConfig,
    error::Result,
    segmentation::{segment_largest_foreground, SegmentationOptions},
    services::ImageIOService,
    types::{CarveResult, ProcessingMetadata, ProcessingTimings, RegionSummary},
};
use image::DynamicImage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Background carving processor driven by a [`CarveConfig`].
pub struct CarveProcessor {
    config: CarveConfig,
}

impl CarveProcessor {
    /// Create a new processor with the given configuration.
    #[must_use]
    pub fn new(config: CarveConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CarveConfig {
        &self.config
    }

    /// Process an image file.
    ///
    /// # Errors
    ///
    /// Returns `BgCarveError` for file I/O failures, undecodable images,
    /// and zero-area inputs.
    pub fn process_file<P: AsRef<Path>>(&self, input_path: P) -> Result<CarveResult> {
        let path = input_path.as_ref();

        let decode_start = Instant::now();
        let image = ImageIOService::load_image(path)?;
        let decode_ms = decode_start.elapsed().as_millis() as u64;

        let input_format = image::ImageFormat::from_path(path)
            .map(|format| format!("{format:?}").to_lowercase())
            .unwrap_or_else(|_| "unknown".to_string());
        debug!(
            path = %path.display(),
            format = %input_format,
            decode_ms,
            "decoded input image"
        );

        let mut result = self.run(&image, decode_ms, input_format)?;
        result.input_path = Some(path.display().to_string());
        Ok(result)
    }

    /// Process an image already decoded in memory.
    ///
    /// # Errors
    ///
    /// Returns `BgCarveError` for zero-area inputs.
    pub fn process_image(&self, image: &DynamicImage) -> Result<CarveResult> {
        self.run(image, 0, "memory".to_string())
    }

    /// Process raw encoded image bytes.
    ///
    /// # Errors
    ///
    /// Returns `BgCarveError` when the bytes cannot be decoded or the
    /// image has zero area.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<CarveResult> {
        let decode_start = Instant::now();
        let image = ImageIOService::load_from_bytes(bytes)?;
        let decode_ms = decode_start.elapsed().as_millis() as u64;
        self.run(&image, decode_ms, "bytes".to_string())
    }

    #[instrument(
        skip(self, image, input_format),
        fields(
            dimensions = %format!("{}x{}", image.width(), image.height()),
            chunks = self.config.chunk_count,
            parallel = self.config.parallel
        )
    )]
    fn run(
        &self,
        image: &DynamicImage,
        decode_ms: u64,
        input_format: String,
    ) -> Result<CarveResult> {
        let total_start = Instant::now();
        let original_dimensions = (image.width(), image.height());

        let options = SegmentationOptions::from(&self.config);
        let segmentation = segment_largest_foreground(image, &options)?;

        let region = RegionSummary {
            bounds: segmentation.bounds,
            pixels: segmentation.pixels,
            merged_ids: segmentation.merged_ids,
            chunk_count: segmentation.chunk_count,
        };

        let mut metadata = ProcessingMetadata::new(self.config.background_threshold);
        metadata.input_format = input_format;
        metadata.output_format = self.config.output_format.to_string();
        metadata.timings = ProcessingTimings {
            image_decode_ms: decode_ms,
            background_ms: segmentation.timings.background_ms,
            labeling_ms: segmentation.timings.labeling_ms,
            merge_ms: segmentation.timings.merge_ms,
            compositing_ms: segmentation.timings.compositing_ms,
            image_encode_ms: None,
            total_ms: decode_ms + total_start.elapsed().as_millis() as u64,
        };

        match region.bounds {
            Some(bounds) => info!(
                pixels = region.pixels,
                merged_ids = region.merged_ids,
                width = bounds.width(),
                height = bounds.height(),
                "carved foreground region"
            ),
            None => info!("no foreground region found"),
        }

        Ok(CarveResult::new(
            DynamicImage::ImageRgba8(segmentation.image),
            region,
            original_dimensions,
            metadata,
        ))
    }
}
