//! Core types for background carving operations

use crate::{config::OutputFormat, error::Result, segmentation::Bounds};
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of a background carving operation
#[derive(Debug, Clone)]
pub struct CarveResult {
    /// The winning foreground region on a transparent canvas, cropped to
    /// its bounding box
    pub image: DynamicImage,

    /// Summary of the selected region
    pub region: RegionSummary,

    /// Original image dimensions
    pub original_dimensions: (u32, u32),

    /// Processing metadata
    pub metadata: ProcessingMetadata,

    /// Original input path (for logging purposes)
    pub input_path: Option<String>,
}

impl CarveResult {
    /// Create a new carve result
    #[must_use]
    pub fn new(
        image: DynamicImage,
        region: RegionSummary,
        original_dimensions: (u32, u32),
        metadata: ProcessingMetadata,
    ) -> Self {
        Self {
            image,
            region,
            original_dimensions,
            metadata,
            input_path: None,
        }
    }

    /// Create a new carve result with input path
    #[must_use]
    pub fn with_input_path(
        image: DynamicImage,
        region: RegionSummary,
        original_dimensions: (u32, u32),
        metadata: ProcessingMetadata,
        input_path: String,
    ) -> Self {
        Self {
            image,
            region,
            original_dimensions,
            metadata,
            input_path: Some(input_path),
        }
    }

    /// Whether any foreground region was found at all
    #[must_use]
    pub fn has_foreground(&self) -> bool {
        self.region.bounds.is_some()
    }

    /// Save the result as PNG with alpha channel
    ///
    /// # Errors
    ///
    /// Returns an error when encoding fails or the file cannot be written.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Save the result as JPEG; transparency is flattened to black
    ///
    /// # Errors
    ///
    /// Returns an error when encoding fails or the file cannot be written.
    pub fn save_jpeg<P: AsRef<Path>>(&self, path: P, quality: u8) -> Result<()> {
        let rgb_image = self.image.to_rgb8();
        let mut jpeg_encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            std::fs::File::create(path)?,
            quality,
        );
        jpeg_encoder.encode_image(&rgb_image)?;
        Ok(())
    }

    /// Save the result as WebP (lossless)
    ///
    /// # Errors
    ///
    /// Returns an error when encoding fails or the file cannot be written.
    pub fn save_webp<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image
            .save_with_format(path, image::ImageFormat::WebP)?;
        Ok(())
    }

    /// Save in the specified format
    ///
    /// # Errors
    ///
    /// Returns an error when encoding fails or the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat, quality: u8) -> Result<()> {
        match format {
            OutputFormat::Png => self.save_png(path),
            OutputFormat::Jpeg => self.save_jpeg(path, quality),
            OutputFormat::WebP => self.save_webp(path),
            OutputFormat::Rgba8 => {
                let rgba_image = self.image.to_rgba8();
                std::fs::write(path, rgba_image.as_raw())?;
                Ok(())
            },
        }
    }

    /// Get the image as raw RGBA bytes
    #[must_use]
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.image.to_rgba8().into_raw()
    }

    /// Get the image as encoded bytes in the specified format
    ///
    /// # Errors
    ///
    /// Returns an error when encoding fails.
    pub fn to_bytes(&self, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Png => {
                let mut buffer = Vec::new();
                let mut cursor = std::io::Cursor::new(&mut buffer);
                self.image.write_to(&mut cursor, image::ImageFormat::Png)?;
                Ok(buffer)
            },
            OutputFormat::Jpeg => {
                let mut buffer = Vec::new();
                let mut cursor = std::io::Cursor::new(&mut buffer);
                let rgb_image = self.image.to_rgb8();
                let mut jpeg_encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
                jpeg_encoder.encode_image(&rgb_image)?;
                Ok(buffer)
            },
            OutputFormat::WebP => {
                let mut buffer = Vec::new();
                let mut cursor = std::io::Cursor::new(&mut buffer);
                self.image.write_to(&mut cursor, image::ImageFormat::WebP)?;
                Ok(buffer)
            },
            OutputFormat::Rgba8 => Ok(self.to_rgba_bytes()),
        }
    }

    /// Get output image dimensions
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Get detailed timing breakdown
    #[must_use]
    pub fn timings(&self) -> &ProcessingTimings {
        &self.metadata.timings
    }

    /// Get timing summary for display
    #[must_use]
    pub fn timing_summary(&self) -> String {
        let t = &self.metadata.timings;
        let mut summary = format!(
            "Total: {}ms | Decode: {}ms | Background: {}ms | Labeling: {}ms | Merge: {}ms | Composite: {}ms",
            t.total_ms,
            t.image_decode_ms,
            t.background_ms,
            t.labeling_ms,
            t.merge_ms,
            t.compositing_ms
        );
        if let Some(encode_ms) = t.image_encode_ms {
            summary.push_str(&format!(" | Encode: {}ms", encode_ms));
        }
        summary
    }
}

/// Summary of the selected foreground region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    /// Bounding box in source coordinates; `None` when every pixel was
    /// classified as background
    pub bounds: Option<Bounds>,

    /// Pixel count of the region
    pub pixels: u64,

    /// How many chunk-local identifiers merged into the region
    pub merged_ids: usize,

    /// Chunks the grid was actually partitioned into
    pub chunk_count: u32,
}

/// Detailed timing breakdown for a carve operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Image loading and decoding from file
    pub image_decode_ms: u64,

    /// Background color estimation and buffer flattening
    pub background_ms: u64,

    /// Per-chunk flood-fill labeling (all chunks)
    pub labeling_ms: u64,

    /// Cross-chunk merging and winner selection
    pub merge_ms: u64,

    /// Compositing the transparency-masked output
    pub compositing_ms: u64,

    /// Final image encoding (if saving to file)
    pub image_encode_ms: Option<u64>,

    /// Total end-to-end processing time
    pub total_ms: u64,
}

/// Metadata about the processing operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// Detailed timing breakdown
    pub timings: ProcessingTimings,

    /// Background classification threshold used
    pub background_threshold: f64,

    /// Input image format, when known
    pub input_format: String,

    /// Output image format
    pub output_format: String,
}

impl ProcessingMetadata {
    /// Create new processing metadata
    #[must_use]
    pub fn new(background_threshold: f64) -> Self {
        Self {
            timings: ProcessingTimings::default(),
            background_threshold,
            input_format: "unknown".to_string(),
            output_format: "png".to_string(),
        }
    }
}
