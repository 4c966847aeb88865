//! Configuration types for background carving operations

use crate::error::{BgCarveError, Result};
use serde::{Deserialize, Serialize};

/// Euclidean color distance below which a pixel counts as background,
/// measured in 16-bit-per-channel RGB space.
pub const DEFAULT_BACKGROUND_THRESHOLD: f64 = 15_000.0;

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// JPEG (no transparency, RGB output)
    Jpeg,
    /// WebP with alpha channel transparency
    WebP,
    /// Raw RGBA8 pixel data (4 bytes per pixel)
    Rgba8,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::WebP => write!(f, "webp"),
            Self::Rgba8 => write!(f, "rgba8"),
        }
    }
}

/// Pick a chunk grid that keeps every core busy: the smallest perfect
/// square with at least one chunk per available core.
#[must_use]
pub fn default_chunk_count() -> u32 {
    let cores = num_cpus::get() as u32;
    let rows = (f64::from(cores)).sqrt().ceil() as u32;
    rows.max(1) * rows.max(1)
}

/// Configuration for background carving operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarveConfig {
    /// Number of chunks the grid is partitioned into; rounded down to the
    /// nearest perfect square. `0` requests the serial single-chunk
    /// fallback.
    pub chunk_count: u32,

    /// Background classification threshold (Euclidean distance in 16-bit
    /// channel space)
    pub background_threshold: f64,

    /// Label chunks on worker threads instead of the current thread
    pub parallel: bool,

    /// Output format
    pub output_format: OutputFormat,

    /// JPEG quality (0-100, only used for JPEG output)
    pub jpeg_quality: u8,

    /// WebP quality (0-100, only used for WebP output)
    pub webp_quality: u8,

    /// Enable debug mode (additional logging and validation)
    pub debug: bool,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            chunk_count: default_chunk_count(),
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
            parallel: true,
            output_format: OutputFormat::Png,
            jpeg_quality: 90,
            webp_quality: 85,
            debug: false,
        }
    }
}

impl CarveConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> CarveConfigBuilder {
        CarveConfigBuilder::new()
    }
}

/// Builder for `CarveConfig`
pub struct CarveConfigBuilder {
    config: CarveConfig,
}

impl CarveConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CarveConfig::default(),
        }
    }

    #[must_use]
    pub fn chunk_count(mut self, chunks: u32) -> Self {
        self.config.chunk_count = chunks;
        self
    }

    #[must_use]
    pub fn background_threshold(mut self, threshold: f64) -> Self {
        self.config.background_threshold = threshold;
        self
    }

    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    #[must_use]
    pub fn webp_quality(mut self, quality: u8) -> Self {
        self.config.webp_quality = quality;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BgCarveError::InvalidConfig` for:
    /// - Quality values above 100
    /// - A background threshold that is negative or not finite
    pub fn build(self) -> Result<CarveConfig> {
        if self.config.jpeg_quality > 100 {
            return Err(BgCarveError::config_value_error(
                "jpeg_quality",
                self.config.jpeg_quality,
                "0-100",
            ));
        }
        if self.config.webp_quality > 100 {
            return Err(BgCarveError::config_value_error(
                "webp_quality",
                self.config.webp_quality,
                "0-100",
            ));
        }
        if !self.config.background_threshold.is_finite() || self.config.background_threshold < 0.0 {
            return Err(BgCarveError::invalid_config(
                "background threshold must be a non-negative finite number",
            ));
        }

        Ok(self.config)
    }
}

impl Default for CarveConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
