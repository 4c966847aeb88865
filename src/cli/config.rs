//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::config::CarveConfig;
use anyhow::{Context, Result};

/// Convert CLI arguments to a unified `CarveConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build a `CarveConfig` from parsed CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<CarveConfig> {
        CarveConfig::builder()
            .chunk_count(cli.chunks)
            .background_threshold(cli.threshold)
            .parallel(!cli.serial)
            .output_format(cli.format.into())
            .jpeg_quality(cli.jpeg_quality)
            .webp_quality(cli.webp_quality)
            .debug(cli.verbose >= 2)
            .build()
            .context("invalid configuration")
    }
}
