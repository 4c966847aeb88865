//! Parallel connected-component segmentation engine
//!
//! The pipeline runs strictly forward: estimate the dominant background
//! color, partition the grid into chunks, flood-fill each chunk into
//! labeled regions, merge region identities across chunk boundaries with
//! a union-find, then select the largest merged region and composite it
//! onto a transparent canvas.
//!
//! Chunk labeling fans out one task per chunk. Every task owns an
//! exclusive sub-rectangle of the shared pixel buffer, so the only
//! coordination points are the atomic identifier counter and the join at
//! the end of the scope, which also publishes all tag writes to the
//! sequential merge phase.

pub mod background;
pub mod compositor;
pub mod flood;
pub mod forest;
pub mod grid;
pub mod merge;

pub use background::{estimate_background, BackgroundColor};
pub use compositor::SelectedRegion;
pub use flood::RegionRecord;
pub use forest::{RegionAggregate, RegionForest};
pub use grid::{Bounds, Chunk, GridLayout, PixelBuffer, PixelTag};

use crate::config::{CarveConfig, DEFAULT_BACKGROUND_THRESHOLD};
use crate::error::{BgCarveError, Result};
use flood::label_chunk;
use image::{DynamicImage, RgbaImage};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Knobs of the core segmentation operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationOptions {
    /// Requested chunk count; rounded down to the nearest perfect square.
    /// `0` requests the serial single-chunk fallback.
    pub chunk_count: u32,
    /// Background classification threshold (16-bit channel space)
    pub background_threshold: f64,
    /// Label chunks on worker threads
    pub parallel: bool,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        Self {
            chunk_count: crate::config::default_chunk_count(),
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
            parallel: true,
        }
    }
}

impl From<&CarveConfig> for SegmentationOptions {
    fn from(config: &CarveConfig) -> Self {
        Self {
            chunk_count: config.chunk_count,
            background_threshold: config.background_threshold,
            parallel: config.parallel,
        }
    }
}

/// Wall-clock milliseconds spent in each pipeline stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentationTimings {
    pub background_ms: u64,
    pub labeling_ms: u64,
    pub merge_ms: u64,
    pub compositing_ms: u64,
}

/// Outcome of a segmentation run.
pub struct Segmentation {
    /// The winning region on a transparent canvas, cropped to its
    /// bounding box; zero-sized when no foreground was found
    pub image: RgbaImage,
    /// Bounding box of the winning region in source coordinates
    pub bounds: Option<Bounds>,
    /// Pixel count of the winning region
    pub pixels: u64,
    /// How many pre-merge identifiers the winning region absorbed
    pub merged_ids: usize,
    /// Chunks actually laid out after rounding
    pub chunk_count: u32,
    /// Per-stage wall-clock timings
    pub timings: SegmentationTimings,
}

/// Segment the largest connected foreground region of `image`.
///
/// The single entry point of the core engine: everything from background
/// estimation to compositing happens in here, synchronously. An image in
/// which every pixel matches the background yields a zero-sized output
/// rather than an error.
///
/// # Errors
///
/// Returns `BgCarveError::InvalidConfig` for a zero-area image.
pub fn segment_largest_foreground(
    image: &DynamicImage,
    options: &SegmentationOptions,
) -> Result<Segmentation> {
    if image.width() == 0 || image.height() == 0 {
        return Err(BgCarveError::invalid_config(
            "cannot segment a zero-area image",
        ));
    }

    let mut timings = SegmentationTimings::default();

    let stage = Instant::now();
    let (background, buffer) = estimate_background(image);
    timings.background_ms = stage.elapsed().as_millis() as u64;

    let layout = GridLayout::new(buffer.width(), buffer.height(), options.chunk_count);
    let chunks = layout.chunks();
    debug!(
        requested = options.chunk_count,
        laid_out = layout.chunk_count(),
        parallel = options.parallel,
        "partitioned grid"
    );

    let stage = Instant::now();
    let counter = AtomicU32::new(0);
    let threshold = options.background_threshold;
    let records: Vec<RegionRecord> = if options.parallel && chunks.len() > 1 {
        let buffer = &buffer;
        let background = &background;
        let counter = &counter;
        std::thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .iter()
                .map(|chunk| {
                    scope.spawn(move || label_chunk(buffer, background, threshold, chunk, counter))
                })
                .collect();
            // Joining every handle is the fan-in: exactly one result per
            // launched chunk, in launch order.
            handles
                .into_iter()
                .flat_map(|handle| handle.join().expect("chunk labeling thread panicked"))
                .collect()
        })
    } else {
        chunks
            .iter()
            .flat_map(|chunk| label_chunk(&buffer, &background, threshold, chunk, &counter))
            .collect()
    };
    timings.labeling_ms = stage.elapsed().as_millis() as u64;

    let stage = Instant::now();
    let mut forest = RegionForest::from_records(counter.load(Ordering::Relaxed), records.iter());
    merge::merge_chunk_boundaries(&buffer, &layout, &mut forest);
    let selection = compositor::select_largest(&mut forest);
    timings.merge_ms = stage.elapsed().as_millis() as u64;

    let stage = Instant::now();
    let mut segmentation = match selection {
        Some(selection) => {
            let output = compositor::compose(&buffer, &selection);
            Segmentation {
                image: output,
                bounds: Some(selection.bounds),
                pixels: selection.pixels,
                merged_ids: selection.ids.len(),
                chunk_count: layout.chunk_count(),
                timings,
            }
        },
        None => {
            info!("no foreground region detected");
            Segmentation {
                image: RgbaImage::new(0, 0),
                bounds: None,
                pixels: 0,
                merged_ids: 0,
                chunk_count: layout.chunk_count(),
                timings,
            }
        },
    };
    segmentation.timings.compositing_ms = stage.elapsed().as_millis() as u64;

    Ok(segmentation)
}
