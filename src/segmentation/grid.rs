//! Pixel grid storage and chunk partitioning
//!
//! The `PixelBuffer` is the single shared data structure of the pipeline:
//! a row-major color plane filled once by the background estimator, plus a
//! component-tag plane written by the chunk labelers. Tags live in atomic
//! cells so that concurrently running chunk tasks can write their own
//! (disjoint) cells through a shared reference; no two tasks ever touch
//! the same cell.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::atomic::{AtomicI32, Ordering};

/// Inclusive bounding box over grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest row index covered
    pub top: u32,
    /// Largest row index covered
    pub bottom: u32,
    /// Smallest column index covered
    pub left: u32,
    /// Largest column index covered
    pub right: u32,
}

impl Bounds {
    /// Single-pixel box at `(col, row)`.
    #[must_use]
    pub fn at(col: u32, row: u32) -> Self {
        Self {
            top: row,
            bottom: row,
            left: col,
            right: col,
        }
    }

    /// Grow the box to cover `(col, row)`.
    pub fn include(&mut self, col: u32, row: u32) {
        self.top = self.top.min(row);
        self.bottom = self.bottom.max(row);
        self.left = self.left.min(col);
        self.right = self.right.max(col);
    }

    /// Element-wise union of two boxes.
    #[must_use]
    pub fn merge(a: Self, b: Self) -> Self {
        Self {
            top: a.top.min(b.top),
            bottom: a.bottom.max(b.bottom),
            left: a.left.min(b.left),
            right: a.right.max(b.right),
        }
    }

    /// Width in pixels (bounds are inclusive).
    #[must_use]
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    /// Height in pixels (bounds are inclusive).
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }
}

/// Per-pixel component tag.
///
/// Every cell starts `Unvisited`; a flood fill either classifies it as
/// `Background` or claims it for a region. Both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelTag {
    /// Not yet reached by any flood fill
    Unvisited,
    /// Classified as background; never revisited
    Background,
    /// Claimed by the foreground region with this identifier (>= 1)
    Region(u32),
}

impl PixelTag {
    const BACKGROUND: i32 = -1;

    fn encode(self) -> i32 {
        match self {
            Self::Unvisited => 0,
            Self::Background => Self::BACKGROUND,
            Self::Region(id) => {
                debug_assert!(id >= 1 && id <= i32::MAX as u32);
                id as i32
            },
        }
    }

    fn decode(raw: i32) -> Self {
        match raw {
            0 => Self::Unvisited,
            Self::BACKGROUND => Self::Background,
            id => Self::Region(id as u32),
        }
    }

    /// Region identifier, if this tag belongs to a foreground region.
    #[must_use]
    pub fn region(self) -> Option<u32> {
        match self {
            Self::Region(id) => Some(id),
            _ => None,
        }
    }
}

/// Row-major pixel grid with a color plane and a component-tag plane.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    colors: Vec<Rgba<u8>>,
    tags: Vec<AtomicI32>,
}

impl PixelBuffer {
    /// Build a buffer from a row-major color plane.
    ///
    /// # Panics
    ///
    /// Panics if `colors.len() != width * height`.
    #[must_use]
    pub fn new(width: u32, height: u32, colors: Vec<Rgba<u8>>) -> Self {
        assert_eq!(
            colors.len(),
            width as usize * height as usize,
            "color plane does not match grid dimensions"
        );
        let tags = (0..colors.len()).map(|_| AtomicI32::new(0)).collect();
        Self {
            width,
            height,
            colors,
            tags,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, col: u32, row: u32) -> usize {
        debug_assert!(col < self.width && row < self.height);
        row as usize * self.width as usize + col as usize
    }

    /// Original color at `(col, row)`.
    #[must_use]
    pub fn color(&self, col: u32, row: u32) -> Rgba<u8> {
        self.colors[self.index(col, row)]
    }

    /// Component tag at `(col, row)`.
    ///
    /// Relaxed ordering suffices: during labeling each cell is only ever
    /// written by the task that owns its chunk, and the scope join
    /// publishes all writes before the merge phase reads across chunks.
    #[must_use]
    pub fn tag(&self, col: u32, row: u32) -> PixelTag {
        PixelTag::decode(self.tags[self.index(col, row)].load(Ordering::Relaxed))
    }

    pub(crate) fn set_tag(&self, col: u32, row: u32, tag: PixelTag) {
        self.tags[self.index(col, row)].store(tag.encode(), Ordering::Relaxed);
    }
}

/// One rectangular partition of the grid: rows `[rows.start, rows.end)`,
/// columns `[cols.start, cols.end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub rows: Range<u32>,
    pub cols: Range<u32>,
}

impl Chunk {
    /// Whether `(col, row)` lies inside this chunk's rectangle.
    #[must_use]
    pub fn contains(&self, col: i64, row: i64) -> bool {
        row >= i64::from(self.rows.start)
            && row < i64::from(self.rows.end)
            && col >= i64::from(self.cols.start)
            && col < i64::from(self.cols.end)
    }
}

/// Near-square arrangement of rectangular chunks covering the grid
/// exactly once.
///
/// The requested chunk count is rounded down to the nearest perfect
/// square; the final row/column of chunks absorbs the remainder when the
/// grid does not divide evenly.
#[derive(Debug, Clone)]
pub struct GridLayout {
    width: u32,
    height: u32,
    chunk_rows: u32,
    row_size: u32,
    col_size: u32,
}

impl GridLayout {
    /// Lay out `chunk_count` chunks over a `width` x `height` grid.
    /// `chunk_count == 0` requests a single chunk spanning the grid.
    ///
    /// # Panics
    ///
    /// Panics on a zero-area grid; callers reject those before any work
    /// begins.
    #[must_use]
    pub fn new(width: u32, height: u32, chunk_count: u32) -> Self {
        assert!(width > 0 && height > 0, "zero-area grid");

        let requested = if chunk_count == 0 {
            1
        } else {
            f64::from(chunk_count).sqrt().floor() as u32
        };
        // Never lay out more chunk rows than the grid has rows or columns.
        let chunk_rows = requested.max(1).min(width).min(height);

        Self {
            width,
            height,
            chunk_rows,
            row_size: height / chunk_rows,
            col_size: width / chunk_rows,
        }
    }

    /// Number of chunks actually laid out.
    #[must_use]
    pub fn chunk_count(&self) -> u32 {
        self.chunk_rows * self.chunk_rows
    }

    /// All chunks in row-major order.
    #[must_use]
    pub fn chunks(&self) -> Vec<Chunk> {
        let mut chunks = Vec::with_capacity(self.chunk_count() as usize);
        for row in 0..self.chunk_rows {
            let start_row = row * self.row_size;
            let end_row = if row == self.chunk_rows - 1 {
                self.height
            } else {
                (row + 1) * self.row_size
            };
            for col in 0..self.chunk_rows {
                let start_col = col * self.col_size;
                let end_col = if col == self.chunk_rows - 1 {
                    self.width
                } else {
                    (col + 1) * self.col_size
                };
                chunks.push(Chunk {
                    rows: start_row..end_row,
                    cols: start_col..end_col,
                });
            }
        }
        chunks
    }

    /// Rows that separate two chunk rows. Outer image edges are excluded;
    /// nothing lies beyond them to merge with.
    pub fn interior_row_boundaries(&self) -> impl Iterator<Item = u32> + '_ {
        (1..self.chunk_rows).map(|k| k * self.row_size)
    }

    /// Columns that separate two chunk columns.
    pub fn interior_col_boundaries(&self) -> impl Iterator<Item = u32> + '_ {
        (1..self.chunk_rows).map(|k| k * self.col_size)
    }
}
