//! Cross-chunk boundary merging
//!
//! After labeling, one visual region that straddles a chunk boundary
//! holds a different identifier on each side. Only the pixel pairs lying
//! exactly on interior boundaries need inspection to reconcile them; the
//! chunk interiors are already consistent, and nothing lies beyond the
//! outer image edges.

use super::forest::RegionForest;
use super::grid::{GridLayout, PixelBuffer};
use tracing::trace;

/// Union region identifiers across every interior chunk boundary.
pub(crate) fn merge_chunk_boundaries(
    buffer: &PixelBuffer,
    layout: &GridLayout,
    forest: &mut RegionForest,
) {
    for row in layout.interior_row_boundaries() {
        merge_row_boundary(buffer, forest, row);
    }
    for col in layout.interior_col_boundaries() {
        merge_col_boundary(buffer, forest, col);
    }
}

/// Walk the boundary between row `row - 1` and `row`, unioning vertically
/// adjacent foreground pairs. When the cell directly above is background
/// the upper-right diagonal is tried instead, covering regions that touch
/// only corner-to-corner across the boundary.
fn merge_row_boundary(buffer: &PixelBuffer, forest: &mut RegionForest, row: u32) {
    let width = buffer.width();
    for col in 0..width {
        let Some(lower) = buffer.tag(col, row).region() else {
            continue;
        };
        if let Some(upper) = buffer.tag(col, row - 1).region() {
            forest.union(upper, lower);
        } else if col != width - 1 {
            if let Some(diagonal) = buffer.tag(col + 1, row - 1).region() {
                forest.union(diagonal, lower);
            }
        }
    }
    trace!(row, "merged row boundary");
}

/// Walk the boundary between column `col - 1` and `col`; the symmetric
/// check tries the lower-left diagonal when the cell directly to the left
/// is background.
fn merge_col_boundary(buffer: &PixelBuffer, forest: &mut RegionForest, col: u32) {
    let height = buffer.height();
    for row in 0..height {
        let Some(right) = buffer.tag(col, row).region() else {
            continue;
        };
        if let Some(left) = buffer.tag(col - 1, row).region() {
            forest.union(right, left);
        } else if row != height - 1 {
            if let Some(diagonal) = buffer.tag(col - 1, row + 1).region() {
                forest.union(diagonal, right);
            }
        }
    }
    trace!(col, "merged column boundary");
}
