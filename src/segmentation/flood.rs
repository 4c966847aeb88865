//! Per-chunk flood-fill labeling
//!
//! Each chunk is scanned in row-major order; every still-unvisited cell
//! seeds a flood fill over the 8-connected neighborhood, confined to the
//! chunk's rectangle. Region identifiers are drawn from a counter shared
//! by all chunks and atomically incremented, so concurrently labeled
//! chunks can never collide on an id.
//!
//! The traversal is iterative with an explicit stack: a single connected
//! region can cover most of a photograph, far beyond any practical
//! call-stack depth.

use super::background::BackgroundColor;
use super::grid::{Bounds, Chunk, PixelBuffer, PixelTag};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// A connected foreground region discovered inside one chunk.
///
/// Immutable once the flood fill that produced it completes; the merger
/// consumes these records to seed the union-find forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRecord {
    /// Globally unique identifier (>= 1)
    pub id: u32,
    /// Number of pixels claimed
    pub pixels: u64,
    /// Smallest box covering every claimed pixel
    pub bounds: Bounds,
}

/// Offsets of the 8-connected neighborhood.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Flood-fill from `seed`, tagging reachable foreground cells with
/// `region`. Returns the claimed pixel count and bounding box, or `None`
/// when the seed itself was background or already visited — the caller
/// then reuses `region` for the next seed instead of recording it.
pub(crate) fn flood_fill(
    buffer: &PixelBuffer,
    background: &BackgroundColor,
    threshold: f64,
    chunk: &Chunk,
    seed: (u32, u32),
    region: u32,
) -> Option<(u64, Bounds)> {
    let mut stack: Vec<(i64, i64)> = vec![(i64::from(seed.0), i64::from(seed.1))];
    let mut count = 0u64;
    let mut bounds: Option<Bounds> = None;

    while let Some((col, row)) = stack.pop() {
        // Chunks never label pixels belonging to another chunk; merging
        // across boundaries happens later.
        if !chunk.contains(col, row) {
            continue;
        }
        let (col, row) = (col as u32, row as u32);

        if buffer.tag(col, row) != PixelTag::Unvisited {
            continue;
        }

        if background.is_background(buffer.color(col, row), threshold) {
            buffer.set_tag(col, row, PixelTag::Background);
            continue;
        }

        buffer.set_tag(col, row, PixelTag::Region(region));
        match bounds.as_mut() {
            Some(bounds) => bounds.include(col, row),
            None => bounds = Some(Bounds::at(col, row)),
        }
        count += 1;

        for (dc, dr) in NEIGHBORS {
            stack.push((i64::from(col) + dc, i64::from(row) + dr));
        }
    }

    bounds.map(|bounds| (count, bounds))
}

/// Label every foreground region confined to `chunk`, drawing ids from
/// the shared `counter`.
pub(crate) fn label_chunk(
    buffer: &PixelBuffer,
    background: &BackgroundColor,
    threshold: f64,
    chunk: &Chunk,
    counter: &AtomicU32,
) -> Vec<RegionRecord> {
    let mut records = Vec::new();
    let mut candidate: Option<u32> = None;

    for row in chunk.rows.clone() {
        for col in chunk.cols.clone() {
            // Draw a fresh id only once the previous candidate actually
            // claimed pixels; empty fills reuse theirs.
            let region = match candidate {
                Some(id) => id,
                None => counter.fetch_add(1, Ordering::Relaxed) + 1,
            };

            match flood_fill(buffer, background, threshold, chunk, (col, row), region) {
                Some((pixels, bounds)) => {
                    records.push(RegionRecord {
                        id: region,
                        pixels,
                        bounds,
                    });
                    candidate = None;
                },
                None => candidate = Some(region),
            }
        }
    }

    trace!(
        rows = ?chunk.rows,
        cols = ?chunk.cols,
        regions = records.len(),
        "labeled chunk"
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const THRESHOLD: f64 = 15_000.0;

    /// Build a buffer from an ASCII sketch: '#' is foreground (black on a
    /// white background), '.' is background.
    fn buffer_from_sketch(sketch: &[&str]) -> PixelBuffer {
        let height = sketch.len() as u32;
        let width = sketch[0].len() as u32;
        let mut colors = Vec::new();
        for line in sketch {
            for ch in line.chars() {
                colors.push(if ch == '#' { BLACK } else { WHITE });
            }
        }
        PixelBuffer::new(width, height, colors)
    }

    fn white_background() -> BackgroundColor {
        BackgroundColor::from_rgba(WHITE)
    }

    fn full_chunk(buffer: &PixelBuffer) -> Chunk {
        Chunk {
            rows: 0..buffer.height(),
            cols: 0..buffer.width(),
        }
    }

    #[test]
    fn test_fill_claims_connected_blob() {
        let buffer = buffer_from_sketch(&[
            ".....",
            ".##..",
            ".##..",
            ".....",
        ]);
        let chunk = full_chunk(&buffer);
        let result = flood_fill(&buffer, &white_background(), THRESHOLD, &chunk, (1, 1), 1);

        let (pixels, bounds) = result.unwrap();
        assert_eq!(pixels, 4);
        assert_eq!(
            bounds,
            Bounds {
                top: 1,
                bottom: 2,
                left: 1,
                right: 2
            }
        );
        assert_eq!(buffer.tag(1, 1), PixelTag::Region(1));
        assert_eq!(buffer.tag(2, 2), PixelTag::Region(1));
        // Adjacent background cells were visited and classified
        assert_eq!(buffer.tag(0, 0), PixelTag::Background);
        // Cells beyond the fill's frontier stay unvisited
        assert_eq!(buffer.tag(4, 3), PixelTag::Unvisited);
    }

    #[test]
    fn test_fill_connects_diagonals() {
        let buffer = buffer_from_sketch(&[
            "#..",
            ".#.",
            "..#",
        ]);
        let chunk = full_chunk(&buffer);
        let (pixels, bounds) =
            flood_fill(&buffer, &white_background(), THRESHOLD, &chunk, (0, 0), 1).unwrap();
        assert_eq!(pixels, 3);
        assert_eq!(bounds.width(), 3);
        assert_eq!(bounds.height(), 3);
    }

    #[test]
    fn test_fill_from_background_seed_yields_nothing() {
        let buffer = buffer_from_sketch(&["..", ".#"]);
        let chunk = full_chunk(&buffer);
        let result = flood_fill(&buffer, &white_background(), THRESHOLD, &chunk, (0, 0), 1);
        assert!(result.is_none());
        assert_eq!(buffer.tag(0, 0), PixelTag::Background);
        // Nothing expanded from a background seed
        assert_eq!(buffer.tag(1, 1), PixelTag::Unvisited);
    }

    #[test]
    fn test_fill_respects_chunk_confinement() {
        let buffer = buffer_from_sketch(&[
            "####",
            "####",
        ]);
        // Only the left half belongs to this chunk
        let chunk = Chunk {
            rows: 0..2,
            cols: 0..2,
        };
        let (pixels, bounds) =
            flood_fill(&buffer, &white_background(), THRESHOLD, &chunk, (0, 0), 1).unwrap();
        assert_eq!(pixels, 4);
        assert_eq!(bounds.right, 1);
        assert_eq!(buffer.tag(2, 0), PixelTag::Unvisited);
        assert_eq!(buffer.tag(3, 1), PixelTag::Unvisited);
    }

    #[test]
    fn test_label_chunk_finds_separate_regions() {
        let buffer = buffer_from_sketch(&[
            "#..#",
            "....",
            "#...",
        ]);
        let counter = AtomicU32::new(0);
        let chunk = full_chunk(&buffer);
        let records = label_chunk(&buffer, &white_background(), THRESHOLD, &chunk, &counter);

        assert_eq!(records.len(), 3);
        let ids: Vec<u32> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(records.iter().all(|r| r.pixels == 1));
        // Empty fills reuse their candidate id, so the counter advanced
        // exactly once per recorded region plus at most one spare.
        assert!(counter.load(Ordering::Relaxed) <= 4);
    }

    #[test]
    fn test_label_chunk_ids_unique_across_chunks() {
        let buffer = buffer_from_sketch(&[
            "#.#.",
            "....",
        ]);
        let counter = AtomicU32::new(0);
        let left = Chunk {
            rows: 0..2,
            cols: 0..2,
        };
        let right = Chunk {
            rows: 0..2,
            cols: 2..4,
        };

        let mut records = label_chunk(&buffer, &white_background(), THRESHOLD, &left, &counter);
        records.extend(label_chunk(
            &buffer,
            &white_background(),
            THRESHOLD,
            &right,
            &counter,
        ));

        let mut ids: Vec<u32> = records.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), records.len(), "ids must never collide");
    }

    #[test]
    fn test_label_chunk_all_background() {
        let buffer = buffer_from_sketch(&["..", ".."]);
        let counter = AtomicU32::new(0);
        let chunk = full_chunk(&buffer);
        let records = label_chunk(&buffer, &white_background(), THRESHOLD, &chunk, &counter);
        assert!(records.is_empty());
    }
}
