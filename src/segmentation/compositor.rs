//! Winner selection and transparency compositing
//!
//! After merging, the root with the greatest aggregate pixel mass is the
//! subject. The pixel buffer still stores pre-merge identifiers, so the
//! full set of identifiers resolving to the winning root is collected
//! before compositing; membership in that set decides opacity.

use super::forest::RegionForest;
use super::grid::{Bounds, PixelBuffer};
use image::{Rgba, RgbaImage};
use std::collections::HashSet;
use tracing::debug;

/// The winning region: its merged extent and every pre-merge identifier
/// that belongs to it.
#[derive(Debug, Clone)]
pub struct SelectedRegion {
    /// Pre-merge identifiers resolving to the winning root
    pub ids: HashSet<u32>,
    /// Merged bounding box
    pub bounds: Bounds,
    /// Aggregate pixel count
    pub pixels: u64,
}

/// Select the merged region with the greatest pixel count, ties resolved
/// by the first identifier encountered. Returns `None` when every pixel
/// was background.
pub(crate) fn select_largest(forest: &mut RegionForest) -> Option<SelectedRegion> {
    let mut winner = 0u32;
    let mut winner_pixels = 0u64;
    let mut winner_bounds: Option<Bounds> = None;

    // Identifier 0 is reserved; real ids start at 1.
    for id in 1..=forest.id_count() {
        let area = forest.area(id);
        if area.pixels > winner_pixels {
            winner = id;
            winner_pixels = area.pixels;
            winner_bounds = area.bounds;
        }
    }

    let bounds = winner_bounds?;
    let winner_root = forest.find(winner);
    let ids: HashSet<u32> = (1..=forest.id_count())
        .filter(|&id| forest.find(id) == winner_root)
        .collect();

    debug!(
        pixels = winner_pixels,
        merged_ids = ids.len(),
        ?bounds,
        "selected largest foreground region"
    );

    Some(SelectedRegion {
        ids,
        bounds,
        pixels: winner_pixels,
    })
}

/// Render the winning region onto a transparent canvas sized exactly to
/// its bounding box. Member pixels keep their original color; everything
/// else stays fully transparent.
pub(crate) fn compose(buffer: &PixelBuffer, selection: &SelectedRegion) -> RgbaImage {
    let bounds = selection.bounds;
    let mut output = RgbaImage::from_pixel(bounds.width(), bounds.height(), Rgba([0, 0, 0, 0]));

    for row in 0..bounds.height() {
        for col in 0..bounds.width() {
            let (src_col, src_row) = (bounds.left + col, bounds.top + row);
            if let Some(id) = buffer.tag(src_col, src_row).region() {
                if selection.ids.contains(&id) {
                    output.put_pixel(col, row, buffer.color(src_col, src_row));
                }
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::flood::RegionRecord;

    fn record(id: u32, pixels: u64, bounds: Bounds) -> RegionRecord {
        RegionRecord { id, pixels, bounds }
    }

    #[test]
    fn test_select_picks_greatest_mass() {
        let records = [
            record(1, 4, Bounds::at(0, 0)),
            record(2, 9, Bounds { top: 2, bottom: 4, left: 2, right: 4 }),
            record(3, 1, Bounds::at(7, 7)),
        ];
        let mut forest = RegionForest::from_records(3, records.iter());
        let selection = select_largest(&mut forest).unwrap();

        assert_eq!(selection.pixels, 9);
        assert_eq!(selection.ids, HashSet::from([2]));
        assert_eq!(selection.bounds.width(), 3);
    }

    #[test]
    fn test_select_collects_merged_ids() {
        let records = [
            record(1, 4, Bounds { top: 0, bottom: 1, left: 0, right: 1 }),
            record(2, 4, Bounds { top: 2, bottom: 3, left: 0, right: 1 }),
            record(3, 5, Bounds::at(9, 9)),
        ];
        let mut forest = RegionForest::from_records(3, records.iter());
        forest.union(1, 2);

        let selection = select_largest(&mut forest).unwrap();
        assert_eq!(selection.pixels, 8);
        assert_eq!(selection.ids, HashSet::from([1, 2]));
        assert_eq!(
            selection.bounds,
            Bounds { top: 0, bottom: 3, left: 0, right: 1 }
        );
    }

    #[test]
    fn test_select_tie_goes_to_first_index() {
        let records = [
            record(1, 6, Bounds::at(0, 0)),
            record(2, 6, Bounds::at(5, 5)),
        ];
        let mut forest = RegionForest::from_records(2, records.iter());
        let selection = select_largest(&mut forest).unwrap();
        assert_eq!(selection.ids, HashSet::from([1]));
    }

    #[test]
    fn test_select_empty_forest_yields_none() {
        let mut forest = RegionForest::from_records(0, [].iter());
        assert!(select_largest(&mut forest).is_none());

        // Ids drawn but never recorded carry no mass either
        let mut forest = RegionForest::from_records(5, [].iter());
        assert!(select_largest(&mut forest).is_none());
    }

    #[test]
    fn test_compose_masks_non_members() {
        use crate::segmentation::grid::PixelTag;
        use image::Rgba;

        let blue = Rgba([0, 0, 255, 255]);
        let green = Rgba([0, 255, 0, 255]);
        let buffer = PixelBuffer::new(3, 1, vec![blue, green, blue]);
        buffer.set_tag(0, 0, PixelTag::Region(1));
        buffer.set_tag(1, 0, PixelTag::Background);
        buffer.set_tag(2, 0, PixelTag::Region(2));

        let selection = SelectedRegion {
            ids: HashSet::from([1]),
            bounds: Bounds { top: 0, bottom: 0, left: 0, right: 2 },
            pixels: 1,
        };
        let output = compose(&buffer, &selection);

        assert_eq!(output.dimensions(), (3, 1));
        assert_eq!(*output.get_pixel(0, 0), blue);
        assert_eq!(*output.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
        // Region 2 is foreground but not a member of the winning set
        assert_eq!(*output.get_pixel(2, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_compose_output_sized_to_bounds() {
        let red = Rgba([255, 0, 0, 255]);
        let buffer = PixelBuffer::new(5, 5, vec![red; 25]);
        use crate::segmentation::grid::PixelTag;
        buffer.set_tag(2, 1, PixelTag::Region(1));
        buffer.set_tag(3, 2, PixelTag::Region(1));

        let selection = SelectedRegion {
            ids: HashSet::from([1]),
            bounds: Bounds { top: 1, bottom: 2, left: 2, right: 3 },
            pixels: 2,
        };
        let output = compose(&buffer, &selection);

        assert_eq!(output.dimensions(), (2, 2));
        assert_eq!(*output.get_pixel(0, 0), red);
        assert_eq!(*output.get_pixel(1, 1), red);
        assert_eq!(*output.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
    }
}
