//! Dominant background color estimation
//!
//! A photograph's background is taken to be its single most frequent
//! exact color. One row-major pass tallies color frequencies and, as a
//! side effect, flattens the decoded image into the [`PixelBuffer`] every
//! later stage works on.

use super::grid::PixelBuffer;
use image::{DynamicImage, Rgba};
use std::collections::HashMap;
use tracing::debug;

/// The dominant color, widened to 16-bit-per-channel RGB. Alpha is
/// ignored for distance purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundColor {
    channels: [u16; 3],
}

impl BackgroundColor {
    /// Widen an 8-bit RGBA color into the 16-bit reference space.
    #[must_use]
    pub fn from_rgba(pixel: Rgba<u8>) -> Self {
        let Rgba([r, g, b, _]) = pixel;
        Self {
            channels: [widen(r), widen(g), widen(b)],
        }
    }

    /// Euclidean distance between this reference and a pixel, computed in
    /// 16-bit channel space.
    #[must_use]
    pub fn distance(&self, pixel: Rgba<u8>) -> f64 {
        let Rgba([r, g, b, _]) = pixel;
        let dr = f64::from(i32::from(self.channels[0]) - i32::from(widen(r)));
        let dg = f64::from(i32::from(self.channels[1]) - i32::from(widen(g)));
        let db = f64::from(i32::from(self.channels[2]) - i32::from(widen(b)));
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Whether a pixel is close enough to the reference to count as
    /// background.
    #[must_use]
    pub fn is_background(&self, pixel: Rgba<u8>, threshold: f64) -> bool {
        self.distance(pixel) < threshold
    }
}

/// 8-bit channel to 16-bit channel (0xFF -> 0xFFFF).
fn widen(channel: u8) -> u16 {
    u16::from(channel) * 257
}

/// Scan the image once, tally exact-color frequencies, and return the
/// most frequent color alongside the flattened pixel buffer.
///
/// The running winner is only replaced on a strictly higher count, so
/// ties resolve to the color seen first.
#[must_use]
pub fn estimate_background(image: &DynamicImage) -> (BackgroundColor, PixelBuffer) {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug_assert!(width > 0 && height > 0);

    let mut colors = Vec::with_capacity(width as usize * height as usize);
    let mut frequency: HashMap<[u8; 4], u32> = HashMap::new();
    let mut popular = Rgba([0, 0, 0, 0]);
    let mut max_count = 0u32;

    for pixel in rgba.pixels() {
        colors.push(*pixel);
        let count = frequency.entry(pixel.0).or_insert(0);
        *count += 1;
        if *count > max_count {
            max_count = *count;
            popular = *pixel;
        }
    }

    debug!(
        color = ?popular.0,
        count = max_count,
        distinct = frequency.len(),
        "estimated background color"
    );

    (
        BackgroundColor::from_rgba(popular),
        PixelBuffer::new(width, height, colors),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn image_from(width: u32, height: u32, pixels: &[[u8; 4]]) -> DynamicImage {
        let mut img = RgbaImage::new(width, height);
        for (i, p) in pixels.iter().enumerate() {
            img.put_pixel(i as u32 % width, i as u32 / width, Rgba(*p));
        }
        DynamicImage::ImageRgba8(img)
    }

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];

    #[test]
    fn test_most_frequent_color_wins() {
        let image = image_from(3, 1, &[WHITE, WHITE, BLACK]);
        let (background, _) = estimate_background(&image);
        assert_eq!(background, BackgroundColor::from_rgba(Rgba(WHITE)));
    }

    #[test]
    fn test_tie_resolves_to_first_seen() {
        let image = image_from(4, 1, &[BLACK, WHITE, WHITE, BLACK]);
        let (background, _) = estimate_background(&image);
        // BLACK reaches count 2 only after WHITE already holds it
        assert_eq!(background, BackgroundColor::from_rgba(Rgba(BLACK)));
    }

    #[test]
    fn test_buffer_preserves_colors_row_major() {
        let image = image_from(2, 2, &[WHITE, BLACK, RED, WHITE]);
        let (_, buffer) = estimate_background(&image);
        assert_eq!(buffer.width(), 2);
        assert_eq!(buffer.height(), 2);
        assert_eq!(buffer.color(0, 0), Rgba(WHITE));
        assert_eq!(buffer.color(1, 0), Rgba(BLACK));
        assert_eq!(buffer.color(0, 1), Rgba(RED));
        assert_eq!(buffer.color(1, 1), Rgba(WHITE));
    }

    #[test]
    fn test_distance_is_euclidean_in_16_bit_space() {
        let background = BackgroundColor::from_rgba(Rgba(BLACK));
        assert_eq!(background.distance(Rgba(BLACK)), 0.0);

        // One channel fully off: 0xFFFF apart
        let d = background.distance(Rgba([255, 0, 0, 255]));
        assert!((d - 65_535.0).abs() < 1e-9);

        // All three channels fully off: sqrt(3) * 0xFFFF
        let d = background.distance(Rgba(WHITE));
        assert!((d - 65_535.0 * 3f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_alpha_is_ignored() {
        let background = BackgroundColor::from_rgba(Rgba([10, 20, 30, 255]));
        assert_eq!(background.distance(Rgba([10, 20, 30, 0])), 0.0);
    }

    #[test]
    fn test_is_background_respects_threshold() {
        let background = BackgroundColor::from_rgba(Rgba(WHITE));
        let near_white = Rgba([250, 250, 250, 255]);
        assert!(background.is_background(near_white, 15_000.0));
        assert!(!background.is_background(Rgba(BLACK), 15_000.0));
        // Strict inequality: a distance exactly at the threshold is foreground
        assert!(!background.is_background(Rgba(WHITE), 0.0));
    }
}
