//! Printable strip composition.
//!
//! The strip is the classic booth format: the photo sequence laid out
//! top-to-bottom, duplicated into two identical columns so the print can be
//! cut in half, with a fixed margin around every cell on a white mat.

use image::RgbaImage;
use image::imageops::{FilterType, overlay, resize};

/// Margin around each photo cell, in pixels.
pub const MARGIN: u32 = 40;

/// Each photo is scaled to the configured resolution times `ratio`.
#[must_use]
pub fn cell_size(photo_resolution: (u32, u32), ratio: f32) -> (u32, u32) {
    (
        (photo_resolution.0 as f32 * ratio) as u32,
        (photo_resolution.1 as f32 * ratio) as u32,
    )
}

/// Final strip dimensions for `count` photos: two columns wide, with
/// margins on both sides of each column and between/around the rows.
#[must_use]
pub fn strip_dimensions(photo_resolution: (u32, u32), ratio: f32, count: u32) -> (u32, u32) {
    let (cell_w, cell_h) = cell_size(photo_resolution, ratio);
    (
        2 * cell_w + 4 * MARGIN,
        count * cell_h + (count + 1) * MARGIN,
    )
}

/// Compose captured photos into the printable strip image.
#[must_use]
pub fn compose_strip(
    photos: &[RgbaImage],
    photo_resolution: (u32, u32),
    ratio: f32,
) -> RgbaImage {
    let (cell_w, cell_h) = cell_size(photo_resolution, ratio);
    let (strip_w, strip_h) = strip_dimensions(photo_resolution, ratio, photos.len() as u32);
    let mut strip = RgbaImage::from_pixel(strip_w, strip_h, image::Rgba([255, 255, 255, 255]));

    for (row, photo) in photos.iter().enumerate() {
        let scaled = resize(photo, cell_w, cell_h, FilterType::Triangle);
        let y = (MARGIN + row as u32 * (cell_h + MARGIN)) as i64;
        for column in 0..2u32 {
            let x = (column * (cell_w + 2 * MARGIN) + MARGIN) as i64;
            overlay(&mut strip, &scaled, x, y);
        }
    }

    strip
}

#[cfg(test)]
mod tests {
    use super::{MARGIN, compose_strip, strip_dimensions};

    #[test]
    fn four_photo_strip_dimensions() {
        let (w, h) = strip_dimensions((1640, 1232), 0.75, 4);
        assert_eq!(w, 2 * 1230 + 4 * MARGIN);
        assert_eq!(h, 4 * 924 + 5 * MARGIN);
    }

    #[test]
    fn composed_strip_matches_computed_dimensions() {
        let photos: Vec<_> = (0..4)
            .map(|i| image::RgbaImage::from_pixel(40, 30, image::Rgba([i * 60, 0, 0, 255])))
            .collect();
        let strip = compose_strip(&photos, (40, 30), 0.75);
        let (w, h) = strip_dimensions((40, 30), 0.75, 4);
        assert_eq!((strip.width(), strip.height()), (w, h));
    }

    #[test]
    fn columns_are_duplicates() {
        let photos: Vec<_> = (0..2)
            .map(|i| image::RgbaImage::from_pixel(32, 24, image::Rgba([10 + i * 100, 20, 30, 255])))
            .collect();
        let strip = compose_strip(&photos, (32, 24), 1.0);
        let (cell_w, _) = super::cell_size((32, 24), 1.0);

        // Same pixel sampled from the middle of each column's first cell.
        let left = strip.get_pixel(MARGIN + cell_w / 2, MARGIN + 10);
        let right = strip.get_pixel(cell_w + 3 * MARGIN + cell_w / 2, MARGIN + 10);
        assert_eq!(left, right);
    }

    #[test]
    fn margins_stay_white() {
        let photos = vec![image::RgbaImage::from_pixel(32, 24, image::Rgba([0, 0, 0, 255]))];
        let strip = compose_strip(&photos, (32, 24), 1.0);
        assert_eq!(strip.get_pixel(1, 1), &image::Rgba([255, 255, 255, 255]));
    }
}
