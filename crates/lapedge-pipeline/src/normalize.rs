//! Rectify and clip the tracked edge map into an output raster.

use image::{GrayImage, Luma};

use crate::types::SignedImage;

/// Take the absolute value of every sample and clamp it to `max_value`.
#[must_use = "returns the output raster"]
pub fn normalize(edges: &SignedImage, max_value: u8) -> GrayImage {
    let ceiling = u32::from(max_value);
    GrayImage::from_fn(edges.width(), edges.height(), |x, y| {
        let rectified = edges.get_pixel(x, y).0[0].unsigned_abs();
        Luma([u8::try_from(rectified.min(ceiling)).unwrap_or(max_value)])
    })
}

/// Number of samples whose magnitude exceeds `max_value` and would be
/// clipped by [`normalize`].
#[must_use]
pub fn clipped_count(edges: &SignedImage, max_value: u8) -> u64 {
    let ceiling = u32::from(max_value);
    edges
        .pixels()
        .map(|p| u64::from(p.0[0].unsigned_abs() > ceiling))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::widen;

    fn sample_edges() -> SignedImage {
        let values = [-1000, -256, -255, -100, -1, 0, 1, 100, 255, 256, 800, i32::MIN];
        SignedImage::from_fn(4, 3, |x, y| Luma([values[(y * 4 + x) as usize]]))
    }

    #[test]
    fn rectifies_and_clips() {
        let out = normalize(&sample_edges(), 255);
        let raw: Vec<u8> = out.into_raw();
        assert_eq!(raw, vec![255, 255, 255, 100, 1, 0, 1, 100, 255, 255, 255, 255]);
    }

    #[test]
    fn lower_ceiling_clips_earlier() {
        let out = normalize(&sample_edges(), 100);
        assert!(out.pixels().all(|p| p.0[0] <= 100));
        assert_eq!(out.get_pixel(3, 0).0[0], 100);
        assert_eq!(out.get_pixel(0, 1).0[0], 1);
    }

    #[test]
    fn zero_ceiling_blanks_everything() {
        let out = normalize(&sample_edges(), 0);
        assert!(out.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn normalization_is_idempotent() {
        for max_value in [0u8, 1, 100, 255] {
            let once = normalize(&sample_edges(), max_value);
            let twice = normalize(&widen(&once), max_value);
            assert_eq!(once, twice, "not idempotent at max_value={max_value}");
        }
    }

    #[test]
    fn preserves_dimensions() {
        let out = normalize(&SignedImage::new(13, 29), 255);
        assert_eq!(out.dimensions(), (13, 29));
    }

    #[test]
    fn clipped_count_matches_values_above_ceiling() {
        assert_eq!(clipped_count(&sample_edges(), 255), 5);
        assert_eq!(clipped_count(&sample_edges(), 0), 11);
    }
}
