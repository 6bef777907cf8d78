//! Edge-replication padding view.
//!
//! Hysteresis tracking reads the strong grid as if it were surrounded by
//! a one-pixel border that duplicates the outermost row and column. The
//! border is never materialized: coordinates outside the image are
//! clamped to the nearest real pixel.

use image::{ImageBuffer, Luma, Primitive};

/// Sample at `(x, y)` of the edge-replicated view of `image`.
///
/// `x` and `y` may lie outside the image by any amount; they are clamped
/// to the valid range.
///
/// # Panics
///
/// Panics if `image` has no pixels.
#[must_use]
pub fn replicated<T: Primitive>(image: &ImageBuffer<Luma<T>, Vec<T>>, x: i64, y: i64) -> T {
    let cx = x.min(i64::from(image.width()) - 1).max(0);
    let cy = y.min(i64::from(image.height()) - 1).max(0);
    // Both clamped values are within [0, u32::MAX).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (cx, cy) = (cx as u32, cy as u32);
    image.get_pixel(cx, cy).0[0]
}

/// The 3x3 neighborhood centered at `(x, y)`, read through the
/// edge-replicated view. Indexed `[row][column]`.
#[must_use]
pub fn window<T: Primitive>(image: &ImageBuffer<Luma<T>, Vec<T>>, x: u32, y: u32) -> [[T; 3]; 3] {
    let (x, y) = (i64::from(x), i64::from(y));
    let mut out = [[replicated(image, x, y); 3]; 3];
    for (dy, row) in (-1..=1).zip(out.iter_mut()) {
        for (dx, sample) in (-1..=1).zip(row.iter_mut()) {
            *sample = replicated(image, x + dx, y + dy);
        }
    }
    out
}
