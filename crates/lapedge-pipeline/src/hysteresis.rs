//! Double-threshold edge tracking.
//!
//! Two passes over the thinned edge map:
//!
//! 1. **Strong** pixels are those whose value lies strictly outside
//!    `±high`. They are copied into a strong grid.
//! 2. **Connected weak** pixels are non-strong pixels strictly outside
//!    `±low` that have at least one nonzero cell in the 3x3 neighborhood
//!    of the strong grid (8-connectivity, edge-replicated). They are
//!    copied into a weak grid.
//!
//! The output is the sum of the two grids, which are disjoint.
//!
//! Connectivity is a single hop: a weak pixel touching only other weak
//! pixels is dropped even if those lead to a strong pixel.

use image::Luma;

use crate::diagnostics::count_nonzero;
use crate::padding;
use crate::types::SignedImage;

/// The two disjoint classification grids produced by [`classify`].
#[derive(Debug, Clone)]
pub struct Classified {
    /// Strong pixels with their input value; zero elsewhere.
    pub strong: SignedImage,
    /// Connected weak pixels with their input value; zero elsewhere.
    pub weak: SignedImage,
}

impl Classified {
    /// Number of strong pixels.
    #[must_use]
    pub fn strong_count(&self) -> u64 {
        count_nonzero(&self.strong)
    }

    /// Number of connected weak pixels.
    #[must_use]
    pub fn weak_count(&self) -> u64 {
        count_nonzero(&self.weak)
    }

    /// Merge the strong and weak grids into the tracked edge map.
    #[must_use]
    pub fn merge(self) -> SignedImage {
        let Self { mut strong, weak } = self;
        for (s, w) in strong.pixels_mut().zip(weak.pixels()) {
            s.0[0] = s.0[0].saturating_add(w.0[0]);
        }
        strong
    }
}

/// Whether `value` lies strictly outside `±threshold`.
///
/// Evaluated in `i64` so that negating any `i32` threshold is exact.
fn exceeds(value: i32, threshold: i32) -> bool {
    let (v, t) = (i64::from(value), i64::from(threshold));
    v > t || v < -t
}

/// Run both classification passes without merging.
///
/// Thresholds are not validated here. With `high <= low` the weak pass
/// never finds a candidate; with negative thresholds every pixel
/// classifies as strong. Neither case panics.
#[must_use]
pub fn classify(edges: &SignedImage, high: i32, low: i32) -> Classified {
    let (width, height) = edges.dimensions();

    let mut strong = SignedImage::new(width, height);
    for (x, y, p) in edges.enumerate_pixels() {
        if exceeds(p.0[0], high) {
            strong.put_pixel(x, y, *p);
        }
    }

    let mut weak = SignedImage::new(width, height);
    for (x, y, p) in edges.enumerate_pixels() {
        let value = p.0[0];
        if exceeds(value, high) || !exceeds(value, low) {
            continue;
        }
        let touches_strong = padding::window(&strong, x, y)
            .iter()
            .flatten()
            .any(|&s| s != 0);
        if touches_strong {
            weak.put_pixel(x, y, Luma([value]));
        }
    }

    Classified { strong, weak }
}

/// Keep strong pixels and weak pixels adjacent to a strong pixel.
#[must_use = "returns the tracked edge map"]
pub fn track(edges: &SignedImage, high: i32, low: i32) -> SignedImage {
    classify(edges, high, low).merge()
}
