//! Edge thinning by axis-separable non-maximum suppression.
//!
//! Each interior pixel is compared with its horizontal 3-run and its
//! vertical 3-run independently. It survives if it is the largest or the
//! smallest value of either run, with ties counting as survival, so a
//! plateau of equal strength is kept whole. Diagonals are never
//! consulted.
//!
//! The outermost ring of the output is always zero: suppression there
//! would need a neighbor outside the image, and the ring is excluded
//! rather than padded.

use image::Luma;

use crate::types::SignedImage;

/// Apply non-maximum suppression along rows and columns.
///
/// Surviving pixels keep their input value; all others, and the whole
/// border ring, are zero. Images narrower or shorter than 3 pixels have
/// no interior and produce an all-zero output.
#[must_use = "returns the thinned edge map"]
pub fn thin(edges: &SignedImage) -> SignedImage {
    let (width, height) = edges.dimensions();
    let mut out = SignedImage::new(width, height);
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let center = edges.get_pixel(x, y).0[0];
            let horizontal = [
                edges.get_pixel(x - 1, y).0[0],
                center,
                edges.get_pixel(x + 1, y).0[0],
            ];
            let vertical = [
                edges.get_pixel(x, y - 1).0[0],
                center,
                edges.get_pixel(x, y + 1).0[0],
            ];
            if is_extremum(center, horizontal) || is_extremum(center, vertical) {
                out.put_pixel(x, y, Luma([center]));
            }
        }
    }
    out
}

/// Whether `center` is the inclusive maximum or minimum of `run`.
fn is_extremum(center: i32, run: [i32; 3]) -> bool {
    let strongest_positive = run.iter().all(|&v| center >= v);
    let strongest_negative = run.iter().all(|&v| center <= v);
    strongest_positive || strongest_negative
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_rows(rows: &[&[i32]]) -> SignedImage {
        let height = u32::try_from(rows.len()).unwrap_or(0);
        let width = u32::try_from(rows.first().map_or(0, |r| r.len())).unwrap_or(0);
        SignedImage::from_fn(width, height, |x, y| Luma([rows[y as usize][x as usize]]))
    }

    fn to_rows(image: &SignedImage) -> Vec<Vec<i32>> {
        image
            .rows()
            .map(|row| row.map(|p| p.0[0]).collect())
            .collect()
    }

    #[test]
    fn border_ring_is_always_zero() {
        let img = SignedImage::from_pixel(6, 5, Luma([50]));
        let out = thin(&img);
        for (x, y, p) in out.enumerate_pixels() {
            if x == 0 || y == 0 || x == 5 || y == 4 {
                assert_eq!(p.0[0], 0, "border ({x}, {y}) not zero");
            }
        }
    }

    #[test]
    fn plateau_is_kept_whole() {
        let img = SignedImage::from_pixel(5, 5, Luma([50]));
        let out = thin(&img);
        assert_eq!(out.get_pixel(2, 2).0[0], 50);
        assert_eq!(out.get_pixel(1, 3).0[0], 50);
    }

    #[test]
    fn monotonic_ramp_interior_is_suppressed() {
        // Strictly increasing along both axes: every interior pixel has a
        // larger and a smaller neighbor on each axis.
        let img = SignedImage::from_fn(5, 5, |x, y| Luma([i32::try_from(x + y).unwrap_or(0)]));
        let out = thin(&img);
        assert!(out.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn vertical_ridge_survives_on_horizontal_axis() {
        let img = from_rows(&[
            &[0, 1, 9, 1, 0],
            &[0, 2, 8, 2, 0],
            &[0, 3, 7, 3, 0],
            &[0, 4, 6, 4, 0],
            &[0, 5, 5, 5, 0],
        ]);
        let out = thin(&img);
        // Ridge column is the horizontal maximum on every interior row.
        assert_eq!(out.get_pixel(2, 1).0[0], 8);
        assert_eq!(out.get_pixel(2, 2).0[0], 7);
        assert_eq!(out.get_pixel(2, 3).0[0], 6);
        // Flanks are neither extreme horizontally (0 < v < ridge) nor
        // vertically (monotonic 1..5).
        assert_eq!(out.get_pixel(1, 2).0[0], 0);
        assert_eq!(out.get_pixel(3, 2).0[0], 0);
    }

    #[test]
    fn negative_trough_survives() {
        let img = from_rows(&[
            &[0, 0, 0, 0, 0],
            &[1, 2, 3, 4, 5],
            &[-9, -9, -9, -9, -9],
            &[5, 4, 3, 2, 1],
            &[0, 0, 0, 0, 0],
        ]);
        let out = thin(&img);
        assert_eq!(to_rows(&out)[2], vec![0, -9, -9, -9, 0]);
    }

    #[test]
    fn output_is_subset_of_input() {
        let img = from_rows(&[
            &[3, -7, 12, 0, 5, -2],
            &[8, 1, -4, 6, -9, 11],
            &[-3, 14, 2, -8, 7, 0],
            &[0, -5, 9, 4, -1, 6],
            &[10, 2, -6, 13, 3, -4],
        ]);
        let out = thin(&img);
        for (x, y, p) in out.enumerate_pixels() {
            let v = p.0[0];
            if v != 0 {
                assert_eq!(v, img.get_pixel(x, y).0[0], "({x}, {y}) changed value");
            }
            if img.get_pixel(x, y).0[0] == 0 {
                assert_eq!(v, 0, "({x}, {y}) was zero in the input");
            }
        }
    }

    #[test]
    fn diagonals_are_ignored() {
        // Center 5 is beaten by both diagonal neighbors but is the
        // horizontal maximum, so it survives.
        let img = from_rows(&[&[9, 0, 9], &[1, 5, 1], &[9, 2, 9]]);
        let out = thin(&img);
        assert_eq!(out.get_pixel(1, 1).0[0], 5);
    }

    #[test]
    fn center_between_both_axes_is_suppressed() {
        let img = from_rows(&[&[0, 1, 0], &[4, 5, 6], &[0, 9, 0]]);
        let out = thin(&img);
        assert_eq!(out.get_pixel(1, 1).0[0], 0);
    }

    #[test]
    fn narrow_images_are_all_zero() {
        for (w, h) in [(0, 0), (1, 5), (2, 2), (5, 2)] {
            let out = thin(&SignedImage::from_pixel(w, h, Luma([7])));
            assert_eq!(out.dimensions(), (w, h));
            assert!(out.pixels().all(|p| p.0[0] == 0));
        }
    }
}
