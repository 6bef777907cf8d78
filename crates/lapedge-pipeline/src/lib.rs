//! lapedge-pipeline: Laplacian edge detection over grayscale rasters (sans-IO).
//!
//! Turns an 8-bit grayscale image into an 8-bit edge map through:
//! convolution -> thinning -> hysteresis tracking -> normalization.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory
//! [`GrayImage`] buffers; reading and writing PGM files lives in
//! `lapedge-pgm` and the `lapedge` binary.
//!
//! Use [`process`] for a one-shot run, [`Pipeline`] to step through
//! stages one at a time, or
//! [`diagnostics::process_with_diagnostics`] to time each stage.

pub mod convolve;
pub mod diagnostics;
pub mod hysteresis;
pub mod normalize;
pub mod padding;
pub mod pipeline;
pub mod thin;
pub mod types;

pub use pipeline::Pipeline;
pub use types::{
    Dimensions, GrayImage, Kernel, LAPLACIAN_3X3, PipelineConfig, PipelineError, SignedImage,
    widen,
};

/// Run the full edge-detection pipeline.
///
/// # Pipeline steps
///
/// 1. Convolve the kernel over the edge-replicated input
/// 2. Thin edges by row/column non-maximum suppression
/// 3. Keep strong pixels and weak pixels adjacent to them
/// 4. Take absolute values and clip at `max_value`
///
/// The output has the same dimensions as `image`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the thresholds are not
/// ordered `high > low >= 0`.
/// Returns [`PipelineError::UnsupportedKernel`] if the kernel is not 3x3.
pub fn process(image: &GrayImage, config: &PipelineConfig) -> Result<GrayImage, PipelineError> {
    config.validate()?;

    // 1. Convolution.
    let edges = convolve::convolve(image, &config.kernel)?;

    // 2. Non-maximum suppression.
    let thinned = thin::thin(&edges);

    // 3. Hysteresis tracking.
    let tracked = hysteresis::track(&thinned, config.high_threshold, config.low_threshold);

    // 4. Rectify and clip.
    Ok(normalize::normalize(&tracked, config.max_value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Luma;

    use super::*;

    fn spike() -> GrayImage {
        let mut img = GrayImage::from_pixel(5, 5, Luma([100]));
        img.put_pixel(2, 2, Luma([200]));
        img
    }

    #[test]
    fn spike_produces_clipped_center_and_ring() {
        let out = process(&spike(), &PipelineConfig::default()).unwrap();
        let expected: Vec<u8> = vec![
            0, 0, 0, 0, 0, //
            0, 100, 100, 100, 0, //
            0, 100, 255, 100, 0, //
            0, 100, 100, 100, 0, //
            0, 0, 0, 0, 0,
        ];
        assert_eq!(out.into_raw(), expected);
    }

    #[test]
    fn uniform_image_has_no_edges() {
        for level in [0u8, 1, 128, 255] {
            let img = GrayImage::from_pixel(7, 4, Luma([level]));
            let out = process(&img, &PipelineConfig::default()).unwrap();
            assert!(out.pixels().all(|p| p.0[0] == 0), "level {level}");
        }
    }

    #[test]
    fn preserves_dimensions() {
        for (w, h) in [(1, 1), (2, 9), (16, 3), (0, 0)] {
            let img = GrayImage::from_fn(w, h, |x, y| Luma([u8::try_from((x * 37 + y * 11) % 256).unwrap()]));
            let out = process(&img, &PipelineConfig::default()).unwrap();
            assert_eq!(out.dimensions(), (w, h));
        }
    }

    #[test]
    fn border_ring_is_zero_in_output() {
        let img = GrayImage::from_fn(8, 6, |x, y| Luma([if (x + y) % 2 == 0 { 255 } else { 0 }]));
        let out = process(&img, &PipelineConfig::default()).unwrap();
        for (x, y, p) in out.enumerate_pixels() {
            if x == 0 || y == 0 || x == 7 || y == 5 {
                assert_eq!(p.0[0], 0, "border ({x}, {y})");
            }
        }
    }

    #[test]
    fn vertical_step_edge_is_detected() {
        // Left half dark, right half bright.
        let img = GrayImage::from_fn(6, 5, |x, _| Luma([if x < 3 { 10 } else { 200 }]));
        let out = process(&img, &PipelineConfig::default()).unwrap();
        // Column 2 sees -3*190 = -570 and column 3 sees +570; both
        // are strong and clip to 255 on interior rows.
        for y in 1..4 {
            assert_eq!(out.get_pixel(2, y).0[0], 255);
            assert_eq!(out.get_pixel(3, y).0[0], 255);
            assert_eq!(out.get_pixel(1, y).0[0], 0);
            assert_eq!(out.get_pixel(4, y).0[0], 0);
        }
    }

    #[test]
    fn lower_max_value_caps_output() {
        let config = PipelineConfig {
            max_value: 90,
            ..PipelineConfig::default()
        };
        let out = process(&spike(), &config).unwrap();
        assert_eq!(out.get_pixel(2, 2).0[0], 90);
        assert_eq!(out.get_pixel(1, 1).0[0], 90);
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let config = PipelineConfig {
            high_threshold: 40,
            low_threshold: 40,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            process(&spike(), &config),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn non_3x3_kernel_is_rejected() {
        let config = PipelineConfig {
            kernel: Kernel::new(5, 5, vec![0; 25]).unwrap(),
            ..PipelineConfig::default()
        };
        assert_eq!(
            process(&spike(), &config),
            Err(PipelineError::UnsupportedKernel {
                width: 5,
                height: 5
            })
        );
    }
}
