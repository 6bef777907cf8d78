//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! ```rust
//! # use lapedge_pipeline::{GrayImage, Pipeline, PipelineConfig, PipelineError};
//! # fn run(image: GrayImage) -> Result<(), PipelineError> {
//! let output = Pipeline::new(image, PipelineConfig::default())
//!     .convolve()?
//!     .thin()
//!     .track()
//!     .normalize()
//!     .into_image();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next state, taking
//! ownership of the previous stage's raster and handing its own output
//! forward. Only the current stage's raster is alive at any point.
//!
//! Stage methods log the stage name at `info` level and dump the
//! resulting grid at `debug` level. The pure stage functions in
//! [`crate::convolve`], [`crate::thin`], [`crate::hysteresis`], and
//! [`crate::normalize`] do no logging.

use log::{debug, info};

use crate::diagnostics::{StageMetrics, count_nonzero, format_grid};
use crate::hysteresis;
use crate::types::{Dimensions, GrayImage, PipelineConfig, PipelineError, SignedImage};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`convolve`](Self::convolve) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .convolve() to continue"]
pub struct Pending {
    config: PipelineConfig,
    image: GrayImage,
}

impl Pending {
    /// The input raster.
    #[must_use]
    pub const fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Validate the configuration and convolve the kernel across the
    /// input, advancing to the [`Convolved`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the thresholds are
    /// misordered, or [`PipelineError::UnsupportedKernel`] if the kernel
    /// is not 3x3. Nothing is computed in either case.
    pub fn convolve(self) -> Result<Convolved, PipelineError> {
        self.config.validate()?;
        info!(
            "Applying {}x{} convolution kernel...",
            self.config.kernel.height(),
            self.config.kernel.width(),
        );
        let dimensions = Dimensions::of(&self.image);
        let edges = crate::convolve::convolve(&self.image, &self.config.kernel)?;
        debug!(
            "Convolution applied {}x{}:\n{}",
            dimensions.height,
            dimensions.width,
            format_grid(&edges),
        );
        Ok(Convolved {
            config: self.config,
            edges,
        })
    }
}

// ───────────────────────── Stage 1: Convolved ────────────────────────

/// Pipeline state after kernel convolution.
///
/// Call [`thin`](Self::thin) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .thin() to continue"]
pub struct Convolved {
    config: PipelineConfig,
    edges: SignedImage,
}

impl Convolved {
    /// The signed edge-strength map.
    #[must_use]
    pub const fn edges(&self) -> &SignedImage {
        &self.edges
    }

    /// Range and count metrics for the convolution output.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        let samples = self.edges.pixels().map(|p| p.0[0]);
        StageMetrics::Convolution {
            kernel_width: self.config.kernel.width(),
            kernel_height: self.config.kernel.height(),
            min_response: samples.clone().min().unwrap_or(0),
            max_response: samples.max().unwrap_or(0),
            nonzero_count: count_nonzero(&self.edges),
        }
    }

    /// Advance to the thinning stage.
    pub fn thin(self) -> Thinned {
        info!("Applying edge thinning using non-maximum suppression...");
        let nonzero_before = count_nonzero(&self.edges);
        let edges = crate::thin::thin(&self.edges);
        debug!(
            "Edges thinned {}x{}:\n{}",
            edges.height(),
            edges.width(),
            format_grid(&edges),
        );
        Thinned {
            config: self.config,
            edges,
            nonzero_before,
        }
    }
}

// ───────────────────────── Stage 2: Thinned ──────────────────────────

/// Pipeline state after non-maximum suppression.
///
/// Call [`track`](Self::track) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .track() to continue"]
pub struct Thinned {
    config: PipelineConfig,
    edges: SignedImage,
    nonzero_before: u64,
}

impl Thinned {
    /// The thinned edge map.
    #[must_use]
    pub const fn edges(&self) -> &SignedImage {
        &self.edges
    }

    /// Nonzero counts before and after suppression.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Thinning {
            nonzero_before: self.nonzero_before,
            nonzero_after: count_nonzero(&self.edges),
        }
    }

    /// Advance to the hysteresis tracking stage.
    pub fn track(self) -> Tracked {
        info!("Applying edge tracking using double-threshold hysteresis...");
        let classified = hysteresis::classify(
            &self.edges,
            self.config.high_threshold,
            self.config.low_threshold,
        );
        debug!(
            "Strong pixels {}x{}:\n{}",
            classified.strong.height(),
            classified.strong.width(),
            format_grid(&classified.strong),
        );
        debug!(
            "Weak pixels {}x{}:\n{}",
            classified.weak.height(),
            classified.weak.width(),
            format_grid(&classified.weak),
        );
        let strong_count = classified.strong_count();
        let weak_count = classified.weak_count();
        let edges = classified.merge();
        debug!(
            "Edge tracking {}x{}:\n{}",
            edges.height(),
            edges.width(),
            format_grid(&edges),
        );
        Tracked {
            config: self.config,
            edges,
            strong_count,
            weak_count,
        }
    }
}

// ───────────────────────── Stage 3: Tracked ──────────────────────────

/// Pipeline state after hysteresis tracking.
///
/// Call [`normalize`](Self::normalize) to advance to the final stage.
#[must_use = "pipeline stages are consumed by advancing; call .normalize() to continue"]
pub struct Tracked {
    config: PipelineConfig,
    edges: SignedImage,
    strong_count: u64,
    weak_count: u64,
}

impl Tracked {
    /// The tracked edge map.
    #[must_use]
    pub const fn edges(&self) -> &SignedImage {
        &self.edges
    }

    /// Strong and connected-weak counts.
    #[must_use]
    pub const fn metrics(&self) -> StageMetrics {
        StageMetrics::Tracking {
            high_threshold: self.config.high_threshold,
            low_threshold: self.config.low_threshold,
            strong_count: self.strong_count,
            weak_count: self.weak_count,
        }
    }

    /// Rectify and clip, advancing to the final stage.
    pub fn normalize(self) -> Normalized {
        info!("Rectifying negative pixel values and clipping at maximum value for output...");
        let max_value = self.config.max_value;
        let clipped_count = crate::normalize::clipped_count(&self.edges, max_value);
        let output = crate::normalize::normalize(&self.edges, max_value);
        debug!(
            "Rectified and clipped {}x{}:\n{}",
            output.height(),
            output.width(),
            format_grid(&output),
        );
        Normalized {
            max_value,
            output,
            clipped_count,
        }
    }
}

// ───────────────────────── Stage 4: Normalized ───────────────────────

/// Final pipeline state holding the output raster.
#[must_use = "call .into_image() to take the output raster"]
pub struct Normalized {
    max_value: u8,
    output: GrayImage,
    clipped_count: u64,
}

impl Normalized {
    /// The output raster.
    #[must_use]
    pub const fn image(&self) -> &GrayImage {
        &self.output
    }

    /// Output edge count and clipping.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Normalization {
            max_value: self.max_value,
            edge_pixel_count: count_nonzero(&self.output),
            clipped_count: self.clipped_count,
        }
    }

    /// Consume the pipeline and return the output raster.
    #[must_use]
    pub fn into_image(self) -> GrayImage {
        self.output
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Entry point for the incremental pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Start a pipeline over `image` with `config`.
    ///
    /// Configuration is validated when the first stage runs.
    pub const fn new(image: GrayImage, config: PipelineConfig) -> Pending {
        Pending { config, image }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Luma;

    use super::*;
    use crate::types::Kernel;

    fn spike() -> GrayImage {
        let mut img = GrayImage::from_pixel(5, 5, Luma([100]));
        img.put_pixel(2, 2, Luma([200]));
        img
    }

    fn init_logger() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    #[test]
    fn pending_exposes_input() {
        let pending = Pipeline::new(spike(), PipelineConfig::default());
        assert_eq!(pending.image().get_pixel(2, 2).0[0], 200);
    }

    #[test]
    fn each_stage_exposes_its_output() {
        init_logger();
        let convolved = Pipeline::new(spike(), PipelineConfig::default())
            .convolve()
            .unwrap();
        assert_eq!(convolved.edges().get_pixel(2, 2).0[0], 800);

        let thinned = convolved.thin();
        assert_eq!(thinned.edges().get_pixel(0, 0).0[0], 0);
        assert_eq!(thinned.edges().get_pixel(1, 1).0[0], -100);

        let tracked = thinned.track();
        assert_eq!(tracked.edges().get_pixel(2, 2).0[0], 800);

        let normalized = tracked.normalize();
        assert_eq!(normalized.image().get_pixel(2, 2).0[0], 255);
        assert_eq!(normalized.image().get_pixel(1, 1).0[0], 100);
    }

    #[test]
    fn chained_pipeline_matches_process() {
        let chained = Pipeline::new(spike(), PipelineConfig::default())
            .convolve()
            .unwrap()
            .thin()
            .track()
            .normalize()
            .into_image();
        let direct = crate::process(&spike(), &PipelineConfig::default()).unwrap();
        assert_eq!(chained, direct);
    }

    #[test]
    fn unsupported_kernel_stops_before_convolution() {
        let config = PipelineConfig {
            kernel: Kernel::from_rows(vec![vec![1, -1]]).unwrap(),
            ..PipelineConfig::default()
        };
        let result = Pipeline::new(spike(), config).convolve();
        assert!(matches!(
            result,
            Err(PipelineError::UnsupportedKernel {
                width: 2,
                height: 1
            })
        ));
    }

    #[test]
    fn misordered_thresholds_are_rejected() {
        let config = PipelineConfig {
            high_threshold: 40,
            low_threshold: 80,
            ..PipelineConfig::default()
        };
        let result = Pipeline::new(spike(), config).convolve();
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn tracked_metrics_report_thresholds() {
        let config = PipelineConfig {
            high_threshold: 500,
            low_threshold: 50,
            ..PipelineConfig::default()
        };
        let tracked = Pipeline::new(spike(), config)
            .convolve()
            .unwrap()
            .thin()
            .track();
        // Only the 800 center is strong; the -100 ring is weak and adjacent.
        assert_eq!(
            tracked.metrics(),
            StageMetrics::Tracking {
                high_threshold: 500,
                low_threshold: 50,
                strong_count: 1,
                weak_count: 8,
            }
        );
    }
}
