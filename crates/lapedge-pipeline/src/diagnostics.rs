//! Pipeline diagnostics: timing, pixel counts, and grid dumps.
//!
//! [`process_with_diagnostics`] drives the incremental
//! [`Pipeline`](crate::Pipeline) and records, for each stage, its
//! wall-clock duration and the stage's [`StageMetrics`]. The CLI prints
//! the result with [`PipelineDiagnostics::report`] or as JSON.
//!
//! Durations are serialized as fractional seconds (`f64`) since
//! `std::time::Duration` does not implement serde traits.

use std::fmt::{Display, Write};
use std::time::{Duration, Instant};

use image::{GrayImage, ImageBuffer, Luma, Primitive};
use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::types::{Dimensions, PipelineConfig, PipelineError};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: kernel convolution.
    pub convolution: StageDiagnostics,
    /// Stage 2: non-maximum suppression.
    pub thinning: StageDiagnostics,
    /// Stage 3: hysteresis tracking.
    pub tracking: StageDiagnostics,
    /// Stage 4: rectify and clip.
    pub normalization: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Kernel convolution metrics.
    Convolution {
        /// Kernel columns.
        kernel_width: usize,
        /// Kernel rows.
        kernel_height: usize,
        /// Smallest response.
        min_response: i32,
        /// Largest response.
        max_response: i32,
        /// Pixels with a nonzero response.
        nonzero_count: u64,
    },
    /// Non-maximum suppression metrics.
    Thinning {
        /// Nonzero pixels entering the stage.
        nonzero_before: u64,
        /// Nonzero pixels surviving the stage.
        nonzero_after: u64,
    },
    /// Hysteresis tracking metrics.
    Tracking {
        /// Strong-edge threshold.
        high_threshold: i32,
        /// Weak-edge threshold.
        low_threshold: i32,
        /// Pixels classified as strong.
        strong_count: u64,
        /// Weak pixels kept because a strong pixel is adjacent.
        weak_count: u64,
    },
    /// Rectify-and-clip metrics.
    Normalization {
        /// Output ceiling.
        max_value: u8,
        /// Nonzero pixels in the output raster.
        edge_pixel_count: u64,
        /// Pixels whose magnitude was clamped to `max_value`.
        clipped_count: u64,
    },
}

/// High-level summary for the entire pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Raster width in pixels.
    pub image_width: u32,
    /// Raster height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Nonzero pixels in the final output.
    pub edge_pixel_count: u64,
}

/// Run the full pipeline, timing each stage.
///
/// # Errors
///
/// Returns the same errors as [`crate::process`].
pub fn process_with_diagnostics(
    image: GrayImage,
    config: PipelineConfig,
) -> Result<(GrayImage, PipelineDiagnostics), PipelineError> {
    let dimensions = Dimensions::of(&image);
    let start = Instant::now();

    let t = Instant::now();
    let convolved = Pipeline::new(image, config).convolve()?;
    let convolution = StageDiagnostics {
        duration: t.elapsed(),
        metrics: convolved.metrics(),
    };

    let t = Instant::now();
    let thinned = convolved.thin();
    let thinning = StageDiagnostics {
        duration: t.elapsed(),
        metrics: thinned.metrics(),
    };

    let t = Instant::now();
    let tracked = thinned.track();
    let tracking = StageDiagnostics {
        duration: t.elapsed(),
        metrics: tracked.metrics(),
    };

    let t = Instant::now();
    let normalized = tracked.normalize();
    let normalization = StageDiagnostics {
        duration: t.elapsed(),
        metrics: normalized.metrics(),
    };

    let total_duration = start.elapsed();
    let output = normalized.into_image();
    let summary = PipelineSummary {
        image_width: dimensions.width,
        image_height: dimensions.height,
        pixel_count: dimensions.pixel_count(),
        edge_pixel_count: count_nonzero(&output),
    };

    Ok((
        output,
        PipelineDiagnostics {
            convolution,
            thinning,
            tracking,
            normalization,
            total_duration,
            summary,
        },
    ))
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Convolution", &self.convolution),
            ("Thinning", &self.thinning),
            ("Tracking", &self.tracking),
            ("Normalization", &self.normalization),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Edge pixels: {} of {}",
            self.summary.edge_pixel_count, self.summary.pixel_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Convolution {
            kernel_width,
            kernel_height,
            min_response,
            max_response,
            nonzero_count,
        } => format!(
            "{kernel_height}x{kernel_width} kernel, range [{min_response}, {max_response}], nonzero={nonzero_count}",
        ),
        StageMetrics::Thinning {
            nonzero_before,
            nonzero_after,
        } => format!("nonzero {nonzero_before}->{nonzero_after}"),
        StageMetrics::Tracking {
            high_threshold,
            low_threshold,
            strong_count,
            weak_count,
        } => format!(
            "high={high_threshold} low={low_threshold} strong={strong_count} weak={weak_count}",
        ),
        StageMetrics::Normalization {
            max_value,
            edge_pixel_count,
            clipped_count,
        } => format!("max={max_value} edges={edge_pixel_count} clipped={clipped_count}"),
    }
}

/// Count nonzero samples in any single-channel raster.
pub(crate) fn count_nonzero<T: Primitive>(image: &ImageBuffer<Luma<T>, Vec<T>>) -> u64 {
    image
        .pixels()
        .map(|p| u64::from(p.0[0] != T::zero()))
        .sum()
}

/// Render a raster as right-aligned rows of numbers for debug logs.
///
/// ```
/// use lapedge_pipeline::diagnostics::format_grid;
/// use lapedge_pipeline::SignedImage;
///
/// let grid = SignedImage::from_raw(2, 2, vec![1, -20, 300, 0]).unwrap();
/// assert_eq!(format_grid(&grid), "[[  1 -20]\n [300   0]]");
/// ```
#[must_use]
pub fn format_grid<T: Primitive + Display>(image: &ImageBuffer<Luma<T>, Vec<T>>) -> String {
    let cells: Vec<String> = image.pixels().map(|p| p.0[0].to_string()).collect();
    let cell_width = cells.iter().map(String::len).max().unwrap_or(0);
    let row_len = usize::try_from(image.width()).unwrap_or(usize::MAX).max(1);

    let mut out = String::from("[");
    for (index, row) in cells.chunks(row_len).enumerate() {
        if index > 0 {
            out.push_str("\n ");
        }
        out.push('[');
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{cell:>cell_width$}");
        }
        out.push(']');
    }
    out.push(']');
    out
}
