//! Shared types for the lapedge edge-detection pipeline.

use image::{ImageBuffer, Luma};
use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference the input
/// and output rasters without depending on `image` directly.
pub use image::GrayImage;

/// Signed edge-strength raster produced by the intermediate stages.
///
/// Same row-major layout as [`GrayImage`], but samples are `i32` so
/// negative responses and kernel sums larger than 255 are representable.
pub type SignedImage = ImageBuffer<Luma<i32>, Vec<i32>>;

/// Widen an unsigned raster into a [`SignedImage`] of the same size.
#[must_use]
pub fn widen(image: &GrayImage) -> SignedImage {
    SignedImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([i32::from(image.get_pixel(x, y).0[0])])
    })
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an image buffer.
    #[must_use]
    pub fn of<P: image::Pixel>(image: &ImageBuffer<P, Vec<P::Subpixel>>) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// Total number of pixels.
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Second-derivative approximation weights (center +8, neighbors -1).
pub const LAPLACIAN_3X3: [[i32; 3]; 3] = [[-1, -1, -1], [-1, 8, -1], [-1, -1, -1]];

/// A rectangular matrix of signed integer convolution weights.
///
/// Any rectangular shape can be represented so that configuration
/// loaded from JSON round-trips faithfully, but the convolution stage
/// only accepts 3x3 kernels and rejects everything else with
/// [`PipelineError::UnsupportedKernel`].
///
/// Serialized as a list of rows, e.g. `[[-1,-1,-1],[-1,8,-1],[-1,-1,-1]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i32>>", into = "Vec<Vec<i32>>")]
pub struct Kernel {
    width: usize,
    height: usize,
    weights: Vec<i32>,
}

impl Kernel {
    /// Build a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `weights.len()` is not
    /// `width * height`.
    pub fn new(width: usize, height: usize, weights: Vec<i32>) -> Result<Self, PipelineError> {
        if width.checked_mul(height) != Some(weights.len()) {
            return Err(PipelineError::InvalidConfig(format!(
                "kernel of shape {height}x{width} needs {} weights, got {}",
                width.saturating_mul(height),
                weights.len(),
            )));
        }
        Ok(Self {
            width,
            height,
            weights,
        })
    }

    /// Build a kernel from a list of equally long rows.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self, PipelineError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(PipelineError::InvalidConfig(format!(
                "kernel row {index} has {} weights, expected {width}",
                row.len(),
            )));
        }
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    /// The fixed Laplacian kernel used by default.
    #[must_use]
    pub fn laplacian() -> Self {
        Self::from(LAPLACIAN_3X3)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// The weights as a fixed 3x3 matrix, or `None` for any other shape.
    #[must_use]
    pub fn as_3x3(&self) -> Option<[[i32; 3]; 3]> {
        if self.width != 3 || self.height != 3 {
            return None;
        }
        let mut out = [[0; 3]; 3];
        for (row, chunk) in out.iter_mut().zip(self.weights.chunks_exact(3)) {
            row.copy_from_slice(chunk);
        }
        Some(out)
    }

    /// Largest response magnitude the kernel can produce over 8-bit
    /// samples: the sum of absolute weights times 255.
    #[must_use]
    pub fn response_bound(&self) -> i64 {
        self.weights
            .iter()
            .map(|&w| i64::from(w).abs() * i64::from(u8::MAX))
            .sum()
    }
}

impl From<[[i32; 3]; 3]> for Kernel {
    fn from(rows: [[i32; 3]; 3]) -> Self {
        Self {
            width: 3,
            height: 3,
            weights: rows.into_iter().flatten().collect(),
        }
    }
}

impl TryFrom<Vec<Vec<i32>>> for Kernel {
    type Error = PipelineError;

    fn try_from(rows: Vec<Vec<i32>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Kernel> for Vec<Vec<i32>> {
    fn from(kernel: Kernel) -> Self {
        if kernel.width == 0 {
            return vec![Vec::new(); kernel.height];
        }
        kernel
            .weights
            .chunks_exact(kernel.width)
            .map(<[i32]>::to_vec)
            .collect()
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::laplacian()
    }
}

/// Configuration for the edge-detection pipeline.
///
/// Defaults reproduce the hardware block's fixed parameters. Use
/// [`validate`](Self::validate) (called by [`crate::Pipeline`]) to
/// reject threshold orderings that make the two-tier classification
/// meaningless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Convolution kernel. Must be 3x3.
    pub kernel: Kernel,

    /// Pixels whose magnitude strictly exceeds this value are strong
    /// edges.
    pub high_threshold: i32,

    /// Pixels whose magnitude strictly exceeds this value are weak
    /// edges, kept only when adjacent to a strong edge.
    pub low_threshold: i32,

    /// Ceiling for the rectified output samples.
    pub max_value: u8,
}

impl PipelineConfig {
    /// Default strong-edge threshold.
    pub const DEFAULT_HIGH_THRESHOLD: i32 = 80;
    /// Default weak-edge threshold.
    pub const DEFAULT_LOW_THRESHOLD: i32 = 40;
    /// Default output ceiling.
    pub const DEFAULT_MAX_VALUE: u8 = 255;

    /// Check the threshold ordering `high > low >= 0`.
    ///
    /// Kernel shape is checked separately by the convolution stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the offending
    /// thresholds.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.low_threshold < 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "low_threshold must be non-negative, got {}",
                self.low_threshold,
            )));
        }
        if self.high_threshold <= self.low_threshold {
            return Err(PipelineError::InvalidConfig(format!(
                "high_threshold ({}) must exceed low_threshold ({})",
                self.high_threshold, self.low_threshold,
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            kernel: Kernel::laplacian(),
            high_threshold: Self::DEFAULT_HIGH_THRESHOLD,
            low_threshold: Self::DEFAULT_LOW_THRESHOLD,
            max_value: Self::DEFAULT_MAX_VALUE,
        }
    }
}

/// Errors that can occur during pipeline processing.
///
/// Every variant is a configuration problem; the stages themselves
/// cannot fail once configuration has been accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// The convolution kernel is not 3x3.
    #[error("only 3x3 kernels are supported, but the given kernel is {height}x{width}")]
    UnsupportedKernel {
        /// Kernel columns.
        width: usize,
        /// Kernel rows.
        height: usize,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
