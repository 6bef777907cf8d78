//! Kernel convolution over an edge-replicated 3x3 neighborhood.
//!
//! Delegates to [`imageproc::filter::filter_clamped`], which reads
//! outside the image by clamping coordinates to the nearest edge pixel
//! and applies the kernel as written (no flip). For the symmetric
//! Laplacian this is identical to a true convolution.

use image::GrayImage;
use imageproc::filter::filter_clamped;

use crate::types::{Kernel, PipelineError, SignedImage};

/// Convolve `kernel` across every pixel of `image`.
///
/// Border pixels see replicated samples rather than zeros, so a uniform
/// image produces a uniform response (zero for a Laplacian) all the way
/// to the edges.
///
/// # Errors
///
/// Returns [`PipelineError::UnsupportedKernel`] if `kernel` is not 3x3,
/// or [`PipelineError::InvalidConfig`] if its weights could push a
/// response outside the `i32` range. Nothing is computed in either case.
pub fn convolve(image: &GrayImage, kernel: &Kernel) -> Result<SignedImage, PipelineError> {
    let weights = kernel
        .as_3x3()
        .ok_or_else(|| PipelineError::UnsupportedKernel {
            width: kernel.width(),
            height: kernel.height(),
        })?;
    let bound = kernel.response_bound();
    if bound > i64::from(i32::MAX) {
        return Err(PipelineError::InvalidConfig(format!(
            "kernel weights allow responses up to {bound}, beyond the 32-bit range",
        )));
    }

    let weights = weights.as_flattened();
    Ok(filter_clamped::<_, i32, i32>(
        image,
        imageproc::kernel::Kernel::new(weights, 3, 3),
    ))
}
