//! Lenient raster decoding.
//!
//! The header must be well formed, but the raster may be any length. A
//! short raster is padded with zero samples; a long one is truncated.
//! Both cases are logged as warnings and neither is an error.
//!
//! A single `\n` directly after a complete raster is the terminator that
//! [`crate::encode`] writes. It counts as an exact match, so files this
//! crate writes read back without a warning.

use image::GrayImage;
use log::{info, warn};

use crate::error::FormatError;
use crate::header::{PgmHeader, parse_header};

/// Result of decoding a PGM file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPgm {
    /// The parsed header.
    pub header: PgmHeader,
    /// The raster, always exactly `width x height`.
    pub image: GrayImage,
    /// Trailing samples missing from the input and filled with zero.
    pub missing_samples: usize,
    /// Bytes after the raster that were ignored, not counting a lone
    /// terminating newline.
    pub surplus_bytes: usize,
}

/// Largest raster accepted, in samples (16384 x 16384).
///
/// Declared sizes are allocated up front for zero-filling, so a tiny
/// file must not be able to claim an arbitrarily large raster.
pub const MAX_SAMPLES: usize = 1 << 28;

/// Decode a binary PGM file held in memory.
///
/// # Errors
///
/// Returns any [`FormatError`] from [`parse_header`], or
/// [`FormatError::RasterTooLarge`] if the declared dimensions exceed
/// [`MAX_SAMPLES`].
pub fn decode(data: &[u8]) -> Result<DecodedPgm, FormatError> {
    let (header, offset) = parse_header(data)?;
    let PgmHeader {
        width,
        height,
        max_value,
    } = header;
    if max_value > 255 {
        warn!("Maximum grey value {max_value} exceeds 255; samples are read as single bytes");
    }

    let expected = header
        .sample_count()
        .filter(|&count| count <= MAX_SAMPLES)
        .ok_or(FormatError::RasterTooLarge { width, height })?;
    let raster = data.get(offset..).unwrap_or_default();
    let terminated = raster.len() == expected + 1 && raster.last() == Some(&b'\n');

    let (missing_samples, surplus_bytes) = if raster.len() == expected || terminated {
        info!("Raster is of expected size {width} * {height} = {expected}");
        (0, 0)
    } else if raster.len() < expected {
        warn!(
            "Expected raster of size {width} * {height} = {expected}, but actual size {}",
            raster.len(),
        );
        (expected - raster.len(), 0)
    } else {
        warn!(
            "Expected raster of size {width} * {height} = {expected}, but actual size {}; ignoring {} trailing bytes",
            raster.len(),
            raster.len() - expected,
        );
        (0, raster.len() - expected)
    };

    let mut samples = raster[..expected.min(raster.len())].to_vec();
    if missing_samples > 0 {
        let (row, column) = position(raster.len(), width);
        warn!("Substituting 0 for {missing_samples} missing pixels from row {row}, column {column}");
        samples.resize(expected, 0);
    }

    let image = GrayImage::from_raw(width, height, samples)
        .ok_or(FormatError::RasterTooLarge { width, height })?;
    Ok(DecodedPgm {
        header,
        image,
        missing_samples,
        surplus_bytes,
    })
}

/// Row and column of the sample at `index` in a raster `width` wide.
fn position(index: usize, width: u32) -> (usize, usize) {
    let width = usize::try_from(width).unwrap_or(usize::MAX).max(1);
    (index / width, index % width)
}
