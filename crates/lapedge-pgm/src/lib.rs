//! lapedge-pgm: Binary PGM (`P5`) reader and writer (sans-IO).
//!
//! Decodes from and encodes to in-memory byte buffers. Opening, reading,
//! and writing files is left to the caller.
//!
//! Only 8-bit samples are handled. A maxval above 255 is accepted with a
//! warning, and the raster is still read one byte per sample.

pub mod decode;
pub mod encode;
pub mod error;
pub mod header;

pub use decode::{DecodedPgm, MAX_SAMPLES, decode};
pub use encode::{OUTPUT_MAX_VALUE, encode};
pub use error::FormatError;
pub use header::{MAGIC, PgmHeader, parse_header};
