/// Errors raised while decoding a binary PGM file.
///
/// All are fatal. A raster whose byte count differs from the header is
/// not an error; see [`crate::decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Input ended before magic, width, height, and maxval were read.
    #[error("unable to detect PGM header: expected 4 header tokens, found {found}")]
    MissingHeader {
        /// Number of tokens collected before the input ended.
        found: usize,
    },

    /// The line completing the header carried more than 4 tokens.
    #[error("unexpected token '{token}' after PGM header")]
    ExtraHeaderToken {
        /// The first surplus token.
        token: String,
    },

    /// The first header token is not `P5`.
    #[error(
        "expected PGM header token 0 to be magic number 'P5' for a binary grey map, but found '{found}'"
    )]
    BadMagic {
        /// The token that was read instead.
        found: String,
    },

    /// A dimension or maxval token is not a non-negative decimal integer.
    #[error("expected PGM header field '{field}' in ASCII decimal, but found '{value}'")]
    InvalidNumber {
        /// Header field name: `width`, `height`, or `max_value`.
        field: &'static str,
        /// The offending token.
        value: String,
    },

    /// `width * height` exceeds [`crate::decode::MAX_SAMPLES`].
    #[error("PGM raster of {width}x{height} is too large")]
    RasterTooLarge {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
}
