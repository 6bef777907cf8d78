//! PGM header parsing.
//!
//! The header is read line by line. Lines whose first non-blank byte is
//! `#` are comments and are skipped. Every other line contributes its
//! whitespace-separated tokens. Parsing stops at the end of the line on
//! which the fourth token appears; the raster begins on the next byte.

use log::debug;

use crate::error::FormatError;

/// Magic token for a binary (raw) grey map.
pub const MAGIC: &str = "P5";

/// Number of tokens in a complete header.
const HEADER_TOKENS: usize = 4;

/// Fields of a parsed PGM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgmHeader {
    /// Raster columns.
    pub width: u32,
    /// Raster rows.
    pub height: u32,
    /// Declared maximum sample value.
    pub max_value: u32,
}

impl PgmHeader {
    /// Number of samples the header promises, or `None` on overflow.
    #[must_use]
    pub fn sample_count(&self) -> Option<usize> {
        let width = usize::try_from(self.width).ok()?;
        let height = usize::try_from(self.height).ok()?;
        width.checked_mul(height)
    }
}

/// Parse the header at the start of `data`.
///
/// Returns the header and the byte offset at which the raster starts.
///
/// # Errors
///
/// Returns [`FormatError::MissingHeader`] if the input ends before four
/// tokens are found, [`FormatError::ExtraHeaderToken`] if the completing
/// line carries more, [`FormatError::BadMagic`] if the magic token is not
/// `P5`, and [`FormatError::InvalidNumber`] for a malformed width, height,
/// or maxval.
pub fn parse_header(data: &[u8]) -> Result<(PgmHeader, usize), FormatError> {
    let mut tokens: Vec<String> = Vec::with_capacity(HEADER_TOKENS);
    let mut offset = 0;

    while offset < data.len() && tokens.len() < HEADER_TOKENS {
        let rest = &data[offset..];
        let (line, consumed) = rest
            .iter()
            .position(|&b| b == b'\n')
            .map_or((rest, rest.len()), |end| (&rest[..end], end + 1));
        offset += consumed;

        if is_comment(line) {
            debug!(
                "Ignoring comment: {}",
                String::from_utf8_lossy(line).trim_end()
            );
            continue;
        }
        tokens.extend(
            line.split(u8::is_ascii_whitespace)
                .filter(|t| !t.is_empty())
                .map(|t| String::from_utf8_lossy(t).into_owned()),
        );
    }
    debug!("PGM header tokens: {tokens:?}");

    let found = tokens.len();
    let mut tokens = tokens.into_iter();
    let (Some(magic), Some(width), Some(height), Some(max_value)) =
        (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(FormatError::MissingHeader { found });
    };
    if let Some(token) = tokens.next() {
        return Err(FormatError::ExtraHeaderToken { token });
    }

    if magic != MAGIC {
        return Err(FormatError::BadMagic { found: magic });
    }
    let header = PgmHeader {
        width: parse_decimal("width", width)?,
        height: parse_decimal("height", height)?,
        max_value: parse_decimal("max_value", max_value)?,
    };
    debug!(
        "Parsed valid PGM header with magic number '{MAGIC}', width {}, height {}, and maximum grey value {}",
        header.width, header.height, header.max_value,
    );
    Ok((header, offset))
}

fn is_comment(line: &[u8]) -> bool {
    line.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'#')
}

/// Parse a token made only of ASCII digits.
fn parse_decimal(field: &'static str, value: String) -> Result<u32, FormatError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::InvalidNumber { field, value });
    }
    value
        .parse()
        .map_err(|_| FormatError::InvalidNumber { field, value })
}
