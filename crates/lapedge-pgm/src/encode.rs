//! PGM serialization.

use image::GrayImage;

use crate::header::MAGIC;

/// Maximum sample value written to every output header.
pub const OUTPUT_MAX_VALUE: u8 = 255;

/// Serialize `image` as a binary PGM.
///
/// Magic, width, height, and maxval each sit on their own line, followed
/// by the raw row-major samples and a trailing newline.
#[must_use]
pub fn encode(image: &GrayImage) -> Vec<u8> {
    let header = format!(
        "{MAGIC}\n{}\n{}\n{OUTPUT_MAX_VALUE}\n",
        image.width(),
        image.height(),
    );
    let mut out = Vec::with_capacity(header.len() + image.as_raw().len() + 1);
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(image.as_raw());
    out.push(b'\n');
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Luma;

    use super::*;
    use crate::decode::decode;

    #[test]
    fn layout_is_fixed() {
        let img = GrayImage::from_raw(2, 1, vec![0, 200]).unwrap();
        assert_eq!(encode(&img), b"P5\n2\n1\n255\n\x00\xc8\n".to_vec());
    }

    #[test]
    fn empty_image() {
        assert_eq!(encode(&GrayImage::new(0, 0)), b"P5\n0\n0\n255\n\n".to_vec());
    }

    #[test]
    fn written_raster_reads_back_identically() {
        // Samples include '\n', '#' and whitespace bytes.
        let img = GrayImage::from_fn(7, 5, |x, y| {
            Luma([u8::try_from((x * 31 + y * 7 + 10) % 256).unwrap()])
        });
        let decoded = decode(&encode(&img)).unwrap();
        assert_eq!(decoded.image, img);
        assert_eq!(decoded.header.max_value, 255);
        assert_eq!(decoded.missing_samples, 0);
        // The terminating newline is not surplus.
        assert_eq!(decoded.surplus_bytes, 0);
    }
}
