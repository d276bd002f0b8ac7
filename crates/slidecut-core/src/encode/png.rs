//! PNG encoding for exported slides.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Encode RGB pixel data (3 bytes per pixel, row-major) to PNG bytes.
///
/// PNG is lossless, so exported slides keep exactly the sampled pixels.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Encoding is deterministic.
        #[test]
        fn prop_deterministic_output((width, height) in (1u32..=20, 1u32..=20), value in any::<u8>()) {
            let pixels = vec![value; (width as usize) * (height as usize) * 3];
            let first = encode_png(&pixels, width, height).unwrap();
            let second = encode_png(&pixels, width, height).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: Invalid pixel data length always returns error.
        #[test]
        fn prop_invalid_pixel_length_returns_error(
            (width, height) in (1u32..=30, 1u32..=30),
            delta in prop_oneof![-10i32..0, 1i32..=10],
        ) {
            let expected = (width as usize) * (height as usize) * 3;
            let actual = (expected as i64 + delta as i64).max(0) as usize;
            prop_assume!(actual != expected);

            let pixels = vec![128u8; actual];
            let rejected = matches!(
                encode_png(&pixels, width, height),
                Err(EncodeError::InvalidPixelData { .. })
            );
            prop_assert!(rejected);
        }
    }
}
