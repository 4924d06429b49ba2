//! JPEG encoding of RGB rasters using the `image` crate's encoder.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use super::RasterEncoder;
use crate::decode::Raster;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder reported a failure
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),

    /// The encoder succeeded but produced no bytes
    #[error("Encoder produced an empty bitmap")]
    EmptyOutput,
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, values outside are clamped)
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
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

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());

    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Default platform encoder: baseline JPEG via the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegRasterEncoder;

impl RasterEncoder for JpegRasterEncoder {
    fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    async fn encode(&self, surface: &Raster, quality: u8) -> Result<Vec<u8>, EncodeError> {
        encode_jpeg(&surface.pixels, surface.width, surface.height, quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 255 / width) as u8);
                pixels.push((y * 255 / height) as u8);
                pixels.push(128);
            }
        }
        pixels
    }

    #[test]
    fn test_encode_jpeg_markers() {
        let jpeg = encode_jpeg(&gradient(100, 100), 100, 100, 95).unwrap();

        // SOI and EOI markers
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let pixels = vec![128u8; 10 * 10 * 3];
        assert!(encode_jpeg(&pixels, 10, 10, 0).is_ok());
        assert!(encode_jpeg(&pixels, 10, 10, 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let pixels = vec![128u8; 99 * 100 * 3];
        let result = encode_jpeg(&pixels, 100, 100, 95);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_jpeg_zero_dimensions() {
        assert!(matches!(
            encode_jpeg(&[], 0, 100, 95),
            Err(EncodeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            encode_jpeg(&[], 100, 0, 95),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_jpeg_single_pixel() {
        let jpeg = encode_jpeg(&[255, 0, 0], 1, 1, 95).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_raster_encoder_round_trips_dimensions() {
        let surface = Raster::new(30, 10, gradient(30, 10));
        let bytes = JpegRasterEncoder.encode(&surface, 95).await.unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 10));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: valid input always yields a well-formed JPEG.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            (width, height) in (1u32..=50, 1u32..=50),
            quality in 1u8..=100,
        ) {
            let pixels = vec![128u8; (width * height * 3) as usize];
            let jpeg = encode_jpeg(&pixels, width, height, quality).unwrap();

            prop_assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
            prop_assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
        }

        /// Property: encoding is deterministic.
        #[test]
        fn prop_deterministic_output((width, height) in (1u32..=20, 1u32..=20)) {
            let pixels = vec![100u8; (width * height * 3) as usize];
            let first = encode_jpeg(&pixels, width, height, 95).unwrap();
            let second = encode_jpeg(&pixels, width, height, 95).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
