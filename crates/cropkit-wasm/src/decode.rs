//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@cropkit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const source = decode_image(bytes);
//! console.log(`Decoded ${source.width}x${source.height}`);
//! ```

use crate::types::{to_js_error, JsSourceImage};
use cropkit_core::decode;
use cropkit_core::CropError;
use wasm_bindgen::prelude::*;

/// Decode a JPEG or PNG file into a readable source image.
///
/// EXIF orientation is applied, so the result is upright.
///
/// # Errors
///
/// Returns an error prefixed with `decode:` if the bytes are empty, in an
/// unsupported format, or corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsSourceImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsSourceImage::from_source)
        .map_err(|e| to_js_error(CropError::from(e)))
}

/// EXIF orientation (1-8) of an encoded file, 1 when absent.
#[wasm_bindgen]
pub fn read_orientation(bytes: &[u8]) -> u8 {
    decode::read_orientation(bytes) as u8
}


/// WASM-specific tests that require JsValue.
///
/// Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_image_invalid() {
        assert!(decode_image(&[0, 1, 2, 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_image_empty() {
        assert!(decode_image(&[]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_image_jpeg() {
        let bytes = cropkit_core::encode::encode_jpeg(&vec![128u8; 64 * 32 * 3], 64, 32, 90).unwrap();
        let source = decode_image(&bytes).unwrap();
        assert_eq!(source.width(), 64);
        assert_eq!(source.height(), 32);
    }
}
