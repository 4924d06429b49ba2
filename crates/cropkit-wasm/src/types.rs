//! JavaScript-facing wrappers around core image types.
//!
//! Pixel buffers live in WASM memory. Getters that return a `Uint8Array`
//! copy the data across the boundary.

use cropkit_core::decode::{FilterType, Raster, SourceImage};
use cropkit_core::{CropError, EncodedBitmap};
use wasm_bindgen::prelude::*;

/// A photo selected by the user, ready to be cropped.
///
/// Constructed from RGB pixels, or with [`JsSourceImage::opaque`] when the
/// browser refuses read-back of a cross-origin image.
#[wasm_bindgen]
pub struct JsSourceImage {
    inner: SourceImage,
}

#[wasm_bindgen]
impl JsSourceImage {
    /// Create a readable source from RGB pixel data (3 bytes per pixel,
    /// row-major order).
    ///
    /// # Errors
    ///
    /// Fails with `configuration:` if a dimension is not a positive integer
    /// or `pixels` is not exactly `width * height * 3` bytes.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, pixels: Vec<u8>) -> Result<JsSourceImage, JsValue> {
        Self::from_rgb(width, height, pixels).map_err(to_js_error)
    }

    /// A source with known dimensions but unreadable pixels.
    pub fn opaque(width: f64, height: f64) -> Result<JsSourceImage, JsValue> {
        let width = dimension(width, "width").map_err(to_js_error)?;
        let height = dimension(height, "height").map_err(to_js_error)?;
        Ok(JsSourceImage {
            inner: SourceImage::opaque(width, height),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    #[wasm_bindgen(getter)]
    pub fn readable(&self) -> bool {
        self.inner.is_readable()
    }

    /// Number of bytes in the pixel buffer, 0 for an opaque source.
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.raster().map_or(0, |raster| raster.pixels.len())
    }

    /// RGB pixel data as a `Uint8Array` copy. Empty for an opaque source.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner
            .raster()
            .map(|raster| raster.pixels.clone())
            .unwrap_or_default()
    }
}

impl JsSourceImage {
    pub(crate) fn from_rgb(width: f64, height: f64, pixels: Vec<u8>) -> Result<Self, CropError> {
        let raster = Raster {
            width: dimension(width, "width")?,
            height: dimension(height, "height")?,
            pixels,
        };
        if !raster.has_valid_len() {
            return Err(CropError::Configuration(format!(
                "expected {}x{}x3 pixel bytes, got {}",
                raster.width,
                raster.height,
                raster.pixels.len()
            )));
        }
        Ok(Self::from_source(SourceImage::from_raster(raster)))
    }

    pub(crate) fn from_source(inner: SourceImage) -> Self {
        Self { inner }
    }

    pub(crate) fn source(&self) -> &SourceImage {
        &self.inner
    }

    pub(crate) fn into_source(self) -> SourceImage {
        self.inner
    }
}

/// The compressed output of a crop or resize.
#[wasm_bindgen]
pub struct JsEncodedBitmap {
    inner: EncodedBitmap,
}

#[wasm_bindgen]
impl JsEncodedBitmap {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// MIME type to use for the upload, e.g. `image/jpeg`.
    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.len()
    }

    /// Encoded bytes as a `Uint8Array` copy.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    /// Move the encoded bytes out without copying, consuming the bitmap.
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_bytes()
    }
}

impl From<EncodedBitmap> for JsEncodedBitmap {
    fn from(inner: EncodedBitmap) -> Self {
        Self { inner }
    }
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest
/// - 1 = Bilinear
/// - 2 = Lanczos3
///
/// Any other value defaults to Lanczos3.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        1 => FilterType::Bilinear,
        _ => FilterType::Lanczos3,
    }
}

/// Validate a JS number used as a pixel count or bound.
///
/// JS numbers reach `u32` parameters through ToInt32, which turns `-1` into
/// `u32::MAX`, so sizes cross the boundary as `f64` and are checked here.
pub(crate) fn dimension(value: f64, what: &str) -> Result<u32, CropError> {
    if !value.is_finite() || value < 1.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(CropError::Configuration(format!(
            "{what} must be a positive integer, got {value}"
        )));
    }
    Ok(value as u32)
}

/// `"<kind>: <message>"`, so callers can branch on the prefix.
pub(crate) fn error_message(error: &CropError) -> String {
    format!("{}: {}", error.kind(), error)
}

pub(crate) fn to_js_error(error: CropError) -> JsValue {
    JsValue::from_str(&error_message(&error))
}
