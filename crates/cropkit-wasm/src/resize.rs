//! Bounding-box resize bindings for uploads without an interactive crop.
//!
//! ```typescript
//! import { decode_image, encode_resized } from '@cropkit/wasm';
//!
//! const source = decode_image(bytes);
//! const bitmap = await encode_resized(source, 1920, 1920);
//! await upload(new Blob([bitmap.bytes()], { type: bitmap.mime_type }));
//! ```

use crate::types::{dimension, filter_from_u8, to_js_error, JsEncodedBitmap, JsSourceImage};
use cropkit_core::decode::{FilterType, Raster, SourceImage};
use cropkit_core::{resize, CropError, JpegRasterEncoder, ResizeConfig};
use wasm_bindgen::prelude::*;

fn readable(image: &JsSourceImage) -> Result<&Raster, CropError> {
    image.source().raster().ok_or(CropError::UnreadablePixelData)
}

fn bounds(max_width: f64, max_height: f64) -> Result<(u32, u32), CropError> {
    Ok((
        dimension(max_width, "max_width")?,
        dimension(max_height, "max_height")?,
    ))
}

/// Resize an image to fit within `max_width x max_height`, preserving aspect
/// ratio. Images already inside the bounds are returned unchanged.
///
/// `filter`: 0=Nearest, 1=Bilinear, 2=Lanczos3 (default).
#[wasm_bindgen]
pub fn resize_to_fit(
    image: &JsSourceImage,
    max_width: f64,
    max_height: f64,
    filter: u8,
) -> Result<JsSourceImage, JsValue> {
    fit(image, max_width, max_height, filter_from_u8(filter))
        .map(|raster| JsSourceImage::from_source(SourceImage::from_raster(raster)))
        .map_err(to_js_error)
}

fn fit(
    image: &JsSourceImage,
    max_width: f64,
    max_height: f64,
    filter: FilterType,
) -> Result<Raster, CropError> {
    let (max_width, max_height) = bounds(max_width, max_height)?;
    resize::fit_within(readable(image)?, max_width, max_height, filter)
}

/// Output dimensions `[width, height]` a resize would produce.
#[wasm_bindgen]
pub fn fit_dimensions(
    width: f64,
    height: f64,
    max_width: f64,
    max_height: f64,
) -> Result<Vec<u32>, JsValue> {
    dimensions(width, height, max_width, max_height)
        .map(|(w, h)| vec![w, h])
        .map_err(to_js_error)
}

fn dimensions(
    width: f64,
    height: f64,
    max_width: f64,
    max_height: f64,
) -> Result<(u32, u32), CropError> {
    let (max_width, max_height) = bounds(max_width, max_height)?;
    resize::fit_dimensions(
        dimension(width, "width")?,
        dimension(height, "height")?,
        max_width,
        max_height,
    )
}

/// Resize into the bounds and encode as JPEG at the output quality.
///
/// Consumes the source image.
#[wasm_bindgen]
pub async fn encode_resized(
    image: JsSourceImage,
    max_width: f64,
    max_height: f64,
) -> Result<JsEncodedBitmap, JsValue> {
    encode_with(&image, max_width, max_height)
        .await
        .map_err(to_js_error)
}

async fn encode_with(
    image: &JsSourceImage,
    max_width: f64,
    max_height: f64,
) -> Result<JsEncodedBitmap, CropError> {
    let (max_width, max_height) = bounds(max_width, max_height)?;
    let config = ResizeConfig {
        max_width,
        max_height,
        ..ResizeConfig::default()
    };
    let bitmap = resize::resize_and_encode(readable(image)?, &config, &JpegRasterEncoder).await?;
    Ok(bitmap.into())
}
