//! Bounding-box resizing for uploads that skip the interactive crop.
//!
//! The image is scaled uniformly so it fits inside `max_width x max_height`.
//! It is never enlarged.

use log::info;

use crate::config::ResizeConfig;
use crate::decode::{FilterType, Raster};
use crate::encode::{encode_raster, EncodedBitmap, RasterEncoder};
use crate::error::CropError;
use crate::geometry::round_half_up;

/// Compute output dimensions for a bounding-box fit.
///
/// Uses `s = min(max_width / width, max_height / height, 1.0)` and rounds
/// each dimension half-up, keeping at least one pixel.
///
/// # Errors
///
/// Returns `CropError::Configuration` if a bound or a source dimension is
/// zero.
pub fn fit_dimensions(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> Result<(u32, u32), CropError> {
    if max_width == 0 || max_height == 0 {
        return Err(CropError::config(format!(
            "resize bounds must be positive, got {max_width}x{max_height}"
        )));
    }
    if width == 0 || height == 0 {
        return Err(CropError::config(format!(
            "cannot resize an empty {width}x{height} image"
        )));
    }

    let (w, h) = (f64::from(width), f64::from(height));
    let scale = (f64::from(max_width) / w)
        .min(f64::from(max_height) / h)
        .min(1.0);

    // Rounding can overshoot a bound by a fraction; min() keeps it inside
    let out_w = (round_half_up(w * scale) as u32).clamp(1, max_width.min(width));
    let out_h = (round_half_up(h * scale) as u32).clamp(1, max_height.min(height));
    Ok((out_w, out_h))
}

/// Resize a raster to fit within the bounds, preserving aspect ratio.
///
/// Returns a copy when the raster already fits.
pub fn fit_within(
    raster: &Raster,
    max_width: u32,
    max_height: u32,
    filter: FilterType,
) -> Result<Raster, CropError> {
    let (width, height) = fit_dimensions(raster.width, raster.height, max_width, max_height)?;
    if (width, height) == (raster.width, raster.height) {
        return Ok(raster.clone());
    }

    let rgb = raster
        .to_rgb_image()
        .ok_or_else(|| CropError::config("raster buffer does not match its dimensions"))?;
    let resized = image::imageops::resize(&rgb, width, height, filter.to_image_filter());
    Ok(Raster::from_rgb_image(resized))
}

/// Fit a raster into `config`'s bounds and encode it with the output quality.
pub async fn resize_and_encode<E: RasterEncoder>(
    raster: &Raster,
    config: &ResizeConfig,
    encoder: &E,
) -> Result<EncodedBitmap, CropError> {
    let resized = fit_within(raster, config.max_width, config.max_height, config.filter)?;
    info!(
        "resized {}x{} to {}x{} (bounds {}x{})",
        raster.width, raster.height, resized.width, resized.height, config.max_width, config.max_height
    );
    Ok(encode_raster(encoder, &resized).await?)
}
