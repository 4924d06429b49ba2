//! Encoding of extracted rasters into compressed bitmaps.
//!
//! This module provides:
//! - [`RasterEncoder`], the seam to the platform's image encoder
//! - [`JpegRasterEncoder`], the default JPEG implementation
//! - [`encode_raster`], which applies the fixed output quality
//!
//! Encoding is the only asynchronous step of the pipeline. Everything that
//! runs before it (pan, zoom, transform, extraction) is synchronous.

mod jpeg;
mod raster;

pub use jpeg::{encode_jpeg, EncodeError, JpegRasterEncoder};
pub use raster::{encode_raster, EncodedBitmap, RasterEncoder, OUTPUT_QUALITY};
