//! Turning the user's selected file into a crop source.
//!
//! This module provides:
//! - Decoding JPEG and PNG bytes into RGB pixel data
//! - EXIF orientation correction
//! - The [`Raster`] surface type shared by extraction, resizing and encoding
//!
//! A crop session starts from a [`SourceImage`]. Sources built with
//! [`SourceImage::opaque`] carry only their natural size; any attempt to read
//! their pixels fails with `CropError::UnreadablePixelData`.

mod file;
mod types;

pub use file::{decode_image, read_orientation};
pub use types::{DecodeError, FilterType, Orientation, Raster, SourceImage};
