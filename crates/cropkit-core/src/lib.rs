//! Cropkit Core - aspect-locked crop pipeline
//!
//! This crate turns a user-selected photo into a pixel-exact, compressed
//! bitmap of a chosen aspect ratio, independent of how the photo was shown
//! on screen. It covers decoding, the interactive crop geometry, extraction,
//! JPEG encoding, and bounding-box resizing for uploads without a crop.
//!
//! # Pipeline
//!
//! 1. [`decode::decode_image`] builds a [`SourceImage`]
//! 2. [`CropSession`] applies pan/zoom input to a [`Geometry`]
//! 3. [`CropSession::confirm`] maps the frame to a [`CropRegion`] and extracts it
//! 4. [`PendingEncode::encode`] awaits the encoder and yields an [`EncodedBitmap`]
//!
//! The caller takes it from there (see [`handoff`]).

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod handoff;
pub mod resize;
pub mod session;

pub use config::{CropPreset, CropShape, ResizeConfig, SessionConfig};
pub use decode::{decode_image, Raster, SourceImage};
pub use encode::{EncodedBitmap, JpegRasterEncoder, RasterEncoder};
pub use error::CropError;
pub use geometry::{AspectRatio, CropRegion, Geometry, Offset, Viewport, ZoomFactor};
pub use resize::{fit_dimensions, fit_within, resize_and_encode};
pub use session::{CropSession, InputEvent, PendingEncode, SessionState};
