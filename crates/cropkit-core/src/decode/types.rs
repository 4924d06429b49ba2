//! Core types for decoded images.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The image decoded to zero pixels.
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    #[default]
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Flip horizontal + rotate 270 CW.
    Transpose = 5,
    Rotate90CW = 6,
    /// Flip horizontal + rotate 90 CW.
    Transverse = 7,
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// An RGB raster surface.
///
/// Used both for decoded source pixels and for the transient surface the
/// extraction engine draws into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Create a new raster with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a raster from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbImage. Clones the pixel data.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Buffer length implied by the dimensions, `None` if it overflows `usize`.
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(3)
    }

    /// Whether the pixel buffer holds exactly `width * height` RGB pixels.
    pub fn has_valid_len(&self) -> bool {
        self.expected_len() == Some(self.pixels.len())
    }

    /// Length in bytes of one pixel row.
    pub fn stride(&self) -> usize {
        self.width as usize * 3
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// Pixel access for a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SourcePixels {
    Readable(Raster),
    /// Dimensions are known but read-back is forbidden.
    Opaque,
}

/// A decoded photo selected by the user.
///
/// Immutable once built. A crop session owns its source exclusively and
/// drops it when the session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    pixels: SourcePixels,
}

impl SourceImage {
    /// Wrap a readable raster.
    pub fn from_raster(raster: Raster) -> Self {
        Self {
            width: raster.width,
            height: raster.height,
            pixels: SourcePixels::Readable(raster),
        }
    }

    /// A source whose natural size is known but whose pixels cannot be read,
    /// e.g. a cross-origin image displayed without anonymous access.
    pub fn opaque(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: SourcePixels::Opaque,
        }
    }

    /// Natural width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Natural height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Readable pixel data, or `None` for an opaque source.
    pub fn raster(&self) -> Option<&Raster> {
        match &self.pixels {
            SourcePixels::Readable(raster) => Some(raster),
            SourcePixels::Opaque => None,
        }
    }

    pub fn is_readable(&self) -> bool {
        matches!(self.pixels, SourcePixels::Readable(_))
    }
}
