//! Decoding of user-selected files with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};
use log::debug;

use super::{DecodeError, Orientation, Raster, SourceImage};

/// Decode an image file (JPEG or PNG) into a crop source.
///
/// The container format is guessed from the bytes. Alpha is discarded and
/// EXIF orientation is applied so the pixels match what a browser paints for
/// the same file.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognised,
/// `DecodeError::CorruptedFile` if decoding fails, and
/// `DecodeError::EmptyImage` if the image has no pixels.
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let orientation = read_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let raster = Raster::from_rgb_image(apply_orientation(img, orientation).into_rgb8());
    if raster.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: raster.width,
            height: raster.height,
        });
    }

    debug!(
        "decoded {}x{} source (orientation {:?})",
        raster.width, raster.height, orientation
    );
    Ok(SourceImage::from_raster(raster))
}

/// Read the EXIF orientation tag.
///
/// Returns `Orientation::Normal` if no EXIF data is present or the tag
/// cannot be read.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
