//! Extraction of a crop region into a fresh raster.
//!
//! The output surface is allocated at exactly the region's pixel size and
//! filled by copying source rows 1:1. The source is never modified.

use log::debug;

use crate::decode::{Raster, SourceImage};
use crate::error::CropError;
use crate::geometry::CropRegion;

/// Copy `region` out of `source` into a new raster.
///
/// # Errors
///
/// - `CropError::UnreadablePixelData` if the source is opaque
/// - `CropError::DegenerateRegion` if the region has no area
/// - `CropError::RegionOutOfBounds` if the region does not fit the source
/// - `CropError::Configuration` if the pixel buffer does not match the
///   source dimensions
pub fn extract_region(source: &SourceImage, region: CropRegion) -> Result<Raster, CropError> {
    let raster = source.raster().ok_or(CropError::UnreadablePixelData)?;

    if !raster.has_valid_len() {
        return Err(CropError::config(format!(
            "pixel buffer of {} bytes does not match a {}x{} RGB raster",
            raster.pixels.len(),
            raster.width,
            raster.height
        )));
    }

    if region.width == 0 || region.height == 0 {
        return Err(CropError::DegenerateRegion {
            width: region.width,
            height: region.height,
        });
    }
    if !region.fits_within(raster.width, raster.height) {
        return Err(CropError::RegionOutOfBounds {
            region,
            width: raster.width,
            height: raster.height,
        });
    }

    let src_stride = raster.stride();
    let row_len = region.width as usize * 3;
    let mut output = Vec::with_capacity(row_len * region.height as usize);

    // Bounds were checked above, so these cannot overflow
    for y in region.y..region.y + region.height {
        let start = y as usize * src_stride + region.x as usize * 3;
        output.extend_from_slice(&raster.pixels[start..start + row_len]);
    }

    debug!(
        "extracted {}x{} at ({}, {}) from {}x{} source",
        region.width, region.height, region.x, region.y, raster.width, raster.height
    );
    Ok(Raster::new(region.width, region.height, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_source(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        SourceImage::from_raster(Raster::new(width, height, pixels))
    }

    fn region(x: u32, y: u32, width: u32, height: u32) -> CropRegion {
        CropRegion {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn test_full_region_copies_everything() {
        let source = test_source(20, 10);
        let out = extract_region(&source, region(0, 0, 20, 10)).unwrap();
        assert_eq!(&out, source.raster().unwrap());
    }

    #[test]
    fn test_center_region_pixel_values() {
        let source = test_source(10, 10);
        let out = extract_region(&source, region(2, 3, 4, 5)).unwrap();

        assert_eq!((out.width, out.height), (4, 5));
        assert_eq!(out.pixels.len(), 4 * 5 * 3);
        // First pixel comes from (2, 3): 3 * 10 + 2 = 32
        assert_eq!(out.pixels[0], 32);
        // Last pixel comes from (5, 7): 7 * 10 + 5 = 75
        assert_eq!(out.pixels[out.pixels.len() - 1], 75);
    }

    #[test]
    fn test_source_is_untouched() {
        let source = test_source(8, 8);
        let before = source.clone();
        let _ = extract_region(&source, region(1, 1, 3, 3)).unwrap();
        assert_eq!(source, before);
    }

    #[test]
    fn test_opaque_source_is_unreadable() {
        let source = SourceImage::opaque(100, 100);
        let result = extract_region(&source, region(0, 0, 10, 10));
        assert!(matches!(result, Err(CropError::UnreadablePixelData)));
    }

    #[test]
    fn test_out_of_bounds_region() {
        let source = test_source(10, 10);
        let result = extract_region(&source, region(5, 5, 6, 2));
        assert!(matches!(result, Err(CropError::RegionOutOfBounds { .. })));
    }

    #[test]
    fn test_region_past_u32_max_is_out_of_bounds() {
        let source = test_source(4, 4);
        let result = extract_region(&source, region(u32::MAX, 0, 2, 1));
        assert!(matches!(result, Err(CropError::RegionOutOfBounds { .. })));

        let result = extract_region(&source, region(0, u32::MAX - 1, 1, 4));
        assert!(matches!(result, Err(CropError::RegionOutOfBounds { .. })));
    }

    #[test]
    fn test_short_pixel_buffer_is_rejected() {
        let source = SourceImage::from_raster(Raster {
            width: 10,
            height: 10,
            pixels: vec![0u8; 30],
        });
        let result = extract_region(&source, region(0, 0, 10, 10));
        assert!(matches!(result, Err(CropError::Configuration(_))));
    }

    #[test]
    fn test_empty_region() {
        let source = test_source(10, 10);
        let result = extract_region(&source, region(0, 0, 0, 4));
        assert!(matches!(result, Err(CropError::DegenerateRegion { .. })));
    }

    #[test]
    fn test_single_pixel_region() {
        let source = test_source(4, 4);
        let out = extract_region(&source, region(3, 3, 1, 1)).unwrap();
        assert_eq!(out.pixels, vec![15, 15, 15]);
    }
}
