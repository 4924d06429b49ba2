//! Mapping between viewport space and source pixel space.
//!
//! For a viewport point `p`, the corresponding source point is
//!
//! ```text
//! src = (p - (viewport_centre + offset)) / (display_scale * zoom) + source_centre
//! ```
//!
//! Letterboxing needs no separate term: the image is centred in the viewport,
//! so the centre-relative form already accounts for the inset.

use serde::{Deserialize, Serialize};

use super::{Geometry, Rect};
use crate::error::CropError;

/// Integer crop rectangle in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Right edge (exclusive). Widened so `x + width` cannot overflow.
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Whether the region lies inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= u64::from(width) && self.bottom() <= u64::from(height)
    }
}

/// Round half-up (`2.5 -> 3`, `-2.5 -> -2`).
#[inline]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Map a rectangle in viewport coordinates to source pixel coordinates.
///
/// The result is not rounded or clamped.
pub fn viewport_to_source(geometry: &Geometry, rect: Rect) -> Rect {
    let scale = geometry.display_scale() * geometry.zoom().value();
    let viewport = geometry.viewport();
    let offset = geometry.offset();

    let centre_x = viewport.width / 2.0 + offset.x;
    let centre_y = viewport.height / 2.0 + offset.y;

    Rect {
        x: (rect.x - centre_x) / scale + f64::from(geometry.source_width()) / 2.0,
        y: (rect.y - centre_y) / scale + f64::from(geometry.source_height()) / 2.0,
        width: rect.width / scale,
        height: rect.height / scale,
    }
}

/// Compute the source-space crop region for the current geometry.
///
/// The primary axis (height for aspect ratios >= 1, width otherwise) is
/// rounded half-up and the other axis is derived from it, so the region's
/// ratio drifts from the target by at most half a pixel on the derived axis.
/// The origin is rounded and clamped so the region always fits the source.
///
/// # Errors
///
/// Returns `CropError::DegenerateRegion` if either dimension rounds to zero.
pub fn crop_region(geometry: &Geometry) -> Result<CropRegion, CropError> {
    let src = viewport_to_source(geometry, geometry.frame_rect());
    let source_w = f64::from(geometry.source_width());
    let source_h = f64::from(geometry.source_height());
    let aspect = geometry.aspect().value();

    let exact_w = src.width.min(source_w);
    let exact_h = src.height.min(source_h);

    let (mut width, mut height) = if aspect >= 1.0 {
        let height = round_half_up(exact_h);
        (round_half_up(height * aspect), height)
    } else {
        let width = round_half_up(exact_w);
        (width, round_half_up(width / aspect))
    };

    if width > source_w {
        width = source_w;
        height = round_half_up(source_w / aspect).min(source_h);
    }
    if height > source_h {
        height = source_h;
        width = round_half_up(source_h * aspect).min(source_w);
    }

    if width < 1.0 || height < 1.0 {
        return Err(CropError::DegenerateRegion {
            width: width.max(0.0) as u32,
            height: height.max(0.0) as u32,
        });
    }

    let x = round_half_up(src.x).clamp(0.0, source_w - width);
    let y = round_half_up(src.y).clamp(0.0, source_h - height);

    Ok(CropRegion {
        x: x as u32,
        y: y as u32,
        width: width as u32,
        height: height as u32,
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================
