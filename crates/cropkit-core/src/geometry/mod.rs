//! Crop geometry: the value model behind an interactive crop.
//!
//! # Display Model
//!
//! The source image is shown "contain"-fit and centred inside the viewport.
//! Any space left over is letterboxing. The crop frame is the largest
//! rectangle of the session's aspect ratio that fits inside the displayed
//! image at zoom 1.0, also centred in the viewport.
//!
//! At zoom `z` the image is drawn at `display_scale * z`, centred on the
//! viewport centre plus [`Offset`]. The offset is limited so the frame never
//! shows anything outside the image.
//!
//! # Coordinate System
//!
//! - Viewport coordinates are display pixels, origin at the top-left corner
//! - Source coordinates are native pixels of the decoded image
//! - Positive offset moves the image right/down, so the selected source
//!   region moves left/up

mod transform;

pub use transform::{crop_region, round_half_up, viewport_to_source, CropRegion};

use serde::{Deserialize, Serialize};

use crate::error::CropError;

/// Smallest zoom factor; the frame covers the displayed image along its
/// constraining axis.
pub const MIN_ZOOM: f64 = 1.0;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 3.0;
/// Zoom slider granularity.
pub const ZOOM_STEP: f64 = 0.1;

/// Width / height ratio of the crop frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AspectRatio(f64);

impl AspectRatio {
    /// Create an aspect ratio from a width/height quotient.
    pub fn new(ratio: f64) -> Result<Self, CropError> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(CropError::config(format!(
                "aspect ratio must be positive and finite, got {ratio}"
            )));
        }
        Ok(Self(ratio))
    }

    /// Create an aspect ratio from integer width and height, e.g. `(16, 9)`.
    pub fn from_dimensions(width: u32, height: u32) -> Result<Self, CropError> {
        if width == 0 || height == 0 {
            return Err(CropError::config(format!(
                "aspect ratio {width}:{height} has a zero term"
            )));
        }
        Self::new(f64::from(width) / f64::from(height))
    }

    /// Non-zero constant terms only.
    pub(crate) fn from_terms(width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0);
        Self(f64::from(width) / f64::from(height))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Display-space size allocated to the cropper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn validate(self) -> Result<Self, CropError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(CropError::config(format!(
                "viewport must have positive area, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(self)
    }
}

/// Zoom factor in `[MIN_ZOOM, MAX_ZOOM]`, snapped to `ZOOM_STEP`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoomFactor(f64);

impl ZoomFactor {
    /// Clamp and snap an arbitrary value. Non-finite input becomes `MIN_ZOOM`.
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self(MIN_ZOOM);
        }
        let snapped = (value.clamp(MIN_ZOOM, MAX_ZOOM) / ZOOM_STEP).round() * ZOOM_STEP;
        // Snapping can land a hair outside the range (e.g. 3.0000000000000004)
        Self(snapped.clamp(MIN_ZOOM, MAX_ZOOM))
    }

    /// Move by a whole number of slider steps.
    pub fn stepped(self, steps: i32) -> Self {
        Self::new(self.0 + f64::from(steps) * ZOOM_STEP)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for ZoomFactor {
    fn default() -> Self {
        Self(MIN_ZOOM)
    }
}

/// Translation of the image centre relative to the frame centre, in
/// display pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Floating-point size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Floating-point rectangle, origin at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Complete crop state for one session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    source_width: u32,
    source_height: u32,
    viewport: Viewport,
    aspect: AspectRatio,
    zoom: ZoomFactor,
    offset: Offset,
}

impl Geometry {
    /// Build the initial geometry: zoom 1.0, centred.
    ///
    /// # Errors
    ///
    /// Returns `CropError::Configuration` if the aspect ratio is not positive,
    /// the viewport has no area, or the source has no pixels.
    pub fn new(
        source_width: u32,
        source_height: u32,
        viewport: Viewport,
        aspect: AspectRatio,
    ) -> Result<Self, CropError> {
        if source_width == 0 || source_height == 0 {
            return Err(CropError::config(format!(
                "source image must have positive area, got {source_width}x{source_height}"
            )));
        }
        // Re-validate: a deserialized AspectRatio has not been through new()
        let aspect = AspectRatio::new(aspect.value())?;
        let viewport = viewport.validate()?;

        Ok(Self {
            source_width,
            source_height,
            viewport,
            aspect,
            zoom: ZoomFactor::default(),
            offset: Offset::default(),
        })
    }

    /// Replace zoom and offset with an unclamped candidate.
    ///
    /// The result may violate the frame bounds until [`Geometry::clamp`]
    /// is called.
    pub fn with_candidate(mut self, zoom: ZoomFactor, offset: Offset) -> Self {
        self.zoom = zoom;
        self.offset = offset;
        self
    }

    /// Pull the offset back inside the range allowed at the current zoom.
    ///
    /// Idempotent: clamping a valid state leaves it unchanged.
    pub fn clamp(&mut self) {
        let bounds = self.offset_bounds();
        let limit = |value: f64, bound: f64| {
            if value.is_finite() {
                value.clamp(-bound, bound)
            } else {
                0.0
            }
        };
        self.offset = Offset::new(limit(self.offset.x, bounds.x), limit(self.offset.y, bounds.y));
    }

    /// Consuming form of [`Geometry::clamp`].
    pub fn clamped(mut self) -> Self {
        self.clamp();
        self
    }

    pub fn source_width(&self) -> u32 {
        self.source_width
    }

    pub fn source_height(&self) -> u32 {
        self.source_height
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn aspect(&self) -> AspectRatio {
        self.aspect
    }

    pub fn zoom(&self) -> ZoomFactor {
        self.zoom
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Viewport-to-source ratio at zoom 1.0 (display pixels per source pixel).
    pub fn display_scale(&self) -> f64 {
        let sx = self.viewport.width / f64::from(self.source_width);
        let sy = self.viewport.height / f64::from(self.source_height);
        sx.min(sy)
    }

    /// Size of the displayed image at zoom 1.0.
    pub fn media_size(&self) -> Size {
        let scale = self.display_scale();
        Size {
            width: f64::from(self.source_width) * scale,
            height: f64::from(self.source_height) * scale,
        }
    }

    /// Letterbox inset on each side of the displayed image at zoom 1.0.
    pub fn letterbox(&self) -> Size {
        let media = self.media_size();
        Size {
            width: ((self.viewport.width - media.width) / 2.0).max(0.0),
            height: ((self.viewport.height - media.height) / 2.0).max(0.0),
        }
    }

    /// Size of the crop frame in display pixels.
    pub fn frame_size(&self) -> Size {
        let media = self.media_size();
        let aspect = self.aspect.value();
        if media.width / media.height > aspect {
            Size {
                width: media.height * aspect,
                height: media.height,
            }
        } else {
            Size {
                width: media.width,
                height: media.width / aspect,
            }
        }
    }

    /// The crop frame in viewport coordinates (always centred).
    pub fn frame_rect(&self) -> Rect {
        let frame = self.frame_size();
        Rect {
            x: (self.viewport.width - frame.width) / 2.0,
            y: (self.viewport.height - frame.height) / 2.0,
            width: frame.width,
            height: frame.height,
        }
    }

    /// Largest absolute offset allowed on each axis at the current zoom.
    pub fn offset_bounds(&self) -> Offset {
        let media = self.media_size();
        let frame = self.frame_size();
        let zoom = self.zoom.value();
        Offset {
            x: ((media.width * zoom - frame.width) / 2.0).max(0.0),
            y: ((media.height * zoom - frame.height) / 2.0).max(0.0),
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn geometry_strategy() -> impl Strategy<Value = Geometry> {
        (
            1u32..=6000,
            1u32..=6000,
            50.0f64..=1600.0,
            50.0f64..=1600.0,
            0.2f64..=5.0,
            1.0f64..=3.0,
            -10_000.0f64..=10_000.0,
            -10_000.0f64..=10_000.0,
        )
            .prop_map(|(sw, sh, vw, vh, aspect, zoom, ox, oy)| {
                Geometry::new(sw, sh, Viewport::new(vw, vh), AspectRatio::new(aspect).unwrap())
                    .unwrap()
                    .with_candidate(ZoomFactor::new(zoom), Offset::new(ox, oy))
            })
    }

    proptest! {
        /// Property: clamping twice equals clamping once.
        #[test]
        fn prop_clamp_is_idempotent(candidate in geometry_strategy()) {
            let once = candidate.clamped();
            let twice = once.clamped();
            prop_assert_eq!(once, twice);
        }

        /// Property: clamped offsets stay within the bounds for their zoom.
        #[test]
        fn prop_clamped_offset_within_bounds(candidate in geometry_strategy()) {
            let geometry = candidate.clamped();
            let bounds = geometry.offset_bounds();
            prop_assert!(geometry.offset().x.abs() <= bounds.x);
            prop_assert!(geometry.offset().y.abs() <= bounds.y);
        }

        /// Property: the frame never exceeds the displayed image.
        #[test]
        fn prop_frame_inside_media(candidate in geometry_strategy()) {
            let media = candidate.media_size();
            let frame = candidate.frame_size();
            prop_assert!(frame.width <= media.width * (1.0 + 1e-12));
            prop_assert!(frame.height <= media.height * (1.0 + 1e-12));
        }

        /// Property: zoom is always within range and on a step.
        #[test]
        fn prop_zoom_in_range(value in -10.0f64..=10.0) {
            let zoom = ZoomFactor::new(value).value();
            prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom));
            let steps = zoom / ZOOM_STEP;
            prop_assert!((steps - steps.round()).abs() < 1e-9);
        }
    }
}
