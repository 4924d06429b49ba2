//! Interactive crop sessions.
//!
//! A session moves through `Selecting -> Extracting -> {Completed | Cancelled
//! | Failed}`. The states are encoded in the types:
//!
//! - [`CropSession`] is `Selecting`; only it accepts pan and zoom input
//! - [`CropSession::confirm`] consumes it and yields a [`PendingEncode`]
//!   (`Extracting`), or hands it back inside [`Rejected`] when the region is
//!   degenerate
//! - [`PendingEncode::encode`] consumes the pending encode and yields the
//!   bitmap (`Completed`)
//! - [`CropSession::cancel`] consumes the session (`Cancelled`)
//!
//! Panning a finished session is therefore a compile error. Adapters that
//! cannot use typestate report [`SessionState`] instead.

mod pending;

pub use pending::{CancelHandle, EncodeFailure, PendingEncode};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{CropShape, SessionConfig};
use crate::decode::SourceImage;
use crate::error::CropError;
use crate::extract::extract_region;
use crate::geometry::{crop_region, CropRegion, Geometry, Offset, ZoomFactor};

/// Lifecycle state of a crop session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Selecting,
    Extracting,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    /// Whether the session has ended.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Failed
        )
    }
}

/// A single user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InputEvent {
    /// Drag delta in display pixels.
    Pan { dx: f64, dy: f64 },
    /// Absolute slider value.
    Zoom { value: f64 },
    /// Relative zoom in slider steps (wheel, keyboard).
    ZoomSteps { steps: i32 },
    /// Back to zoom 1.0, centred.
    Recenter,
}

/// Apply one input event to a geometry.
///
/// Total: the returned geometry is always clamped.
pub fn update(geometry: Geometry, event: InputEvent) -> Geometry {
    let offset = geometry.offset();
    let candidate = match event {
        InputEvent::Pan { dx, dy } => {
            let dx = if dx.is_finite() { dx } else { 0.0 };
            let dy = if dy.is_finite() { dy } else { 0.0 };
            geometry.with_candidate(geometry.zoom(), Offset::new(offset.x + dx, offset.y + dy))
        }
        InputEvent::Zoom { value } => geometry.with_candidate(ZoomFactor::new(value), offset),
        InputEvent::ZoomSteps { steps } => {
            geometry.with_candidate(geometry.zoom().stepped(steps), offset)
        }
        InputEvent::Recenter => geometry.with_candidate(ZoomFactor::default(), Offset::default()),
    };
    candidate.clamped()
}

/// Turns pointer down/move/up positions into pan events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerDrag {
    last: Option<(f64, f64)>,
}

impl PointerDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, x: f64, y: f64) {
        self.last = Some((x, y));
    }

    /// Pan delta since the previous position, or `None` when not dragging.
    pub fn moved(&mut self, x: f64, y: f64) -> Option<InputEvent> {
        let (last_x, last_y) = self.last?;
        self.last = Some((x, y));
        Some(InputEvent::Pan {
            dx: x - last_x,
            dy: y - last_y,
        })
    }

    pub fn release(&mut self) {
        self.last = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }
}

/// A crop session in the `Selecting` state.
///
/// Owns the source image; it is released when the session is confirmed,
/// cancelled, or dropped.
#[derive(Debug)]
pub struct CropSession {
    source: SourceImage,
    config: SessionConfig,
    geometry: Geometry,
}

impl CropSession {
    /// Start a session centred at zoom 1.0.
    ///
    /// # Errors
    ///
    /// Returns `CropError::Configuration` for a non-positive aspect ratio, an
    /// empty viewport, or an empty source.
    pub fn new(source: SourceImage, config: SessionConfig) -> Result<Self, CropError> {
        let geometry = Geometry::new(
            source.width(),
            source.height(),
            config.viewport,
            config.aspect,
        )?;
        debug!(
            "crop session started: {}x{} source, aspect {:.4}, {:?}",
            source.width(),
            source.height(),
            config.aspect.value(),
            config.shape
        );
        Ok(Self {
            source,
            config,
            geometry,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn shape(&self) -> CropShape {
        self.config.shape
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn apply(&mut self, event: InputEvent) {
        self.geometry = update(self.geometry, event);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.apply(InputEvent::Pan { dx, dy });
    }

    pub fn set_zoom(&mut self, value: f64) {
        self.apply(InputEvent::Zoom { value });
    }

    pub fn zoom_by_steps(&mut self, steps: i32) {
        self.apply(InputEvent::ZoomSteps { steps });
    }

    pub fn recenter(&mut self) {
        self.apply(InputEvent::Recenter);
    }

    /// The source region currently under the crop frame.
    pub fn crop_region(&self) -> Result<CropRegion, CropError> {
        crop_region(&self.geometry)
    }

    /// Finalise the selection and extract it.
    ///
    /// On `DegenerateRegion` the session is handed back through
    /// [`Rejected::into_session`]. Any other failure ends the session.
    pub fn confirm(self) -> Result<PendingEncode, Rejected> {
        let region = match self.crop_region() {
            Ok(region) => region,
            Err(error) => {
                warn!("crop confirm rejected: {error}");
                return Err(Rejected::recoverable(error, self));
            }
        };

        match extract_region(&self.source, region) {
            Ok(surface) => {
                debug!("crop session extracting {region:?}");
                Ok(PendingEncode::new(
                    surface,
                    region,
                    self.geometry,
                    self.config.shape,
                ))
            }
            Err(error) if error.is_recoverable() => {
                warn!("crop confirm rejected: {error}");
                Err(Rejected::recoverable(error, self))
            }
            Err(error) => {
                warn!("crop session failed: {error}");
                Err(Rejected::terminal(error))
            }
        }
    }

    /// Discard the session and its source image.
    pub fn cancel(self) {
        debug!(
            "crop session cancelled, releasing {}x{} source",
            self.source.width(),
            self.source.height()
        );
    }
}

/// Confirm failure, carrying the session back when it is still usable.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Rejected {
    #[source]
    pub error: CropError,
    session: Option<Box<CropSession>>,
}

impl Rejected {
    fn recoverable(error: CropError, session: CropSession) -> Self {
        Self {
            error,
            session: Some(Box::new(session)),
        }
    }

    fn terminal(error: CropError) -> Self {
        Self {
            error,
            session: None,
        }
    }

    /// State the session is in after this failure.
    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Selecting
        } else {
            SessionState::Failed
        }
    }

    /// The session, still `Selecting`, when the failure was recoverable.
    pub fn into_session(self) -> Option<CropSession> {
        self.session.map(|session| *session)
    }

    /// Split into the error and the recovered session, if any.
    pub fn into_parts(self) -> (CropError, Option<CropSession>) {
        (self.error, self.session.map(|session| *session))
    }
}

impl From<Rejected> for CropError {
    fn from(rejected: Rejected) -> Self {
        rejected.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Raster;
    use crate::geometry::{AspectRatio, Viewport};

    fn source(width: u32, height: u32) -> SourceImage {
        let pixels = (0..width * height * 3).map(|i| (i % 256) as u8).collect();
        SourceImage::from_raster(Raster::new(width, height, pixels))
    }

    fn config(aspect: f64) -> SessionConfig {
        SessionConfig::new(
            AspectRatio::new(aspect).unwrap(),
            CropShape::Rectangle,
            Viewport::new(400.0, 300.0),
        )
    }

    #[test]
    fn test_rejects_bad_configuration_up_front() {
        let bad = SessionConfig::new(
            AspectRatio::new(1.0).unwrap(),
            CropShape::Rectangle,
            Viewport::new(0.0, 0.0),
        );
        let result = CropSession::new(source(10, 10), bad);
        assert!(matches!(result, Err(CropError::Configuration(_))));
    }

    #[test]
    fn test_update_pan_is_clamped() {
        let session = CropSession::new(source(400, 300), config(1.0)).unwrap();
        let moved = update(*session.geometry(), InputEvent::Pan { dx: 9999.0, dy: 5.0 });
        let bounds = moved.offset_bounds();
        assert_eq!(moved.offset().x, bounds.x);
        assert_eq!(moved.offset().y, 0.0);
    }

    #[test]
    fn test_zoom_out_reclamps_offset() {
        let mut session = CropSession::new(source(400, 300), config(1.0)).unwrap();
        session.set_zoom(3.0);
        session.pan(-1000.0, -1000.0);
        let zoomed_offset = session.geometry().offset();
        assert!(zoomed_offset.y < 0.0);

        session.set_zoom(1.0);
        let offset = session.geometry().offset();
        assert!(offset.x.abs() <= session.geometry().offset_bounds().x);
        assert_eq!(offset.y, 0.0);
    }

    #[test]
    fn test_non_finite_pan_is_ignored() {
        let mut session = CropSession::new(source(400, 300), config(1.0)).unwrap();
        session.set_zoom(2.0);
        session.pan(20.0, 10.0);
        let before = session.geometry().offset();
        session.pan(f64::NAN, f64::INFINITY);
        assert_eq!(session.geometry().offset(), before);
    }

    #[test]
    fn test_zoom_steps_and_recenter() {
        let mut session = CropSession::new(source(400, 300), config(1.0)).unwrap();
        session.zoom_by_steps(4);
        assert!((session.geometry().zoom().value() - 1.4).abs() < 1e-12);
        session.pan(30.0, 30.0);

        session.recenter();
        assert_eq!(session.geometry().zoom(), ZoomFactor::default());
        assert_eq!(session.geometry().offset(), Offset::default());
    }

    #[test]
    fn test_pointer_drag_produces_deltas() {
        let mut drag = PointerDrag::new();
        assert_eq!(drag.moved(5.0, 5.0), None);

        drag.press(10.0, 10.0);
        assert!(drag.is_dragging());
        assert_eq!(
            drag.moved(15.0, 7.0),
            Some(InputEvent::Pan { dx: 5.0, dy: -3.0 })
        );
        assert_eq!(
            drag.moved(16.0, 7.0),
            Some(InputEvent::Pan { dx: 1.0, dy: 0.0 })
        );

        drag.release();
        assert_eq!(drag.moved(20.0, 20.0), None);
    }

    #[test]
    fn test_confirm_extracts_region() {
        let session = CropSession::new(source(400, 300), config(1.0)).unwrap();
        let pending = session.confirm().unwrap();
        assert_eq!(
            pending.region(),
            CropRegion {
                x: 50,
                y: 0,
                width: 300,
                height: 300,
            }
        );
        assert_eq!(pending.surface().width, 300);
    }

    #[test]
    fn test_degenerate_confirm_hands_session_back() {
        let mut session = CropSession::new(source(1, 1), config(16.0 / 9.0)).unwrap();
        session.set_zoom(3.0);

        let rejected = session.confirm().unwrap_err();
        assert_eq!(rejected.state(), SessionState::Selecting);
        assert!(matches!(rejected.error, CropError::DegenerateRegion { .. }));

        let mut session = rejected.into_session().unwrap();
        session.set_zoom(1.0);
        let pending = session.confirm().unwrap();
        assert_eq!(pending.region().width, 1);
    }

    #[test]
    fn test_unreadable_source_fails_session() {
        let session = CropSession::new(SourceImage::opaque(400, 300), config(1.0)).unwrap();
        let rejected = session.confirm().unwrap_err();
        assert_eq!(rejected.state(), SessionState::Failed);
        let (error, session) = rejected.into_parts();
        assert!(matches!(error, CropError::UnreadablePixelData));
        assert!(session.is_none());
    }

    #[test]
    fn test_shape_hint_does_not_change_extraction() {
        let viewport = Viewport::new(400.0, 300.0);
        let aspect = AspectRatio::new(1.0).unwrap();

        let mut regions = Vec::new();
        for shape in [CropShape::Round, CropShape::Rectangle] {
            let mut session =
                CropSession::new(source(400, 300), SessionConfig::new(aspect, shape, viewport))
                    .unwrap();
            session.set_zoom(1.7);
            session.pan(-25.0, 12.0);
            let pending = session.confirm().unwrap();
            regions.push((pending.region(), pending.surface().clone()));
        }
        assert_eq!(regions[0], regions[1]);
    }

    #[test]
    fn test_session_state_terminal() {
        assert!(!SessionState::Selecting.is_terminal());
        assert!(!SessionState::Extracting.is_terminal());
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(SessionState::Failed.is_terminal());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::decode::Raster;
    use crate::geometry::{AspectRatio, Viewport};
    use proptest::prelude::*;

    fn event_strategy() -> impl Strategy<Value = InputEvent> {
        prop_oneof![
            (-500.0f64..=500.0, -500.0f64..=500.0).prop_map(|(dx, dy)| InputEvent::Pan { dx, dy }),
            (0.0f64..=4.0).prop_map(|value| InputEvent::Zoom { value }),
            (-15i32..=15).prop_map(|steps| InputEvent::ZoomSteps { steps }),
            Just(InputEvent::Recenter),
        ]
    }

    proptest! {
        /// Property: any sequence of interactions leaves a region that is
        /// inside the source and aspect-locked.
        #[test]
        fn prop_interaction_keeps_region_valid(
            (sw, sh) in (40u32..=400, 40u32..=400),
            aspect in prop::sample::select(vec![1.0, 3.0, 0.8, 2.0, 1.75, 16.0 / 9.0]),
            events in prop::collection::vec(event_strategy(), 0..20),
        ) {
            let source = SourceImage::from_raster(Raster::new(sw, sh, vec![0u8; (sw * sh * 3) as usize]));
            let config = SessionConfig::new(
                AspectRatio::new(aspect).unwrap(),
                CropShape::Rectangle,
                Viewport::new(320.0, 240.0),
            );
            let mut session = CropSession::new(source, config).unwrap();
            for event in events {
                session.apply(event);
                prop_assert_eq!(session.geometry().clamped(), *session.geometry());
            }

            let region = session.crop_region().unwrap();
            prop_assert!(region.fits_within(sw, sh));
            let drift = (f64::from(region.width) - f64::from(region.height) * aspect).abs();
            prop_assert!(drift <= 0.5 * aspect.max(1.0) + 1e-9);
        }
    }
}
