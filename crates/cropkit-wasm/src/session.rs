//! Interactive crop session bindings.
//!
//! JavaScript cannot follow the core typestate, so [`JsCropSession`] keeps
//! the current stage behind `Rc<RefCell<_>>` and reports it through `state`.
//! Calls that do not apply to the current stage fail with an error instead
//! of being ignored.
//!
//! ```typescript
//! const session = JsCropSession.from_preset(source, 'avatar', 800, 600);
//! canvas.onpointerdown = (e) => session.pointer_down(e.offsetX, e.offsetY);
//! canvas.onpointermove = (e) => session.pointer_move(e.offsetX, e.offsetY);
//! canvas.onpointerup = () => session.pointer_up();
//! slider.oninput = () => session.set_zoom(Number(slider.value));
//!
//! session.confirm();
//! const bitmap = await session.encode();
//! ```

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use crate::types::{to_js_error, JsEncodedBitmap, JsSourceImage};
use cropkit_core::geometry::{Rect, Size};
use cropkit_core::session::{CancelHandle, EncodeFailure, PointerDrag};
use cropkit_core::{
    AspectRatio, CropError, CropPreset, CropRegion, CropSession, CropShape, EncodedBitmap,
    Geometry, InputEvent, JpegRasterEncoder, PendingEncode, SessionConfig, SessionState, Viewport,
};
use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

enum Stage {
    Selecting(CropSession),
    Extracting(PendingEncode),
    Encoding(CancelHandle),
    Ended(SessionState),
}

impl Stage {
    fn state(&self) -> SessionState {
        match self {
            Stage::Selecting(_) => SessionState::Selecting,
            Stage::Extracting(_) | Stage::Encoding(_) => SessionState::Extracting,
            Stage::Ended(state) => *state,
        }
    }
}

/// Session state machine without any JavaScript types.
struct Controller {
    stage: Stage,
    drag: PointerDrag,
}

impl Controller {
    fn new(session: CropSession) -> Self {
        Self {
            stage: Stage::Selecting(session),
            drag: PointerDrag::new(),
        }
    }

    fn state(&self) -> SessionState {
        self.stage.state()
    }

    fn not_selecting(&self) -> CropError {
        not_selecting(self.state())
    }

    fn selecting(&mut self) -> Result<&mut CropSession, CropError> {
        let state = self.state();
        match &mut self.stage {
            Stage::Selecting(session) => Ok(session),
            _ => Err(not_selecting(state)),
        }
    }

    fn geometry(&self) -> Result<&Geometry, CropError> {
        match &self.stage {
            Stage::Selecting(session) => Ok(session.geometry()),
            Stage::Extracting(pending) => Ok(pending.geometry()),
            _ => Err(self.not_selecting()),
        }
    }

    fn apply(&mut self, event: InputEvent) -> Result<(), CropError> {
        self.selecting()?.apply(event);
        Ok(())
    }

    fn pointer_down(&mut self, x: f64, y: f64) -> Result<(), CropError> {
        self.selecting()?;
        self.drag.press(x, y);
        Ok(())
    }

    fn pointer_move(&mut self, x: f64, y: f64) -> Result<(), CropError> {
        self.selecting()?;
        match self.drag.moved(x, y) {
            Some(event) => self.apply(event),
            None => Ok(()),
        }
    }

    fn pointer_up(&mut self) {
        self.drag.release();
    }

    fn crop_region(&self) -> Result<CropRegion, CropError> {
        match &self.stage {
            Stage::Selecting(session) => session.crop_region(),
            Stage::Extracting(pending) => Ok(pending.region()),
            _ => Err(self.not_selecting()),
        }
    }

    fn confirm(&mut self) -> Result<CropRegion, CropError> {
        self.selecting()?;
        self.drag.release();
        let Stage::Selecting(session) = mem::replace(&mut self.stage, Stage::Ended(SessionState::Failed))
        else {
            return Err(self.not_selecting());
        };

        match session.confirm() {
            Ok(pending) => {
                let region = pending.region();
                self.stage = Stage::Extracting(pending);
                Ok(region)
            }
            Err(rejected) => {
                let (error, session) = rejected.into_parts();
                if let Some(session) = session {
                    self.stage = Stage::Selecting(session);
                }
                Err(error)
            }
        }
    }

    /// Take the pending encode out so it can be awaited without a borrow.
    fn begin_encode(&mut self) -> Result<PendingEncode, CropError> {
        if !matches!(self.stage, Stage::Extracting(_)) {
            return Err(CropError::Configuration(format!(
                "session is {}, confirm before encoding",
                state_name(self.state())
            )));
        }
        let Stage::Extracting(pending) = mem::replace(&mut self.stage, Stage::Ended(SessionState::Failed))
        else {
            return Err(self.not_selecting());
        };
        self.stage = Stage::Encoding(pending.cancel_handle());
        Ok(pending)
    }

    fn finish_encode(
        &mut self,
        result: Result<EncodedBitmap, EncodeFailure>,
    ) -> Result<EncodedBitmap, CropError> {
        if !matches!(self.stage, Stage::Encoding(_)) {
            // Cancelled while the encoder was running
            return Err(CropError::Discarded);
        }
        match result {
            Ok(bitmap) => {
                self.stage = Stage::Ended(SessionState::Completed);
                Ok(bitmap)
            }
            Err(failure) => {
                let state = failure.state();
                let (error, pending) = failure.into_parts();
                self.stage = match pending {
                    Some(pending) => Stage::Extracting(pending),
                    None => Stage::Ended(state),
                };
                Err(error)
            }
        }
    }

    fn cancel(&mut self) {
        match mem::replace(&mut self.stage, Stage::Ended(SessionState::Cancelled)) {
            Stage::Selecting(session) => session.cancel(),
            Stage::Encoding(handle) => handle.cancel(),
            Stage::Extracting(_) => debug!("crop session cancelled before encoding"),
            Stage::Ended(state) => self.stage = Stage::Ended(state),
        }
        self.drag.release();
    }
}

/// `width:height` ratio terms from JS. Both must be positive and finite.
fn aspect_from_terms(width: f64, height: f64) -> Result<AspectRatio, CropError> {
    let valid = |term: f64| term.is_finite() && term > 0.0;
    if !valid(width) || !valid(height) {
        return Err(CropError::Configuration(format!(
            "aspect ratio terms must be positive, got {width}:{height}"
        )));
    }
    AspectRatio::new(width / height)
}

fn not_selecting(state: SessionState) -> CropError {
    CropError::Configuration(format!(
        "session is {}, input is only accepted while selecting",
        state_name(state)
    ))
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Selecting => "selecting",
        SessionState::Extracting => "extracting",
        SessionState::Completed => "completed",
        SessionState::Cancelled => "cancelled",
        SessionState::Failed => "failed",
    }
}

/// An interactive crop session for one selected photo.
///
/// The session owns the source image. Create a new session each time the
/// crop dialog opens; a cancelled session cannot be reused.
#[wasm_bindgen]
pub struct JsCropSession {
    inner: Rc<RefCell<Controller>>,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Start a session with an explicit aspect ratio (`aspect_width:aspect_height`)
    /// shown in a `viewport_width x viewport_height` stage.
    ///
    /// `round` only changes how the frame is drawn; the output is rectangular.
    #[wasm_bindgen(constructor)]
    pub fn new(
        source: JsSourceImage,
        aspect_width: f64,
        aspect_height: f64,
        viewport_width: f64,
        viewport_height: f64,
        round: bool,
    ) -> Result<JsCropSession, JsValue> {
        let start = || -> Result<CropSession, CropError> {
            let shape = if round {
                CropShape::Round
            } else {
                CropShape::Rectangle
            };
            let aspect = aspect_from_terms(aspect_width, aspect_height)?;
            let viewport = Viewport::new(viewport_width, viewport_height);
            CropSession::new(source.into_source(), SessionConfig::new(aspect, shape, viewport))
        };
        start().map(Self::wrap).map_err(to_js_error)
    }

    /// Start a session from a named preset such as `"avatar"` or `"cover"`.
    pub fn from_preset(
        source: JsSourceImage,
        preset: &str,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Result<JsCropSession, JsValue> {
        let start = || -> Result<CropSession, CropError> {
            let preset = CropPreset::from_name(preset)?;
            let viewport = Viewport::new(viewport_width, viewport_height);
            CropSession::new(source.into_source(), SessionConfig::from_preset(preset, viewport))
        };
        start().map(Self::wrap).map_err(to_js_error)
    }

    /// Start a session from a serialized `SessionConfig`, e.g.
    /// `{ aspect: 1.5, shape: 'round', viewport: { width: 800, height: 600 } }`.
    pub fn from_config(source: JsSourceImage, config: JsValue) -> Result<JsCropSession, JsValue> {
        let config: SessionConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("configuration: invalid session config: {e}")))?;
        CropSession::new(source.into_source(), config)
            .map(Self::wrap)
            .map_err(to_js_error)
    }

    /// One of `selecting`, `extracting`, `completed`, `cancelled`, `failed`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.inner.borrow().state()).to_string()
    }

    /// Whether the frame should be drawn as a circle.
    #[wasm_bindgen(getter)]
    pub fn round(&self) -> bool {
        match &self.inner.borrow().stage {
            Stage::Selecting(session) => session.shape() == CropShape::Round,
            Stage::Extracting(pending) => pending.shape() == CropShape::Round,
            _ => false,
        }
    }

    pub fn pointer_down(&self, x: f64, y: f64) -> Result<(), JsValue> {
        self.inner.borrow_mut().pointer_down(x, y).map_err(to_js_error)
    }

    pub fn pointer_move(&self, x: f64, y: f64) -> Result<(), JsValue> {
        self.inner.borrow_mut().pointer_move(x, y).map_err(to_js_error)
    }

    pub fn pointer_up(&self) {
        self.inner.borrow_mut().pointer_up();
    }

    /// Apply a serialized input event, e.g. `{ type: 'zoom-steps', steps: -1 }`.
    pub fn apply(&self, event: JsValue) -> Result<(), JsValue> {
        let event: InputEvent = serde_wasm_bindgen::from_value(event)
            .map_err(|e| JsValue::from_str(&format!("configuration: invalid input event: {e}")))?;
        self.inner.borrow_mut().apply(event).map_err(to_js_error)
    }

    /// Set the slider value; clamped to `[1, 3]` and snapped to 0.1 steps.
    pub fn set_zoom(&self, value: f64) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .apply(InputEvent::Zoom { value })
            .map_err(to_js_error)
    }

    pub fn zoom_steps(&self, steps: i32) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .apply(InputEvent::ZoomSteps { steps })
            .map_err(to_js_error)
    }

    pub fn recenter(&self) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .apply(InputEvent::Recenter)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> Result<f64, JsValue> {
        let inner = self.inner.borrow();
        inner
            .geometry()
            .map(|geometry| geometry.zoom().value())
            .map_err(to_js_error)
    }

    /// Current pan offset `{ x, y }` in display pixels.
    pub fn offset(&self) -> Result<JsValue, JsValue> {
        let offset = self.inner.borrow().geometry().map(Geometry::offset).map_err(to_js_error)?;
        to_js_value(&offset)
    }

    /// Frame rectangle `{ x, y, width, height }` in viewport coordinates.
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        let frame: Rect = self.inner.borrow().geometry().map(Geometry::frame_rect).map_err(to_js_error)?;
        to_js_value(&frame)
    }

    /// Unzoomed size `{ width, height }` of the displayed image.
    pub fn media_size(&self) -> Result<JsValue, JsValue> {
        let size: Size = self.inner.borrow().geometry().map(Geometry::media_size).map_err(to_js_error)?;
        to_js_value(&size)
    }

    /// Source pixel region `{ x, y, width, height }` under the frame.
    pub fn crop_region(&self) -> Result<JsValue, JsValue> {
        let region = self.inner.borrow().crop_region().map_err(to_js_error)?;
        to_js_value(&region)
    }

    /// Finalise the selection and extract the region.
    ///
    /// A `degenerate-region` error leaves the session selecting.
    pub fn confirm(&self) -> Result<JsValue, JsValue> {
        let region = self.inner.borrow_mut().confirm().map_err(to_js_error)?;
        to_js_value(&region)
    }

    /// Encode the confirmed region. Resolves to a `JsEncodedBitmap`.
    ///
    /// After an `encoding` rejection the session stays `extracting` and
    /// `encode` may be called again.
    pub fn encode(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let pending = inner.borrow_mut().begin_encode().map_err(to_js_error)?;
            let result = pending.encode(&JpegRasterEncoder).await;
            let bitmap = inner.borrow_mut().finish_encode(result).map_err(to_js_error)?;
            Ok(JsEncodedBitmap::from(bitmap).into())
        })
    }

    /// End the session. An in-flight encode resolves with a `discarded` error.
    pub fn cancel(&self) {
        self.inner.borrow_mut().cancel();
    }
}

impl JsCropSession {
    fn wrap(session: CropSession) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Controller::new(session))),
        }
    }
}

fn to_js_value<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}
