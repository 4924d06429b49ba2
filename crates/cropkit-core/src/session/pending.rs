//! The `Extracting` state: an extracted surface waiting to be encoded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

use super::SessionState;
use crate::config::CropShape;
use crate::decode::Raster;
use crate::encode::{encode_raster, EncodedBitmap, RasterEncoder};
use crate::error::CropError;
use crate::geometry::{CropRegion, Geometry};

/// Cooperative cancellation flag for an in-flight encode.
///
/// The flag is only looked at after the encoder resolves; a result that
/// arrives for a cancelled session is dropped instead of delivered.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A confirmed crop whose surface has been extracted but not yet encoded.
#[derive(Debug)]
pub struct PendingEncode {
    surface: Raster,
    region: CropRegion,
    geometry: Geometry,
    shape: CropShape,
    cancel: CancelHandle,
}

impl PendingEncode {
    pub(super) fn new(
        surface: Raster,
        region: CropRegion,
        geometry: Geometry,
        shape: CropShape,
    ) -> Self {
        Self {
            surface,
            region,
            geometry,
            shape,
            cancel: CancelHandle::default(),
        }
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    /// Geometry at the moment of confirmation.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn shape(&self) -> CropShape {
        self.shape
    }

    /// The transient raster holding the extracted pixels.
    pub fn surface(&self) -> &Raster {
        &self.surface
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Encode the surface, ending the session.
    ///
    /// The surface is released when this returns, except on a retryable
    /// encoder failure, where [`EncodeFailure::retry`] gives it back.
    pub async fn encode<E: RasterEncoder>(
        self,
        encoder: &E,
    ) -> Result<EncodedBitmap, EncodeFailure> {
        let result = encode_raster(encoder, &self.surface).await;

        if self.cancel.is_cancelled() {
            warn!(
                "discarding encode result for cancelled crop {:?}",
                self.region
            );
            return Err(EncodeFailure::terminal(CropError::Discarded));
        }

        match result {
            Ok(bitmap) => {
                info!(
                    "crop completed: {}x{} from ({}, {}), {} bytes",
                    bitmap.width,
                    bitmap.height,
                    self.region.x,
                    self.region.y,
                    bitmap.len()
                );
                Ok(bitmap)
            }
            Err(error) => {
                warn!("crop encode failed, surface kept for retry: {error}");
                Err(EncodeFailure {
                    error: error.into(),
                    pending: Some(Box::new(self)),
                })
            }
        }
    }
}

/// Encode failure, carrying the pending encode back when it may be retried.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct EncodeFailure {
    #[source]
    pub error: CropError,
    pending: Option<Box<PendingEncode>>,
}

impl EncodeFailure {
    fn terminal(error: CropError) -> Self {
        Self {
            error,
            pending: None,
        }
    }

    /// State the session is in after this failure.
    pub fn state(&self) -> SessionState {
        match (&self.error, &self.pending) {
            (CropError::Discarded, _) => SessionState::Cancelled,
            (_, Some(_)) => SessionState::Extracting,
            (_, None) => SessionState::Failed,
        }
    }

    /// The pending encode, for another attempt with the same geometry.
    pub fn retry(self) -> Option<PendingEncode> {
        self.pending.map(|pending| *pending)
    }

    pub fn into_parts(self) -> (CropError, Option<PendingEncode>) {
        (self.error, self.pending.map(|pending| *pending))
    }
}

impl From<EncodeFailure> for CropError {
    fn from(failure: EncodeFailure) -> Self {
        failure.error
    }
}
