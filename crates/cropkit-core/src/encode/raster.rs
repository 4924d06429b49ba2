//! The asynchronous encode step and its output type.

use log::info;
use serde::Serialize;

use super::EncodeError;
use crate::decode::Raster;

/// Quality used for every crop and resize output (0.95 on a 0-1 scale).
pub const OUTPUT_QUALITY: u8 = 95;

/// Platform image encoder.
///
/// This is the single suspension point of the pipeline. Implementations that
/// wrap a browser or OS encoder report failures as `EncodeError`; they must
/// never return an empty buffer on success.
pub trait RasterEncoder {
    /// MIME type of the produced bytes.
    fn mime_type(&self) -> &'static str;

    /// Serialize `surface` at `quality` (1-100).
    async fn encode(&self, surface: &Raster, quality: u8) -> Result<Vec<u8>, EncodeError>;
}

/// Compressed result of a crop or resize.
///
/// Its dimensions are those of the extracted region, not of the viewport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedBitmap {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
}

impl EncodedBitmap {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encode a surface with the fixed output quality.
///
/// # Errors
///
/// Propagates the encoder's error, and returns `EncodeError::EmptyOutput`
/// if the encoder reported success without producing bytes.
pub async fn encode_raster<E: RasterEncoder>(
    encoder: &E,
    surface: &Raster,
) -> Result<EncodedBitmap, EncodeError> {
    let bytes = encoder.encode(surface, OUTPUT_QUALITY).await?;
    if bytes.is_empty() {
        return Err(EncodeError::EmptyOutput);
    }

    info!(
        "encoded {}x{} surface to {} bytes ({})",
        surface.width,
        surface.height,
        bytes.len(),
        encoder.mime_type()
    );
    Ok(EncodedBitmap {
        bytes,
        width: surface.width,
        height: surface.height,
        mime_type: encoder.mime_type(),
    })
}
