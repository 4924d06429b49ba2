//! Error taxonomy for the crop pipeline.
//!
//! Every failure the pipeline can produce is a distinct variant of
//! [`CropError`]. None of them is ever converted into an empty or placeholder
//! bitmap.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::geometry::CropRegion;

/// Errors produced while configuring, interacting with, extracting, or
/// encoding a crop session.
#[derive(Debug, Error)]
pub enum CropError {
    /// Invalid aspect ratio, viewport, source size, or resize bounds.
    ///
    /// This is a caller bug and is reported at construction time.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The crop region rounds to zero pixels in at least one dimension.
    ///
    /// The session stays interactive; the user can zoom or pan and retry.
    #[error("Degenerate crop region: {width}x{height} pixels")]
    DegenerateRegion { width: u32, height: u32 },

    /// Pixel data of the source cannot be read back (cross-origin source
    /// loaded without anonymous access).
    #[error("Pixel data of the source image is not readable")]
    UnreadablePixelData,

    /// A crop region that does not fit inside the source reached extraction.
    #[error("Crop region {region:?} exceeds source bounds {width}x{height}")]
    RegionOutOfBounds {
        region: CropRegion,
        width: u32,
        height: u32,
    },

    /// The encoder reported a failure. Retrying the same confirm is allowed.
    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodeError),

    /// The session was cancelled while its encode was in flight; the result
    /// was dropped.
    #[error("Encode result discarded because the session was cancelled")]
    Discarded,

    /// The selected file could not be decoded.
    #[error("Decoding failed: {0}")]
    Decode(#[from] DecodeError),
}

impl CropError {
    /// True when the session that produced this error is still interactive.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CropError::DegenerateRegion { .. })
    }

    /// True when the same confirm may simply be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CropError::Encoding(_))
    }

    /// Stable identifier used by adapters that cannot expose Rust enums.
    pub fn kind(&self) -> &'static str {
        match self {
            CropError::Configuration(_) => "configuration",
            CropError::DegenerateRegion { .. } => "degenerate-region",
            CropError::UnreadablePixelData => "unreadable-pixel-data",
            CropError::RegionOutOfBounds { .. } => "region-out-of-bounds",
            CropError::Encoding(_) => "encoding",
            CropError::Discarded => "discarded",
            CropError::Decode(_) => "decode",
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        CropError::Configuration(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_degenerate_is_recoverable() {
        assert!(CropError::DegenerateRegion {
            width: 0,
            height: 3
        }
        .is_recoverable());
        assert!(!CropError::UnreadablePixelData.is_recoverable());
        assert!(!CropError::config("bad").is_recoverable());
        assert!(!CropError::Discarded.is_recoverable());
    }

    #[test]
    fn test_only_encoding_is_retryable() {
        let err = CropError::from(EncodeError::EncodingFailed("boom".to_string()));
        assert!(err.is_retryable());
        assert!(!CropError::UnreadablePixelData.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = CropError::DegenerateRegion {
            width: 0,
            height: 1,
        };
        assert_eq!(err.to_string(), "Degenerate crop region: 0x1 pixels");

        let err = CropError::config("aspect ratio must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: aspect ratio must be positive"
        );
    }

    #[test]
    fn test_kind_is_stable() {
        assert_eq!(CropError::UnreadablePixelData.kind(), "unreadable-pixel-data");
        assert_eq!(CropError::Discarded.kind(), "discarded");
    }
}
