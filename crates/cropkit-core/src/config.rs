//! Session and resize configuration.
//!
//! Plain serde structs so adapters can pass them in from JavaScript or a
//! settings file. Validation happens when a session or resize is started,
//! never at deserialisation time.

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;
use crate::error::CropError;
use crate::geometry::{AspectRatio, Viewport};

/// Display mask drawn around the crop frame.
///
/// Purely cosmetic: the extracted pixels are identical for both shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropShape {
    #[default]
    Rectangle,
    Round,
}

/// Crop surfaces used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CropPreset {
    /// Profile picture, 1:1 with a round mask.
    Avatar,
    /// Profile cover, 3:1.
    Cover,
    /// Social post image, 4:5.
    PostImage,
    /// Event banner, 2:1.
    EventBanner,
    /// Feed spotlight image, 700:400.
    FeedSpotlight,
    /// Moderation console banner, 1200:400.
    AdminBanner,
    /// Premium content thumbnail, 16:9.
    PremiumThumbnail,
    /// Premium creator avatar, 1:1.
    PremiumAvatar,
}

impl CropPreset {
    pub const ALL: [CropPreset; 8] = [
        CropPreset::Avatar,
        CropPreset::Cover,
        CropPreset::PostImage,
        CropPreset::EventBanner,
        CropPreset::FeedSpotlight,
        CropPreset::AdminBanner,
        CropPreset::PremiumThumbnail,
        CropPreset::PremiumAvatar,
    ];

    /// Aspect ratio as integer width and height terms.
    pub fn ratio_terms(self) -> (u32, u32) {
        match self {
            CropPreset::Avatar | CropPreset::PremiumAvatar => (1, 1),
            CropPreset::Cover => (3, 1),
            CropPreset::PostImage => (4, 5),
            CropPreset::EventBanner => (2, 1),
            CropPreset::FeedSpotlight => (700, 400),
            CropPreset::AdminBanner => (1200, 400),
            CropPreset::PremiumThumbnail => (16, 9),
        }
    }

    pub fn aspect(self) -> AspectRatio {
        let (w, h) = self.ratio_terms();
        AspectRatio::from_terms(w, h)
    }

    pub fn shape(self) -> CropShape {
        match self {
            CropPreset::Avatar => CropShape::Round,
            _ => CropShape::Rectangle,
        }
    }

    /// Parse the kebab-case name used by the JavaScript side.
    pub fn from_name(name: &str) -> Result<Self, CropError> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == name)
            .ok_or_else(|| CropError::config(format!("unknown crop preset '{name}'")))
    }

    pub fn name(self) -> &'static str {
        match self {
            CropPreset::Avatar => "avatar",
            CropPreset::Cover => "cover",
            CropPreset::PostImage => "post-image",
            CropPreset::EventBanner => "event-banner",
            CropPreset::FeedSpotlight => "feed-spotlight",
            CropPreset::AdminBanner => "admin-banner",
            CropPreset::PremiumThumbnail => "premium-thumbnail",
            CropPreset::PremiumAvatar => "premium-avatar",
        }
    }
}

/// Parameters fixed at session start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub aspect: AspectRatio,
    #[serde(default)]
    pub shape: CropShape,
    pub viewport: Viewport,
}

impl SessionConfig {
    pub fn new(aspect: AspectRatio, shape: CropShape, viewport: Viewport) -> Self {
        Self {
            aspect,
            shape,
            viewport,
        }
    }

    pub fn from_preset(preset: CropPreset, viewport: Viewport) -> Self {
        Self::new(preset.aspect(), preset.shape(), viewport)
    }
}

/// Bounding box for non-interactive uploads such as gallery photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeConfig {
    pub max_width: u32,
    pub max_height: u32,
    #[serde(default)]
    pub filter: FilterType,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1920,
            filter: FilterType::Lanczos3,
        }
    }
}
