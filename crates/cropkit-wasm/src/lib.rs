//! Cropkit WASM - WebAssembly bindings for cropkit
//!
//! This crate exposes the cropkit-core crop pipeline to JavaScript/TypeScript
//! applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrappers for source images and encoded bitmaps
//! - `decode` - Image decoding bindings
//! - `session` - Interactive crop session (pan, zoom, confirm, encode)
//! - `resize` - Bounding-box resize for uploads without a crop
//! - `handoff` - Object key helpers for the upload step
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, JsCropSession } from '@cropkit/wasm';
//!
//! await init();
//!
//! const source = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const session = JsCropSession.from_preset(source, 'cover', 800, 600);
//! // ...wire pointer and slider events...
//! session.confirm();
//! const bitmap = await session.encode();
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod handoff;
mod resize;
mod session;
mod types;

pub use decode::{decode_image, read_orientation};
pub use handoff::{object_key, object_key_at};
pub use resize::{encode_resized, fit_dimensions, resize_to_fit};
pub use session::JsCropSession;
pub use types::{JsEncodedBitmap, JsSourceImage};

/// Initialize the WASM module (called automatically on load)
///
/// Routes `log` records to the browser console at `info` level.
#[wasm_bindgen(start)]
pub fn init() -> Result<(), JsValue> {
    console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Change the console log level (`off`, `error`, `warn`, `info`, `debug`, `trace`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("configuration: unknown log level {level:?}")))?;
    log::set_max_level(filter);
    Ok(())
}

fn parse_level(level: &str) -> Option<log::LevelFilter> {
    level.trim().parse().ok()
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Names of the built-in crop presets.
#[wasm_bindgen]
pub fn preset_names() -> Vec<String> {
    cropkit_core::CropPreset::ALL
        .iter()
        .map(|preset| preset.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(log::LevelFilter::Debug));
        assert_eq!(parse_level(" WARN "), Some(log::LevelFilter::Warn));
        assert_eq!(parse_level("off"), Some(log::LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_preset_names() {
        let names = preset_names();
        assert!(names.contains(&"avatar".to_string()));
        assert!(names.contains(&"premium-thumbnail".to_string()));
        assert_eq!(names.len(), cropkit_core::CropPreset::ALL.len());
    }
}
