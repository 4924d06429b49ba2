//! Object key helpers for the caller's upload step.

use cropkit_core::handoff::Destination;
use wasm_bindgen::prelude::*;

/// Storage key `"{prefix}/{owner}/{timestamp_ms}.jpg"` for an explicit time.
#[wasm_bindgen]
pub fn object_key_at(prefix: &str, owner: &str, timestamp_ms: f64) -> String {
    let timestamp = if timestamp_ms.is_finite() && timestamp_ms > 0.0 {
        timestamp_ms as u64
    } else {
        0
    };
    Destination::new("", prefix).object_key(owner, timestamp)
}

/// Storage key for an upload made now.
#[wasm_bindgen]
pub fn object_key(prefix: &str, owner: &str) -> String {
    object_key_at(prefix, owner, js_sys::Date::now())
}
