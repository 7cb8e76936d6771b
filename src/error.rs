//! Structured error types for xloverlay.
//!
//! Runtime event handling never surfaces errors (a detached root tears the
//! synchronizer down, inactive panes are no-ops). These types cover the
//! configuration boundary and the wasm DOM binding.

/// All errors that can occur while configuring or binding the overlay layer.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    /// Settings JSON could not be decoded.
    #[error("Settings decode: {0}")]
    Settings(#[from] serde_json::Error),

    /// A setting was decoded but holds an unusable value.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// A DOM call failed in the wasm binding.
    #[error("DOM error: {0}")]
    Dom(String),

    /// The synchronizer was already torn down.
    #[error("Synchronizer destroyed")]
    Destroyed,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OverlayError>;

#[cfg(target_arch = "wasm32")]
impl From<OverlayError> for wasm_bindgen::JsValue {
    fn from(e: OverlayError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for OverlayError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}
