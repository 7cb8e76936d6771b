//! Overlay configuration.
//!
//! Settings arrive from the host as JSON (or a JS object on wasm32) and are
//! treated as read-only by the synchronizer. Host notification hooks
//! (`onWindowResize`, `onContainerElementResize`) live on [`crate::Host`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, Result};

/// Default window-resize coalescing window in milliseconds.
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u32 = 200;

/// Fallback line height multiplier applied to the body font size when the
/// computed line height is not numeric (e.g. `normal`).
pub const DEFAULT_LINE_HEIGHT_MULTIPLIER: f64 = 1.2;

/// Legacy `wheelDeltaX/Y` fields point the opposite way to `deltaX/Y`.
pub const DEFAULT_LEGACY_WHEEL_SIGN: f64 = -1.0;

/// Default row height in pixels.
pub const DEFAULT_ROW_HEIGHT: f64 = 23.0;

/// Default column width in pixels.
pub const DEFAULT_COLUMN_WIDTH: f64 = 50.0;

/// Overlay settings, decoded from camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub total_rows: u32,
    pub total_columns: u32,
    pub fixed_rows_top: u32,
    pub fixed_rows_bottom: u32,
    pub fixed_columns_start: u32,
    /// Height of the column header band (0 = no column headers)
    pub column_header_height: f64,
    /// Width of the row header band (0 = no row headers)
    pub row_header_width: f64,
    pub default_row_height: f64,
    pub default_column_width: f64,
    /// Per-row height overrides
    pub row_heights: HashMap<u32, f64>,
    /// Per-column width overrides
    pub column_widths: HashMap<u32, f64>,
    /// Cancel native wheel scrolling even when the viewport is the window
    pub prevent_wheel: bool,
    /// Window-resize coalescing window in milliseconds
    pub resize_debounce_ms: u32,
    pub line_height_multiplier: f64,
    pub legacy_wheel_sign: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_rows: 0,
            total_columns: 0,
            fixed_rows_top: 0,
            fixed_rows_bottom: 0,
            fixed_columns_start: 0,
            column_header_height: 0.0,
            row_header_width: 0.0,
            default_row_height: DEFAULT_ROW_HEIGHT,
            default_column_width: DEFAULT_COLUMN_WIDTH,
            row_heights: HashMap::new(),
            column_widths: HashMap::new(),
            prevent_wheel: false,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            line_height_multiplier: DEFAULT_LINE_HEIGHT_MULTIPLIER,
            legacy_wheel_sign: DEFAULT_LEGACY_WHEEL_SIGN,
        }
    }
}

impl Settings {
    /// Decode settings from JSON and validate them.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a value is unusable.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Decode settings from a JS object.
    ///
    /// # Errors
    /// Returns an error if the object does not match the settings shape.
    #[cfg(target_arch = "wasm32")]
    pub fn from_js(value: wasm_bindgen::JsValue) -> Result<Self> {
        let settings: Self = serde_wasm_bindgen::from_value(value)
            .map_err(|e| OverlayError::InvalidSetting(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject sizes that would poison layout math.
    ///
    /// # Errors
    /// Returns [`OverlayError::InvalidSetting`] naming the first bad key.
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("columnHeaderHeight", self.column_header_height),
            ("rowHeaderWidth", self.row_header_width),
            ("defaultRowHeight", self.default_row_height),
            ("defaultColumnWidth", self.default_column_width),
        ];
        for (key, value) in sizes {
            if !value.is_finite() || value < 0.0 {
                return Err(OverlayError::InvalidSetting(format!(
                    "{key} must be a non-negative number, got {value}"
                )));
            }
        }
        if let Some((row, h)) = self
            .row_heights
            .iter()
            .find(|(_, h)| !h.is_finite() || **h < 0.0)
        {
            return Err(OverlayError::InvalidSetting(format!(
                "rowHeights[{row}] must be a non-negative number, got {h}"
            )));
        }
        if let Some((col, w)) = self
            .column_widths
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(OverlayError::InvalidSetting(format!(
                "columnWidths[{col}] must be a non-negative number, got {w}"
            )));
        }
        if !self.line_height_multiplier.is_finite() || self.line_height_multiplier <= 0.0 {
            return Err(OverlayError::InvalidSetting(format!(
                "lineHeightMultiplier must be positive, got {}",
                self.line_height_multiplier
            )));
        }
        if !self.legacy_wheel_sign.is_finite() {
            return Err(OverlayError::InvalidSetting(
                "legacyWheelSign must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the top region (frozen rows or column headers) is rendered.
    pub fn should_render_top(&self) -> bool {
        self.fixed_rows_top > 0 || self.column_header_height > 0.0
    }

    /// Whether the bottom region is rendered.
    pub fn should_render_bottom(&self) -> bool {
        self.fixed_rows_bottom > 0
    }

    /// Whether the leading-edge region (frozen columns or row headers) is rendered.
    pub fn should_render_inline_start(&self) -> bool {
        self.fixed_columns_start > 0 || self.row_header_width > 0.0
    }
}
