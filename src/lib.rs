//! xloverlay - frozen-pane overlays for virtualized spreadsheet grids
//!
//! Keeps the cloned header and frozen-region panes of a virtualized grid
//! scroll-locked to its master viewport:
//! - Viewport scroll propagated to the top, bottom and leading-edge panes
//! - Wheel input over any pane translated into viewport scrolls
//! - Hider/spreader sizing with scrollbar gutter detection
//! - Debounced window resize and frame-deferred container resize
//! - Headless core (any [`DomAccess`]), browser binding on wasm32
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { XlOverlay } from 'xloverlay';
//! await init();
//! const overlay = new XlOverlay(elements, { fixedRowsTop: 1 }, { draw });
//! overlay.render(false);
//! ```
//!
//! # Usage (Rust, headless)
//!
//! ```
//! use xloverlay::{HeadlessDom, Host, Settings, Size, Synchronizer};
//!
//! struct Table;
//! impl Host for Table {
//!     fn draw(&mut self, _fast_draw: bool) {}
//! }
//!
//! let settings = Settings { total_rows: 100, fixed_rows_top: 1, ..Settings::default() };
//! let dom = HeadlessDom::new(Size::new(400.0, 300.0), Size::new(400.0, 2300.0));
//! let mut sync = Synchronizer::with_event_manager(Table, dom, settings)?;
//! sync.render(false);
//! # Ok::<(), xloverlay::OverlayError>(())
//! ```

pub mod adjuster;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod events;
pub mod geometry;
pub mod metrics;
pub mod pane;
pub mod resize;
pub mod settings;
pub mod sync;
pub mod wheel;

#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use adjuster::LayoutAdjuster;
pub use debounce::Debouncer;
pub use dom::{DomAccess, HeadlessDom};
pub use error::{OverlayError, Result};
pub use events::{
    EventKind, EventManager, EventOutcome, EventRegistry, EventTarget, ListenerHandle,
    ListenerOptions, NavigationKey, OverlayEvent,
};
pub use geometry::{Offset, Size};
pub use metrics::GridMetrics;
pub use pane::{ClonedSurface, Pane, PaneKind, Panes};
pub use resize::ResizeWatcher;
pub use settings::Settings;
pub use sync::{Host, InputState, ScrollState, Synchronizer};
pub use wheel::{DeltaMode, LineHeight, WheelInput};

#[cfg(target_arch = "wasm32")]
pub use web::XlOverlay;

/// Default settings as a JS object, for hosts that merge their own keys in.
///
/// # Errors
/// Returns an error if serialization fails.
#[wasm_bindgen(js_name = defaultSettings)]
pub fn default_settings() -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&Settings::default())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
