//! The DOM boundary of the overlay layer.
//!
//! [`DomAccess`] is everything the synchronizer reads from or writes to the
//! page: the viewport's scroll offset, measurement helpers, the hider size and
//! the clone surfaces of each pane. The wasm32 binding implements it over
//! `web-sys`; [`HeadlessDom`] implements it natively with platform-like
//! clamping so hosts without a browser (and tests) can drive the same logic.

use std::collections::HashMap;

use crate::geometry::{differs, Offset, Size};
use crate::pane::{ClonedSurface, PaneKind};
use crate::wheel::LineHeight;

/// Measurement and mutation surface used by the synchronizer.
pub trait DomAccess {
    /// Current viewport scroll offset (`scrollLeft`, `scrollTop`).
    fn viewport_scroll(&self) -> Offset;
    /// Write `scrollTop`; the platform may clamp the value.
    fn set_viewport_scroll_top(&mut self, top: f64);
    /// Write `scrollLeft`; the platform may clamp the value.
    fn set_viewport_scroll_left(&mut self, left: f64);
    /// Visible client size of the viewport.
    fn viewport_size(&self) -> Size;
    /// Whether the scrollable viewport is the window itself.
    fn viewport_is_window(&self) -> bool;
    /// Window scroll position (`scrollX`, `scrollY`).
    fn window_scroll(&self) -> Offset;

    /// Whether the widget root is still attached to the document.
    fn is_root_attached(&self) -> bool;
    /// Whether the master table is visible (has layout).
    fn is_table_visible(&self) -> bool;
    /// Native scrollbar thickness.
    fn scrollbar_width(&self) -> f64;
    /// Browser default line height, falling back to `font-size × multiplier`.
    fn line_height(&self, multiplier: f64) -> LineHeight;

    /// Client size of the spreader element.
    fn spreader_client_size(&self) -> Size;
    /// Scroll size of the widget root element.
    fn root_scroll_size(&self) -> Size;
    /// Scroll size of the master holder element.
    fn holder_scroll_size(&self) -> Size;
    /// Scroll size of the hider element.
    fn hider_scroll_size(&self) -> Size;
    /// Write the hider's CSS width/height.
    fn set_hider_size(&mut self, size: Size);

    /// Write a pane's cloned holder scroll offset.
    fn set_clone_scroll(&mut self, kind: PaneKind, offset: Offset);
    /// Write position and size of a pane's overlay root.
    fn apply_clone_surface(&mut self, kind: PaneKind, surface: &ClonedSurface);

    /// Stop native resize observation and cancel pending resize timers.
    /// Called once when the synchronizer is torn down.
    fn release_observers(&mut self);
}

/// A native [`DomAccess`] with browser-like clamping and write counters.
#[derive(Debug, Clone)]
pub struct HeadlessDom {
    visible: Size,
    content: Size,
    scroll: Offset,
    window_scroll: Offset,
    viewport_is_window: bool,
    attached: bool,
    table_visible: bool,
    scrollbar_width: f64,
    line_height: Option<f64>,
    font_size: f64,
    spreader: Size,
    hider: Size,
    clone_scroll: HashMap<PaneKind, Offset>,
    surfaces: HashMap<PaneKind, ClonedSurface>,
    viewport_writes: usize,
    hider_writes: usize,
    clone_scroll_writes: usize,
    released: bool,
}

impl HeadlessDom {
    /// A viewport of `visible` size over content of `content` size.
    pub fn new(visible: Size, content: Size) -> Self {
        Self {
            visible,
            content,
            scroll: Offset::ZERO,
            window_scroll: Offset::ZERO,
            viewport_is_window: false,
            attached: true,
            table_visible: true,
            scrollbar_width: 0.0,
            line_height: None,
            font_size: 16.0,
            spreader: content,
            hider: content,
            clone_scroll: HashMap::new(),
            surfaces: HashMap::new(),
            viewport_writes: 0,
            hider_writes: 0,
            clone_scroll_writes: 0,
            released: false,
        }
    }

    fn max_scroll(&self) -> Offset {
        Offset::new(
            (self.content.width - self.visible.width).max(0.0),
            (self.content.height - self.visible.height).max(0.0),
        )
    }

    /// Simulate a user-driven scroll of the viewport (clamped).
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        let max = self.max_scroll();
        self.scroll = Offset::new(x.clamp(0.0, max.x), y.clamp(0.0, max.y));
    }

    /// Resize the visible viewport.
    pub fn resize_viewport(&mut self, visible: Size) {
        self.visible = visible;
        self.scroll_to(self.scroll.x, self.scroll.y);
    }

    pub fn set_window_scroll(&mut self, offset: Offset) {
        self.window_scroll = offset;
    }

    pub fn set_viewport_is_window(&mut self, is_window: bool) {
        self.viewport_is_window = is_window;
    }

    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    pub fn set_table_visible(&mut self, visible: bool) {
        self.table_visible = visible;
    }

    pub fn set_scrollbar_width(&mut self, width: f64) {
        self.scrollbar_width = width;
    }

    /// Computed body line height; `None` behaves like CSS `normal`.
    pub fn set_line_height(&mut self, line_height: Option<f64>, font_size: f64) {
        self.line_height = line_height;
        self.font_size = font_size;
    }

    /// Simulate a structural change of the spreader.
    pub fn set_spreader_size(&mut self, size: Size) {
        self.spreader = size;
    }

    /// Current hider size as last written.
    pub fn hider_size(&self) -> Size {
        self.hider
    }

    /// Last surface applied to a pane's overlay root.
    pub fn surface(&self, kind: PaneKind) -> Option<&ClonedSurface> {
        self.surfaces.get(&kind)
    }

    /// Number of viewport offset writes so far.
    pub fn viewport_writes(&self) -> usize {
        self.viewport_writes
    }

    /// Number of hider size writes so far.
    pub fn hider_writes(&self) -> usize {
        self.hider_writes
    }

    /// Number of clone holder scroll writes so far.
    pub fn clone_scroll_writes(&self) -> usize {
        self.clone_scroll_writes
    }

    /// Scroll offset of a pane's cloned holder as last written.
    pub fn clone_scroll(&self, kind: PaneKind) -> Offset {
        self.clone_scroll.get(&kind).copied().unwrap_or_default()
    }

    /// Whether teardown released the native observers.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl DomAccess for HeadlessDom {
    fn viewport_scroll(&self) -> Offset {
        self.scroll
    }

    fn set_viewport_scroll_top(&mut self, top: f64) {
        self.viewport_writes += 1;
        let max = self.max_scroll();
        self.scroll.y = top.clamp(0.0, max.y);
    }

    fn set_viewport_scroll_left(&mut self, left: f64) {
        self.viewport_writes += 1;
        let max = self.max_scroll();
        self.scroll.x = left.clamp(0.0, max.x);
    }

    fn viewport_size(&self) -> Size {
        self.visible
    }

    fn viewport_is_window(&self) -> bool {
        self.viewport_is_window
    }

    fn window_scroll(&self) -> Offset {
        self.window_scroll
    }

    fn is_root_attached(&self) -> bool {
        self.attached
    }

    fn is_table_visible(&self) -> bool {
        self.table_visible
    }

    fn scrollbar_width(&self) -> f64 {
        self.scrollbar_width
    }

    fn line_height(&self, multiplier: f64) -> LineHeight {
        match self.line_height {
            Some(px) => LineHeight(px),
            None => LineHeight(self.font_size * multiplier),
        }
    }

    fn spreader_client_size(&self) -> Size {
        self.spreader
    }

    fn root_scroll_size(&self) -> Size {
        self.visible
    }

    fn holder_scroll_size(&self) -> Size {
        Size::new(
            self.hider.width.max(self.visible.width),
            self.hider.height.max(self.visible.height),
        )
    }

    fn hider_scroll_size(&self) -> Size {
        self.hider
    }

    fn set_hider_size(&mut self, size: Size) {
        self.hider_writes += 1;
        self.hider = size;
        self.content = size;
        self.scroll_to(self.scroll.x, self.scroll.y);
    }

    fn set_clone_scroll(&mut self, kind: PaneKind, offset: Offset) {
        let current = self.clone_scroll(kind);
        if differs(current.x, offset.x) || differs(current.y, offset.y) {
            self.clone_scroll_writes += 1;
        }
        self.clone_scroll.insert(kind, offset);
    }

    fn apply_clone_surface(&mut self, kind: PaneKind, surface: &ClonedSurface) {
        self.surfaces.insert(kind, *surface);
    }

    fn release_observers(&mut self) {
        self.released = true;
    }
}
