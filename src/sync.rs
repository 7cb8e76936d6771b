//! Scroll synchronization between the master viewport and the frozen panes.
//!
//! The [`Synchronizer`] listens (through an injected [`EventRegistry`]) for
//! scroll, wheel, keyboard, visibility and resize events, copies the
//! viewport's offset into the panes that follow it and asks the host to
//! redraw. The viewport is the only authoritative scroll position; panes
//! are followers and never write to it.
//!
//! Ordering within one pass: pane offset writes, then `Host::draw`, then the
//! post-redraw re-notification of the leading-edge/top panes, then the
//! transient scroll flags are cleared.

use crate::adjuster::LayoutAdjuster;
use crate::debounce::Debouncer;
use crate::dom::DomAccess;
use crate::error::{OverlayError, Result};
use crate::events::{
    EventKind, EventManager, EventOutcome, EventRegistry, EventTarget, ListenerOptions,
    NavigationKey, OverlayEvent,
};
use crate::geometry::{differs, Offset};
use crate::metrics::GridMetrics;
use crate::pane::{PaneKind, Panes};
use crate::resize::ResizeWatcher;
use crate::settings::Settings;
use crate::wheel::{self, LineHeight, WheelInput};

const LOG_TARGET: &str = "xloverlay";

/// The widget hosting the overlays.
pub trait Host {
    /// Redraw the master table; `fast_draw` skips work that only matters
    /// after structural changes.
    fn draw(&mut self, fast_draw: bool);

    /// Debounced window resize.
    fn on_window_resize(&mut self) {}

    /// Container element resized (animation-frame deferred).
    fn on_container_element_resize(&mut self) {}

    /// The leading-edge pane followed a vertical scroll.
    fn on_scroll_vertically(&mut self) {}

    /// The top pane followed a horizontal scroll.
    fn on_scroll_horizontally(&mut self) {}
}

/// Whether overlay-originated input is currently suppressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputState {
    #[default]
    Idle,
    /// An arrow key is held: only scroll events from the master itself sync
    KeyboardNavigation,
}

/// Transient flags of one sync pass, cleared after the redraw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Coordinates the viewport, the panes and the host's redraws.
pub struct Synchronizer<H: Host, D: DomAccess, R: EventRegistry = EventManager> {
    host: H,
    dom: D,
    registry: R,
    settings: Settings,
    metrics: GridMetrics,
    panes: Panes,
    adjuster: LayoutAdjuster,
    scroll_state: ScrollState,
    input_state: InputState,
    /// Viewport offset applied by the previous pass
    last_applied: Offset,
    last_window_scroll: Offset,
    line_height: LineHeight,
    viewport_is_window: bool,
    resize_debounce: Debouncer,
    resize_watcher: ResizeWatcher,
    drawn: bool,
    destroyed: bool,
}

impl<H: Host, D: DomAccess, R: EventRegistry> Synchronizer<H, D, R> {
    /// Build the synchronizer and register its listeners.
    ///
    /// # Errors
    /// Returns an error if `settings` fail validation.
    pub fn new(host: H, dom: D, registry: R, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let metrics = GridMetrics::new(&settings);
        let panes = Panes::new(&settings);
        let line_height = dom.line_height(settings.line_height_multiplier);
        let viewport_is_window = dom.viewport_is_window();
        let last_window_scroll = dom.window_scroll();
        let resize_debounce = Debouncer::new(f64::from(settings.resize_debounce_ms));

        let mut sync = Self {
            host,
            dom,
            registry,
            settings,
            metrics,
            panes,
            adjuster: LayoutAdjuster::new(),
            scroll_state: ScrollState::default(),
            input_state: InputState::default(),
            last_applied: Offset::ZERO,
            last_window_scroll,
            line_height,
            viewport_is_window,
            resize_debounce,
            resize_watcher: ResizeWatcher::new(),
            drawn: false,
            destroyed: false,
        };
        sync.register_listeners();
        tracing::debug!(
            target: LOG_TARGET,
            panes = ?sync.panes.active_kinds(),
            viewport_is_window,
            line_height = line_height.0,
            "overlay synchronizer created"
        );
        Ok(sync)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    pub fn panes(&self) -> &Panes {
        &self.panes
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll_state
    }

    pub fn input_state(&self) -> InputState {
        self.input_state
    }

    pub fn line_height(&self) -> LineHeight {
        self.line_height
    }

    pub fn has_scrollbar_right(&self) -> bool {
        self.adjuster.has_scrollbar_right()
    }

    pub fn has_scrollbar_bottom(&self) -> bool {
        self.adjuster.has_scrollbar_bottom()
    }

    pub fn is_drawn(&self) -> bool {
        self.drawn
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_observing_container(&self) -> bool {
        self.resize_watcher.is_observing()
    }

    /// Listener target of the master scrollable element.
    pub fn viewport_target(&self) -> EventTarget {
        if self.viewport_is_window {
            EventTarget::Window
        } else {
            EventTarget::Viewport
        }
    }

    // ------------------------------------------------------------------
    // Listener lifecycle
    // ------------------------------------------------------------------

    /// Register every listener the synchronizer reacts to.
    pub fn register_listeners(&mut self) {
        let registry = &mut self.registry;
        let plain = ListenerOptions::default();
        registry.add_event_listener(EventTarget::DocumentElement, EventKind::KeyDown, plain);
        registry.add_event_listener(EventTarget::DocumentElement, EventKind::KeyUp, plain);
        registry.add_event_listener(EventTarget::Document, EventKind::VisibilityChange, plain);

        let viewport = if self.viewport_is_window {
            EventTarget::Window
        } else {
            EventTarget::Viewport
        };
        registry.add_event_listener(viewport, EventKind::Scroll, ListenerOptions::PASSIVE);

        // Wheel listeners stay cancelable unless the page scrolls natively
        let wheel_options = ListenerOptions {
            passive: self.viewport_is_window && !self.settings.prevent_wheel,
        };
        registry.add_event_listener(EventTarget::RootElement, EventKind::Wheel, wheel_options);
        for kind in self.panes.active_kinds() {
            registry.add_event_listener(EventTarget::CloneHolder(kind), EventKind::Wheel, wheel_options);
        }

        registry.add_event_listener(EventTarget::Window, EventKind::Resize, plain);

        if !self.viewport_is_window {
            registry.add_event_listener(EventTarget::Container, EventKind::Resize, plain);
            self.resize_watcher.observe();
        }
    }

    /// Remove every listener in the registry context.
    pub fn deregister_listeners(&mut self) {
        self.registry.clear_events(true);
    }

    /// Re-query the viewport (it may have been re-attached or swapped for
    /// the window) and rebind all listeners.
    ///
    /// # Errors
    /// Returns [`OverlayError::Destroyed`] after teardown.
    pub fn update_main_scrollable_element(&mut self) -> Result<()> {
        if self.destroyed {
            return Err(OverlayError::Destroyed);
        }
        self.deregister_listeners();
        self.resize_watcher.disconnect();
        self.viewport_is_window = self.dom.viewport_is_window();
        self.register_listeners();
        tracing::debug!(
            target: LOG_TARGET,
            viewport_is_window = self.viewport_is_window,
            "rebound overlay listeners"
        );
        Ok(())
    }

    /// Replace the settings and re-layout.
    ///
    /// # Errors
    /// Returns an error if the settings fail validation or after teardown.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        if self.destroyed {
            return Err(OverlayError::Destroyed);
        }
        if let Err(e) = settings.validate() {
            tracing::warn!(target: LOG_TARGET, error = %e, "rejected overlay settings");
            return Err(e);
        }
        let rebind = settings.prevent_wheel != self.settings.prevent_wheel;
        self.metrics = GridMetrics::new(&settings);
        self.line_height = self.dom.line_height(settings.line_height_multiplier);
        self.resize_debounce = Debouncer::new(f64::from(settings.resize_debounce_ms));
        self.settings = settings;
        if rebind {
            // Wheel listener passivity depends on prevent_wheel
            self.deregister_listeners();
            self.resize_watcher.disconnect();
            self.register_listeners();
        }
        self.adjuster
            .adjust_elements_size(&self.metrics, &mut self.dom, &mut self.panes, true);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------

    /// Deliver an event that arrived at a listener on `target`.
    ///
    /// Events for targets nothing is listening on (including every event
    /// after [`Synchronizer::destroy`]) are ignored.
    pub fn dispatch(&mut self, target: EventTarget, event: OverlayEvent) -> EventOutcome {
        if self.destroyed || !self.registry.is_listening(target, event.kind()) {
            return EventOutcome::default();
        }
        match event {
            OverlayEvent::Scroll { origin } => {
                self.on_table_scroll(origin);
                EventOutcome::default()
            }
            OverlayEvent::Wheel { origin, input } => self.on_clone_wheel(origin, &input),
            OverlayEvent::KeyDown { key } => {
                self.on_key_down(key);
                EventOutcome::default()
            }
            OverlayEvent::KeyUp | OverlayEvent::VisibilityChange => {
                self.on_key_up();
                EventOutcome::default()
            }
            OverlayEvent::Resize { now_ms } => {
                if target == EventTarget::Container {
                    self.on_container_resize(1);
                } else {
                    self.on_window_resize(now_ms);
                }
                EventOutcome::default()
            }
        }
    }

    /// Whether the element an event came from contains the master viewport.
    /// Clone holders never do.
    fn contains_master(origin: EventTarget) -> bool {
        !matches!(origin, EventTarget::CloneHolder(_))
    }

    fn is_suppressed(&self, origin: EventTarget) -> bool {
        self.input_state == InputState::KeyboardNavigation && !Self::contains_master(origin)
    }

    /// Scroll of the master scrollable element.
    pub fn on_table_scroll(&mut self, origin: EventTarget) {
        if self.destroyed {
            return;
        }
        if self.is_suppressed(origin) {
            tracing::trace!(
                target: LOG_TARGET,
                pane = ?self.panes.parent_pane_of(origin),
                "scroll suppressed during keyboard navigation"
            );
            return;
        }
        self.sync_scroll_positions();
    }

    /// Wheel over the root or a clone holder.
    ///
    /// When the window is the viewport the browser scrolls the page itself,
    /// so the wheel is only cancelled if `prevent_wheel` is set.
    pub fn on_clone_wheel(&mut self, origin: EventTarget, input: &WheelInput) -> EventOutcome {
        if self.destroyed || self.is_suppressed(origin) {
            return EventOutcome::default();
        }
        if self.viewport_is_window {
            return EventOutcome {
                prevent_default: self.settings.prevent_wheel,
            };
        }
        let scrolled = wheel::translate_wheel(
            &mut self.dom,
            input,
            self.line_height,
            self.settings.legacy_wheel_sign,
        );
        EventOutcome {
            prevent_default: self.settings.prevent_wheel || scrolled,
        }
    }

    pub fn on_key_down(&mut self, key: NavigationKey) {
        self.input_state = if key.is_arrow() {
            InputState::KeyboardNavigation
        } else {
            InputState::Idle
        };
    }

    pub fn on_key_up(&mut self) {
        self.input_state = InputState::Idle;
    }

    /// Window resize: restart the debounce window.
    pub fn on_window_resize(&mut self, now_ms: f64) -> u64 {
        self.resize_debounce.trigger(now_ms)
    }

    /// Whether a debounce timer armed for `generation` is still current.
    pub fn is_resize_pending(&self, generation: u64) -> bool {
        self.resize_debounce.is_current(generation)
    }

    /// Advance timers. Fires the debounced window-resize notification.
    pub fn tick(&mut self, now_ms: f64) {
        if self.destroyed {
            return;
        }
        if self.resize_debounce.poll(now_ms) {
            tracing::debug!(target: LOG_TARGET, "window resize settled");
            self.host.on_window_resize();
        }
    }

    /// A container resize batch. Returns true if an animation frame must be
    /// requested.
    pub fn on_container_resize(&mut self, entries: usize) -> bool {
        if self.destroyed {
            return false;
        }
        self.resize_watcher.notify(entries)
    }

    /// Animation-frame boundary.
    pub fn animation_frame(&mut self) {
        if self.destroyed {
            return;
        }
        if self.resize_watcher.take_frame() {
            tracing::debug!(target: LOG_TARGET, "container resized");
            self.host.on_container_element_resize();
        }
    }

    // ------------------------------------------------------------------
    // Sync pass
    // ------------------------------------------------------------------

    /// Offset a reference pane last applied, or the previous pass's viewport
    /// offset when that pane is not rendered.
    fn reference_offset(&self, kind: PaneKind) -> Offset {
        let pane = self.panes.get(kind);
        if pane.is_active() {
            pane.offset()
        } else {
            self.last_applied
        }
    }

    fn write_pane_offset(&mut self, kind: PaneKind, offset: Offset) {
        if self.panes.get_mut(kind).set_offset(offset) {
            self.dom.set_clone_scroll(kind, offset);
        }
    }

    /// Copy the viewport offset into the panes that follow it, without
    /// redrawing.
    fn write_pane_offsets(&mut self, scroll: Offset) {
        if self.scroll_state.horizontal {
            for kind in [PaneKind::Top, PaneKind::Bottom] {
                let current = self.panes.get(kind).offset();
                self.write_pane_offset(kind, Offset::new(scroll.x, current.y));
            }
        }
        if self.scroll_state.vertical {
            let current = self.panes.get(PaneKind::InlineStart).offset();
            self.write_pane_offset(PaneKind::InlineStart, Offset::new(current.x, scroll.y));
        }
        self.last_applied = scroll;
    }

    /// One synchronization pass: detect, write, redraw, re-notify, clear.
    pub fn sync_scroll_positions(&mut self) {
        if self.destroyed {
            return;
        }
        let scroll = self.dom.viewport_scroll();
        let window = self.dom.window_scroll();

        let top = self.reference_offset(PaneKind::Top);
        let inline_start = self.reference_offset(PaneKind::InlineStart);
        self.scroll_state.horizontal =
            differs(top.x, scroll.x) || differs(self.last_window_scroll.x, window.x);
        self.scroll_state.vertical =
            differs(inline_start.y, scroll.y) || differs(self.last_window_scroll.y, window.y);
        self.last_window_scroll = window;

        self.write_pane_offsets(scroll);
        tracing::debug!(
            target: LOG_TARGET,
            x = scroll.x,
            y = scroll.y,
            horizontal = self.scroll_state.horizontal,
            vertical = self.scroll_state.vertical,
            "sync pass"
        );
        self.refresh_all();
    }

    /// Align pane offsets with the viewport after pane states flipped.
    fn sync_scroll_with_master(&mut self) {
        let scroll = self.dom.viewport_scroll();
        self.scroll_state = ScrollState {
            horizontal: true,
            vertical: true,
        };
        self.write_pane_offsets(scroll);
        self.scroll_state = ScrollState::default();
    }

    /// Redraw after a sync pass, then re-notify the following panes.
    pub fn refresh_all(&mut self) {
        if !self.drawn {
            self.scroll_state = ScrollState::default();
            return;
        }
        self.render(true);
        if self.destroyed {
            return;
        }
        if self.scroll_state.vertical {
            self.host.on_scroll_vertically();
        }
        if self.scroll_state.horizontal {
            self.host.on_scroll_horizontally();
        }
        self.scroll_state = ScrollState::default();
    }

    // ------------------------------------------------------------------
    // Render cycle
    // ------------------------------------------------------------------

    /// Re-evaluate which panes render. Returns true if any changed.
    pub fn prepare_overlays(&mut self) -> bool {
        self.panes.update_state_of_rendering(&self.settings)
    }

    /// Resize surfaces if the spreader changed, then redraw pane clones.
    pub fn refresh(&mut self, fast_draw: bool) {
        if self.adjuster.update_last_spreader_size(&self.dom) {
            self.adjust_elements_size(false);
        }
        self.panes.refresh(fast_draw, &self.settings);
    }

    pub fn adjust_elements_size(&mut self, force: bool) {
        self.adjuster
            .adjust_elements_size(&self.metrics, &mut self.dom, &mut self.panes, force);
    }

    /// Push pane geometry to the DOM; skipped while the table is invisible.
    pub fn apply_to_dom(&mut self) {
        if !self.dom.is_table_visible() {
            return;
        }
        self.panes.apply_to_dom(&mut self.dom);
    }

    /// Full redraw: host draw, pane state, pane refresh, DOM application.
    ///
    /// A root detached from the document tears the synchronizer down
    /// instead of drawing.
    pub fn render(&mut self, fast_draw: bool) {
        if self.destroyed {
            return;
        }
        if !self.dom.is_root_attached() {
            tracing::warn!(target: LOG_TARGET, "root detached from document, destroying overlays");
            self.destroy();
            return;
        }
        self.host.draw(fast_draw);
        if self.prepare_overlays() {
            self.sync_scroll_with_master();
            // Clone-holder wheel listeners follow the active pane set
            self.deregister_listeners();
            self.resize_watcher.disconnect();
            self.register_listeners();
        }
        self.refresh(fast_draw);
        self.apply_to_dom();
        self.drawn = true;
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Unregister every listener, disconnect the resize watcher, invalidate
    /// pending timers and destroy the panes. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.registry.clear_events(true);
        self.resize_watcher.disconnect();
        self.dom.release_observers();
        self.resize_debounce.cancel();
        self.panes.destroy();
        self.scroll_state = ScrollState::default();
        self.input_state = InputState::Idle;
        self.destroyed = true;
        tracing::debug!(target: LOG_TARGET, "overlay synchronizer destroyed");
    }
}

impl<H: Host, D: DomAccess> Synchronizer<H, D, EventManager> {
    /// Build with a fresh in-memory [`EventManager`].
    ///
    /// # Errors
    /// Returns an error if `settings` fail validation.
    pub fn with_event_manager(host: H, dom: D, settings: Settings) -> Result<Self> {
        Self::new(host, dom, EventManager::new(), settings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::dom::HeadlessDom;
    use crate::geometry::Size;

    #[derive(Default)]
    struct CountingHost {
        draws: u32,
        vertical: u32,
        horizontal: u32,
    }

    impl Host for CountingHost {
        fn draw(&mut self, _fast_draw: bool) {
            self.draws += 1;
        }

        fn on_scroll_vertically(&mut self) {
            self.vertical += 1;
        }

        fn on_scroll_horizontally(&mut self) {
            self.horizontal += 1;
        }
    }

    fn synchronizer() -> Synchronizer<CountingHost, HeadlessDom> {
        let settings = Settings {
            total_rows: 1000,
            total_columns: 50,
            fixed_rows_top: 1,
            fixed_columns_start: 1,
            ..Settings::default()
        };
        let dom = HeadlessDom::new(Size::new(400.0, 300.0), Size::new(2500.0, 23000.0));
        Synchronizer::with_event_manager(CountingHost::default(), dom, settings).unwrap()
    }

    #[test]
    fn test_scroll_before_first_draw_only_writes_offsets() {
        let mut sync = synchronizer();
        sync.dom_mut().scroll_to(0.0, 120.0);
        sync.dispatch(
            EventTarget::Viewport,
            OverlayEvent::Scroll {
                origin: EventTarget::Viewport,
            },
        );
        assert_eq!(sync.panes().get(PaneKind::InlineStart).offset().y, 120.0);
        assert_eq!(sync.host().draws, 0);
        assert_eq!(sync.scroll_state(), ScrollState::default());
    }

    #[test]
    fn test_sync_pass_order() {
        let mut sync = synchronizer();
        sync.render(false);
        assert_eq!(sync.host().draws, 1);

        sync.dom_mut().scroll_to(30.0, 0.0);
        sync.sync_scroll_positions();
        assert_eq!(sync.host().draws, 2);
        assert_eq!(sync.host().horizontal, 1);
        assert_eq!(sync.host().vertical, 0);
        assert_eq!(sync.scroll_state(), ScrollState::default());
    }

    #[test]
    fn test_key_state_machine() {
        let mut sync = synchronizer();
        sync.on_key_down(NavigationKey::ArrowDown);
        assert_eq!(sync.input_state(), InputState::KeyboardNavigation);
        sync.on_key_down(NavigationKey::Other);
        assert_eq!(sync.input_state(), InputState::Idle);
        sync.on_key_down(NavigationKey::ArrowLeft);
        sync.dispatch(EventTarget::Document, OverlayEvent::VisibilityChange);
        assert_eq!(sync.input_state(), InputState::Idle);
    }

    #[test]
    fn test_update_settings_rejects_invalid() {
        let mut sync = synchronizer();
        let bad = Settings {
            default_row_height: f64::NAN,
            ..Settings::default()
        };
        assert!(sync.update_settings(bad).is_err());
        assert_eq!(sync.settings().total_rows, 1000);
    }

    #[test]
    fn test_rebind_after_destroy_fails() {
        let mut sync = synchronizer();
        sync.destroy();
        assert!(matches!(
            sync.update_main_scrollable_element(),
            Err(OverlayError::Destroyed)
        ));
    }
}
