//! Browser binding for the overlay synchronizer (wasm32 only).
//!
//! `XlOverlay` wires a [`Synchronizer`] to real DOM elements: listeners are
//! attached through [`WebEventManager`], measurements and writes go through
//! [`WebDom`], and host callbacks are plain JS functions.
//!
//! ```javascript
//! import init, { XlOverlay } from 'xloverlay';
//! await init();
//! const overlay = new XlOverlay(
//!   { root, holder, hider, spreader, container, viewport,
//!     clones: { top: { root: topRoot, holder: topHolder } } },
//!   { totalRows: 1000, totalColumns: 26, fixedRowsTop: 1 },
//!   { draw: (fast) => table.draw(fast) },
//! );
//! overlay.render(false);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, HtmlElement, KeyboardEvent, ResizeObserver, WheelEvent,
    Window,
};

use crate::dom::DomAccess;
use crate::error::{OverlayError, Result};
use crate::events::{
    EventKind, EventManager, EventRegistry, EventTarget, ListenerHandle, ListenerOptions,
    NavigationKey, OverlayEvent,
};
use crate::geometry::{Offset, Size};
use crate::pane::{ClonedSurface, PaneKind};
use crate::settings::Settings;
use crate::sync::{Host, Synchronizer};
use crate::wheel::{DeltaMode, LineHeight, WheelInput};

const LOG_TARGET: &str = "xloverlay::web";

type SharedSync = Rc<RefCell<Synchronizer<JsHost, WebDom, WebEventManager>>>;
type Dispatch = Rc<dyn Fn(EventTarget, web_sys::Event)>;
type DispatchSlot = Rc<RefCell<Option<Dispatch>>>;

pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

fn get_f64(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|value| value.as_f64())
}

fn set_f64(target: &JsValue, key: &str, value: f64) {
    let _ = Reflect::set(target, &JsValue::from_str(key), &JsValue::from_f64(value));
}

fn px(value: f64) -> String {
    format!("{value}px")
}

fn required_element(source: &JsValue, key: &str) -> Result<HtmlElement> {
    optional_element(source, key)
        .ok_or_else(|| OverlayError::Dom(format!("missing element `{key}`")))
}

fn optional_element(source: &JsValue, key: &str) -> Option<HtmlElement> {
    Reflect::get(source, &JsValue::from_str(key))
        .ok()
        .and_then(|value| value.dyn_into::<HtmlElement>().ok())
}

// ============================================================================
// Elements
// ============================================================================

struct CloneElements {
    root: HtmlElement,
    holder: HtmlElement,
}

/// Every element the binding touches.
struct Elements {
    window: Window,
    document: Document,
    root: HtmlElement,
    holder: HtmlElement,
    hider: HtmlElement,
    spreader: HtmlElement,
    container: Option<HtmlElement>,
    /// Master scrollable element; `None` means the window scrolls
    viewport: RefCell<Option<HtmlElement>>,
    clones: HashMap<PaneKind, CloneElements>,
}

impl Elements {
    fn from_js(source: &JsValue) -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| OverlayError::Dom("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| OverlayError::Dom("no document".into()))?;

        let mut clones = HashMap::new();
        if let Ok(clone_map) = Reflect::get(source, &JsValue::from_str("clones")) {
            for kind in PaneKind::ALL {
                let Ok(entry) = Reflect::get(&clone_map, &JsValue::from_str(kind.name())) else {
                    continue;
                };
                if entry.is_undefined() || entry.is_null() {
                    continue;
                }
                clones.insert(
                    kind,
                    CloneElements {
                        root: required_element(&entry, "root")?,
                        holder: required_element(&entry, "holder")?,
                    },
                );
            }
        }

        Ok(Self {
            root: required_element(source, "root")?,
            holder: required_element(source, "holder")?,
            hider: required_element(source, "hider")?,
            spreader: required_element(source, "spreader")?,
            container: optional_element(source, "container"),
            viewport: RefCell::new(optional_element(source, "viewport")),
            clones,
            window,
            document,
        })
    }

    fn resolve(&self, target: EventTarget) -> Option<web_sys::EventTarget> {
        match target {
            EventTarget::Window => Some(self.window.clone().into()),
            EventTarget::Document => Some(self.document.clone().into()),
            EventTarget::DocumentElement => self.document.document_element().map(Into::into),
            EventTarget::Viewport => Some(match self.viewport.borrow().as_ref() {
                Some(element) => element.clone().into(),
                None => self.window.clone().into(),
            }),
            EventTarget::RootElement => Some(self.root.clone().into()),
            // Observed through ResizeObserver, not a DOM listener
            EventTarget::Container => None,
            EventTarget::CloneHolder(kind) => {
                self.clones.get(&kind).map(|c| c.holder.clone().into())
            }
        }
    }
}

// ============================================================================
// WebDom
// ============================================================================

/// [`DomAccess`] over live elements.
pub struct WebDom {
    elements: Rc<Elements>,
    timers: Rc<RefCell<Timers>>,
    scrollbar_width: f64,
}

impl WebDom {
    fn new(elements: Rc<Elements>, timers: Rc<RefCell<Timers>>) -> Self {
        let scrollbar_width = measure_scrollbar_width(&elements.document);
        Self {
            elements,
            timers,
            scrollbar_width,
        }
    }

    fn clone_holder(&self, kind: PaneKind) -> Option<&HtmlElement> {
        self.elements.clones.get(&kind).map(|c| &c.holder)
    }
}

/// Thickness of a native scrollbar, from an off-screen scratch element.
fn measure_scrollbar_width(document: &Document) -> f64 {
    let Some(body) = document.body() else {
        return 0.0;
    };
    let Some(scratch) = document
        .create_element("div")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return 0.0;
    };
    let style = scratch.style();
    let _ = style.set_property("position", "absolute");
    let _ = style.set_property("top", "-9999px");
    let _ = style.set_property("width", "100px");
    let _ = style.set_property("height", "100px");
    let _ = style.set_property("overflow", "scroll");
    if body.append_child(&scratch).is_err() {
        return 0.0;
    }
    let width = f64::from(scratch.offset_width() - scratch.client_width());
    let _ = body.remove_child(&scratch);
    width.max(0.0)
}

impl DomAccess for WebDom {
    fn viewport_scroll(&self) -> Offset {
        match self.elements.viewport.borrow().as_ref() {
            Some(element) => Offset::new(
                get_f64(element.as_ref(), "scrollLeft").unwrap_or(0.0),
                get_f64(element.as_ref(), "scrollTop").unwrap_or(0.0),
            ),
            None => self.window_scroll(),
        }
    }

    fn set_viewport_scroll_top(&mut self, top: f64) {
        match self.elements.viewport.borrow().as_ref() {
            Some(element) => set_f64(element.as_ref(), "scrollTop", top),
            None => {
                let x = self.elements.window.scroll_x().unwrap_or(0.0);
                self.elements.window.scroll_to_with_x_and_y(x, top);
            }
        }
    }

    fn set_viewport_scroll_left(&mut self, left: f64) {
        match self.elements.viewport.borrow().as_ref() {
            Some(element) => set_f64(element.as_ref(), "scrollLeft", left),
            None => {
                let y = self.elements.window.scroll_y().unwrap_or(0.0);
                self.elements.window.scroll_to_with_x_and_y(left, y);
            }
        }
    }

    fn viewport_size(&self) -> Size {
        match self.elements.viewport.borrow().as_ref() {
            Some(element) => Size::new(
                f64::from(element.client_width()),
                f64::from(element.client_height()),
            ),
            None => {
                let window = &self.elements.window;
                Size::new(
                    window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
                    window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
                )
            }
        }
    }

    fn viewport_is_window(&self) -> bool {
        self.elements.viewport.borrow().is_none()
    }

    fn window_scroll(&self) -> Offset {
        let window = &self.elements.window;
        Offset::new(
            window.scroll_x().unwrap_or(0.0),
            window.scroll_y().unwrap_or(0.0),
        )
    }

    fn is_root_attached(&self) -> bool {
        self.elements.root.is_connected()
    }

    fn is_table_visible(&self) -> bool {
        let holder = &self.elements.holder;
        holder.offset_width() > 0 || holder.offset_height() > 0
    }

    fn scrollbar_width(&self) -> f64 {
        self.scrollbar_width
    }

    fn line_height(&self, multiplier: f64) -> LineHeight {
        let Some(body) = self.elements.document.body() else {
            return LineHeight::default();
        };
        match self.elements.window.get_computed_style(&body) {
            Ok(Some(style)) => {
                let line_height = style.get_property_value("line-height").unwrap_or_default();
                let font_size = style.get_property_value("font-size").unwrap_or_default();
                LineHeight::from_computed(&line_height, &font_size, multiplier)
            }
            _ => LineHeight::default(),
        }
    }

    fn spreader_client_size(&self) -> Size {
        let spreader = &self.elements.spreader;
        Size::new(
            f64::from(spreader.client_width()),
            f64::from(spreader.client_height()),
        )
    }

    fn root_scroll_size(&self) -> Size {
        let root = &self.elements.root;
        Size::new(f64::from(root.scroll_width()), f64::from(root.scroll_height()))
    }

    fn holder_scroll_size(&self) -> Size {
        let holder = &self.elements.holder;
        Size::new(
            f64::from(holder.scroll_width()),
            f64::from(holder.scroll_height()),
        )
    }

    fn hider_scroll_size(&self) -> Size {
        let hider = &self.elements.hider;
        Size::new(f64::from(hider.scroll_width()), f64::from(hider.scroll_height()))
    }

    fn set_hider_size(&mut self, size: Size) {
        let style = self.elements.hider.style();
        let _ = style.set_property("width", &px(size.width));
        let _ = style.set_property("height", &px(size.height));
    }

    fn set_clone_scroll(&mut self, kind: PaneKind, offset: Offset) {
        if let Some(holder) = self.clone_holder(kind) {
            set_f64(holder.as_ref(), "scrollLeft", offset.x);
            set_f64(holder.as_ref(), "scrollTop", offset.y);
        }
    }

    fn apply_clone_surface(&mut self, kind: PaneKind, surface: &ClonedSurface) {
        let Some(clone) = self.elements.clones.get(&kind) else {
            return;
        };
        let style = clone.root.style();
        let _ = style.set_property("left", &px(surface.position.x));
        let _ = style.set_property("top", &px(surface.position.y));
        let _ = style.set_property("width", &px(surface.size.width));
        let _ = style.set_property("height", &px(surface.size.height));
        set_f64(clone.holder.as_ref(), "scrollLeft", surface.scroll.x);
        set_f64(clone.holder.as_ref(), "scrollTop", surface.scroll.y);
    }

    fn release_observers(&mut self) {
        if let Ok(mut timers) = self.timers.try_borrow_mut() {
            timers.release();
        }
    }
}

// ============================================================================
// WebEventManager
// ============================================================================

struct BoundListener {
    handle: ListenerHandle,
    node: web_sys::EventTarget,
    kind: EventKind,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

/// [`EventRegistry`] that attaches real DOM listeners.
///
/// Removed closures are parked in `retired` instead of dropped: removal can
/// happen while one of them is executing.
pub struct WebEventManager {
    inner: EventManager,
    elements: Rc<Elements>,
    slot: DispatchSlot,
    bound: Vec<BoundListener>,
    retired: Vec<Closure<dyn FnMut(web_sys::Event)>>,
}

impl WebEventManager {
    fn new(elements: Rc<Elements>, slot: DispatchSlot) -> Self {
        Self {
            inner: EventManager::new(),
            elements,
            slot,
            bound: Vec::new(),
            retired: Vec::new(),
        }
    }

    /// Drop parked closures. Only call from outside any of them.
    fn drain_retired(&mut self) {
        self.retired.clear();
    }

    fn unbind(&mut self, listener: BoundListener) {
        let _ = listener.node.remove_event_listener_with_callback(
            listener.kind.as_str(),
            listener.closure.as_ref().unchecked_ref(),
        );
        self.retired.push(listener.closure);
    }
}

impl EventRegistry for WebEventManager {
    fn add_event_listener(
        &mut self,
        target: EventTarget,
        kind: EventKind,
        options: ListenerOptions,
    ) -> ListenerHandle {
        let handle = self.inner.add_event_listener(target, kind, options);
        let Some(node) = self.elements.resolve(target) else {
            return handle;
        };

        let slot = Rc::clone(&self.slot);
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let dispatch = slot.borrow().clone();
            if let Some(dispatch) = dispatch {
                dispatch(target, event);
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        let dom_options = AddEventListenerOptions::new();
        dom_options.set_passive(options.passive);
        if let Err(e) = node.add_event_listener_with_callback_and_add_event_listener_options(
            kind.as_str(),
            closure.as_ref().unchecked_ref(),
            &dom_options,
        ) {
            tracing::warn!(target: LOG_TARGET, error = ?e, event = kind.as_str(), "addEventListener failed");
            return handle;
        }
        self.bound.push(BoundListener {
            handle,
            node,
            kind,
            closure,
        });
        handle
    }

    fn remove_event_listener(&mut self, handle: ListenerHandle) -> bool {
        if let Some(pos) = self.bound.iter().position(|l| l.handle == handle) {
            let listener = self.bound.swap_remove(pos);
            self.unbind(listener);
        }
        self.inner.remove_event_listener(handle)
    }

    /// Every DOM listener in `bound` belongs to this manager, so both modes
    /// unbind all of them; `remove_all` only widens the logical clear to the
    /// shared context.
    fn clear_events(&mut self, remove_all: bool) {
        let bound = std::mem::take(&mut self.bound);
        for listener in bound {
            self.unbind(listener);
        }
        self.inner.clear_events(remove_all);
    }

    fn is_listening(&self, target: EventTarget, kind: EventKind) -> bool {
        self.inner.is_listening(target, kind)
    }

    fn listener_count(&self) -> usize {
        self.inner.listener_count()
    }
}

// ============================================================================
// JsHost
// ============================================================================

/// [`Host`] backed by optional JS callbacks.
pub struct JsHost {
    callbacks: JsValue,
}

impl JsHost {
    fn callback(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.callbacks, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
    }

    fn call0(&self, name: &str) {
        if let Some(callback) = self.callback(name) {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                tracing::warn!(target: LOG_TARGET, error = ?e, callback = name, "host callback threw");
            }
        }
    }
}

impl Host for JsHost {
    fn draw(&mut self, fast_draw: bool) {
        if let Some(callback) = self.callback("draw") {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_bool(fast_draw)) {
                tracing::warn!(target: LOG_TARGET, error = ?e, "draw callback threw");
            }
        }
    }

    fn on_window_resize(&mut self) {
        self.call0("onWindowResize");
    }

    fn on_container_element_resize(&mut self) {
        self.call0("onContainerElementResize");
    }

    fn on_scroll_vertically(&mut self) {
        self.call0("onScrollVertically");
    }

    fn on_scroll_horizontally(&mut self) {
        self.call0("onScrollHorizontally");
    }
}

// ============================================================================
// Timers
// ============================================================================

/// Deferred work shared by the binding and [`WebDom`].
///
/// The observer closure stays parked after `release`: teardown can run
/// while it is on the stack.
#[derive(Default)]
struct Timers {
    resize_timer: Option<i32>,
    resize_closure: Option<Closure<dyn FnMut()>>,
    frame_closure: Option<Closure<dyn FnMut()>>,
    resize_observer: Option<ResizeObserver>,
    resize_observer_closure: Option<Closure<dyn FnMut(js_sys::Array)>>,
}

impl Timers {
    /// Disconnect the container observer and clear a pending resize timeout.
    fn release(&mut self) {
        if let Some(observer) = self.resize_observer.take() {
            observer.disconnect();
            tracing::debug!(target: LOG_TARGET, "container ResizeObserver disconnected");
        }
        if let Some(timer_id) = self.resize_timer.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(timer_id);
            }
        }
    }
}

fn wheel_input(event: &WheelEvent) -> WheelInput {
    WheelInput {
        delta_x: event.delta_x(),
        delta_y: event.delta_y(),
        wheel_delta_x: get_f64(event.as_ref(), "wheelDeltaX").unwrap_or(f64::NAN),
        wheel_delta_y: get_f64(event.as_ref(), "wheelDeltaY").unwrap_or(f64::NAN),
        delta_mode: DeltaMode::from_dom(event.delta_mode()),
    }
}

fn overlay_event(target: EventTarget, event: &web_sys::Event) -> Option<OverlayEvent> {
    match event.type_().as_str() {
        "scroll" => Some(OverlayEvent::Scroll { origin: target }),
        "wheel" => event.dyn_ref::<WheelEvent>().map(|wheel| OverlayEvent::Wheel {
            origin: target,
            input: wheel_input(wheel),
        }),
        "keydown" => event.dyn_ref::<KeyboardEvent>().map(|key| OverlayEvent::KeyDown {
            key: NavigationKey::from_key(&key.key()),
        }),
        "keyup" => Some(OverlayEvent::KeyUp),
        "visibilitychange" => Some(OverlayEvent::VisibilityChange),
        "resize" => Some(OverlayEvent::Resize { now_ms: now_ms() }),
        _ => None,
    }
}

fn handle_dom_event(
    sync: &SharedSync,
    timers: &Rc<RefCell<Timers>>,
    target: EventTarget,
    event: &web_sys::Event,
) {
    let Some(overlay_event) = overlay_event(target, event) else {
        return;
    };
    let (outcome, debounce_ms, destroyed) = {
        let Ok(mut s) = sync.try_borrow_mut() else {
            tracing::warn!(target: LOG_TARGET, "event dropped during host callback");
            return;
        };
        s.registry_mut().drain_retired();
        let outcome = s.dispatch(target, overlay_event);
        (outcome, s.settings().resize_debounce_ms, s.is_destroyed())
    };
    if outcome.prevent_default {
        event.prevent_default();
    }
    if !destroyed && matches!(overlay_event, OverlayEvent::Resize { .. }) {
        schedule_resize_timeout(timers, debounce_ms);
    }
}

fn schedule_resize_timeout(timers: &Rc<RefCell<Timers>>, debounce_ms: u32) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let mut t = timers.borrow_mut();
    if let Some(timer_id) = t.resize_timer.take() {
        window.clear_timeout_with_handle(timer_id);
    }
    let Some(callback) = t.resize_closure.as_ref() else {
        return;
    };
    let timeout = i32::try_from(debounce_ms).unwrap_or(i32::MAX);
    if let Ok(id) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        timeout,
    ) {
        t.resize_timer = Some(id);
    }
}

// ============================================================================
// XlOverlay
// ============================================================================

/// Overlay synchronizer bound to a live grid.
#[wasm_bindgen]
pub struct XlOverlay {
    sync: SharedSync,
    elements: Rc<Elements>,
    timers: Rc<RefCell<Timers>>,
}

#[wasm_bindgen]
impl XlOverlay {
    /// Bind to `elements`, decode `settings` and register listeners.
    ///
    /// # Errors
    /// Returns an error if a required element is missing or the settings
    /// are invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(elements: JsValue, settings: JsValue, callbacks: JsValue) -> std::result::Result<XlOverlay, JsValue> {
        console_error_panic_hook::set_once();

        let settings = Settings::from_js(settings)?;
        let elements = Rc::new(Elements::from_js(&elements)?);
        let slot: DispatchSlot = Rc::new(RefCell::new(None));

        let timers = Rc::new(RefCell::new(Timers::default()));
        let dom = WebDom::new(Rc::clone(&elements), Rc::clone(&timers));
        let registry = WebEventManager::new(Rc::clone(&elements), Rc::clone(&slot));
        let host = JsHost { callbacks };
        let sync: SharedSync = Rc::new(RefCell::new(Synchronizer::new(host, dom, registry, settings)?));

        let weak_sync = Rc::downgrade(&sync);
        let weak_timers = Rc::downgrade(&timers);
        let dispatch: Dispatch = Rc::new(move |target, event| {
            if let (Some(sync), Some(timers)) = (weak_sync.upgrade(), weak_timers.upgrade()) {
                handle_dom_event(&sync, &timers, target, &event);
            }
        });
        *slot.borrow_mut() = Some(dispatch);

        {
            let weak_sync = Rc::downgrade(&sync);
            let weak_timers = Rc::downgrade(&timers);
            let resize = Closure::wrap(Box::new(move || {
                if let Some(timers) = weak_timers.upgrade() {
                    timers.borrow_mut().resize_timer = None;
                }
                if let Some(sync) = weak_sync.upgrade() {
                    if let Ok(mut s) = sync.try_borrow_mut() {
                        s.tick(now_ms());
                    }
                }
            }) as Box<dyn FnMut()>);

            let weak_sync = Rc::downgrade(&sync);
            let frame = Closure::wrap(Box::new(move || {
                if let Some(sync) = weak_sync.upgrade() {
                    if let Ok(mut s) = sync.try_borrow_mut() {
                        s.animation_frame();
                    }
                }
            }) as Box<dyn FnMut()>);

            let mut t = timers.borrow_mut();
            t.resize_closure = Some(resize);
            t.frame_closure = Some(frame);
        }

        let overlay = XlOverlay {
            sync,
            elements,
            timers,
        };
        overlay.observe_container();
        Ok(overlay)
    }

    fn observe_container(&self) {
        let Some(container) = self.elements.container.as_ref() else {
            return;
        };
        let weak_sync = Rc::downgrade(&self.sync);
        let weak_timers = Rc::downgrade(&self.timers);
        let closure = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            let (Some(sync), Some(timers)) = (weak_sync.upgrade(), weak_timers.upgrade()) else {
                return;
            };
            let entries = usize::try_from(entries.length()).unwrap_or(usize::MAX);
            let request_frame = match sync.try_borrow_mut() {
                Ok(mut s) => s.on_container_resize(entries),
                Err(_) => false,
            };
            if !request_frame {
                return;
            }
            let Some(window) = web_sys::window() else {
                return;
            };
            let t = timers.borrow();
            if let Some(frame) = t.frame_closure.as_ref() {
                let _ = window.request_animation_frame(frame.as_ref().unchecked_ref());
            }
        }) as Box<dyn FnMut(js_sys::Array)>);

        match ResizeObserver::new(closure.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(container);
                let mut t = self.timers.borrow_mut();
                t.resize_observer = Some(observer);
                t.resize_observer_closure = Some(closure);
            }
            Err(e) => {
                tracing::warn!(target: LOG_TARGET, error = ?e, "ResizeObserver unavailable");
            }
        }
    }

    fn with_sync<T>(&self, f: impl FnOnce(&mut Synchronizer<JsHost, WebDom, WebEventManager>) -> T) -> std::result::Result<T, JsValue> {
        let mut s = self
            .sync
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("overlay is busy (called from a host callback)"))?;
        s.registry_mut().drain_retired();
        Ok(f(&mut s))
    }

    /// Full redraw of the host table and every pane.
    pub fn render(&self, fast_draw: bool) -> std::result::Result<(), JsValue> {
        self.with_sync(|s| s.render(fast_draw))
    }

    /// Re-read the viewport and propagate it to the panes.
    #[wasm_bindgen(js_name = syncScrollPositions)]
    pub fn sync_scroll_positions(&self) -> std::result::Result<(), JsValue> {
        self.with_sync(Synchronizer::sync_scroll_positions)
    }

    #[wasm_bindgen(js_name = adjustElementsSize)]
    pub fn adjust_elements_size(&self, force: bool) -> std::result::Result<(), JsValue> {
        self.with_sync(|s| s.adjust_elements_size(force))
    }

    /// Replace the settings.
    ///
    /// # Errors
    /// Returns an error if the settings are invalid.
    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&self, settings: JsValue) -> std::result::Result<(), JsValue> {
        let settings = Settings::from_js(settings)?;
        self.with_sync(|s| s.update_settings(settings))?
            .map_err(JsValue::from)
    }

    /// Swap the master scrollable element (`null` for the window) and
    /// rebind listeners.
    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&self, viewport: Option<HtmlElement>) -> std::result::Result<(), JsValue> {
        {
            let _busy = self
                .sync
                .try_borrow()
                .map_err(|_| JsValue::from_str("overlay is busy (called from a host callback)"))?;
            *self.elements.viewport.borrow_mut() = viewport;
        }
        self.with_sync(Synchronizer::update_main_scrollable_element)?
            .map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = hasScrollbarRight)]
    pub fn has_scrollbar_right(&self) -> bool {
        self.sync.try_borrow().is_ok_and(|s| s.has_scrollbar_right())
    }

    #[wasm_bindgen(js_name = hasScrollbarBottom)]
    pub fn has_scrollbar_bottom(&self) -> bool {
        self.sync.try_borrow().is_ok_and(|s| s.has_scrollbar_bottom())
    }

    #[wasm_bindgen(js_name = isDestroyed)]
    pub fn is_destroyed(&self) -> bool {
        self.sync.try_borrow().is_ok_and(|s| s.is_destroyed())
    }

    /// Whether a native ResizeObserver is watching the container.
    #[wasm_bindgen(js_name = isObservingContainer)]
    pub fn is_observing_container(&self) -> bool {
        self.timers
            .try_borrow()
            .is_ok_and(|t| t.resize_observer.is_some())
    }

    /// Remove every listener and stop observing. Idempotent.
    pub fn destroy(&mut self) {
        if let Ok(mut s) = self.sync.try_borrow_mut() {
            s.destroy();
            s.registry_mut().drain_retired();
        }
        if let Ok(mut t) = self.timers.try_borrow_mut() {
            t.release();
            drop(t.resize_observer_closure.take());
        }
    }
}

impl Drop for XlOverlay {
    fn drop(&mut self) {
        self.destroy();
    }
}
