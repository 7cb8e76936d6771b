//! Listener registration and the events the synchronizer reacts to.
//!
//! The synchronizer never touches native listener APIs. It registers
//! interest through an [`EventRegistry`] and only reacts to events whose
//! `(target, kind)` pair is currently registered, so teardown is a single
//! `clear_events(true)` call.
//!
//! [`EventManager`] is the default registry. Several managers may share one
//! listener context (see [`EventManager::scoped`]); `clear_events(false)`
//! removes only the calling manager's own listeners.

use std::cell::RefCell;
use std::rc::Rc;

use crate::pane::PaneKind;
use crate::wheel::WheelInput;

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Document,
    DocumentElement,
    /// The master scrollable element (when it is not the window)
    Viewport,
    /// The widget's root element
    RootElement,
    /// The element whose size the resize watcher observes
    Container,
    /// A pane's cloned holder
    CloneHolder(PaneKind),
}

/// The DOM event type a listener is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Wheel,
    KeyDown,
    KeyUp,
    VisibilityChange,
    Resize,
}

impl EventKind {
    /// DOM event name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Wheel => "wheel",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::VisibilityChange => "visibilitychange",
            Self::Resize => "resize",
        }
    }
}

/// Options passed through to `addEventListener`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub passive: bool,
}

impl ListenerOptions {
    pub const PASSIVE: Self = Self { passive: true };
}

/// Opaque handle returned by [`EventRegistry::add_event_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(u32);

/// Keys that matter to the keyboard-navigation guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl NavigationKey {
    /// Map a `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Self {
        match key {
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            _ => Self::Other,
        }
    }

    pub fn is_arrow(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// An event delivered to the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayEvent {
    /// `origin` is the element that actually scrolled (`event.target`)
    Scroll { origin: EventTarget },
    Wheel { origin: EventTarget, input: WheelInput },
    KeyDown { key: NavigationKey },
    KeyUp,
    VisibilityChange,
    /// Window resize, stamped with the current clock in milliseconds
    Resize { now_ms: f64 },
}

impl OverlayEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Scroll { .. } => EventKind::Scroll,
            Self::Wheel { .. } => EventKind::Wheel,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::KeyUp => EventKind::KeyUp,
            Self::VisibilityChange => EventKind::VisibilityChange,
            Self::Resize { .. } => EventKind::Resize,
        }
    }
}

/// What the caller should do with the native event after dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Cancel the browser's default action (`preventDefault`)
    pub prevent_default: bool,
}

/// Listener registration capability injected into the synchronizer.
pub trait EventRegistry {
    fn add_event_listener(
        &mut self,
        target: EventTarget,
        kind: EventKind,
        options: ListenerOptions,
    ) -> ListenerHandle;

    /// Returns false if the handle was not registered.
    fn remove_event_listener(&mut self, handle: ListenerHandle) -> bool;

    /// Remove this registry's listeners, or every listener in the shared
    /// context when `remove_all` is set.
    fn clear_events(&mut self, remove_all: bool);

    fn is_listening(&self, target: EventTarget, kind: EventKind) -> bool;

    /// Number of live listeners visible to this registry.
    fn listener_count(&self) -> usize;
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    handle: ListenerHandle,
    owner: u32,
    target: EventTarget,
    kind: EventKind,
    options: ListenerOptions,
}

#[derive(Debug, Default)]
struct ListenerContext {
    listeners: Vec<Listener>,
    next_handle: u32,
    next_owner: u32,
}

/// In-memory [`EventRegistry`].
#[derive(Debug)]
pub struct EventManager {
    context: Rc<RefCell<ListenerContext>>,
    owner: u32,
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventManager {
    /// A manager with its own fresh listener context.
    pub fn new() -> Self {
        let context = Rc::new(RefCell::new(ListenerContext {
            next_owner: 1,
            ..ListenerContext::default()
        }));
        Self { context, owner: 0 }
    }

    /// A second manager sharing this manager's listener context.
    pub fn scoped(&self) -> Self {
        let owner = {
            let mut ctx = self.context.borrow_mut();
            let owner = ctx.next_owner;
            ctx.next_owner += 1;
            owner
        };
        Self {
            context: Rc::clone(&self.context),
            owner,
        }
    }

    /// Options a live listener was registered with.
    pub fn options(&self, handle: ListenerHandle) -> Option<ListenerOptions> {
        self.context
            .borrow()
            .listeners
            .iter()
            .find(|l| l.handle == handle)
            .map(|l| l.options)
    }

    /// Options of the listener registered for `(target, kind)`, if any.
    pub fn options_for(&self, target: EventTarget, kind: EventKind) -> Option<ListenerOptions> {
        self.context
            .borrow()
            .listeners
            .iter()
            .find(|l| l.target == target && l.kind == kind)
            .map(|l| l.options)
    }

    /// Every live `(target, kind)` registration, in registration order.
    pub fn registrations(&self) -> Vec<(EventTarget, EventKind)> {
        self.context
            .borrow()
            .listeners
            .iter()
            .map(|l| (l.target, l.kind))
            .collect()
    }
}

impl EventRegistry for EventManager {
    fn add_event_listener(
        &mut self,
        target: EventTarget,
        kind: EventKind,
        options: ListenerOptions,
    ) -> ListenerHandle {
        let mut ctx = self.context.borrow_mut();
        let handle = ListenerHandle(ctx.next_handle);
        ctx.next_handle += 1;
        ctx.listeners.push(Listener {
            handle,
            owner: self.owner,
            target,
            kind,
            options,
        });
        handle
    }

    fn remove_event_listener(&mut self, handle: ListenerHandle) -> bool {
        let mut ctx = self.context.borrow_mut();
        let before = ctx.listeners.len();
        ctx.listeners.retain(|l| l.handle != handle);
        ctx.listeners.len() != before
    }

    fn clear_events(&mut self, remove_all: bool) {
        let owner = self.owner;
        let mut ctx = self.context.borrow_mut();
        if remove_all {
            ctx.listeners.clear();
        } else {
            ctx.listeners.retain(|l| l.owner != owner);
        }
    }

    fn is_listening(&self, target: EventTarget, kind: EventKind) -> bool {
        self.context
            .borrow()
            .listeners
            .iter()
            .any(|l| l.target == target && l.kind == kind)
    }

    fn listener_count(&self) -> usize {
        self.context.borrow().listeners.len()
    }
}
