//! Scroll synchronization tests
//!
//! Drives the synchronizer through its event entry point against a headless
//! DOM and checks pane offsets, redraw ordering, keyboard suppression,
//! debouncing and teardown.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{drawn_synchronizer, frozen_settings, scroll_event, synchronizer, user_scroll};
use xloverlay::{
    DomAccess, EventKind, EventRegistry, EventTarget, InputState, NavigationKey, Offset,
    OverlayEvent, PaneKind, ScrollState, Settings, WheelInput,
};

// ============================================================================
// Offset propagation
// ============================================================================

#[test]
fn test_scroll_propagates_to_following_panes() {
    let mut sync = drawn_synchronizer(frozen_settings());
    user_scroll(&mut sync, 120.0, 460.0);

    assert_eq!(sync.panes().get(PaneKind::Top).offset().x, 120.0);
    assert_eq!(sync.panes().get(PaneKind::InlineStart).offset().y, 460.0);
    assert_eq!(sync.dom().clone_scroll(PaneKind::Top).x, 120.0);
    assert_eq!(sync.dom().clone_scroll(PaneKind::InlineStart).y, 460.0);
}

#[test]
fn test_panes_follow_only_their_axis() {
    let mut sync = drawn_synchronizer(frozen_settings());
    user_scroll(&mut sync, 0.0, 230.0);

    assert_eq!(sync.panes().get(PaneKind::Top).offset(), Offset::ZERO);
    assert_eq!(sync.panes().get(PaneKind::InlineStart).offset().y, 230.0);
}

#[test]
fn test_fractional_offsets_preserved() {
    let mut sync = drawn_synchronizer(frozen_settings());
    user_scroll(&mut sync, 10.5, 33.25);

    assert_eq!(sync.panes().get(PaneKind::Top).offset().x, 10.5);
    assert_eq!(sync.panes().get(PaneKind::InlineStart).offset().y, 33.25);
}

#[test]
fn test_sync_never_writes_viewport() {
    let mut sync = drawn_synchronizer(frozen_settings());
    user_scroll(&mut sync, 300.0, 900.0);
    user_scroll(&mut sync, 10.0, 20.0);
    assert_eq!(sync.dom().viewport_writes(), 0);
}

#[test]
fn test_inactive_bottom_pane_untouched() {
    let mut sync = drawn_synchronizer(frozen_settings());
    user_scroll(&mut sync, 200.0, 0.0);
    assert!(!sync.panes().is_active(PaneKind::Bottom));
    assert_eq!(sync.panes().get(PaneKind::Bottom).offset(), Offset::ZERO);
    assert_eq!(sync.dom().clone_scroll(PaneKind::Bottom), Offset::ZERO);
}

#[test]
fn test_bottom_pane_follows_horizontal_scroll() {
    let settings = Settings {
        fixed_rows_bottom: 2,
        ..frozen_settings()
    };
    let mut sync = drawn_synchronizer(settings);
    user_scroll(&mut sync, 75.0, 0.0);
    assert_eq!(sync.panes().get(PaneKind::Bottom).offset().x, 75.0);
    assert_eq!(sync.panes().get(PaneKind::Top).offset().x, 75.0);
}

// ============================================================================
// Redraw ordering
// ============================================================================

#[test]
fn test_redraw_then_notify_then_clear() {
    let mut sync = drawn_synchronizer(frozen_settings());
    assert_eq!(sync.host().draws, 1);

    user_scroll(&mut sync, 120.0, 460.0);
    let host = sync.host();
    assert_eq!(host.draws, 2);
    assert_eq!(host.fast_draws, 1);
    assert_eq!(host.vertical_notifications, 1);
    assert_eq!(host.horizontal_notifications, 1);
    assert_eq!(sync.scroll_state(), ScrollState::default());
}

#[test]
fn test_vertical_only_notification() {
    let mut sync = drawn_synchronizer(frozen_settings());
    user_scroll(&mut sync, 0.0, 46.0);
    assert_eq!(sync.host().vertical_notifications, 1);
    assert_eq!(sync.host().horizontal_notifications, 0);
}

#[test]
fn test_no_draw_before_first_render() {
    let mut sync = synchronizer(frozen_settings());
    user_scroll(&mut sync, 0.0, 46.0);
    assert_eq!(sync.host().draws, 0);
    assert_eq!(sync.host().vertical_notifications, 0);
    assert_eq!(sync.panes().get(PaneKind::InlineStart).offset().y, 46.0);
}

#[test]
fn test_window_scroll_marks_vertical() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.dom_mut().set_window_scroll(Offset::new(0.0, 50.0));
    user_scroll(&mut sync, 0.0, 0.0);
    assert_eq!(sync.host().vertical_notifications, 1);
    assert_eq!(sync.host().horizontal_notifications, 0);
}

// ============================================================================
// Keyboard navigation guard
// ============================================================================

#[test]
fn test_clone_scroll_suppressed_during_arrow_navigation() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.dispatch(
        EventTarget::DocumentElement,
        OverlayEvent::KeyDown {
            key: NavigationKey::ArrowDown,
        },
    );
    assert_eq!(sync.input_state(), InputState::KeyboardNavigation);

    sync.dom_mut().scroll_to(0.0, 92.0);
    sync.dispatch(
        EventTarget::Viewport,
        scroll_event(EventTarget::CloneHolder(PaneKind::InlineStart)),
    );
    assert_eq!(sync.host().draws, 1);
    assert_eq!(sync.panes().get(PaneKind::InlineStart).offset().y, 0.0);
}

#[test]
fn test_master_scroll_still_syncs_during_arrow_navigation() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.on_key_down(NavigationKey::ArrowRight);
    user_scroll(&mut sync, 50.0, 0.0);
    assert_eq!(sync.host().draws, 2);
    assert_eq!(sync.panes().get(PaneKind::Top).offset().x, 50.0);
}

#[test]
fn test_clone_holders_have_no_scroll_listener() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.dom_mut().scroll_to(0.0, 92.0);
    let target = EventTarget::CloneHolder(PaneKind::Top);
    sync.dispatch(target, scroll_event(target));
    assert_eq!(sync.host().draws, 1);
}

#[test]
fn test_key_up_releases_guard() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.on_key_down(NavigationKey::ArrowUp);
    sync.dispatch(EventTarget::DocumentElement, OverlayEvent::KeyUp);
    assert_eq!(sync.input_state(), InputState::Idle);

    sync.dom_mut().scroll_to(0.0, 92.0);
    sync.dispatch(
        EventTarget::Viewport,
        scroll_event(EventTarget::CloneHolder(PaneKind::InlineStart)),
    );
    assert_eq!(sync.panes().get(PaneKind::InlineStart).offset().y, 92.0);
}

#[test]
fn test_non_arrow_key_keeps_idle() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.dispatch(
        EventTarget::DocumentElement,
        OverlayEvent::KeyDown {
            key: NavigationKey::from_key("Enter"),
        },
    );
    assert_eq!(sync.input_state(), InputState::Idle);
}

// ============================================================================
// Wheel
// ============================================================================

#[test]
fn test_wheel_over_root_scrolls_viewport_and_cancels() {
    let mut sync = drawn_synchronizer(frozen_settings());
    let outcome = sync.dispatch(
        EventTarget::RootElement,
        OverlayEvent::Wheel {
            origin: EventTarget::RootElement,
            input: WheelInput::pixels(0.0, 100.0),
        },
    );
    assert!(outcome.prevent_default);
    assert_eq!(sync.dom().viewport_scroll().y, 100.0);
}

#[test]
fn test_wheel_over_clone_holder() {
    let mut sync = drawn_synchronizer(frozen_settings());
    let target = EventTarget::CloneHolder(PaneKind::Top);
    let outcome = sync.dispatch(
        target,
        OverlayEvent::Wheel {
            origin: target,
            input: WheelInput::pixels(40.0, 0.0),
        },
    );
    assert!(outcome.prevent_default);
    assert_eq!(sync.dom().viewport_scroll().x, 40.0);
}

#[test]
fn test_wheel_at_boundary_not_cancelled() {
    let mut sync = drawn_synchronizer(frozen_settings());
    let outcome = sync.dispatch(
        EventTarget::RootElement,
        OverlayEvent::Wheel {
            origin: EventTarget::RootElement,
            input: WheelInput::pixels(0.0, -30.0),
        },
    );
    assert!(!outcome.prevent_default);
    assert_eq!(sync.dom().viewport_writes(), 1);
}

#[test]
fn test_wheel_with_window_viewport_passes_through() {
    let settings = frozen_settings();
    let mut dom = common::headless_dom(&settings);
    dom.set_viewport_is_window(true);
    let mut sync =
        xloverlay::Synchronizer::with_event_manager(common::RecordingHost::default(), dom, settings)
            .unwrap();
    let outcome = sync.dispatch(
        EventTarget::RootElement,
        OverlayEvent::Wheel {
            origin: EventTarget::RootElement,
            input: WheelInput::pixels(0.0, 100.0),
        },
    );
    assert!(!outcome.prevent_default);
    assert_eq!(sync.dom().viewport_scroll().y, 0.0);
}

#[test]
fn test_prevent_wheel_with_window_viewport_registers_cancelable_wheel() {
    let settings = Settings {
        prevent_wheel: true,
        ..frozen_settings()
    };
    let mut dom = common::headless_dom(&settings);
    dom.set_viewport_is_window(true);
    let sync =
        xloverlay::Synchronizer::with_event_manager(common::RecordingHost::default(), dom, settings)
            .unwrap();
    let registry = sync.registry();
    assert!(
        !registry
            .options_for(EventTarget::RootElement, EventKind::Wheel)
            .unwrap()
            .passive
    );
    assert!(
        !registry
            .options_for(EventTarget::CloneHolder(PaneKind::Top), EventKind::Wheel)
            .unwrap()
            .passive
    );
}

#[test]
fn test_toggling_prevent_wheel_rebinds_wheel_listeners() {
    let settings = frozen_settings();
    let mut dom = common::headless_dom(&settings);
    dom.set_viewport_is_window(true);
    let mut sync =
        xloverlay::Synchronizer::with_event_manager(common::RecordingHost::default(), dom, settings)
            .unwrap();
    sync.update_settings(Settings {
        prevent_wheel: true,
        ..frozen_settings()
    })
    .unwrap();
    let options = sync
        .registry()
        .options_for(EventTarget::RootElement, EventKind::Wheel)
        .unwrap();
    assert!(!options.passive);
    assert!(sync.registry().is_listening(EventTarget::Window, EventKind::Scroll));
}

#[test]
fn test_prevent_wheel_setting_always_cancels() {
    let settings = Settings {
        prevent_wheel: true,
        ..frozen_settings()
    };
    let mut dom = common::headless_dom(&settings);
    dom.set_viewport_is_window(true);
    let mut sync =
        xloverlay::Synchronizer::with_event_manager(common::RecordingHost::default(), dom, settings)
            .unwrap();
    let outcome = sync.dispatch(
        EventTarget::RootElement,
        OverlayEvent::Wheel {
            origin: EventTarget::RootElement,
            input: WheelInput::pixels(0.0, 0.0),
        },
    );
    assert!(outcome.prevent_default);
}

#[test]
fn test_wheel_suppressed_over_clone_during_navigation() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.on_key_down(NavigationKey::ArrowDown);
    let target = EventTarget::CloneHolder(PaneKind::InlineStart);
    let outcome = sync.dispatch(
        target,
        OverlayEvent::Wheel {
            origin: target,
            input: WheelInput::pixels(0.0, 100.0),
        },
    );
    assert!(!outcome.prevent_default);
    assert_eq!(sync.dom().viewport_scroll().y, 0.0);
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn test_window_resize_burst_fires_once() {
    let mut sync = drawn_synchronizer(frozen_settings());
    for i in 0..10 {
        sync.dispatch(
            EventTarget::Window,
            OverlayEvent::Resize {
                now_ms: f64::from(i) * 5.0,
            },
        );
    }
    sync.tick(100.0);
    assert_eq!(sync.host().window_resizes, 0);
    sync.tick(245.0);
    assert_eq!(sync.host().window_resizes, 1);
    sync.tick(2000.0);
    assert_eq!(sync.host().window_resizes, 1);
}

#[test]
fn test_resize_debounce_window_configurable() {
    let settings = Settings {
        resize_debounce_ms: 50,
        ..frozen_settings()
    };
    let mut sync = drawn_synchronizer(settings);
    sync.on_window_resize(0.0);
    sync.tick(50.0);
    assert_eq!(sync.host().window_resizes, 1);
}

#[test]
fn test_container_resize_deferred_to_frame() {
    let mut sync = drawn_synchronizer(frozen_settings());
    assert!(sync.is_observing_container());
    assert!(sync.on_container_resize(3));
    assert!(!sync.on_container_resize(1));
    assert_eq!(sync.host().container_resizes, 0);

    sync.animation_frame();
    assert_eq!(sync.host().container_resizes, 1);
    sync.animation_frame();
    assert_eq!(sync.host().container_resizes, 1);
}

#[test]
fn test_empty_container_batch_ignored() {
    let mut sync = drawn_synchronizer(frozen_settings());
    assert!(!sync.on_container_resize(0));
    sync.animation_frame();
    assert_eq!(sync.host().container_resizes, 0);
}

#[test]
fn test_container_resize_via_dispatch() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.dispatch(EventTarget::Container, OverlayEvent::Resize { now_ms: 0.0 });
    sync.animation_frame();
    assert_eq!(sync.host().container_resizes, 1);
    sync.tick(1000.0);
    assert_eq!(sync.host().window_resizes, 0);
}

// ============================================================================
// Listener plan and rebinding
// ============================================================================

#[test]
fn test_listener_plan_for_element_viewport() {
    let sync = synchronizer(frozen_settings());
    let registry = sync.registry();

    assert!(registry.is_listening(EventTarget::DocumentElement, EventKind::KeyDown));
    assert!(registry.is_listening(EventTarget::DocumentElement, EventKind::KeyUp));
    assert!(registry.is_listening(EventTarget::Document, EventKind::VisibilityChange));
    assert!(registry.is_listening(EventTarget::Viewport, EventKind::Scroll));
    assert!(registry.is_listening(EventTarget::Window, EventKind::Resize));
    assert!(registry.is_listening(EventTarget::Container, EventKind::Resize));

    let scroll = registry
        .options_for(EventTarget::Viewport, EventKind::Scroll)
        .unwrap();
    assert!(scroll.passive);
    let wheel = registry
        .options_for(EventTarget::RootElement, EventKind::Wheel)
        .unwrap();
    assert!(!wheel.passive);

    for kind in [PaneKind::Top, PaneKind::InlineStart, PaneKind::TopInlineStartCorner] {
        assert!(registry.is_listening(EventTarget::CloneHolder(kind), EventKind::Wheel));
    }
    assert!(!registry.is_listening(EventTarget::CloneHolder(PaneKind::Bottom), EventKind::Wheel));
}

#[test]
fn test_listener_plan_for_window_viewport() {
    let settings = frozen_settings();
    let mut dom = common::headless_dom(&settings);
    dom.set_viewport_is_window(true);
    let sync =
        xloverlay::Synchronizer::with_event_manager(common::RecordingHost::default(), dom, settings)
            .unwrap();
    let registry = sync.registry();

    assert!(registry.is_listening(EventTarget::Window, EventKind::Scroll));
    assert!(!registry.is_listening(EventTarget::Viewport, EventKind::Scroll));
    assert!(!registry.is_listening(EventTarget::Container, EventKind::Resize));
    assert!(!sync.is_observing_container());
    assert!(
        registry
            .options_for(EventTarget::RootElement, EventKind::Wheel)
            .unwrap()
            .passive
    );
}

#[test]
fn test_rebind_follows_new_viewport() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.dom_mut().set_viewport_is_window(true);
    sync.update_main_scrollable_element().unwrap();

    assert_eq!(sync.viewport_target(), EventTarget::Window);
    assert!(sync.registry().is_listening(EventTarget::Window, EventKind::Scroll));
    assert!(!sync.registry().is_listening(EventTarget::Viewport, EventKind::Scroll));
    assert!(!sync.is_observing_container());
}

#[test]
fn test_deactivated_pane_loses_wheel_listener() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.update_settings(Settings {
        fixed_rows_top: 0,
        ..frozen_settings()
    })
    .unwrap();
    sync.render(false);

    assert!(!sync.panes().is_active(PaneKind::Top));
    assert!(!sync.panes().is_active(PaneKind::TopInlineStartCorner));
    assert!(!sync
        .registry()
        .is_listening(EventTarget::CloneHolder(PaneKind::Top), EventKind::Wheel));
    assert!(sync
        .registry()
        .is_listening(EventTarget::CloneHolder(PaneKind::InlineStart), EventKind::Wheel));
}

#[test]
fn test_activated_pane_aligned_with_viewport() {
    let mut sync = drawn_synchronizer(Settings {
        fixed_rows_top: 0,
        ..frozen_settings()
    });
    user_scroll(&mut sync, 64.0, 0.0);
    sync.update_settings(frozen_settings()).unwrap();
    sync.render(false);

    assert!(sync.panes().is_active(PaneKind::Top));
    assert_eq!(sync.panes().get(PaneKind::Top).offset().x, 64.0);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn test_destroy_stops_everything() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.on_window_resize(0.0);
    sync.on_container_resize(1);
    sync.destroy();

    assert!(sync.is_destroyed());
    assert_eq!(sync.registry().listener_count(), 0);

    user_scroll(&mut sync, 100.0, 100.0);
    sync.render(false);
    sync.tick(1000.0);
    sync.animation_frame();
    let host = sync.host();
    assert_eq!(host.draws, 1);
    assert_eq!(host.window_resizes, 0);
    assert_eq!(host.container_resizes, 0);
    assert_eq!(sync.dom().clone_scroll(PaneKind::Top), Offset::ZERO);

    sync.destroy();
    assert!(sync.is_destroyed());
}

#[test]
fn test_detached_root_self_destroys() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.dom_mut().set_attached(false);
    user_scroll(&mut sync, 0.0, 200.0);

    assert!(sync.is_destroyed());
    assert_eq!(sync.host().draws, 1);
    assert_eq!(sync.host().vertical_notifications, 0);
    assert_eq!(sync.registry().listener_count(), 0);
    assert!(!sync.is_observing_container());
    assert!(sync.dom().is_released());
}

#[test]
fn test_settings_rejected_after_destroy() {
    let mut sync = drawn_synchronizer(frozen_settings());
    sync.destroy();
    assert!(sync.update_settings(frozen_settings()).is_err());
}
