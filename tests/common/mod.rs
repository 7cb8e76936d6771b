//! Shared fixtures for the synchronizer integration tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use xloverlay::{
    EventManager, EventTarget, HeadlessDom, Host, OverlayEvent, Settings, Size, Synchronizer,
};

/// Host that records every callback.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub draws: u32,
    pub fast_draws: u32,
    pub window_resizes: u32,
    pub container_resizes: u32,
    pub vertical_notifications: u32,
    pub horizontal_notifications: u32,
}

impl Host for RecordingHost {
    fn draw(&mut self, fast_draw: bool) {
        self.draws += 1;
        if fast_draw {
            self.fast_draws += 1;
        }
    }

    fn on_window_resize(&mut self) {
        self.window_resizes += 1;
    }

    fn on_container_element_resize(&mut self) {
        self.container_resizes += 1;
    }

    fn on_scroll_vertically(&mut self) {
        self.vertical_notifications += 1;
    }

    fn on_scroll_horizontally(&mut self) {
        self.horizontal_notifications += 1;
    }
}

pub type TestSync = Synchronizer<RecordingHost, HeadlessDom, EventManager>;

/// 1000 rows x 50 columns of default size, one frozen row and column.
pub fn frozen_settings() -> Settings {
    Settings {
        total_rows: 1000,
        total_columns: 50,
        fixed_rows_top: 1,
        fixed_columns_start: 1,
        ..Settings::default()
    }
}

/// 800x600 viewport over `settings`' full content extent.
pub fn headless_dom(settings: &Settings) -> HeadlessDom {
    let content = Size::new(
        settings.row_header_width + f64::from(settings.total_columns) * settings.default_column_width,
        settings.column_header_height
            + f64::from(settings.total_rows) * settings.default_row_height
            + 1.0,
    );
    HeadlessDom::new(Size::new(800.0, 600.0), content)
}

pub fn synchronizer(settings: Settings) -> TestSync {
    let dom = headless_dom(&settings);
    Synchronizer::with_event_manager(RecordingHost::default(), dom, settings)
        .expect("valid settings")
}

/// A synchronizer that has completed its first full draw.
pub fn drawn_synchronizer(settings: Settings) -> TestSync {
    let mut sync = synchronizer(settings);
    sync.render(false);
    sync
}

/// Scroll the master viewport like a user would and deliver the event.
pub fn user_scroll(sync: &mut TestSync, x: f64, y: f64) {
    sync.dom_mut().scroll_to(x, y);
    let target = sync.viewport_target();
    sync.dispatch(target, OverlayEvent::Scroll { origin: target });
}

pub fn scroll_event(origin: EventTarget) -> OverlayEvent {
    OverlayEvent::Scroll { origin }
}
