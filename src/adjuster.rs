//! Size/layout adjustment of the hider and spreader surfaces.
//!
//! The hider is sized to the full content extent so native scrollbars match
//! the virtual grid. Whether a right or bottom scrollbar gutter must be
//! reserved is decided by comparing the root element's scroll size with the
//! holder's; when one scrollbar's thickness would push the other axis over
//! its boundary, both gutters are reserved.

use crate::dom::DomAccess;
use crate::geometry::{differs, Size};
use crate::metrics::GridMetrics;
use crate::pane::{PaneKind, PaneLayout, Panes};

/// Extra pixel on the hider height for the bottom border of the last row.
const HIDER_BORDER: f64 = 1.0;

/// Tracks spreader size and scrollbar gutters across refreshes.
#[derive(Debug, Clone, Default)]
pub struct LayoutAdjuster {
    spreader_last_size: Option<Size>,
    last_hider_size: Option<Size>,
    has_scrollbar_right: bool,
    has_scrollbar_bottom: bool,
}

impl LayoutAdjuster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_scrollbar_right(&self) -> bool {
        self.has_scrollbar_right
    }

    pub fn has_scrollbar_bottom(&self) -> bool {
        self.has_scrollbar_bottom
    }

    /// Record the spreader's measured size. Returns true when it changed
    /// since the last observation (always true the first time).
    pub fn update_last_spreader_size<D: DomAccess + ?Sized>(&mut self, dom: &D) -> bool {
        let size = dom.spreader_client_size();
        let needs_updating = match self.spreader_last_size {
            Some(last) => differs(last.width, size.width) || differs(last.height, size.height),
            None => true,
        };
        if needs_updating {
            self.spreader_last_size = Some(size);
        }
        needs_updating
    }

    /// Hider size for the given metrics: headers plus every row and column,
    /// summed along the scroll-locked axis of the top and leading panes.
    pub fn hider_size(metrics: &GridMetrics) -> Size {
        let columns = Panes::sum_cell_sizes(PaneKind::InlineStart, metrics, 0, metrics.total_columns);
        let rows = Panes::sum_cell_sizes(PaneKind::Top, metrics, 0, metrics.total_rows);
        Size::new(
            metrics.row_header_width + columns,
            metrics.column_header_height + rows + HIDER_BORDER,
        )
    }

    /// Resize the hider, recompute scrollbar gutters and resize the panes.
    ///
    /// The hider is only written when its size changed, unless `force` is set.
    pub fn adjust_elements_size<D: DomAccess + ?Sized>(
        &mut self,
        metrics: &GridMetrics,
        dom: &mut D,
        panes: &mut Panes,
        force: bool,
    ) {
        let hider = Self::hider_size(metrics);
        let unchanged = self
            .last_hider_size
            .is_some_and(|last| !differs(last.width, hider.width) && !differs(last.height, hider.height));
        if force || !unchanged {
            dom.set_hider_size(hider);
            self.last_hider_size = Some(hider);
        }

        let scrollbar_width = dom.scrollbar_width();
        if scrollbar_width > 0.0 {
            self.detect_scrollbars(dom, scrollbar_width);
        } else {
            self.has_scrollbar_right = false;
            self.has_scrollbar_bottom = false;
        }

        let layout = PaneLayout {
            viewport: dom.viewport_size(),
            scrollbar_width,
            has_scrollbar_right: self.has_scrollbar_right,
            has_scrollbar_bottom: self.has_scrollbar_bottom,
        };
        panes.adjust_elements_size(metrics, &layout, force);
    }

    fn detect_scrollbars<D: DomAccess + ?Sized>(&mut self, dom: &D, scrollbar_width: f64) {
        let root = dom.root_scroll_size();
        let holder = dom.holder_scroll_size();
        let hider = dom.hider_scroll_size();
        let (right, bottom) = scrollbar_flags(root, holder, hider, scrollbar_width);
        self.has_scrollbar_right = right;
        self.has_scrollbar_bottom = bottom;
    }
}

/// Decide `(right, bottom)` scrollbar gutters.
///
/// A gutter is needed on an axis whose holder content exceeds the root. If
/// only one gutter is detected but its thickness would overflow the other
/// axis, that axis gets a gutter too.
pub fn scrollbar_flags(root: Size, holder: Size, hider: Size, scrollbar_width: f64) -> (bool, bool) {
    let mut right = root.height < holder.height;
    let mut bottom = root.width < holder.width;

    if right && hider.width + scrollbar_width > root.width {
        bottom = true;
    } else if bottom && hider.height + scrollbar_width > root.height {
        right = true;
    }
    (right, bottom)
}
