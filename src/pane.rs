//! Frozen-region panes.
//!
//! Each pane owns a cloned rendering surface that mirrors a sub-rectangle of
//! the master table. [`Panes`] is the single owner of all five records;
//! corner panes never hold handles to the edge panes, they name them by
//! [`PaneKind`] and derive their surface from them after the edges are laid
//! out.

use serde::{Deserialize, Serialize};

use crate::dom::DomAccess;
use crate::events::EventTarget;
use crate::geometry::{differs, Offset, Size};
use crate::metrics::GridMetrics;
use crate::settings::Settings;

/// Region tag of a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaneKind {
    Top,
    Bottom,
    /// Frozen columns on the leading edge (left in LTR layouts)
    InlineStart,
    TopInlineStartCorner,
    BottomInlineStartCorner,
}

impl PaneKind {
    pub const ALL: [Self; 5] = [
        Self::Top,
        Self::Bottom,
        Self::InlineStart,
        Self::TopInlineStartCorner,
        Self::BottomInlineStartCorner,
    ];

    /// Refresh order: edges first, corners last.
    const REFRESH_ORDER: [Self; 5] = [
        Self::Bottom,
        Self::InlineStart,
        Self::Top,
        Self::TopInlineStartCorner,
        Self::BottomInlineStartCorner,
    ];

    /// The `(vertical-band, horizontal-band)` edge panes a corner derives from.
    pub fn parents(self) -> Option<(Self, Self)> {
        match self {
            Self::TopInlineStartCorner => Some((Self::Top, Self::InlineStart)),
            Self::BottomInlineStartCorner => Some((Self::Bottom, Self::InlineStart)),
            _ => None,
        }
    }

    pub fn is_corner(self) -> bool {
        self.parents().is_some()
    }

    /// camelCase name used by the JS binding.
    pub fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::InlineStart => "inlineStart",
            Self::TopInlineStartCorner => "topInlineStartCorner",
            Self::BottomInlineStartCorner => "bottomInlineStartCorner",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Plain-data state of a pane's cloned surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClonedSurface {
    /// Scroll offset of the cloned holder
    pub scroll: Offset,
    /// Position of the overlay root relative to the widget root
    pub position: Offset,
    pub size: Size,
    /// Number of clone draws so far
    pub draws: u32,
    pub last_fast_draw: bool,
}

/// Inputs for sizing pane surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaneLayout {
    pub viewport: Size,
    pub scrollbar_width: f64,
    pub has_scrollbar_right: bool,
    pub has_scrollbar_bottom: bool,
}

impl PaneLayout {
    fn gutter_right(&self) -> f64 {
        if self.has_scrollbar_right {
            self.scrollbar_width
        } else {
            0.0
        }
    }

    fn gutter_bottom(&self) -> f64 {
        if self.has_scrollbar_bottom {
            self.scrollbar_width
        } else {
            0.0
        }
    }
}

/// One frozen region.
#[derive(Debug, Clone)]
pub struct Pane {
    kind: PaneKind,
    /// "needs full render"
    active: bool,
    surface: ClonedSurface,
}

impl Pane {
    fn new(kind: PaneKind, active: bool) -> Self {
        Self {
            kind,
            active,
            surface: ClonedSurface::default(),
        }
    }

    pub fn kind(&self) -> PaneKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn surface(&self) -> &ClonedSurface {
        &self.surface
    }

    /// Scroll offset of the cloned holder (zero while inactive).
    pub fn offset(&self) -> Offset {
        if self.active {
            self.surface.scroll
        } else {
            Offset::ZERO
        }
    }

    /// Update the cloned holder's offset. Returns true if it changed.
    pub fn set_offset(&mut self, offset: Offset) -> bool {
        if !self.active {
            return false;
        }
        let current = self.surface.scroll;
        if !differs(current.x, offset.x) && !differs(current.y, offset.y) {
            return false;
        }
        self.surface.scroll = offset;
        true
    }

    /// Adopt the next render state. Returns true if it flipped.
    pub fn update_state_of_rendering(&mut self, should_render: bool) -> bool {
        let changed = self.active != should_render;
        self.active = should_render;
        if changed && !should_render {
            self.reset();
        }
        changed
    }

    /// Redraw the clone, then adopt `next_should_render` for the next cycle.
    pub fn refresh(&mut self, fast_draw: bool, next_should_render: bool) {
        if !self.active {
            return;
        }
        self.surface.draws = self.surface.draws.saturating_add(1);
        self.surface.last_fast_draw = fast_draw;
        if !next_should_render {
            self.active = false;
            self.reset();
        }
    }

    /// Resize the overlay root. Inactive panes only resize when forced.
    pub fn adjust_elements_size(&mut self, position: Offset, size: Size, force: bool) {
        if self.active || force {
            self.surface.position = position;
            self.surface.size = size;
        }
    }

    /// Push the surface geometry to the DOM.
    pub fn apply_to_dom<D: DomAccess + ?Sized>(&self, dom: &mut D) {
        if self.active {
            dom.apply_clone_surface(self.kind, &self.surface);
        }
    }

    /// Take over a corner's geometry from its two edge panes.
    fn derive_from(&mut self, band: &ClonedSurface, inline_start: &ClonedSurface) {
        if !self.active {
            return;
        }
        self.surface.position = Offset::new(inline_start.position.x, band.position.y);
        self.surface.size = Size::new(inline_start.size.width, band.size.height);
    }

    fn reset(&mut self) {
        let draws = self.surface.draws;
        self.surface = ClonedSurface {
            draws,
            ..ClonedSurface::default()
        };
    }

    pub fn destroy(&mut self) {
        self.active = false;
        self.reset();
    }
}

/// Owning collection of every pane, indexed by [`PaneKind`].
#[derive(Debug, Clone)]
pub struct Panes {
    top: Pane,
    bottom: Pane,
    inline_start: Pane,
    top_inline_start_corner: Pane,
    bottom_inline_start_corner: Pane,
}

impl Panes {
    pub fn new(settings: &Settings) -> Self {
        let pane = |kind| Pane::new(kind, Self::should_render(kind, settings));
        Self {
            top: pane(PaneKind::Top),
            bottom: pane(PaneKind::Bottom),
            inline_start: pane(PaneKind::InlineStart),
            top_inline_start_corner: pane(PaneKind::TopInlineStartCorner),
            bottom_inline_start_corner: pane(PaneKind::BottomInlineStartCorner),
        }
    }

    fn all_mut(&mut self) -> [&mut Pane; 5] {
        [
            &mut self.top,
            &mut self.bottom,
            &mut self.inline_start,
            &mut self.top_inline_start_corner,
            &mut self.bottom_inline_start_corner,
        ]
    }

    /// Whether `kind` should be rendered under `settings`. Corners need both
    /// adjacent edges.
    pub fn should_render(kind: PaneKind, settings: &Settings) -> bool {
        match kind {
            PaneKind::Top => settings.should_render_top(),
            PaneKind::Bottom => settings.should_render_bottom(),
            PaneKind::InlineStart => settings.should_render_inline_start(),
            PaneKind::TopInlineStartCorner | PaneKind::BottomInlineStartCorner => kind
                .parents()
                .is_some_and(|(band, inline_start)| {
                    Self::should_render(band, settings)
                        && Self::should_render(inline_start, settings)
                }),
        }
    }

    pub fn get(&self, kind: PaneKind) -> &Pane {
        match kind {
            PaneKind::Top => &self.top,
            PaneKind::Bottom => &self.bottom,
            PaneKind::InlineStart => &self.inline_start,
            PaneKind::TopInlineStartCorner => &self.top_inline_start_corner,
            PaneKind::BottomInlineStartCorner => &self.bottom_inline_start_corner,
        }
    }

    pub fn get_mut(&mut self, kind: PaneKind) -> &mut Pane {
        match kind {
            PaneKind::Top => &mut self.top,
            PaneKind::Bottom => &mut self.bottom,
            PaneKind::InlineStart => &mut self.inline_start,
            PaneKind::TopInlineStartCorner => &mut self.top_inline_start_corner,
            PaneKind::BottomInlineStartCorner => &mut self.bottom_inline_start_corner,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pane> {
        PaneKind::ALL.into_iter().map(move |kind| self.get(kind))
    }

    pub fn is_active(&self, kind: PaneKind) -> bool {
        self.get(kind).is_active()
    }

    /// Kinds of the currently active panes.
    pub fn active_kinds(&self) -> Vec<PaneKind> {
        self.iter()
            .filter(|p| p.is_active())
            .map(Pane::kind)
            .collect()
    }

    /// The active pane an event target belongs to.
    pub fn parent_pane_of(&self, target: EventTarget) -> Option<PaneKind> {
        match target {
            EventTarget::CloneHolder(kind) if self.is_active(kind) => Some(kind),
            _ => None,
        }
    }

    /// Sum of the cell sizes along the pane's scroll-locked axis: rows for the
    /// top/bottom bands, columns for the leading edge.
    pub fn sum_cell_sizes(kind: PaneKind, metrics: &GridMetrics, from: u32, to: u32) -> f64 {
        match kind {
            PaneKind::Top | PaneKind::Bottom => metrics.sum_row_heights(from, to),
            PaneKind::InlineStart
            | PaneKind::TopInlineStartCorner
            | PaneKind::BottomInlineStartCorner => metrics.sum_column_widths(from, to),
        }
    }

    /// Re-evaluate which panes render. Returns true if any flipped, in which
    /// case a scroll sync must follow.
    pub fn update_state_of_rendering(&mut self, settings: &Settings) -> bool {
        let mut changed = false;
        for pane in self.all_mut() {
            let should_render = Self::should_render(pane.kind, settings);
            changed = pane.update_state_of_rendering(should_render) || changed;
        }
        changed
    }

    /// Redraw every active clone, edges before corners.
    pub fn refresh(&mut self, fast_draw: bool, settings: &Settings) {
        for kind in PaneKind::REFRESH_ORDER {
            let next = Self::should_render(kind, settings);
            self.get_mut(kind).refresh(fast_draw, next);
        }
    }

    /// Size and position every edge pane, then derive the corners from them.
    pub fn adjust_elements_size(&mut self, metrics: &GridMetrics, layout: &PaneLayout, force: bool) {
        let band_width = (layout.viewport.width - layout.gutter_right()).max(0.0);
        let band_height = (layout.viewport.height - layout.gutter_bottom()).max(0.0);

        let top_height = metrics.column_header_height + metrics.frozen_top_height();
        self.get_mut(PaneKind::Top)
            .adjust_elements_size(Offset::ZERO, Size::new(band_width, top_height), force);

        let start_width = metrics.row_header_width + metrics.frozen_start_width();
        self.get_mut(PaneKind::InlineStart).adjust_elements_size(
            Offset::ZERO,
            Size::new(start_width, band_height),
            force,
        );

        let bottom_height = metrics.frozen_bottom_height();
        let bottom_y = (band_height - bottom_height).max(0.0);
        self.get_mut(PaneKind::Bottom).adjust_elements_size(
            Offset::new(0.0, bottom_y),
            Size::new(band_width, bottom_height),
            force,
        );

        self.derive_corners();
    }

    fn derive_corners(&mut self) {
        let inline_start = *self.get(PaneKind::InlineStart).surface();
        for corner in [PaneKind::TopInlineStartCorner, PaneKind::BottomInlineStartCorner] {
            if let Some((band, _)) = corner.parents() {
                let band_surface = *self.get(band).surface();
                self.get_mut(corner).derive_from(&band_surface, &inline_start);
            }
        }
    }

    /// Push every active pane's geometry to the DOM, corners last.
    pub fn apply_to_dom<D: DomAccess + ?Sized>(&mut self, dom: &mut D) {
        self.derive_corners();
        for kind in PaneKind::REFRESH_ORDER {
            self.get(kind).apply_to_dom(dom);
        }
    }

    pub fn destroy(&mut self) {
        for pane in self.all_mut() {
            pane.destroy();
        }
    }
}
