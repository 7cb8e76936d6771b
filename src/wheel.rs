//! Wheel-to-scroll translation.
//!
//! Converts raw wheel deltas into pixel deltas and applies them to the
//! viewport one axis at a time. Writes only happen when the target offset
//! differs from the current one; the platform may still clamp the write, so
//! the result is judged by re-reading the offset afterwards.

use crate::dom::DomAccess;
use crate::settings::DEFAULT_LINE_HEIGHT_MULTIPLIER;

/// Unit of the wheel deltas, mirroring `WheelEvent.deltaMode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    /// Map the DOM numeric constant; unknown values are treated as pixels.
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }
}

/// A wheel event as seen by the overlay layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub delta_x: f64,
    pub delta_y: f64,
    /// Legacy `wheelDeltaX`, opposite sign to `delta_x`
    pub wheel_delta_x: f64,
    /// Legacy `wheelDeltaY`, opposite sign to `delta_y`
    pub wheel_delta_y: f64,
    pub delta_mode: DeltaMode,
}

impl WheelInput {
    /// A pixel-mode wheel event without legacy fields.
    pub fn pixels(delta_x: f64, delta_y: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            wheel_delta_x: f64::NAN,
            wheel_delta_y: f64::NAN,
            delta_mode: DeltaMode::Pixel,
        }
    }

    /// A line-mode wheel event without legacy fields.
    pub fn lines(delta_x: f64, delta_y: f64) -> Self {
        Self {
            delta_mode: DeltaMode::Line,
            ..Self::pixels(delta_x, delta_y)
        }
    }
}

impl Default for WheelInput {
    fn default() -> Self {
        Self::pixels(0.0, 0.0)
    }
}

/// Browser default line height in pixels, cached once per synchronizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHeight(pub f64);

impl LineHeight {
    /// Resolve from computed CSS values of the document body.
    ///
    /// A numeric `line-height` (e.g. `"20px"`) wins; anything else (`"normal"`)
    /// falls back to `font-size × multiplier`.
    pub fn from_computed(line_height: &str, font_size: &str, multiplier: f64) -> Self {
        if let Some(px) = parse_leading_int(line_height) {
            return Self(px);
        }
        let font_size = parse_leading_int(font_size).unwrap_or(0.0);
        Self(font_size * multiplier)
    }
}

impl Default for LineHeight {
    fn default() -> Self {
        // 16px body text
        Self(16.0 * DEFAULT_LINE_HEIGHT_MULTIPLIER)
    }
}

/// Leading integer of a CSS length, the way `parseInt("20px", 10)` reads it.
fn parse_leading_int(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let number = digits.get(..end)?;
    if number.is_empty() {
        return None;
    }
    number.parse::<f64>().ok().map(|n| sign * n)
}

/// Normalize a wheel event into signed pixel deltas `(dx, dy)`.
///
/// Each axis independently falls back to its legacy field (times
/// `legacy_sign`) when the modern field is NaN. Non-pixel units are scaled as
/// `delta + delta × line_height`.
pub fn normalize_deltas(input: &WheelInput, line_height: LineHeight, legacy_sign: f64) -> (f64, f64) {
    let pick = |modern: f64, legacy: f64| {
        if modern.is_nan() {
            legacy_sign * legacy
        } else {
            modern
        }
    };
    let mut dx = pick(input.delta_x, input.wheel_delta_x);
    let mut dy = pick(input.delta_y, input.wheel_delta_y);

    if input.delta_mode != DeltaMode::Pixel {
        dx += dx * line_height.0;
        dy += dy * line_height.0;
    }
    tracing::trace!(target: "xloverlay", dx, dy, mode = ?input.delta_mode, "normalized wheel");
    (dx, dy)
}

/// Move the viewport vertically by `delta`. Returns whether it actually moved.
pub fn scroll_vertically<D: DomAccess + ?Sized>(dom: &mut D, delta: f64) -> bool {
    if !delta.is_finite() || delta == 0.0 {
        return false;
    }
    let previous = dom.viewport_scroll().y;
    dom.set_viewport_scroll_top(previous + delta);
    crate::geometry::differs(previous, dom.viewport_scroll().y)
}

/// Move the viewport horizontally by `delta`. Returns whether it actually moved.
pub fn scroll_horizontally<D: DomAccess + ?Sized>(dom: &mut D, delta: f64) -> bool {
    if !delta.is_finite() || delta == 0.0 {
        return false;
    }
    let previous = dom.viewport_scroll().x;
    dom.set_viewport_scroll_left(previous + delta);
    crate::geometry::differs(previous, dom.viewport_scroll().x)
}

/// Translate a wheel event into viewport scrolling.
///
/// Returns true when either axis moved.
pub fn translate_wheel<D: DomAccess + ?Sized>(
    dom: &mut D,
    input: &WheelInput,
    line_height: LineHeight,
    legacy_sign: f64,
) -> bool {
    let (dx, dy) = normalize_deltas(input, line_height, legacy_sign);
    let moved_vertically = scroll_vertically(dom, dy);
    let moved_horizontally = scroll_horizontally(dom, dx);
    moved_vertically || moved_horizontally
}
