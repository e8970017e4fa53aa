//! Geometry / style probes (C1)
//!
//! Pragmatic visibility and stacking-order heuristics, not a full CSS
//! cascade simulation. Every probe here is a total function over its input:
//! no panics, no `unwrap`, so an invalid or stale element just reads as
//! non-visible/non-match rather than needing a try/catch equivalent.

use crate::input::RawElement;
use crate::types::Rect;

/// A value is "positioned" if it establishes its own stacking context via
/// `position`.
fn is_positioned(position: &str) -> bool {
    matches!(position, "absolute" | "fixed" | "relative" | "sticky")
}

/// `isVisible(element)`: display/visibility/opacity/size/offset-parent/
/// pointer-events checks, in that order.
pub fn is_visible(el: &RawElement) -> bool {
    let style = &el.style;

    if style.display == "none" {
        return false;
    }
    if matches!(style.visibility.as_str(), "hidden" | "collapse") {
        return false;
    }
    if style.opacity <= 0.0 {
        return false;
    }
    if el.rect.width == 0.0 && el.rect.height == 0.0 {
        return false;
    }
    let is_root = matches!(el.tag_name.as_str(), "body" | "html");
    if !el.has_offset_parent && !is_root && !matches!(style.position.as_str(), "fixed" | "sticky")
    {
        return false;
    }
    if style.pointer_events == "none" {
        return false;
    }
    true
}

/// `isInViewport(element, expansion)`.
///
/// `expansion` may be negative (shrinks the window rect).
pub fn is_in_viewport(rect: &Rect, window_rect: &Rect, expansion: f64) -> bool {
    let expanded = window_rect.expanded(expansion);
    rect.intersects(&expanded)
}

/// Lexicographic stacking-priority key: `(positioned?, effective_z, positioned?)`.
///
/// The leading and trailing `positioned?` are deliberately both present: it
/// compares positioned-ness twice so that among two positioned elements
/// with equal z-index, neither wins purely on position, but a positioned
/// element still strictly outranks a static one at equal z.
pub type StackingKey = (bool, i64, bool);

pub fn stacking_priority(z_index: Option<i64>, position: &str, parent_z: Option<i64>) -> StackingKey {
    let positioned = is_positioned(position);
    let effective_z = z_index
        .or(parent_z)
        .unwrap_or(i64::MIN);
    (positioned, effective_z, positioned)
}

/// `rectsOverlap(a, b)` — 1px tolerance, delegates to `Rect::overlaps`.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.overlaps(b)
}

/// `isScrollable`: overflowing content AND a scrolling `overflow*` value.
/// `body`/`html` count even without an explicit `overflow` declaration
/// once they have overflowing content.
pub fn is_scrollable(el: &RawElement) -> bool {
    let has_overflow_content = el.scroll.scroll_height > el.scroll.client_height + 1.0
        || el.scroll.scroll_width > el.scroll.client_width + 1.0;
    if !has_overflow_content {
        return false;
    }

    let scrolls = |v: &str| matches!(v, "auto" | "scroll" | "overlay");
    let declares_scroll = scrolls(&el.style.overflow_x) || scrolls(&el.style.overflow_y);

    if matches!(el.tag_name.as_str(), "body" | "html") {
        return true;
    }
    declares_scroll
}
