//! Candidate filter (C5)
//!
//! Two passes over the raw candidate list the walker collected: drop a
//! candidate strictly contained in another candidate (unless the container
//! is an anchor wrapping something that isn't itself an anchor or a
//! button), then drop the larger of two visually-overlapping candidates
//! unless it is the one `isTopElement` picked.

use ahash::AHashMap;
use std::collections::HashMap;

use crate::arena::WalkArena;
use crate::topmost::{NodeGeometry, StackingContext};
use crate::types::{NodeId, NodeRecord, Rect};

fn tag_of(arena: &WalkArena, id: NodeId) -> Option<String> {
    match arena.get(id)? {
        NodeRecord::Element(el) => Some(el.tag_name.clone()),
        _ => None,
    }
}

fn is_anchor_or_button(tag: Option<&str>) -> bool {
    matches!(tag, Some("a") | Some("button"))
}

/// An anchor wrapping something that isn't itself an anchor or a button is
/// the one exception where the *outer* element wins: `<a href><span>Edit
/// </span></a>` keeps the anchor and drops the span, not the reverse.
fn anchor_wrapping_plain_content(container_tag: Option<&str>, contained_tag: Option<&str>) -> bool {
    container_tag == Some("a") && !is_anchor_or_button(contained_tag)
}

/// `true` if `id` should be dropped by the containment pass: the innermost
/// target is preferred in general, so a candidate that contains another
/// candidate is dropped, unless it is an anchor wrapping plain (non-anchor,
/// non-button) content — in which case the anchor is kept and the inner
/// candidate is dropped instead.
fn should_drop_for_containment(arena: &WalkArena, id: NodeId, candidates: &[NodeId]) -> bool {
    let id_tag = tag_of(arena, id);
    candidates.iter().any(|&other| {
        if other == id {
            return false;
        }
        let other_tag = tag_of(arena, other);
        if arena.strictly_contains(id, other) {
            // id is the outer container, other is the inner candidate.
            !anchor_wrapping_plain_content(id_tag.as_deref(), other_tag.as_deref())
        } else if arena.strictly_contains(other, id) {
            // other is the outer container, id is the inner candidate.
            anchor_wrapping_plain_content(other_tag.as_deref(), id_tag.as_deref())
        } else {
            false
        }
    })
}

/// Removes candidates dropped by the containment pass (see
/// `should_drop_for_containment`).
fn filter_contained(arena: &WalkArena, candidates: &[NodeId]) -> Vec<NodeId> {
    candidates
        .iter()
        .copied()
        .filter(|&id| !should_drop_for_containment(arena, id, candidates))
        .collect()
}

fn rect_of(geometry: &HashMap<NodeId, NodeGeometry>, id: NodeId) -> Option<Rect> {
    geometry.get(&id).map(|g| g.rect)
}

/// Of two overlapping candidates, keeps the smaller-area one unless the
/// larger one is the one `isTopElement` actually picks.
fn filter_overlapping(
    candidates: &[NodeId],
    geometry: &HashMap<NodeId, NodeGeometry>,
    parent_of: &AHashMap<NodeId, NodeId>,
    children_of: &HashMap<NodeId, Vec<NodeId>>,
    window_rect: Rect,
) -> Vec<NodeId> {
    let ctx = StackingContext {
        geometry,
        parent_of,
        children_of,
        window_rect,
    };

    candidates
        .iter()
        .copied()
        .filter(|&id| {
            let Some(rect) = rect_of(geometry, id) else {
                return false;
            };
            // Dropped iff some overlapping candidate is strictly smaller
            // (id is "the larger one") and id isn't itself the top hit.
            let is_the_larger_of_an_overlapping_pair = candidates.iter().any(|&other| {
                if other == id {
                    return false;
                }
                let Some(other_rect) = rect_of(geometry, other) else {
                    return false;
                };
                rect.overlaps(&other_rect) && other_rect.area() < rect.area()
            });
            !(is_the_larger_of_an_overlapping_pair && !ctx.is_top_element(id))
        })
        .collect()
}

/// Runs both passes, in order.
pub fn filter_candidates(
    arena: &WalkArena,
    candidates: &[NodeId],
    geometry: &HashMap<NodeId, NodeGeometry>,
    parent_of: &AHashMap<NodeId, NodeId>,
    children_of: &HashMap<NodeId, Vec<NodeId>>,
    window_rect: Rect,
) -> Vec<NodeId> {
    let after_containment = filter_contained(arena, candidates);
    filter_overlapping(&after_containment, geometry, parent_of, children_of, window_rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementRecord;

    fn el(tag: &str) -> NodeRecord {
        NodeRecord::Element(ElementRecord {
            tag_name: tag.to_string(),
            attributes: HashMap::new(),
            xpath: String::new(),
            is_visible: true,
            is_interactive: true,
            is_top_element: false,
            is_in_viewport: true,
            highlight_index: None,
            shadow_root: false,
            viewport: Rect::zero(),
            children: Vec::new(),
            text: String::new(),
            aria_label: None,
            aria_description: None,
            title: None,
            role: None,
            is_scrollable: false,
        })
    }

    #[test]
    fn anchor_wrapping_span_keeps_only_the_anchor() {
        let mut arena = WalkArena::new();
        let anchor = arena.push(el("a"), None);
        let span = arena.push(el("span"), Some(anchor));
        let survivors = filter_contained(&arena, &[anchor, span]);
        assert_eq!(survivors, vec![anchor]);
    }

    #[test]
    fn div_wrapping_button_keeps_only_the_button() {
        let mut arena = WalkArena::new();
        let div = arena.push(el("div"), None);
        let button = arena.push(el("button"), Some(div));
        let survivors = filter_contained(&arena, &[div, button]);
        assert_eq!(survivors, vec![button]);
    }

    #[test]
    fn anchor_wrapping_button_drops_anchor() {
        let mut arena = WalkArena::new();
        let anchor = arena.push(el("a"), None);
        let button = arena.push(el("button"), Some(anchor));
        let mut survivors = filter_contained(&arena, &[anchor, button]);
        survivors.sort();
        assert_eq!(survivors, vec![button]);
    }

    #[test]
    fn smaller_top_element_survives_over_larger_non_top_wrapper() {
        let mut geometry = HashMap::new();
        // Larger wrapper, same center point as the control sitting on it.
        geometry.insert(
            1,
            NodeGeometry {
                rect: Rect::new(300.0, 250.0, 200.0, 100.0),
                z_index: None,
                position: "static".to_string(),
                parent_z: None,
                is_visible: true,
            },
        );
        // Smaller, positioned, higher z-index: wins the hit test at the shared center.
        geometry.insert(
            2,
            NodeGeometry {
                rect: Rect::new(350.0, 275.0, 100.0, 50.0),
                z_index: Some(9999),
                position: "fixed".to_string(),
                parent_z: None,
                is_visible: true,
            },
        );
        let mut parent_of = AHashMap::default();
        parent_of.insert(1, 0);
        parent_of.insert(2, 0);
        let mut children_of = HashMap::new();
        children_of.insert(0, vec![1, 2]);
        let window = Rect::new(0.0, 0.0, 800.0, 600.0);

        let survivors = filter_overlapping(&[1, 2], &geometry, &parent_of, &children_of, window);
        assert_eq!(survivors, vec![2]);
    }
}
