//! Highlight index assignment and overlay data (C6)
//!
//! The browser-hosted original paints colored boxes over the page; we have
//! no canvas to paint onto, so this produces the same per-candidate ordering
//! and returns it as `HighlightBox` data instead (see SPEC_FULL.md §3a).

use std::collections::HashMap;

use crate::arena::WalkArena;
use crate::config::AnalyzerConfig;
use crate::topmost::NodeGeometry;
use crate::types::{HighlightBox, NodeId, NodeRecord};

/// Reading-order comparator: top (rounded to a 5px band) then left.
fn reading_order_key(geometry: &HashMap<NodeId, NodeGeometry>, id: NodeId) -> (i64, i64) {
    let rect = geometry.get(&id).map(|g| g.rect).unwrap_or_default();
    let banded_top = (rect.y / 5.0).round() as i64;
    (banded_top, rect.x.round() as i64)
}

/// Sorts survivors into reading order and stamps `highlightIndex`/
/// `isTopElement` on every one of their arena records. Returns the overlay
/// boxes that `doHighlightElements` would have painted: only survivors whose
/// `isTopElement` is true ever get a box, even though every survivor gets a
/// `highlightIndex`. `focusHighlightIndex` does not change which survivors
/// get a box, only which one comes back with `is_focused` set.
pub fn assign(
    arena: &mut WalkArena,
    survivors: &[NodeId],
    geometry: &HashMap<NodeId, NodeGeometry>,
    top_elements: &HashMap<NodeId, bool>,
    config: &AnalyzerConfig,
) -> Vec<HighlightBox> {
    let mut ordered = survivors.to_vec();
    ordered.sort_by_key(|&id| reading_order_key(geometry, id));

    let mut highlights = Vec::with_capacity(ordered.len());
    for (index, &id) in ordered.iter().enumerate() {
        let index = index as u32;
        let is_top = top_elements.get(&id).copied().unwrap_or(false);

        if let Some(NodeRecord::Element(record)) = arena.get_mut(id) {
            record.highlight_index = Some(index);
            record.is_top_element = is_top;
        }

        if !config.do_highlight_elements || !is_top {
            continue;
        }

        let rect = geometry.get(&id).map(|g| g.rect).unwrap_or_default();
        highlights.push(HighlightBox {
            node_id: id,
            rect,
            index,
            is_focused: config.focus_highlight_index >= 0 && config.focus_highlight_index as u32 == index,
        });
    }

    highlights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementRecord, Rect};
    use std::collections::HashMap;

    fn el() -> NodeRecord {
        NodeRecord::Element(ElementRecord {
            tag_name: "button".to_string(),
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

    fn geom(rect: Rect) -> NodeGeometry {
        NodeGeometry {
            rect,
            z_index: None,
            position: "static".to_string(),
            parent_z: None,
            is_visible: true,
        }
    }

    #[test]
    fn indices_follow_reading_order_not_insertion_order() {
        let mut arena = WalkArena::new();
        let bottom = arena.push(el(), None);
        let top = arena.push(el(), None);

        let mut geometry = HashMap::new();
        geometry.insert(bottom, geom(Rect::new(0.0, 200.0, 50.0, 20.0)));
        geometry.insert(top, geom(Rect::new(0.0, 0.0, 50.0, 20.0)));

        let top_elements = HashMap::new();
        let config = AnalyzerConfig::default();
        highlight_test_helper(&mut arena, &[bottom, top], &geometry, &top_elements, &config);

        if let Some(NodeRecord::Element(rec)) = arena.get(top) {
            assert_eq!(rec.highlight_index, Some(0));
        } else {
            panic!();
        }
        if let Some(NodeRecord::Element(rec)) = arena.get(bottom) {
            assert_eq!(rec.highlight_index, Some(1));
        } else {
            panic!();
        }
    }

    #[test]
    fn focus_index_marks_one_highlight_as_focused_without_dropping_others() {
        let mut arena = WalkArena::new();
        let a = arena.push(el(), None);
        let b = arena.push(el(), None);
        let mut geometry = HashMap::new();
        geometry.insert(a, geom(Rect::new(0.0, 0.0, 10.0, 10.0)));
        geometry.insert(b, geom(Rect::new(0.0, 20.0, 10.0, 10.0)));
        let mut top_elements = HashMap::new();
        top_elements.insert(a, true);
        top_elements.insert(b, true);
        let mut config = AnalyzerConfig::default();
        config.focus_highlight_index = 1;

        let highlights = assign(&mut arena, &[a, b], &geometry, &top_elements, &config);
        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights[0].index, 0);
        assert!(!highlights[0].is_focused);
        assert_eq!(highlights[1].index, 1);
        assert!(highlights[1].is_focused);
    }

    #[test]
    fn non_top_survivor_gets_an_index_but_no_overlay_box() {
        let mut arena = WalkArena::new();
        let id = arena.push(el(), None);
        let mut geometry = HashMap::new();
        geometry.insert(id, geom(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let mut top_elements = HashMap::new();
        top_elements.insert(id, false);
        let config = AnalyzerConfig::default();

        let highlights = assign(&mut arena, &[id], &geometry, &top_elements, &config);
        assert!(highlights.is_empty());
        if let Some(NodeRecord::Element(rec)) = arena.get(id) {
            assert_eq!(rec.highlight_index, Some(0));
            assert!(!rec.is_top_element);
        } else {
            panic!();
        }
    }

    fn highlight_test_helper(
        arena: &mut WalkArena,
        survivors: &[NodeId],
        geometry: &HashMap<NodeId, NodeGeometry>,
        top_elements: &HashMap<NodeId, bool>,
        config: &AnalyzerConfig,
    ) {
        assign(arena, survivors, geometry, top_elements, config);
    }
}
