//! Top-element resolver (C3)
//!
//! Approximates full CSS stacking-context semantics closely enough for
//! typical web UIs without simulating the cascade. Two
//! pieces of per-element geometry/style data that don't survive into the
//! output `NodeRecord` (z-index, position, an ancestor-resolved parent
//! z-index) live here in `NodeGeometry`, built once during the walk and
//! used only for this resolution pass.

use ahash::AHashMap;
use std::collections::HashMap;

use crate::geometry::{self, StackingKey};
use crate::types::{NodeId, Rect};

#[derive(Debug, Clone)]
pub struct NodeGeometry {
    pub rect: Rect,
    pub z_index: Option<i64>,
    pub position: String,
    pub parent_z: Option<i64>,
    pub is_visible: bool,
}

impl NodeGeometry {
    pub fn stacking_key(&self) -> StackingKey {
        geometry::stacking_priority(self.z_index, &self.position, self.parent_z)
    }
}

pub struct StackingContext<'a> {
    pub geometry: &'a HashMap<NodeId, NodeGeometry>,
    pub parent_of: &'a AHashMap<NodeId, NodeId>,
    pub children_of: &'a HashMap<NodeId, Vec<NodeId>>,
    pub window_rect: Rect,
}

impl<'a> StackingContext<'a> {
    fn siblings_of(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&parent) = self.parent_of.get(&id) else {
            return Vec::new();
        };
        self.children_of
            .get(&parent)
            .map(|kids| kids.iter().copied().filter(|&c| c != id).collect())
            .unwrap_or_default()
    }

    /// Approximates `document.elementFromPoint(x, y)`: among all visible
    /// nodes whose rect contains the point, the one with the greatest
    /// `(stacking_key, doc_order)` wins — doc_order (the NodeId itself,
    /// since ids are assigned in walk/paint order) breaks ties the way
    /// later-painted same-priority siblings would in a real browser.
    fn element_from_point(&self, x: f64, y: f64) -> Option<NodeId> {
        self.geometry
            .iter()
            .filter(|(_, g)| g.is_visible && g.rect.contains_point(x, y))
            .max_by_key(|(&id, g)| (g.stacking_key(), id))
            .map(|(&id, _)| id)
    }

    fn contains(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        if ancestor == descendant {
            return true;
        }
        let mut current = self.parent_of.get(&descendant).copied();
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent_of.get(&node_id).copied();
        }
        false
    }

    /// `isTopElement(el)`: true if `id` would actually receive a click at
    /// its own center point.
    pub fn is_top_element(&self, id: NodeId) -> bool {
        let Some(geom) = self.geometry.get(&id) else {
            return false;
        };
        if geom.rect.is_empty() {
            return false;
        }

        let (cx, cy) = geom.rect.center();
        if !self.window_rect.contains_point(cx, cy) {
            return false;
        }

        if let Some(hit) = self.element_from_point(cx, cy) {
            if self.contains(id, hit) {
                return true;
            }
        }

        !self.has_overlapping_higher_element(id)
    }

    /// `hasOverlappingHigherElement(el, rect)`: true if some other visible
    /// node overlapping `id`'s rect outranks it in stacking order.
    fn has_overlapping_higher_element(&self, id: NodeId) -> bool {
        let Some(own) = self.geometry.get(&id) else {
            return false;
        };
        let own_rect = own.rect;
        let own_key = own.stacking_key();

        let mut occluders: Vec<NodeId> = Vec::new();
        let mut current = id;
        let mut level = 0usize;

        while let Some(&parent) = self.parent_of.get(&current) {
            level += 1;
            occluders.extend(self.siblings_of(current));

            if level == 2 {
                if let Some(&grandparent) = self.parent_of.get(&parent) {
                    let uncles = self
                        .children_of
                        .get(&grandparent)
                        .map(|kids| kids.iter().copied().filter(|&c| c != parent))
                        .into_iter()
                        .flatten();
                    for uncle in uncles {
                        if let Some(uncle_geom) = self.geometry.get(&uncle) {
                            if matches!(uncle_geom.position.as_str(), "absolute" | "fixed") {
                                if let Some(kids) = self.children_of.get(&uncle) {
                                    occluders.extend(kids.iter().copied());
                                }
                            }
                        }
                    }
                }
            }

            current = parent;
        }

        occluders.into_iter().any(|candidate_id| {
            candidate_id != id
                && self
                    .geometry
                    .get(&candidate_id)
                    .map(|g| {
                        g.is_visible
                            && g.rect.overlaps(&own_rect)
                            && g.stacking_key() > own_key
                    })
                    .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom(rect: Rect, z: Option<i64>, position: &str) -> NodeGeometry {
        NodeGeometry {
            rect,
            z_index: z,
            position: position.to_string(),
            parent_z: None,
            is_visible: true,
        }
    }

    #[test]
    fn hit_test_picks_topmost_by_stacking_key() {
        let mut geometry = HashMap::new();
        geometry.insert(1, geom(Rect::new(0.0, 0.0, 100.0, 100.0), None, "static"));
        geometry.insert(2, geom(Rect::new(0.0, 0.0, 100.0, 100.0), Some(10), "absolute"));
        let parent_of = AHashMap::default();
        let mut children_of = HashMap::new();
        children_of.insert(0, vec![1, 2]);

        let ctx = StackingContext {
            geometry: &geometry,
            parent_of: &parent_of,
            children_of: &children_of,
            window_rect: Rect::new(0.0, 0.0, 800.0, 600.0),
        };

        assert_eq!(ctx.element_from_point(50.0, 50.0), Some(2));
    }

    #[test]
    fn background_button_is_not_top_under_modal() {
        // modal (id 2, fixed, z 10000) covers background button (id 1).
        let mut geometry = HashMap::new();
        geometry.insert(1, geom(Rect::new(0.0, 0.0, 50.0, 50.0), None, "static"));
        geometry.insert(
            2,
            geom(Rect::new(0.0, 0.0, 800.0, 600.0), Some(10000), "fixed"),
        );
        let mut parent_of = AHashMap::default();
        parent_of.insert(1, 0);
        parent_of.insert(2, 0);
        let mut children_of = HashMap::new();
        children_of.insert(0, vec![1, 2]);

        let ctx = StackingContext {
            geometry: &geometry,
            parent_of: &parent_of,
            children_of: &children_of,
            window_rect: Rect::new(0.0, 0.0, 800.0, 600.0),
        };

        assert!(!ctx.is_top_element(1));
        assert!(ctx.is_top_element(2));
    }

    #[test]
    fn zero_size_rect_is_never_top() {
        let mut geometry = HashMap::new();
        geometry.insert(1, geom(Rect::zero(), None, "static"));
        let parent_of = AHashMap::default();
        let children_of = HashMap::new();
        let ctx = StackingContext {
            geometry: &geometry,
            parent_of: &parent_of,
            children_of: &children_of,
            window_rect: Rect::new(0.0, 0.0, 800.0, 600.0),
        };
        assert!(!ctx.is_top_element(1));
    }
}
