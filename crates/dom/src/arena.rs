//! Id-indexed node storage for the walk.
//!
//! Records carry no parent pointer of their own; a side table
//! (`parentOf: NodeId -> NodeId`) tracks ancestry instead, so the arena
//! stays acyclic and every `NodeRecord` stays plain, serializable data.
//!
//! IDs are 1-based, so node `id` lives at `nodes[id - 1]`.

use ahash::AHashMap;

use crate::types::{NodeId, NodeRecord};

#[derive(Debug, Default)]
pub struct WalkArena {
    nodes: Vec<NodeRecord>,
    parent_of: AHashMap<NodeId, NodeId>,
}

impl WalkArena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(256),
            parent_of: AHashMap::with_capacity(256),
        }
    }

    /// Insert a node, returning its freshly assigned 1-based id.
    pub fn push(&mut self, record: NodeRecord, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(record);
        let id = self.nodes.len() as NodeId;
        if let Some(parent_id) = parent {
            self.parent_of.insert(id, parent_id);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id.checked_sub(1)? as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeRecord> {
        self.nodes.get_mut(id.checked_sub(1)? as usize)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parent_of.get(&id).copied()
    }

    pub fn parent_map(&self) -> &AHashMap<NodeId, NodeId> {
        &self.parent_of
    }

    /// Ancestor chain from `id` up to (and including) the root, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            chain.push(node_id);
            current = self.parent_of(node_id);
        }
        chain
    }

    /// True if `ancestor` strictly contains `descendant` in the DOM tree.
    pub fn strictly_contains(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        if ancestor == descendant {
            return false;
        }
        let mut current = self.parent_of(descendant);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent_of(node_id);
        }
        false
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_parts(self) -> (Vec<NodeRecord>, AHashMap<NodeId, NodeId>) {
        (self.nodes, self.parent_of)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeRecord)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, rec)| (idx as NodeId + 1, rec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementRecord;
    use std::collections::HashMap;

    fn dummy_element() -> NodeRecord {
        NodeRecord::Element(ElementRecord {
            tag_name: "div".to_string(),
            attributes: HashMap::new(),
            xpath: "/div[1]".to_string(),
            is_visible: true,
            is_interactive: false,
            is_top_element: false,
            is_in_viewport: true,
            highlight_index: None,
            shadow_root: false,
            viewport: Default::default(),
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
    fn ids_are_one_based_and_monotonic() {
        let mut arena = WalkArena::new();
        let a = arena.push(dummy_element(), None);
        let b = arena.push(dummy_element(), Some(a));
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(arena.parent_of(b), Some(a));
    }

    #[test]
    fn strictly_contains_is_transitive() {
        let mut arena = WalkArena::new();
        let root = arena.push(dummy_element(), None);
        let mid = arena.push(dummy_element(), Some(root));
        let leaf = arena.push(dummy_element(), Some(mid));
        assert!(arena.strictly_contains(root, leaf));
        assert!(!arena.strictly_contains(leaf, root));
        assert!(!arena.strictly_contains(root, root));
    }
}
