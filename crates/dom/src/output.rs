//! Output builder (C7)
//!
//! Compact-mode projection and advisory popup-container detection. Neither
//! touches `highlightIndex` assignment — that's already done by the time
//! either of these runs.

use ahash::AHashMap;
use std::collections::HashMap;

use crate::arena::WalkArena;
use crate::topmost::NodeGeometry;
use crate::types::{NodeId, NodeRecord, PopupContainer};

const POPUP_KEYWORDS: &[&str] = &[
    "modal", "popup", "dialog", "overlay", "signin", "login", "consent", "cookie", "banner",
];

fn matches_popup_class_id(attrs: &HashMap<String, String>) -> Option<String> {
    let haystack = [
        attrs.get("class").map(String::as_str).unwrap_or(""),
        attrs.get("id").map(String::as_str).unwrap_or(""),
    ]
    .join(" ")
    .to_lowercase();

    POPUP_KEYWORDS
        .iter()
        .find(|kw| haystack.contains(*kw))
        .map(|kw| kw.to_string())
}

fn matches_popup_role(attrs: &HashMap<String, String>) -> Option<String> {
    match attrs.get("role").map(String::as_str) {
        Some("dialog") => return Some("role:dialog".to_string()),
        Some("alertdialog") => return Some("role:alertdialog".to_string()),
        _ => {}
    }
    if attrs.get("aria-modal").map(String::as_str) == Some("true") {
        return Some("aria-modal:true".to_string());
    }
    None
}

/// Enumerates likely modal/overlay regions. Never filters anything out of
/// the node map — purely advisory.
pub fn detect_popups(arena: &WalkArena, geometry: &HashMap<NodeId, NodeGeometry>) -> Vec<PopupContainer> {
    let mut popups = Vec::new();
    for (id, record) in arena.iter() {
        let NodeRecord::Element(el) = record else {
            continue;
        };
        let Some(geom) = geometry.get(&id) else {
            continue;
        };
        if !geom.is_visible {
            continue;
        }
        if !matches!(geom.position.as_str(), "fixed" | "absolute") {
            continue;
        }
        if geom.z_index.unwrap_or(i64::MIN) <= 9000 {
            continue;
        }
        if geom.rect.width < 50.0 || geom.rect.height < 50.0 {
            continue;
        }

        let matched = matches_popup_class_id(&el.attributes).or_else(|| matches_popup_role(&el.attributes));
        if let Some(matched_keyword) = matched {
            popups.push(PopupContainer {
                node_id: id,
                tag_name: el.tag_name.clone(),
                role: el.role.clone(),
                rect: geom.rect,
                matched_keyword,
            });
        }
    }
    popups
}

fn collect_ancestors(parent_of: &AHashMap<NodeId, NodeId>, id: NodeId, into: &mut std::collections::HashSet<NodeId>) {
    let mut current = Some(id);
    while let Some(node_id) = current {
        if !into.insert(node_id) {
            break;
        }
        current = parent_of.get(&node_id).copied();
    }
}

/// Prunes `map` down to the root, every surviving candidate and its
/// ancestors, and every iframe placeholder, filtering each kept node's
/// `children` to the intersection with the kept set.
pub fn project_compact(
    map: HashMap<NodeId, NodeRecord>,
    root_id: Option<NodeId>,
    parent_of: &AHashMap<NodeId, NodeId>,
    candidates: &[NodeId],
    iframe_nodes: &[NodeId],
) -> HashMap<NodeId, NodeRecord> {
    let mut essential = std::collections::HashSet::new();
    if let Some(root) = root_id {
        essential.insert(root);
    }
    for &id in candidates.iter().chain(iframe_nodes.iter()) {
        collect_ancestors(parent_of, id, &mut essential);
    }

    map.into_iter()
        .filter(|(id, _)| essential.contains(id))
        .map(|(id, record)| (id, prune_children(record, &essential)))
        .collect()
}

fn prune_children(record: NodeRecord, essential: &std::collections::HashSet<NodeId>) -> NodeRecord {
    match record {
        NodeRecord::Text { text, is_visible, children } => NodeRecord::Text {
            text,
            is_visible,
            children: children.into_iter().filter(|c| essential.contains(c)).collect(),
        },
        NodeRecord::Element(mut el) => {
            el.children.retain(|c| essential.contains(c));
            NodeRecord::Element(el)
        }
        NodeRecord::Iframe(mut frame) => {
            frame.children.retain(|c| essential.contains(c));
            NodeRecord::Iframe(frame)
        }
    }
}
