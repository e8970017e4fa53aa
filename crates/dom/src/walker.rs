//! Tree walker (C4)
//!
//! Single recursive pass over a `RawDocument` (and any same-origin iframe
//! documents reachable from it) that builds the node map, the parallel
//! geometry table the top-element resolver checks `isTopElement` against,
//! and the raw candidate list the filter and index-assignment stages
//! consume. IDs are issued in walk order, so a parent's id is always
//! smaller than any of its descendants'.

use std::collections::HashMap;

use crate::arena::WalkArena;
use crate::classify;
use crate::config::AnalyzerConfig;
use crate::geometry;
use crate::input::{RawDocument, RawElement, RawNode, Viewport};
use crate::topmost::NodeGeometry;
use crate::types::{
    ElementRecord, IframeContent, IframeRecord, NodeId, NodeRecord, Rect, MAX_TEXT_LEN,
    STRIPPED_ATTRIBUTES, STRIPPED_ATTRIBUTE_PREFIXES,
};

/// Tags that never produce a node and are never recursed into.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "meta", "link", "head", "br", "hr"];

pub struct WalkOutput {
    pub arena: WalkArena,
    pub root_id: Option<NodeId>,
    pub geometry: HashMap<NodeId, NodeGeometry>,
    pub children_of: HashMap<NodeId, Vec<NodeId>>,
    pub candidates: Vec<NodeId>,
    pub iframe_nodes: Vec<NodeId>,
    pub total_nodes: usize,
    pub visible_nodes: usize,
    pub same_origin_iframes: usize,
    pub cross_origin_iframes: usize,
}

struct Walker<'a> {
    config: &'a AnalyzerConfig,
    window_rect: Rect,
    arena: WalkArena,
    geometry: HashMap<NodeId, NodeGeometry>,
    children_of: HashMap<NodeId, Vec<NodeId>>,
    candidates: Vec<NodeId>,
    iframe_nodes: Vec<NodeId>,
    iframe_count: usize,
    total_nodes: usize,
    visible_nodes: usize,
    same_origin_iframes: usize,
    cross_origin_iframes: usize,
}

pub fn walk(document: &RawDocument, viewport: &Viewport, config: &AnalyzerConfig) -> WalkOutput {
    let mut walker = Walker {
        config,
        window_rect: viewport.rect(),
        arena: WalkArena::new(),
        geometry: HashMap::new(),
        children_of: HashMap::new(),
        candidates: Vec::new(),
        iframe_nodes: Vec::new(),
        iframe_count: 0,
        total_nodes: 0,
        visible_nodes: 0,
        same_origin_iframes: 0,
        cross_origin_iframes: 0,
    };

    let root_id = walker.visit_element(&document.body, None, "", 1, 0);

    WalkOutput {
        arena: walker.arena,
        root_id,
        geometry: walker.geometry,
        children_of: walker.children_of,
        candidates: walker.candidates,
        iframe_nodes: walker.iframe_nodes,
        total_nodes: walker.total_nodes,
        visible_nodes: walker.visible_nodes,
        same_origin_iframes: walker.same_origin_iframes,
        cross_origin_iframes: walker.cross_origin_iframes,
    }
}

impl<'a> Walker<'a> {
    /// Visits one element, its text children and sub-elements, returning the
    /// id assigned to it (or `None` if the tag is skip-listed).
    fn visit_element(
        &mut self,
        el: &RawElement,
        parent: Option<NodeId>,
        parent_path: &str,
        sibling_index: usize,
        iframe_depth: usize,
    ) -> Option<NodeId> {
        let tag = el.tag_name.to_lowercase();
        if SKIPPED_TAGS.contains(&tag.as_str()) {
            return None;
        }

        if tag == "iframe"
            && !self.config.include_cross_origin_iframes
            && !matches!(el.iframe, Some(crate::input::IframeSource::SameOrigin(_)))
        {
            return None;
        }

        self.total_nodes += 1;

        let is_visible = geometry::is_visible(el);
        if is_visible {
            self.visible_nodes += 1;
        }
        let in_viewport = self.config.viewport_expansion > 0
            || geometry::is_in_viewport(&el.rect, &self.window_rect, self.config.viewport_expansion as f64);
        let is_interactive = classify::is_interactive(el);
        let is_scrollable = geometry::is_scrollable(el);

        let xpath = build_xpath(el, parent_path, sibling_index);

        if tag == "iframe" {
            return Some(self.visit_iframe(el, parent, &xpath, is_visible, iframe_depth));
        }

        // Reserve the id before descending so children land after it.
        let placeholder = NodeRecord::Element(ElementRecord {
            tag_name: tag.clone(),
            attributes: filtered_attributes(el),
            xpath: xpath.clone(),
            is_visible,
            is_interactive,
            is_top_element: false,
            is_in_viewport: in_viewport,
            highlight_index: None,
            shadow_root: el.shadow_root.is_some(),
            viewport: el.rect,
            children: Vec::new(),
            text: element_text(el, is_interactive),
            aria_label: el.attr("aria-label").map(str::to_string),
            aria_description: el.attr("aria-description").map(str::to_string),
            title: el.attr("title").map(str::to_string),
            role: el.attr("role").map(str::to_string),
            is_scrollable,
        });
        let id = self.arena.push(placeholder, parent);

        self.geometry.insert(
            id,
            NodeGeometry {
                rect: el.rect,
                z_index: el.style.z_index,
                position: el.style.position.clone(),
                parent_z: parent.and_then(|p| self.geometry.get(&p)).map(|g| g.stacking_key().1),
                is_visible,
            },
        );

        if is_interactive && is_visible && in_viewport {
            self.candidates.push(id);
        }

        let mut tag_counts: HashMap<String, usize> = HashMap::new();
        let mut child_ids = Vec::with_capacity(el.children.len());
        for child in el.children.iter() {
            match child {
                RawNode::Text(text) => {
                    if let Some(child_id) = self.visit_text(text, id, is_visible) {
                        child_ids.push(child_id);
                    }
                }
                RawNode::Element(child_el) => {
                    let child_tag = child_el.tag_name.to_lowercase();
                    let idx = tag_counts.entry(child_tag).or_insert(0);
                    *idx += 1;
                    if let Some(child_id) =
                        self.visit_element(child_el, Some(id), &xpath, *idx, iframe_depth)
                    {
                        child_ids.push(child_id);
                    }
                }
            }
        }

        if let Some(shadow_children) = &el.shadow_root {
            let mut shadow_counts: HashMap<String, usize> = HashMap::new();
            for child in shadow_children.iter() {
                match child {
                    RawNode::Text(text) => {
                        if let Some(child_id) = self.visit_text(text, id, is_visible) {
                            child_ids.push(child_id);
                        }
                    }
                    RawNode::Element(child_el) => {
                        let child_tag = child_el.tag_name.to_lowercase();
                        let idx = shadow_counts.entry(child_tag).or_insert(0);
                        *idx += 1;
                        if let Some(child_id) =
                            self.visit_element(child_el, Some(id), &xpath, *idx, iframe_depth)
                        {
                            child_ids.push(child_id);
                        }
                    }
                }
            }
        }

        self.children_of.insert(id, child_ids.clone());
        if let Some(NodeRecord::Element(record)) = self.arena.get_mut(id) {
            record.children = child_ids;
        }

        Some(id)
    }

    fn visit_text(&mut self, text: &str, parent: NodeId, parent_visible: bool) -> Option<NodeId> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let record = NodeRecord::Text {
            text: truncate(trimmed),
            is_visible: parent_visible,
            children: Vec::new(),
        };
        let id = self.arena.push(record, Some(parent));
        self.total_nodes += 1;
        self.children_of.insert(id, Vec::new());
        Some(id)
    }

    fn visit_iframe(
        &mut self,
        el: &RawElement,
        parent: Option<NodeId>,
        xpath: &str,
        is_visible: bool,
        iframe_depth: usize,
    ) -> NodeId {
        let mut attributes = HashMap::new();
        if let Some(src) = el.attr("src") {
            attributes.insert("src".to_string(), truncate_len(src, 200));
        }
        for key in ["title", "aria-label", "name", "id"] {
            if let Some(v) = el.attr(key) {
                attributes.insert(key.to_string(), v.to_string());
            }
        }

        let depth_ok = iframe_depth < self.config.max_iframe_depth;
        let count_ok = self.iframe_count < self.config.max_iframes;

        let (content, body) = match &el.iframe {
            Some(crate::input::IframeSource::SameOrigin(doc)) if depth_ok && count_ok => {
                attributes.insert("data-iframe-type".to_string(), "same-origin".to_string());
                self.same_origin_iframes += 1;
                (IframeContent::Extractable, Some(doc.as_ref()))
            }
            Some(crate::input::IframeSource::SameOrigin(_)) => {
                attributes.insert("data-iframe-type".to_string(), "same-origin".to_string());
                self.same_origin_iframes += 1;
                (IframeContent::Extractable, None)
            }
            Some(crate::input::IframeSource::CrossOrigin) => {
                attributes.insert("data-iframe-type".to_string(), "cross-origin".to_string());
                self.cross_origin_iframes += 1;
                (IframeContent::CrossOriginBlocked, None)
            }
            None => (IframeContent::CrossOriginBlocked, None),
        };

        let placeholder = NodeRecord::Iframe(IframeRecord {
            tag_name: "iframe".to_string(),
            xpath: xpath.to_string(),
            is_visible,
            viewport: el.rect,
            attributes,
            iframe_content: content,
            iframe_depth,
            children: Vec::new(),
        });
        let id = self.arena.push(placeholder, parent);
        self.iframe_count += 1;
        self.iframe_nodes.push(id);
        self.geometry.insert(
            id,
            NodeGeometry {
                rect: el.rect,
                z_index: el.style.z_index,
                position: el.style.position.clone(),
                parent_z: None,
                is_visible,
            },
        );

        let mut child_ids = Vec::new();
        if let Some(body) = body {
            if let Some(child_id) = self.visit_element(&body.body, Some(id), xpath, 1, iframe_depth + 1) {
                child_ids.push(child_id);
            }
        }

        self.children_of.insert(id, child_ids.clone());
        if let Some(NodeRecord::Iframe(record)) = self.arena.get_mut(id) {
            record.children = child_ids;
        }

        id
    }
}

fn build_xpath(el: &RawElement, parent_path: &str, sibling_index: usize) -> String {
    if let Some(id) = el.attr("id") {
        if !id.is_empty() {
            return format!("//*[@id=\"{id}\"]");
        }
    }
    format!("{parent_path}/{}[{sibling_index}]", el.tag_name.to_lowercase())
}

fn filtered_attributes(el: &RawElement) -> HashMap<String, String> {
    el.attributes
        .iter()
        .filter(|(name, _)| {
            !STRIPPED_ATTRIBUTES.contains(&name.as_str())
                && !STRIPPED_ATTRIBUTE_PREFIXES.iter().any(|p| name.starts_with(p))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn truncate(s: &str) -> String {
    truncate_len(s, MAX_TEXT_LEN)
}

fn truncate_len(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

fn direct_child_text(el: &RawElement) -> String {
    el.children
        .iter()
        .filter_map(|c| match c {
            RawNode::Text(t) => Some(t.trim()),
            RawNode::Element(_) => None,
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `innerText`-style text: skips subtrees rooted at an invisible element.
fn inner_text(el: &RawElement) -> String {
    let mut parts = Vec::new();
    collect_inner_text(el, &mut parts);
    parts.join(" ")
}

fn collect_inner_text<'b>(el: &'b RawElement, parts: &mut Vec<&'b str>) {
    for child in el.children.iter() {
        match child {
            RawNode::Text(t) => {
                let trimmed = t.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
            RawNode::Element(child_el) => {
                if geometry::is_visible(child_el) {
                    collect_inner_text(child_el, parts);
                }
            }
        }
    }
}

/// `textContent`-style text: ignores visibility entirely.
fn text_content(el: &RawElement) -> String {
    let mut parts = Vec::new();
    collect_text_content(el, &mut parts);
    parts.join(" ")
}

fn collect_text_content<'b>(el: &'b RawElement, parts: &mut Vec<&'b str>) {
    for child in el.children.iter() {
        match child {
            RawNode::Text(t) => {
                let trimmed = t.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
            RawNode::Element(child_el) => collect_text_content(child_el, parts),
        }
    }
}

fn element_specific_fallback(el: &RawElement) -> String {
    el.text_hints
        .value
        .clone()
        .or_else(|| el.text_hints.placeholder.clone())
        .or_else(|| el.text_hints.selected_option_label.clone())
        .unwrap_or_default()
}

fn element_text(el: &RawElement, is_interactive: bool) -> String {
    if is_interactive {
        let mut text = inner_text(el);
        if text.trim().is_empty() {
            text = text_content(el);
        }
        if text.trim().is_empty() {
            text = element_specific_fallback(el);
        }
        truncate(text.trim())
    } else {
        let mut text = direct_child_text(el);
        if text.trim().is_empty() {
            text = element_specific_fallback(el);
        }
        truncate(text.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{IframeSource, RawDocument};

    fn cfg() -> AnalyzerConfig {
        AnalyzerConfig::default()
    }

    #[test]
    fn empty_body_produces_root_only() {
        let doc = RawDocument::new(RawElement::new("body").with_rect(Rect::new(0.0, 0.0, 800.0, 600.0)));
        let out = walk(&doc, &Viewport::default(), &cfg());
        assert_eq!(out.root_id, Some(1));
        assert_eq!(out.arena.len(), 1);
        assert!(out.candidates.is_empty());
    }

    #[test]
    fn single_button_is_a_candidate() {
        let button = RawElement::new("button")
            .with_rect(Rect::new(10.0, 10.0, 80.0, 30.0))
            .with_child(RawNode::Text("Go".to_string()));
        let body = RawElement::new("body")
            .with_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_child(RawNode::Element(Box::new(button)));
        let out = walk(&RawDocument::new(body), &Viewport::default(), &cfg());
        assert_eq!(out.candidates.len(), 1);
        let id = out.candidates[0];
        if let Some(NodeRecord::Element(rec)) = out.arena.get(id) {
            assert_eq!(rec.text, "Go");
            assert!(rec.is_interactive);
        } else {
            panic!("expected element record");
        }
    }

    #[test]
    fn empty_anchor_is_not_a_candidate() {
        let anchor = RawElement::new("a")
            .with_attr("href", "/x")
            .with_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        let body = RawElement::new("body")
            .with_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_child(RawNode::Element(Box::new(anchor)));
        let out = walk(&RawDocument::new(body), &Viewport::default(), &cfg());
        assert!(out.candidates.is_empty());
    }

    #[test]
    fn cross_origin_iframe_has_no_children() {
        let iframe = {
            let mut el = RawElement::new("iframe").with_rect(Rect::new(0.0, 0.0, 300.0, 200.0));
            el.iframe = Some(IframeSource::CrossOrigin);
            el
        };
        let body = RawElement::new("body")
            .with_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_child(RawNode::Element(Box::new(iframe)));
        let out = walk(&RawDocument::new(body), &Viewport::default(), &cfg());
        assert_eq!(out.cross_origin_iframes, 1);
        let iframe_id = out.iframe_nodes[0];
        if let Some(NodeRecord::Iframe(rec)) = out.arena.get(iframe_id) {
            assert!(rec.children.is_empty());
            assert_eq!(rec.iframe_content, IframeContent::CrossOriginBlocked);
        } else {
            panic!("expected iframe record");
        }
    }

    #[test]
    fn cross_origin_iframe_is_elided_when_not_included() {
        let iframe = {
            let mut el = RawElement::new("iframe").with_rect(Rect::new(0.0, 0.0, 300.0, 200.0));
            el.iframe = Some(IframeSource::CrossOrigin);
            el
        };
        let body = RawElement::new("body")
            .with_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_child(RawNode::Element(Box::new(iframe)));
        let mut config = cfg();
        config.include_cross_origin_iframes = false;
        let out = walk(&RawDocument::new(body), &Viewport::default(), &config);
        assert!(out.iframe_nodes.is_empty());
        assert_eq!(out.cross_origin_iframes, 0);
        assert_eq!(out.arena.len(), 1);
    }

    #[test]
    fn same_origin_iframe_recurses_into_body() {
        let inner_button = RawElement::new("button")
            .with_rect(Rect::new(5.0, 5.0, 50.0, 20.0))
            .with_child(RawNode::Text("Inner".to_string()));
        let inner_doc = RawDocument::new(
            RawElement::new("body")
                .with_rect(Rect::new(0.0, 0.0, 300.0, 200.0))
                .with_child(RawNode::Element(Box::new(inner_button))),
        );
        let iframe = {
            let mut el = RawElement::new("iframe").with_rect(Rect::new(0.0, 0.0, 300.0, 200.0));
            el.iframe = Some(IframeSource::SameOrigin(Box::new(inner_doc)));
            el
        };
        let body = RawElement::new("body")
            .with_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_child(RawNode::Element(Box::new(iframe)));
        let out = walk(&RawDocument::new(body), &Viewport::default(), &cfg());
        assert_eq!(out.same_origin_iframes, 1);
        let iframe_id = out.iframe_nodes[0];
        if let Some(NodeRecord::Iframe(rec)) = out.arena.get(iframe_id) {
            assert_eq!(rec.children.len(), 1);
        } else {
            panic!("expected iframe record");
        }
        assert_eq!(out.candidates.len(), 1);
    }
}
