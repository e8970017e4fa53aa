//! The document/window model the analyzer consumes.
//!
//! The analyzer has no browser attached: it only ever sees a document, a
//! window and a configuration object. These types stand in for
//! `document`/`window`/`getComputedStyle`. Whoever owns a live page
//! (`crates/browser`, a CDP snapshot importer, or a test) is responsible
//! for populating a `RawDocument`.

use smallvec::SmallVec;
use std::collections::HashMap;

use crate::types::Rect;

/// Computed style properties relevant to visibility and stacking.
/// Missing values fall back to CSS initial/inherited defaults.
#[derive(Debug, Clone)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: f64,
    pub pointer_events: String,
    pub position: String,
    /// `None` means `z-index: auto`.
    pub z_index: Option<i64>,
    pub cursor: String,
    pub overflow_x: String,
    pub overflow_y: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
            pointer_events: "auto".to_string(),
            position: "static".to_string(),
            z_index: None,
            cursor: "default".to_string(),
            overflow_x: "visible".to_string(),
            overflow_y: "visible".to_string(),
        }
    }
}

/// A leaf or branch of the synthetic document tree.
#[derive(Debug, Clone)]
pub enum RawNode {
    Element(Box<RawElement>),
    Text(String),
}

/// Geometry/scroll facts the real DOM exposes via `scrollHeight`/`clientHeight`
/// and friends. Only meaningful for element nodes.
#[derive(Debug, Clone, Default)]
pub struct ScrollMetrics {
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub client_width: f64,
    pub client_height: f64,
}

/// Element-specific text fallbacks (input value/placeholder, textarea value,
/// selected `<option>` label) used when an element has no direct text children.
#[derive(Debug, Clone, Default)]
pub struct ElementTextHints {
    pub value: Option<String>,
    pub placeholder: Option<String>,
    pub selected_option_label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RawElement {
    pub tag_name: String,
    pub attributes: HashMap<String, String>,
    pub style: ComputedStyle,
    /// `getBoundingClientRect()`-equivalent rect, viewport-relative.
    pub rect: Rect,
    pub has_offset_parent: bool,
    pub scroll: ScrollMetrics,
    pub text_hints: ElementTextHints,
    pub children: SmallVec<[RawNode; 4]>,
    /// `element.shadowRoot`'s children, if any. `Some(vec![])` is a real
    /// (empty) open shadow root and still sets `shadowRoot: true` on the
    /// host's node record.
    pub shadow_root: Option<SmallVec<[RawNode; 4]>>,
    /// Populated only when `tag_name == "iframe"`.
    pub iframe: Option<IframeSource>,
}

impl RawElement {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            style: ComputedStyle::default(),
            rect: Rect::zero(),
            has_offset_parent: true,
            scroll: ScrollMetrics::default(),
            text_hints: ElementTextHints::default(),
            children: SmallVec::new(),
            shadow_root: None,
            iframe: None,
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_style(mut self, style: ComputedStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<RawNode>) -> Self {
        self.children = SmallVec::from_vec(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Content behind an `<iframe>` element, same-origin or not.
#[derive(Debug, Clone)]
pub enum IframeSource {
    SameOrigin(Box<RawDocument>),
    CrossOrigin,
}

/// A document is, for our purposes, just its body subtree: the analyzer's
/// own root node is always `body`.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub body: RawElement,
}

impl RawDocument {
    pub fn new(body: RawElement) -> Self {
        Self { body }
    }
}

/// Stand-in for `window`: the viewport rectangle and scroll position.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
