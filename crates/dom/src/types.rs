//! Core type definitions for the DOM analyzer's output (the "node map")
//!
//! Key design principles:
//! 1. Use u32 for node indices (4 bytes vs 8 bytes pointer)
//! 2. Model the node map as a tagged enum, not an optional-field struct -
//!    the type system removes the "which fields apply to which node kind"
//!    bookkeeping the source document has to carry by convention.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node identifier, 1-based, monotonically increasing within one `analyze()` call.
pub type NodeId = u32;

/// Rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Strict intersection test, no tolerance.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Overlap test with a 1px tolerance on each axis, to absorb subpixel rounding.
    pub fn overlaps(&self, other: &Rect) -> bool {
        const TOLERANCE: f64 = 1.0;
        self.x < other.x + other.width + TOLERANCE
            && self.x + self.width > other.x - TOLERANCE
            && self.y < other.y + other.height + TOLERANCE
            && self.y + self.height > other.y - TOLERANCE
    }

    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let x_overlap = (self.x + self.width).min(other.x + other.width) - self.x.max(other.x);
        let y_overlap = (self.y + self.height).min(other.y + other.height) - self.y.max(other.y);
        if x_overlap > 0.0 && y_overlap > 0.0 {
            x_overlap * y_overlap
        } else {
            0.0
        }
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }

    pub fn expanded(&self, px: f64) -> Rect {
        Rect {
            x: self.x - px,
            y: self.y - px,
            width: self.width + 2.0 * px,
            height: self.height + 2.0 * px,
        }
    }
}

/// Whether a same-origin iframe's subtree could be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IframeContent {
    Extractable,
    CrossOriginBlocked,
}

/// A single node in the output map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeRecord {
    #[serde(rename = "TEXT_NODE")]
    Text {
        text: String,
        is_visible: bool,
        children: Vec<NodeId>,
    },
    #[serde(rename = "ELEMENT_NODE")]
    Element(ElementRecord),
    #[serde(rename = "IFRAME_NODE")]
    Iframe(IframeRecord),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementRecord {
    pub tag_name: String,
    pub attributes: HashMap<String, String>,
    pub xpath: String,
    pub is_visible: bool,
    pub is_interactive: bool,
    pub is_top_element: bool,
    pub is_in_viewport: bool,
    pub highlight_index: Option<u32>,
    pub shadow_root: bool,
    pub viewport: Rect,
    pub children: Vec<NodeId>,
    pub text: String,
    pub aria_label: Option<String>,
    pub aria_description: Option<String>,
    pub title: Option<String>,
    pub role: Option<String>,
    pub is_scrollable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IframeRecord {
    pub tag_name: String,
    pub xpath: String,
    pub is_visible: bool,
    pub viewport: Rect,
    pub attributes: HashMap<String, String>,
    pub iframe_content: IframeContent,
    pub iframe_depth: usize,
    pub children: Vec<NodeId>,
}

/// Advisory detection of a likely modal/overlay region (never filtered away).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupContainer {
    pub node_id: NodeId,
    pub tag_name: String,
    pub role: Option<String>,
    pub rect: Rect,
    pub matched_keyword: String,
}

/// Data describing a single overlay box C6 would paint, returned instead of
/// mutated into the document (see SPEC_FULL.md §3a).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightBox {
    pub node_id: NodeId,
    pub rect: Rect,
    pub index: u32,
    pub is_focused: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub total_nodes: usize,
    pub processed_nodes: usize,
    pub interactive_nodes: usize,
    pub visible_nodes: usize,
    pub filtered_interactive_nodes: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IframeMetrics {
    pub total_iframes: usize,
    pub same_origin: usize,
    pub cross_origin: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopupMetrics {
    pub total_popups: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerfMetrics {
    pub start_time_ms: f64,
    pub end_time_ms: f64,
    pub total_time_ms: f64,
    pub node_metrics: NodeMetrics,
    pub iframe_metrics: IframeMetrics,
    pub popup_metrics: PopupMetrics,
}

/// An iframe record keyed by its node id, duplicated into the top-level
/// `iframe_nodes` list for callers that want to enumerate frames without
/// walking the whole map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IframeNodeEntry {
    pub node_id: NodeId,
    #[serde(flatten)]
    pub record: IframeRecord,
}

/// The result envelope returned by `analyze()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub map: HashMap<NodeId, NodeRecord>,
    pub root_id: Option<NodeId>,
    pub iframe_nodes: Vec<IframeNodeEntry>,
    pub popup_containers: Vec<PopupContainer>,
    pub perf_metrics: PerfMetrics,
    pub compact_mode: bool,
    pub highlights: Vec<HighlightBox>,
    pub error: Option<String>,
}

impl AnalysisResult {
    /// A degraded envelope for the unrecoverable-error path (no root node).
    pub fn failed(error: impl Into<String>, perf_metrics: PerfMetrics) -> Self {
        Self {
            map: HashMap::new(),
            root_id: None,
            iframe_nodes: Vec::new(),
            popup_containers: Vec::new(),
            perf_metrics,
            compact_mode: false,
            highlights: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Attribute name prefixes stripped during the walk (framework-internal noise).
pub const STRIPPED_ATTRIBUTE_PREFIXES: &[&str] = &["data-reactid", "data-reactroot", "ng-"];

pub const STRIPPED_ATTRIBUTES: &[&str] = &["style"];

/// Maximum length (chars) for any `text` field after trimming.
pub const MAX_TEXT_LEN: usize = 100;
