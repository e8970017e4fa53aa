//! Analyzer service - the single public entry point.
//!
//! Wires the pipeline together: walk (C4, driving C1-C3) → candidate filter
//! (C5) → index assignment (C6) → output projection (C7). Mirrors the
//! teacher's `DomService` shape (a config-holding struct with a single
//! `analyze`-style method) without any of the CDP parsing that struct did.

use std::collections::HashMap;
use std::time::Instant;

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::highlight;
use crate::input::{RawDocument, Viewport};
use crate::output;
use crate::topmost::StackingContext;
use crate::types::{AnalysisResult, IframeNodeEntry, NodeId, NodeRecord, PerfMetrics};
use crate::walker;

pub struct AnalyzerService {
    config: AnalyzerConfig,
}

impl AnalyzerService {
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Runs the full analysis pass over `document`/`viewport` and returns
    /// the result envelope. Never panics; an unrecoverable input (a
    /// documentless root) yields a degraded envelope rather than
    /// propagating an error to the caller.
    pub fn analyze(&self, document: &RawDocument, viewport: &Viewport) -> AnalysisResult {
        let start = Instant::now();
        if self.config.debug_mode {
            tracing::debug!(
                compact_mode = self.config.compact_mode,
                viewport_expansion = self.config.viewport_expansion,
                "starting dom analysis"
            );
        }

        let walked = walker::walk(document, viewport, &self.config);

        let Some(root_id) = walked.root_id else {
            tracing::warn!("walk produced no root node");
            return AnalysisResult::failed(
                AnalyzerError::MissingRoot.to_string(),
                elapsed_metrics(start),
            );
        };

        if walked.same_origin_iframes + walked.cross_origin_iframes >= self.config.max_iframes {
            tracing::warn!(
                max_iframes = self.config.max_iframes,
                "iframe fan-out bound reached during walk"
            );
        }

        let stacking = StackingContext {
            geometry: &walked.geometry,
            parent_of: walked.arena.parent_map(),
            children_of: &walked.children_of,
            window_rect: viewport.rect(),
        };
        let top_elements: HashMap<NodeId, bool> = walked
            .candidates
            .iter()
            .map(|&id| (id, stacking.is_top_element(id)))
            .collect();

        let survivors = crate::filter::filter_candidates(
            &walked.arena,
            &walked.candidates,
            &walked.geometry,
            walked.arena.parent_map(),
            &walked.children_of,
            viewport.rect(),
        );

        if self.config.debug_mode {
            tracing::debug!(
                total_candidates = walked.candidates.len(),
                surviving_candidates = survivors.len(),
                "candidate filter complete"
            );
        }

        let popup_containers = output::detect_popups(&walked.arena, &walked.geometry);

        let mut arena = walked.arena;
        let highlights = highlight::assign(&mut arena, &survivors, &walked.geometry, &top_elements, &self.config);

        let (records, parent_of) = arena.into_parts();
        let mut map: HashMap<NodeId, NodeRecord> = records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| (idx as NodeId + 1, record))
            .collect();

        let iframe_nodes: Vec<IframeNodeEntry> = walked
            .iframe_nodes
            .iter()
            .filter_map(|&id| match map.get(&id) {
                Some(NodeRecord::Iframe(record)) => Some(IframeNodeEntry {
                    node_id: id,
                    record: record.clone(),
                }),
                _ => None,
            })
            .collect();

        let mut perf = elapsed_metrics(start);
        perf.node_metrics.total_nodes = walked.total_nodes;
        perf.node_metrics.processed_nodes = map.len();
        perf.node_metrics.visible_nodes = walked.visible_nodes;
        perf.node_metrics.interactive_nodes = walked.candidates.len();
        perf.node_metrics.filtered_interactive_nodes = survivors.len();
        perf.iframe_metrics.total_iframes = walked.iframe_nodes.len();
        perf.iframe_metrics.same_origin = walked.same_origin_iframes;
        perf.iframe_metrics.cross_origin = walked.cross_origin_iframes;
        perf.popup_metrics.total_popups = popup_containers.len();

        if self.config.compact_mode {
            map = output::project_compact(map, Some(root_id), &parent_of, &survivors, &walked.iframe_nodes);
        }

        AnalysisResult {
            map,
            root_id: Some(root_id),
            iframe_nodes,
            popup_containers,
            perf_metrics: perf,
            compact_mode: self.config.compact_mode,
            highlights,
            error: None,
        }
    }
}

impl Default for AnalyzerService {
    fn default() -> Self {
        Self::new()
    }
}

fn elapsed_metrics(start: Instant) -> PerfMetrics {
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    PerfMetrics {
        start_time_ms: 0.0,
        end_time_ms: elapsed_ms,
        total_time_ms: elapsed_ms,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ComputedStyle, IframeSource, RawElement, RawNode};
    use crate::types::Rect;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn empty_document_has_body_only_root() {
        let doc = RawDocument::new(RawElement::new("body").with_rect(Rect::new(0.0, 0.0, 800.0, 600.0)));
        let result = AnalyzerService::new().analyze(&doc, &viewport());
        assert_eq!(result.map.len(), 1);
        assert_eq!(result.perf_metrics.node_metrics.interactive_nodes, 0);
        assert!(result.highlights.is_empty());
    }

    #[test]
    fn one_button_gets_highlight_zero() {
        let button = RawElement::new("button")
            .with_rect(Rect::new(10.0, 10.0, 80.0, 30.0))
            .with_child(RawNode::Text("Go".to_string()));
        let body = RawElement::new("body")
            .with_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_child(RawNode::Element(Box::new(button)));
        let result = AnalyzerService::new().analyze(&RawDocument::new(body), &viewport());
        assert_eq!(result.map.len(), 3);

        let button_record = result
            .map
            .values()
            .find_map(|r| match r {
                NodeRecord::Element(el) if el.tag_name == "button" => Some(el),
                _ => None,
            })
            .unwrap();
        assert_eq!(button_record.highlight_index, Some(0));
        assert!(button_record.is_interactive);
        assert_eq!(button_record.text, "Go");
    }

    #[test]
    fn anchor_wrapping_span_yields_one_candidate() {
        let span = RawElement::new("span").with_child(RawNode::Text("Click".to_string()));
        let anchor = RawElement::new("a")
            .with_attr("href", "/x")
            .with_rect(Rect::new(0.0, 0.0, 100.0, 30.0))
            .with_child(RawNode::Element(Box::new(span)));
        let body = RawElement::new("body")
            .with_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_child(RawNode::Element(Box::new(anchor)));
        let result = AnalyzerService::new().analyze(&RawDocument::new(body), &viewport());

        let highlighted: Vec<_> = result
            .map
            .values()
            .filter_map(|r| match r {
                NodeRecord::Element(el) => el.highlight_index.map(|idx| (el.tag_name.clone(), idx)),
                _ => None,
            })
            .collect();
        assert_eq!(highlighted, vec![("a".to_string(), 0)]);
    }

    #[test]
    fn empty_anchor_has_no_candidate() {
        let anchor = RawElement::new("a")
            .with_attr("href", "/x")
            .with_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        let body = RawElement::new("body")
            .with_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_child(RawNode::Element(Box::new(anchor)));
        let result = AnalyzerService::new().analyze(&RawDocument::new(body), &viewport());
        assert_eq!(result.perf_metrics.node_metrics.filtered_interactive_nodes, 0);
    }

    #[test]
    fn overlapping_modal_only_highlights_inner_button() {
        let inner_button = RawElement::new("button")
            .with_rect(Rect::new(300.0, 250.0, 80.0, 30.0))
            .with_child(RawNode::Text("Confirm".to_string()));
        let mut modal_style = ComputedStyle::default();
        modal_style.position = "fixed".to_string();
        modal_style.z_index = Some(10000);
        let modal = RawElement::new("div")
            .with_attr("class", "modal-backdrop")
            .with_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_style(modal_style)
            .with_child(RawNode::Element(Box::new(inner_button)));

        let background_button = RawElement::new("button")
            .with_rect(Rect::new(280.0, 230.0, 120.0, 70.0))
            .with_child(RawNode::Text("Hidden".to_string()));

        let body = RawElement::new("body")
            .with_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_child(RawNode::Element(Box::new(background_button)))
            .with_child(RawNode::Element(Box::new(modal)));

        let result = AnalyzerService::new().analyze(&RawDocument::new(body), &viewport());
        let highlighted: Vec<_> = result
            .map
            .values()
            .filter_map(|r| match r {
                NodeRecord::Element(el) if el.highlight_index.is_some() => Some(el.text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(highlighted, vec!["Confirm".to_string()]);
        assert_eq!(result.popup_containers.len(), 1);
    }

    #[test]
    fn same_origin_iframe_button_is_highlighted() {
        let inner_button = RawElement::new("button")
            .with_rect(Rect::new(5.0, 5.0, 50.0, 20.0))
            .with_child(RawNode::Text("In".to_string()));
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

        let result = AnalyzerService::new().analyze(&RawDocument::new(body), &viewport());
        assert_eq!(result.perf_metrics.iframe_metrics.total_iframes, 1);
        assert_eq!(result.iframe_nodes.len(), 1);
        assert_eq!(result.iframe_nodes[0].record.children.len(), 1);

        let highlighted_count = result
            .map
            .values()
            .filter(|r| matches!(r, NodeRecord::Element(el) if el.highlight_index.is_some()))
            .count();
        assert_eq!(highlighted_count, 1);
    }
}
