//! Analyzes a small synthetic page and prints the resulting node map.

use dom::input::{RawDocument, RawElement, RawNode, Viewport};
use dom::AnalyzerService;

fn main() {
    tracing_subscriber::fmt::init();

    let signup_button = RawElement::new("button")
        .with_attr("id", "signup")
        .with_child(RawNode::Text("Sign up".to_string()))
        .with_rect(dom::Rect::new(40.0, 80.0, 120.0, 40.0));

    let nav_link = RawElement::new("a")
        .with_attr("href", "/about")
        .with_child(RawNode::Text("About".to_string()))
        .with_rect(dom::Rect::new(40.0, 20.0, 60.0, 20.0));

    let body = RawElement::new("body")
        .with_rect(dom::Rect::new(0.0, 0.0, 1280.0, 720.0))
        .with_child(RawNode::Element(Box::new(nav_link)))
        .with_child(RawNode::Element(Box::new(signup_button)));

    let document = RawDocument::new(body);
    let viewport = Viewport::default();

    let service = AnalyzerService::new();
    let result = service.analyze(&document, &viewport);

    println!("root id: {:?}", result.root_id);
    println!("nodes: {}", result.map.len());
    println!("highlighted candidates: {}", result.highlights.len());
    for highlight in &result.highlights {
        println!("  #{} node {} rect {:?}", highlight.index, highlight.node_id, highlight.rect);
    }
}
