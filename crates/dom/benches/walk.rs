use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dom::config::AnalyzerConfig;
use dom::input::{RawDocument, RawElement, RawNode, Viewport};
use dom::service::AnalyzerService;
use dom::types::Rect;

/// Builds a `depth`-deep, `fan_out`-wide synthetic tree with an interactive
/// button planted at every leaf, roughly approximating a list-heavy page.
fn synthetic_tree(depth: usize, fan_out: usize) -> RawElement {
    fn build(depth: usize, fan_out: usize, x: f64, y: f64) -> RawElement {
        if depth == 0 {
            return RawElement::new("button")
                .with_rect(Rect::new(x, y, 40.0, 20.0))
                .with_child(RawNode::Text("Item".to_string()));
        }
        let mut el = RawElement::new("div").with_rect(Rect::new(x, y, 800.0, 600.0));
        for i in 0..fan_out {
            let child = build(depth - 1, fan_out, x + i as f64 * 10.0, y + i as f64 * 10.0);
            el = el.with_child(RawNode::Element(Box::new(child)));
        }
        el
    }
    build(depth, fan_out, 0.0, 0.0)
}

fn bench_walk(c: &mut Criterion) {
    let body = synthetic_tree(4, 6).with_rect(Rect::new(0.0, 0.0, 1280.0, 720.0));
    let document = RawDocument::new(body);
    let viewport = Viewport::default();
    let service = AnalyzerService::with_config(AnalyzerConfig::default());

    c.bench_function("analyze_synthetic_tree", |b| {
        b.iter(|| black_box(service.analyze(black_box(&document), black_box(&viewport))))
    });
}

criterion_group!(benches, bench_walk);
criterion_main!(benches);
