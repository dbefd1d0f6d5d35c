//! Benchmarks for span building and segmentation.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic layout streams, so they measure the
//! segmentation core without PDF decoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pdfsect::parser::{LayoutContainer, LayoutItem, LayoutLine, LayoutPage, Segmenter, SpanBuilder};
use pdfsect::{StyleMap, StyleRule};

const BODY: &str = "The quick brown \u{FB01}sh jumps over the lazy dog. It lands on a line-";

/// Creates a synthetic document with the given number of pages, each with
/// a title line and several body lines.
fn create_pages(page_count: u32) -> Vec<LayoutPage> {
    (1..=page_count)
        .map(|number| {
            let mut lines = vec![line(&format!("Section {}", number), "Times-Bold")];
            for _ in 0..20 {
                lines.push(line(BODY, "Times-Roman"));
                lines.push(line("break. Then it rests.", "Times-Roman"));
                lines.push(line("Emphasis here.", "Times-Italic"));
            }
            LayoutPage::new(number, vec![LayoutContainer::new(lines)])
        })
        .collect()
}

fn line(text: &str, font: &str) -> LayoutLine {
    let mut items: Vec<_> = text
        .chars()
        .map(|c| match c {
            ' ' => LayoutItem::space(),
            c => LayoutItem::glyph(c.to_string(), font),
        })
        .collect();
    items.push(LayoutItem::line_break());
    LayoutLine::new(items)
}

/// Benchmark span building at various sizes.
fn bench_span_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("span_building");

    for page_count in [1, 10, 50] {
        let pages = create_pages(page_count);
        group.bench_with_input(BenchmarkId::from_parameter(page_count), &pages, |b, pages| {
            b.iter(|| SpanBuilder::build(black_box(pages)));
        });
    }

    group.finish();
}

/// Benchmark segmentation of a cached stream.
fn bench_segmentation(c: &mut Criterion) {
    let map = StyleMap::from_rules(vec![
        StyleRule::new("Helvetica", "footer"),
        StyleRule::title("Times-Bold"),
    ]);
    let segmenter = Segmenter::new(&map);
    let mut group = c.benchmark_group("segmentation");

    for page_count in [1, 10, 50] {
        let cache = SpanBuilder::build(&create_pages(page_count));
        group.bench_with_input(BenchmarkId::from_parameter(page_count), &cache, |b, cache| {
            b.iter(|| segmenter.segment("bench.pdf", black_box(cache)));
        });
    }

    group.finish();
}

/// Benchmark building a segmenter, which indexes the style map.
fn bench_segmenter_creation(c: &mut Criterion) {
    let rules = (0..100)
        .map(|i| StyleRule::new(format!("Font-{}", i), "other"))
        .chain(std::iter::once(StyleRule::title("Times-Bold")))
        .collect();
    let map = StyleMap::from_rules(rules);

    c.bench_function("segmenter_creation", |b| {
        b.iter(|| Segmenter::new(black_box(&map)));
    });
}

criterion_group!(
    benches,
    bench_span_building,
    bench_segmentation,
    bench_segmenter_creation,
);
criterion_main!(benches);
