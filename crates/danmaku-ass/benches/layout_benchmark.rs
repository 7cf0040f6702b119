use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use danmaku_ass::{AssDocument, CanvasConfig, DisplayMode};
use std::hint::black_box;

const MODES: [DisplayMode; 4] = DisplayMode::LANE_MODES;

fn build_document(count: usize, reduced: bool) -> AssDocument {
    let mut doc = AssDocument::from_config(&CanvasConfig {
        reduced,
        ..Default::default()
    })
    .unwrap();
    for i in 0..count {
        let text = "弾幕".repeat(1 + i % 12);
        doc.add_comment(
            i as f64 * 0.05,
            i as i64,
            &text,
            25.0,
            MODES[i % MODES.len()],
            0xFFFFFF,
            (i % 3) as i32,
        );
    }
    doc
}

fn layout_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for count in [1_000usize, 10_000] {
        let doc = build_document(count, false);
        group.bench_with_input(BenchmarkId::new("allocate", count), &doc, |b, doc| {
            b.iter(|| black_box(doc.layout().len()))
        });
    }
    group.finish();
}

fn materialize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize");
    for reduced in [false, true] {
        let doc = build_document(10_000, reduced);
        let name = if reduced { "reduced" } else { "forced" };
        group.bench_function(name, |b| b.iter(|| black_box(doc.materialize())));
    }
    group.finish();
}

criterion_group!(benches, layout_benchmark, materialize_benchmark);
criterion_main!(benches);
