//! Benchmarks for markdown rendering.

use std::path::Path;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mdviewer::render::Renderer;

fn bench_render_sample(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/sample.md");
    let renderer = Renderer::new();
    let base_dir = Path::new("/docs");

    c.bench_function("render_sample", |b| {
        b.iter(|| renderer.render(black_box(md), base_dir))
    });
}

fn bench_render_large(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/sample.md").repeat(50);
    let renderer = Renderer::new();
    let base_dir = Path::new("/docs");

    c.bench_function("render_large", |b| {
        b.iter(|| renderer.render(black_box(&md), base_dir))
    });
}

criterion_group!(benches, bench_render_sample, bench_render_large);
criterion_main!(benches);
