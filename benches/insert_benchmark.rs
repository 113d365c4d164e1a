//! Benchmarks for slide insertion.
//!
//! Run with: cargo bench
//!
//! These benchmarks measure opening, inserting into and listing decks of
//! increasing slide counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slidemaker::sample::{sample_png, SampleDeck};
use slidemaker::{add_slide, list_layouts, ImageUpload, Limits, Presentation, SlideRequest};

const SLIDE_COUNTS: [usize; 4] = [1, 10, 50, 200];

/// Benchmark opening a presentation package.
fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("open");

    for slides in SLIDE_COUNTS.iter() {
        let data = SampleDeck::new().slides(*slides).build().unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("slides", slides), &data, |b, data| {
            b.iter(|| {
                let _ = Presentation::from_bytes(black_box(data.clone()), u64::MAX);
            });
        });
    }

    group.finish();
}

/// Benchmark the full insertion pipeline, text only.
fn bench_insert_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_text");
    let limits = Limits::default();
    let request = SlideRequest::new("Title and Content", "Line one\nLine two")
        .with_title("Benchmark")
        .at_position(0);

    for slides in SLIDE_COUNTS.iter() {
        let data = SampleDeck::new().slides(*slides).build().unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("slides", slides), &data, |b, data| {
            b.iter(|| {
                let _ = add_slide(black_box(data.clone()), &request, &limits);
            });
        });
    }

    group.finish();
}

/// Benchmark insertion with an image into a picture placeholder.
fn bench_insert_image(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_image");
    let limits = Limits::default();
    let request = SlideRequest::new("Picture with Caption", "Caption").with_image(ImageUpload {
        filename: "photo.png".to_string(),
        data: sample_png(640, 480).unwrap(),
    });

    for slides in [1, 50].iter() {
        let data = SampleDeck::new().slides(*slides).build().unwrap();
        group.bench_with_input(BenchmarkId::new("slides", slides), &data, |b, data| {
            b.iter(|| {
                let _ = add_slide(black_box(data.clone()), &request, &limits);
            });
        });
    }

    group.finish();
}

/// Benchmark listing layouts.
fn bench_list_layouts(c: &mut Criterion) {
    let data = SampleDeck::new().slides(10).build().unwrap();
    let limits = Limits::default();
    c.bench_function("list_layouts", |b| {
        b.iter(|| {
            let _ = list_layouts(black_box(data.clone()), &limits);
        });
    });
}

criterion_group!(
    benches,
    bench_open,
    bench_insert_text,
    bench_insert_image,
    bench_list_layouts
);
criterion_main!(benches);
