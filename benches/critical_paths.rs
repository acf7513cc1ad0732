//! Criterion benchmarks for Swatchmix critical paths
//!
//! Benchmarks the operations that run on every mix:
//! - Color: parsing and HSL conversion
//! - Blend: averaging a selection
//! - Catalog: building the palette and projecting the creation catalog
//! - Renderer: gallery swatch strips

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use swatchmix::catalog::{color_palette, ItemCatalog};
use swatchmix::color::{blend_colors, hsl_to_rgb, parse_color, Rgb};
use swatchmix::composite::project_catalog;
use swatchmix::gallery::GalleryStore;
use swatchmix::models::{Artifact, Category, EntryId, SavedEntry};
use swatchmix::renderer::render_swatches;
use swatchmix::storage::{MemoryStorage, Storage};

// =============================================================================
// Test Data Generators
// =============================================================================

fn make_entries(n: usize) -> Vec<SavedEntry> {
    (0..n)
        .map(|i| SavedEntry {
            id: EntryId(i as u64 + 1),
            name: format!("mix {}", i),
            artifact: Some(Artifact::color(Rgb::new((i * 7 % 256) as u8, (i * 13 % 256) as u8, 128))),
            source_ids: Vec::new(),
        })
        .collect()
}

fn make_gallery(category: Category, n: usize) -> GalleryStore {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let json = serde_json::to_string(&make_entries(n)).unwrap_or_default();
    storage.store(category.storage_key(), &json).ok();
    GalleryStore::open(storage, category.storage_key()).unwrap_or_else(|e| panic!("{}", e))
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    // Regex fast paths
    group.bench_function("parse_hex_3", |b| b.iter(|| parse_color(black_box("#F00"))));
    group.bench_function("parse_hex_6", |b| b.iter(|| parse_color(black_box("#FF0000"))));
    group.bench_function("parse_hsl", |b| {
        b.iter(|| parse_color(black_box("hsl(270, 100%, 50%)")))
    });
    group.bench_function("parse_rgb", |b| b.iter(|| parse_color(black_box("rgb(128, 0, 128)"))));

    // lightningcss fallback
    group.bench_function("parse_named", |b| b.iter(|| parse_color(black_box("rebeccapurple"))));

    group.bench_function("hsl_to_rgb", |b| {
        b.iter(|| hsl_to_rgb(black_box(210.0), black_box(1.0), black_box(0.7)))
    });

    group.finish();
}

fn bench_blend(c: &mut Criterion) {
    let mut group = c.benchmark_group("blend");

    let palette = color_palette(&[]);
    let ids: Vec<String> = palette.items().iter().map(|item| item.id.clone()).collect();

    for size in [2usize, 3, 36] {
        let selection = &ids[..size];
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), selection, |b, selection| {
            b.iter(|| blend_colors(black_box(selection)))
        });
    }

    group.finish();
}

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");

    group.bench_function("color_palette", |b| b.iter(|| color_palette(black_box(&[]))));

    for size in [10usize, 100, 500] {
        let colors = make_gallery(Category::Color, size);
        let gems = make_gallery(Category::Gem, size);
        group.throughput(Throughput::Elements(2 * size as u64));
        group.bench_with_input(BenchmarkId::new("project", size), &size, |b, _| {
            b.iter(|| project_catalog([(Category::Color, &colors), (Category::Gem, &gems)]))
        });
    }

    group.finish();
}

fn bench_renderer(c: &mut Criterion) {
    let mut group = c.benchmark_group("renderer");

    for size in [8usize, 64] {
        let entries = make_entries(size);
        group.bench_with_input(BenchmarkId::new("swatches_32px", size), &entries, |b, entries| {
            b.iter(|| render_swatches(black_box(entries), 32))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_color, bench_blend, bench_catalog, bench_renderer);

criterion_main!(benches);
