//! Benchmark for hotspot detection on a synthetic flyer page.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flyer_hotspots::{HotspotDetector, HotspotOptions, PixelBuffer};
use image::{Rgba, RgbaImage};

/// 1200x1600 page with a 3x4 layout of product blocks
fn synthetic_page() -> RgbaImage {
    let mut img = RgbaImage::from_pixel(1200, 1600, Rgba([250, 250, 245, 255]));
    for row in 0..4u32 {
        for col in 0..3u32 {
            let x0 = 40 + col * 390;
            let y0 = 60 + row * 380;
            // 12 blocks, shades 0..=220
            let shade = (20 * (row * 3 + col)).min(u8::MAX as u32) as u8;
            for y in y0..y0 + 320 {
                for x in x0..x0 + 340 {
                    img.put_pixel(x, y, Rgba([shade, 90, 200 - shade / 2, 255]));
                }
            }
        }
    }
    img
}

fn benchmarks(c: &mut Criterion) {
    let page = synthetic_page();
    let buffer = PixelBuffer::from_rgba(&page);
    let blocks = HotspotDetector::detect(&buffer, &HotspotOptions::default()).map(|r| r.len());
    assert_eq!(blocks.ok(), Some(12), "synthetic page should hold 12 blocks");

    let mut group = c.benchmark_group("detect");
    for grid_size in [5u32, 10, 20] {
        let options = HotspotOptions::builder().grid_size(grid_size).build();
        group.bench_with_input(BenchmarkId::from_parameter(grid_size), &options, |b, opts| {
            b.iter(|| HotspotDetector::detect(black_box(&buffer), opts))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
