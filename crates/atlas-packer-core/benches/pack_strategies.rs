use atlas_packer_core::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn generate_rectangles(count: usize, min_size: u32, max_size: u32) -> Vec<Rectangle> {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            Rectangle::new(format!("tex_{i}"), i, w, h)
        })
        .collect()
}

fn settings(algorithm: PackAlgorithm, rotation: bool) -> Settings {
    Settings::builder()
        .with_max_dimensions(2048, 2048)
        .algorithm(algorithm)
        .allow_rotation(rotation)
        .build()
}

fn bench_pack_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_strategies");

    for count in [50, 200, 500] {
        let rects = generate_rectangles(count, 16, 96);
        group.throughput(Throughput::Elements(count as u64));

        for (label, algorithm, rotation) in [
            ("Best", PackAlgorithm::Best, false),
            ("Best_rot", PackAlgorithm::Best, true),
            ("Greedy", PackAlgorithm::Greedy, false),
            ("Greedy_rot", PackAlgorithm::Greedy, true),
        ] {
            let s = settings(algorithm, rotation);
            group.bench_with_input(BenchmarkId::new(label, count), &rects, |b, rects| {
                b.iter(|| black_box(pack_rectangles(rects.clone(), &s)))
            });
        }
    }

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let sources: Vec<SourceImage> = generate_rectangles(100, 8, 48)
        .into_iter()
        .map(|r| {
            let img = image::RgbaImage::from_pixel(r.width, r.height, image::Rgba([200, 10, 10, 255]));
            SourceImage::new(format!("{}.png", r.name), PixelBuffer::from_rgba(img))
        })
        .collect();

    for strip in [false, true] {
        let s = Settings::builder()
            .with_max_dimensions(1024, 1024)
            .strip_whitespace(strip)
            .build();
        group.bench_with_input(BenchmarkId::new("pack", strip), &sources, |b, sources| {
            b.iter(|| black_box(pack(sources.clone(), s.clone())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pack_strategies, bench_full_pipeline);
criterion_main!(benches);
