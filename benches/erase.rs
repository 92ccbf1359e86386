// Run with:  cargo bench --bench erase

use charlieplex_framebuffer::{compute_buffer_bytes, Format, PixelBuffer};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;

const WIDTH: usize = 8;
const HEIGHT: usize = 256;
const BYTES: usize = compute_buffer_bytes(WIDTH, HEIGHT, Format::Monochrome);

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(3))
        .confidence_level(0.95)
        .significance_level(0.05)
}

fn erase(c: &mut Criterion) {
    let mut group = c.benchmark_group("erase");
    group.throughput(Throughput::Bytes(BYTES as u64));

    group.bench_function("erase", |b| {
        let mut fb = PixelBuffer::<WIDTH, HEIGHT, BYTES>::new();

        b.iter(|| {
            black_box(&mut fb).erase();
        });
    });

    group.bench_function("fill", |b| {
        let mut fb = PixelBuffer::<WIDTH, HEIGHT, BYTES>::new();

        b.iter(|| {
            black_box(&mut fb).fill(black_box(1));
        });
    });

    group.finish();
}

criterion_group!(name = benches; config = configure_criterion(); targets = erase);
criterion_main!(benches);
