// Run with: cargo bench --bench render_text

use charlieplex_framebuffer::remap::Rotated;
use charlieplex_framebuffer::{compute_buffer_bytes, Format, Orientation, PixelBuffer};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use embedded_graphics::{
    mono_font::{ascii::FONT_4X6, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use std::{hint::black_box, time::Duration};

// Long enough for the longest string below, drawn sideways
const LENGTH: usize = 160;
const BYTES: usize = compute_buffer_bytes(8, LENGTH, Format::Monochrome);

type Strip = PixelBuffer<8, LENGTH, BYTES>;
type Wide = PixelBuffer<LENGTH, 8, BYTES>;

const TEST_STRINGS: &[(&str, &str)] = &[
    ("short", "HELLO"),
    ("medium", "THE QUICK BROWN FOX"),
    ("long", "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"),
];

// Iterations per measurement, scaled down for longer text
fn get_iteration_count(text: &str) -> usize {
    match text.len() {
        0..=10 => 1000,
        11..=25 => 500,
        _ => 200,
    }
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(3))
        .confidence_level(0.95)
        .significance_level(0.05)
}

fn render_text_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_text");
    let style = MonoTextStyle::new(&FONT_4X6, BinaryColor::On);

    for (case, text) in TEST_STRINGS {
        let pixel_count = (text.len() as u32
            * FONT_4X6.character_size.width
            * FONT_4X6.character_size.height) as u64;
        let iterations = get_iteration_count(text);

        group.throughput(Throughput::Elements(pixel_count * iterations as u64));

        // Straight into a landscape buffer
        group.bench_with_input(
            BenchmarkId::new("landscape", case),
            &(text, iterations),
            |b, &(text, iterations)| {
                b.iter(|| {
                    let mut fb = Wide::new();
                    for _ in 0..iterations {
                        fb.erase();
                        Text::with_baseline(text, Point::zero(), style, Baseline::Top)
                            .draw(black_box(&mut fb))
                            .unwrap();
                    }
                });
            },
        );

        // Through the remapper into a portrait strip
        group.bench_with_input(
            BenchmarkId::new("rotated", case),
            &(text, iterations),
            |b, &(text, iterations)| {
                b.iter(|| {
                    let mut fb = Rotated::new(Strip::new(), Orientation::Portrait);
                    for _ in 0..iterations {
                        fb.inner_mut().erase();
                        Text::with_baseline(text, Point::zero(), style, Baseline::Top)
                            .draw(black_box(&mut fb))
                            .unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(name = benches; config = configure_criterion(); targets = render_text_benchmark);
criterion_main!(benches);
