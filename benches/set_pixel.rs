// Run with:  cargo bench --bench set_pixel

use charlieplex_framebuffer::{compute_buffer_bytes, Format, GrayBlink, PixelBuffer, Shade};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::Point;
use std::hint::black_box;

const WIDTH: usize = 8;
const HEIGHT: usize = 96;

type MonoStrip =
    PixelBuffer<WIDTH, HEIGHT, { compute_buffer_bytes(WIDTH, HEIGHT, Format::Monochrome) }>;
type GrayStrip = PixelBuffer<
    WIDTH,
    HEIGHT,
    { compute_buffer_bytes(WIDTH, HEIGHT, Format::GrayBlink) },
    GrayBlink,
>;

fn set_pixel(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_pixel");
    group.throughput(Throughput::Elements((WIDTH * HEIGHT) as u64));

    group.bench_function("monochrome", |b| {
        let mut fb = MonoStrip::new();

        b.iter(|| {
            for y in 0..HEIGHT {
                for x in 0..WIDTH {
                    black_box(&mut fb).set_color(
                        black_box(Point::new(x as i32, y as i32)),
                        black_box(BinaryColor::On),
                    );
                }
            }
        });
    });

    group.bench_function("gray_blink", |b| {
        let mut fb = GrayStrip::new();

        b.iter(|| {
            for y in 0..HEIGHT {
                for x in 0..WIDTH {
                    black_box(&mut fb).set_color(
                        black_box(Point::new(x as i32, y as i32)),
                        black_box(Shade::Bright),
                    );
                }
            }
        });
    });

    group.finish();
}

criterion_group!(benches, set_pixel);
criterion_main!(benches);
