// Run with:  cargo bench --bench drive
//
// One tick has to finish well within the refresh period (2 ms at 500 Hz).

use charlieplex_framebuffer::{Driver, Gray12x8, LinePins, Mono12x8, Orientation, RefreshState};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

const TICKS: u64 = 22;

/// Pins that only keep the last written state, like a port register.
#[derive(Default)]
struct PortPins {
    direction: u16,
    output: u16,
}

impl LinePins for PortPins {
    fn set_high(&mut self, line: usize) {
        self.direction |= 1 << line;
        self.output |= 1 << line;
    }

    fn set_low(&mut self, line: usize) {
        self.direction |= 1 << line;
        self.output &= !(1 << line);
    }

    fn release(&mut self, line: usize) {
        self.direction &= !(1 << line);
    }

    fn release_all(&mut self) {
        self.direction = 0;
    }
}

static MONO: Driver<Mono12x8> = Driver::new(Orientation::Landscape);
static GRAY: Driver<Gray12x8> = Driver::new(Orientation::Landscape);

fn drive(c: &mut Criterion) {
    let mut group = c.benchmark_group("drive");
    group.throughput(Throughput::Elements(TICKS));

    group.bench_function("monochrome", |b| {
        let mut fb = Mono12x8::new();
        fb.fill(1);
        let mut state = RefreshState::new();
        let mut pins = PortPins::default();

        b.iter(|| {
            for _ in 0..TICKS {
                MONO.drive(&mut state, black_box(&fb), black_box(&mut pins));
            }
        });
    });

    group.bench_function("gray_blink", |b| {
        let mut fb = Gray12x8::new();
        fb.fill(0b01);
        let mut state = RefreshState::new();
        let mut pins = PortPins::default();

        b.iter(|| {
            for _ in 0..TICKS {
                GRAY.drive(&mut state, black_box(&fb), black_box(&mut pins));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, drive);
criterion_main!(benches);
