//! Benchmarks for PolyBLEP waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use armor8::dsp::{OscillatorMode, PolyBlepOsc};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for mode in OscillatorMode::ALL {
            let mut osc = PolyBlepOsc::new(mode);
            group.bench_with_input(BenchmarkId::new(mode.label(), size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), black_box(440.0), 48_000.0);
                })
            });
        }
    }

    group.finish();
}
