//! Benchmarks for the operator lowpass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use armor8::dsp::{Filter, PolyBlepOsc, OscillatorMode, RenderCtx};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::from_freq(48_000.0, 110.0, 100.0);

    for &size in BLOCK_SIZES {
        let mut source = vec![0.0f32; size];
        PolyBlepOsc::new(OscillatorMode::Sawtooth).render(&mut source, 110.0, 48_000.0);
        let mut buffer = source.clone();

        let mut filter = Filter::new();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&source);
                filter.render(black_box(&mut buffer), 800.0, 0.0, black_box(&ctx));
            })
        });

        let mut filter = Filter::new();
        group.bench_with_input(BenchmarkId::new("resonant", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&source);
                filter.render(black_box(&mut buffer), 800.0, 0.9, black_box(&ctx));
            })
        });
    }

    group.finish();
}
