//! Benchmarks for the ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use armor8::dsp::{Envelope, RenderCtx};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0, 100.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Linear segments
        let mut env = Envelope::adsr(0.5, 0.5, 0.5, 0.5);
        group.bench_with_input(BenchmarkId::new("linear", size), &size, |b, _| {
            b.iter(|| {
                env.note_on();
                env.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Curved segments pay for exp() per sample
        let mut env = Envelope::adsr(0.5, 0.5, 0.5, 0.5);
        env.set_attack(0.5, 80.0);
        env.set_decay(0.5, 80.0);
        group.bench_with_input(BenchmarkId::new("exponential", size), &size, |b, _| {
            b.iter(|| {
                env.note_on();
                env.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
