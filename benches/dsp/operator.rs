//! Benchmarks for a single FM operator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use armor8::dsp::{OscillatorMode, RenderCtx};
use armor8::preset::EgModDestination;
use armor8::synth::Operator;

use crate::BLOCK_SIZES;

pub fn bench_operator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/operator");
    let ctx = RenderCtx::from_note(48_000.0, 57, 100.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Carrier only: oscillator, EG, filter
        let mut carrier = Operator::new();
        carrier.set_amplitude(0.8);
        carrier.set_eg_destination(EgModDestination::Amplitude, true);
        carrier.note_on();
        group.bench_with_input(BenchmarkId::new("carrier", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = carrier.next_sample(black_box(&ctx), &[0.0; 4]);
                }
            })
        });

        // Self-modulated saw with every EG destination on
        let mut feedback = Operator::new();
        feedback.set_wave(OscillatorMode::Sawtooth);
        feedback.set_amplitude(0.8);
        feedback.set_modulation(0, 0.7);
        feedback.set_eg_destination(EgModDestination::Amplitude, true);
        feedback.set_eg_destination(EgModDestination::Frequency, true);
        feedback.set_eg_destination(EgModDestination::Filter, true);
        feedback.note_on();
        group.bench_with_input(BenchmarkId::new("feedback", size), &size, |b, _| {
            b.iter(|| {
                let mut previous = 0.0;
                for sample in buffer.iter_mut() {
                    previous = feedback.next_sample(black_box(&ctx), &[previous, 0.0, 0.0, 0.0]);
                    *sample = previous;
                }
            })
        });
    }

    group.finish();
}
