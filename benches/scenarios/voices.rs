//! Benchmarks for the voice manager rendering a whole polyphonic patch.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use armor8::event::{EventSystem, KeyEvent};
use armor8::preset::{EgModDestination, PresetStore};
use armor8::synth::{NoMessages, VoiceManager};
use armor8::Armor8Config;

use crate::BLOCK_SIZES;

/// Four-operator stack: 4 → 3 → 2 → 1, operator 1 audible.
fn stacked_patch(manager: &mut VoiceManager) {
    for op in 0..4 {
        manager.set_operator_amplitude(op, if op == 0 { 0.3 } else { 0.6 });
        manager.set_operator_ratio(op, true);
        manager.set_operator_freq(op, (op + 1) as f32);
        manager.set_operator_eg_mod_destination(op, EgModDestination::Amplitude, true);
        manager.set_operator_eg_attack(op, 0.01, 0.0);
        manager.set_operator_eg_decay(op, 0.3, 40.0);
        manager.set_operator_eg_sustain(op, 0.6);
    }
    manager.set_operator_modulation(1, 0, 0.5);
    manager.set_operator_modulation(2, 1, 0.5);
    manager.set_operator_modulation(3, 2, 0.5);
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for held in [1usize, 8] {
            let config = Armor8Config::new().voices(8);
            let mut manager = VoiceManager::new(&config, PresetStore::in_memory(1), EventSystem::new());
            stacked_patch(&mut manager);
            for i in 0..held {
                manager.on_key_event(&KeyEvent::on(48 + 4 * i as u8, 100));
            }

            let name = format!("stack_{}_voices", held);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    manager.render_block(black_box(&mut buffer), &mut NoMessages);
                })
            });
        }
    }

    group.finish();
}
