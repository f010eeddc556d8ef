//! Benchmarks for panel redraws driven through the event buses.

use std::sync::{Arc, Mutex};

use criterion::Criterion;
use armor8::assets::{FONT_3X5, LOGO};
use armor8::event::EventSystem;
use armor8::preset::PresetStore;
use armor8::synth::VoiceManager;
use armor8::ui::{DisplaySimulator, Font, Sprite};
use armor8::Armor8Config;

pub fn bench_display(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/display");

    let config = Armor8Config::new().voices(2).boot_ticks(0);
    let events = EventSystem::new();
    let (Ok(font), Ok(logo)) = (Font::from_bytes(&FONT_3X5), Sprite::from_bytes(&LOGO)) else {
        return;
    };
    let mut sim = DisplaySimulator::new(events.clone(), font, logo, &config);
    let manager = Arc::new(Mutex::new(VoiceManager::new(
        &config,
        PresetStore::in_memory(1),
        events.clone(),
    )));
    VoiceManager::bind(&manager, &events);
    sim.tick();

    let mut position = 0.0f32;
    group.bench_function("pot_turn", |b| {
        b.iter(|| {
            position = (position + 0.013) % 1.0;
            sim.process_amp_or_amp_vel_pot(position);
        })
    });

    group.bench_function("operator_cycle", |b| {
        b.iter(|| {
            sim.process_next_op_btn(true);
            sim.process_next_op_btn(false);
            sim.process_next_op_btn(false);
        })
    });

    group.finish();
}
