use std::sync::{Arc, Mutex};

use armor8::assets::{FONT_3X5, LOGO};
use armor8::dsp::OscillatorMode;
use armor8::event::{DisplayRefreshEvent, EventSystem, Subscription};
use armor8::preset::PresetStore;
use armor8::synth::VoiceManager;
use armor8::ui::{Cell, DisplaySimulator, Font, Sprite};
use armor8::Armor8Config;

struct Panel {
    sim: DisplaySimulator,
    manager: Arc<Mutex<VoiceManager>>,
    refreshes: Arc<Mutex<Vec<DisplayRefreshEvent>>>,
    _refresh_sub: Subscription,
}

fn panel() -> Panel {
    let config = Armor8Config::new().voices(2).preset_capacity(4).boot_ticks(2).status_ticks(5);
    let events = EventSystem::new();

    let refreshes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&refreshes);
    let refresh_sub = events
        .display
        .subscribe(move |event: &DisplayRefreshEvent| sink.lock().unwrap().push(*event));

    let sim = DisplaySimulator::new(
        events.clone(),
        Font::from_bytes(&FONT_3X5).unwrap(),
        Sprite::from_bytes(&LOGO).unwrap(),
        &config,
    );
    let manager = Arc::new(Mutex::new(VoiceManager::new(
        &config,
        PresetStore::in_memory(4),
        events.clone(),
    )));
    VoiceManager::bind(&manager, &events);

    Panel {
        sim,
        manager,
        refreshes,
        _refresh_sub: refresh_sub,
    }
}

fn booted() -> Panel {
    let mut panel = panel();
    for _ in 0..3 {
        panel.sim.tick();
    }
    assert!(panel.sim.is_booted());
    panel.refreshes.lock().unwrap().clear();
    panel
}

fn pulse_next_op(sim: &mut DisplaySimulator) {
    sim.process_next_op_btn(true);
    sim.process_next_op_btn(true);
    sim.process_next_op_btn(false);
    sim.process_next_op_btn(false);
}

#[test]
fn three_next_op_pulses_reach_operator_four() {
    let mut panel = booted();
    assert_eq!(panel.sim.current_operator(), 1);

    for _ in 0..3 {
        pulse_next_op(&mut panel.sim);
    }
    assert_eq!(panel.sim.current_operator(), 4);
    assert_eq!(panel.manager.lock().unwrap().operator_to_edit(), 3);

    pulse_next_op(&mut panel.sim);
    assert_eq!(panel.sim.current_operator(), 1);
}

#[test]
fn select_operator_and_wave_step_the_buttons() {
    let mut panel = booted();
    panel.sim.select_operator(3);
    assert_eq!(panel.sim.current_operator(), 3);

    panel.sim.select_wave(4);
    assert_eq!(panel.sim.current_wave(), 4);
    let state = panel.manager.lock().unwrap().state();
    assert_eq!(state.operators[2].wave, OscillatorMode::Sawtooth);

    // Selecting the current operator goes all the way round.
    panel.sim.select_operator(3);
    assert_eq!(panel.sim.current_operator(), 3);
}

#[test]
fn refresh_covers_every_changed_pixel() {
    let mut panel = booted();
    let actions: [fn(&mut DisplaySimulator); 6] = [
        |sim| sim.process_amp_or_amp_vel_pot(0.7),
        |sim| sim.process_atk_or_atk_expo_or_op1_mod_pot(0.3),
        |sim| {
            sim.process_next_wave_btn(true);
            sim.process_next_wave_btn(false);
        },
        |sim| sim.process_mono_btn(true),
        |sim| sim.process_mono_btn(false),
        |sim| sim.process_pitch_bend_or_glide_pot(0.9),
    ];

    for action in actions {
        let before = panel.sim.frame_buffer().clone();
        panel.refreshes.lock().unwrap().clear();
        action(&mut panel.sim);
        let after = panel.sim.frame_buffer();
        let refreshes = panel.refreshes.lock().unwrap().clone();

        for y in 0..64 {
            for x in 0..128 {
                if before.pixel(x, y) != after.pixel(x, y) {
                    assert!(
                        refreshes.iter().any(|r| r.contains(x, y)),
                        "pixel ({}, {}) changed outside {:?}",
                        x,
                        y,
                        refreshes
                    );
                }
            }
        }
    }
}

#[test]
fn pot_turn_highlights_and_times_out() {
    let mut panel = booted();
    panel.sim.process_filt_freq_or_filt_res_or_filt_vel_pot(0.0);
    assert_eq!(panel.sim.highlighted(), Some(Cell::FilterFreq));
    assert_eq!(panel.sim.status_text(), "FLT: 20.00");
    assert_eq!(panel.refreshes.lock().unwrap().len(), 1);

    for _ in 0..5 {
        panel.sim.tick();
    }
    assert_eq!(panel.sim.highlighted(), None);
    assert_eq!(panel.sim.status_text(), "PRESET 01 OP 1");
}

#[test]
fn alt_modifiers_route_pots() {
    let mut panel = booted();

    panel.sim.process_alt1_btn(true);
    panel.sim.process_alt1_btn(true);
    panel.sim.process_rel_or_rel_expo_or_op4_mod_pot(1.0);
    panel.sim.process_alt1_btn(false);
    panel.sim.process_alt1_btn(false);

    panel.sim.process_alt2_btn(true);
    panel.sim.process_rel_or_rel_expo_or_op4_mod_pot(0.5);
    panel.sim.process_amp_or_amp_vel_pot(0.25);
    panel.sim.process_alt2_btn(false);

    panel.sim.process_rel_or_rel_expo_or_op4_mod_pot(1.0);

    let op = panel.manager.lock().unwrap().state().operators[0];
    assert_eq!(op.release_expo, 100.0);
    assert_eq!(op.mod_amounts[3], 0.5);
    assert_eq!(op.amp_vel_sens, 0.25);
    assert_eq!(op.release, 3.0);
}

#[test]
fn eg_destination_setters_are_idempotent() {
    let mut panel = booted();
    panel.sim.set_eg_dest_filter(true);
    panel.sim.set_eg_dest_filter(true);
    assert!(panel.manager.lock().unwrap().state().operators[0].eg_destinations.filter);

    panel.sim.set_eg_dest_filter(false);
    assert!(!panel.manager.lock().unwrap().state().operators[0].eg_destinations.filter);
}

#[test]
fn boot_ends_with_a_full_screen_refresh() {
    let mut panel = panel();
    panel.sim.tick();
    panel.sim.tick();
    assert!(!panel.sim.is_booted());
    panel.sim.tick();

    let refreshes = panel.refreshes.lock().unwrap();
    assert_eq!(refreshes.len(), 3);
    assert_eq!(*refreshes.last().unwrap(), DisplayRefreshEvent::from_size(0, 0, 128, 64));
}
