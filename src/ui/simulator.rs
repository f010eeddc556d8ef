use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::config::Armor8Config;
use crate::dsp::finite_or;
use crate::event::bus::lock;
use crate::event::{
    ButtonControl, ButtonEvent, ButtonState, DisplayRefreshEvent, EventSystem, PotControl, PotEvent,
    PresetChangedEvent, Subscription,
};
use crate::preset::{EgModDestination, VoiceState};
use crate::ui::font::Font;
use crate::ui::framebuffer::{ColorProfile, FrameBuffer, Rect};
use crate::ui::layout::{self, Cell};
use crate::ui::sprite::Sprite;
use crate::NUM_OPERATORS;

/*
Display Simulator
=================

Stands in for the front panel: pots, buttons and the 128x64 screen.

  process_*_pot ──(Alt routing)──▶ PotEvent ─────┐
  process_*_btn ──(debounce)─────▶ ButtonEvent ──┼──▶ voice manager
                                                 │
  PresetChangedEvent ◀───────────────────────────┘
        │
        └──▶ mirror ──▶ redraw changed cells ──▶ DisplayRefreshEvent

tick() drives the boot screen for `boot_ticks` ticks, then draws the whole
panel once. After that it only counts down the transient status line: a
pot turn or button release highlights the edited cell and shows
"parameter: value" until `status_ticks` ticks pass.

Every process call publishes at most one refresh, covering exactly the cells
whose text or highlight changed.
*/

const LOGO_TOP: u32 = 16;
const PROGRESS_BAR: Rect = Rect::new(32, 40, 64, 4);

pub struct DisplaySimulator {
    events: EventSystem,
    frame_buffer: FrameBuffer,
    font: Font,
    logo: Sprite,
    mirror: Arc<Mutex<Option<PresetChangedEvent>>>, // last state announced by the synth
    _mirror_subscription: Subscription,
    buttons: HashMap<ButtonControl, ButtonState>,
    drawn: HashMap<Cell, (String, bool)>, // what each cell currently shows, and if inverted
    highlight: Option<Cell>,
    status: Option<String>,
    status_countdown: u32,
    ticks: u32,
    boot_ticks: u32,
    status_ticks: u32,
}

impl DisplaySimulator {
    pub fn new(events: EventSystem, font: Font, logo: Sprite, config: &Armor8Config) -> Self {
        let mirror = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&mirror);
        let subscription = events
            .presets
            .subscribe(move |event: &PresetChangedEvent| *lock(&sink) = Some(*event));

        Self {
            events,
            frame_buffer: FrameBuffer::screen(),
            font,
            logo,
            mirror,
            _mirror_subscription: subscription,
            buttons: HashMap::new(),
            drawn: HashMap::new(),
            highlight: None,
            status: None,
            status_countdown: 0,
            ticks: 0,
            boot_ticks: config.boot_ticks,
            status_ticks: config.status_ticks,
        }
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame_buffer
    }

    pub fn color_profile(&self) -> ColorProfile {
        self.frame_buffer.profile()
    }

    /// The last state the synth announced, or the init preset before that.
    pub fn current_state(&self) -> PresetChangedEvent {
        let mirrored = *lock(&self.mirror);
        mirrored.unwrap_or(PresetChangedEvent {
            state: VoiceState::default(),
            operator_to_edit: 0,
            preset_num: 0,
        })
    }

    /// 1-based.
    pub fn current_operator(&self) -> usize {
        self.current_state().operator_to_edit + 1
    }

    /// 1-based.
    pub fn current_wave(&self) -> usize {
        let event = self.current_state();
        event
            .state
            .operators
            .get(event.operator_to_edit)
            .map_or(1, |op| op.wave.index() + 1)
    }

    pub fn button_state(&self, control: ButtonControl) -> ButtonState {
        self.buttons.get(&control).copied().unwrap_or_default()
    }

    pub fn alt1_state(&self) -> ButtonState {
        self.button_state(ButtonControl::Alt1)
    }

    pub fn alt2_state(&self) -> ButtonState {
        self.button_state(ButtonControl::Alt2)
    }

    pub fn highlighted(&self) -> Option<Cell> {
        self.highlight
    }

    /// What the status line shows right now.
    pub fn status_text(&self) -> String {
        match &self.status {
            Some(text) => text.clone(),
            None => {
                let event = self.current_state();
                format!("PRESET {:02} OP {}", event.preset_num + 1, event.operator_to_edit + 1)
            }
        }
    }

    pub fn is_booted(&self) -> bool {
        self.ticks > self.boot_ticks
    }

    // ----------------------------------------------------------------------
    // Pots

    /// Turn `control` to `percentage` (clamped to `0.0..=1.0`).
    fn process_pot(&mut self, control: PotControl, percentage: f32) {
        let value = finite_or(percentage, 0.0).clamp(0.0, 1.0);
        self.events.pots.publish(&PotEvent { control, value });

        let cell = layout::cell_for_control(control);
        let status = layout::label_and_value(cell, &self.current_state())
            .map(|(label, value)| format!("{}: {}", label, value));
        self.show_change(cell, status);
    }

    /// Alt1: detune.
    pub fn process_freq_or_detune_pot(&mut self, percentage: f32) {
        let control = if self.alt1_state().is_down() {
            PotControl::Detune
        } else {
            PotControl::Frequency
        };
        self.process_pot(control, percentage);
    }

    /// Alt1: attack curve. Alt2: modulation from operator 1.
    pub fn process_atk_or_atk_expo_or_op1_mod_pot(&mut self, percentage: f32) {
        let control = self.route(PotControl::Attack, Some(PotControl::AttackExpo), Some(PotControl::OpModulation(0)));
        self.process_pot(control, percentage);
    }

    /// Alt1: decay curve. Alt2: modulation from operator 2.
    pub fn process_dec_or_dec_expo_or_op2_mod_pot(&mut self, percentage: f32) {
        let control = self.route(PotControl::Decay, Some(PotControl::DecayExpo), Some(PotControl::OpModulation(1)));
        self.process_pot(control, percentage);
    }

    /// Alt2: modulation from operator 3.
    pub fn process_sus_or_op3_mod_pot(&mut self, percentage: f32) {
        let control = self.route(PotControl::Sustain, None, Some(PotControl::OpModulation(2)));
        self.process_pot(control, percentage);
    }

    /// Alt1: release curve. Alt2: modulation from operator 4.
    pub fn process_rel_or_rel_expo_or_op4_mod_pot(&mut self, percentage: f32) {
        let control = self.route(
            PotControl::Release,
            Some(PotControl::ReleaseExpo),
            Some(PotControl::OpModulation(3)),
        );
        self.process_pot(control, percentage);
    }

    /// Alt2: amplitude velocity sensitivity.
    pub fn process_amp_or_amp_vel_pot(&mut self, percentage: f32) {
        let control = self.route(PotControl::Amplitude, None, Some(PotControl::AmpVelSens));
        self.process_pot(control, percentage);
    }

    /// Alt1: resonance. Alt2: filter velocity sensitivity.
    pub fn process_filt_freq_or_filt_res_or_filt_vel_pot(&mut self, percentage: f32) {
        let control = self.route(
            PotControl::FilterFreq,
            Some(PotControl::FilterRes),
            Some(PotControl::FiltVelSens),
        );
        self.process_pot(control, percentage);
    }

    /// Alt1: pitch bend range. Otherwise glide time.
    pub fn process_pitch_bend_or_glide_pot(&mut self, percentage: f32) {
        let control = self.route(PotControl::GlideTime, Some(PotControl::PitchBend), None);
        self.process_pot(control, percentage);
    }

    /// Alt1 wins over Alt2 when both are held.
    fn route(&self, plain: PotControl, alt1: Option<PotControl>, alt2: Option<PotControl>) -> PotControl {
        if self.alt1_state().is_down() {
            if let Some(control) = alt1 {
                return control;
            }
        }
        if self.alt2_state().is_down() {
            if let Some(control) = alt2 {
                return control;
            }
        }
        plain
    }

    // ----------------------------------------------------------------------
    // Buttons

    /// Advance `control` one scan and publish if its state moved.
    fn process_button(&mut self, control: ButtonControl, pressed: bool) -> ButtonState {
        let previous = self.button_state(control);
        let next = previous.next(pressed);
        if next != previous {
            self.buttons.insert(control, next);
            self.events.buttons.publish(&ButtonEvent { control, state: next });
        }
        next
    }

    /// Panel buttons act on release; the synth has already applied the
    /// change by the time the event returns.
    fn process_action_button(&mut self, control: ButtonControl, pressed: bool) {
        if self.process_button(control, pressed) == ButtonState::Released {
            let (cell, status) = button_feedback(control, &self.current_state());
            self.show_change(cell, Some(status));
        } else {
            self.refresh();
        }
    }

    pub fn process_alt1_btn(&mut self, pressed: bool) {
        self.process_button(ButtonControl::Alt1, pressed);
    }

    pub fn process_alt2_btn(&mut self, pressed: bool) {
        self.process_button(ButtonControl::Alt2, pressed);
    }

    pub fn process_next_op_btn(&mut self, pressed: bool) {
        self.process_action_button(ButtonControl::NextOperator, pressed);
    }

    pub fn process_next_wave_btn(&mut self, pressed: bool) {
        self.process_action_button(ButtonControl::NextWave, pressed);
    }

    pub fn process_ratio_or_fixed_btn(&mut self, pressed: bool) {
        self.process_action_button(ButtonControl::RatioToggle, pressed);
    }

    pub fn process_mono_btn(&mut self, pressed: bool) {
        self.process_action_button(ButtonControl::MonoToggle, pressed);
    }

    pub fn process_glide_retrig_btn(&mut self, pressed: bool) {
        self.process_action_button(ButtonControl::GlideRetriggerToggle, pressed);
    }

    pub fn process_prev_preset_btn(&mut self, pressed: bool) {
        self.process_action_button(ButtonControl::PrevPreset, pressed);
    }

    pub fn process_next_preset_btn(&mut self, pressed: bool) {
        self.process_action_button(ButtonControl::NextPreset, pressed);
    }

    pub fn process_write_preset_btn(&mut self, pressed: bool) {
        self.process_action_button(ButtonControl::WritePreset, pressed);
    }

    pub fn set_eg_dest_amplitude(&mut self, on: bool) {
        self.set_eg_dest(EgModDestination::Amplitude, on);
    }

    pub fn set_eg_dest_frequency(&mut self, on: bool) {
        self.set_eg_dest(EgModDestination::Frequency, on);
    }

    pub fn set_eg_dest_filter(&mut self, on: bool) {
        self.set_eg_dest(EgModDestination::Filter, on);
    }

    /// The EG buttons toggle, so only pulse when the flag differs.
    fn set_eg_dest(&mut self, dest: EgModDestination, on: bool) {
        let event = self.current_state();
        let current = event
            .state
            .operators
            .get(event.operator_to_edit)
            .is_some_and(|op| op.eg_destinations.get(dest));
        if current != on {
            let control = match dest {
                EgModDestination::Amplitude => ButtonControl::EgAmplitude,
                EgModDestination::Frequency => ButtonControl::EgFrequency,
                EgModDestination::Filter => ButtonControl::EgFilter,
            };
            self.pulse(control);
        }
    }

    /// Pressed, held, released, floating.
    fn pulse(&mut self, control: ButtonControl) {
        self.process_action_button(control, true);
        self.process_action_button(control, true);
        self.process_action_button(control, false);
        self.process_action_button(control, false);
    }

    /// Step the operator button until operator `n` (1-based) is selected.
    /// Selecting the current operator cycles all the way round.
    pub fn select_operator(&mut self, n: usize) {
        let current = self.current_operator();
        self.step_to(ButtonControl::NextOperator, current, n);
    }

    /// Step the wave button until wave `n` (1-based) is selected.
    pub fn select_wave(&mut self, n: usize) {
        let current = self.current_wave();
        self.step_to(ButtonControl::NextWave, current, n);
    }

    fn step_to(&mut self, control: ButtonControl, current: usize, target: usize) {
        if !(1..=NUM_OPERATORS).contains(&target) {
            warn!("ignoring {:?} selection of {}", control, target);
            return;
        }
        for _ in 0..pulse_count(current, target) {
            self.pulse(control);
        }
    }

    // ----------------------------------------------------------------------
    // Drawing

    pub fn tick(&mut self) {
        if self.ticks < self.boot_ticks {
            let area = self.draw_boot_frame();
            self.ticks += 1;
            self.events.display.publish(&area);
        } else if self.ticks == self.boot_ticks {
            self.ticks += 1;
            self.redraw_all();
        } else if self.status_countdown > 0 {
            self.status_countdown -= 1;
            if self.status_countdown == 0 {
                self.status = None;
                self.highlight = None;
                self.refresh();
            }
        }
    }

    fn draw_boot_frame(&mut self) -> DisplayRefreshEvent {
        let logo_x = self.frame_buffer.width().saturating_sub(self.logo.width()) / 2;
        let logo_area = self.logo.draw(&mut self.frame_buffer, logo_x, LOGO_TOP);

        let inner = Rect::new(PROGRESS_BAR.x + 1, PROGRESS_BAR.y + 1, PROGRESS_BAR.width - 2, PROGRESS_BAR.height - 2);
        let filled = inner.width * (self.ticks + 1) / self.boot_ticks.max(1);
        self.frame_buffer.fill_rect(PROGRESS_BAR, true);
        self.frame_buffer.fill_rect(inner, false);
        self.frame_buffer
            .fill_rect(Rect::new(inner.x, inner.y, filled.min(inner.width), inner.height), true);

        logo_area.to_refresh().union(&PROGRESS_BAR.to_refresh())
    }

    fn redraw_all(&mut self) {
        debug!("boot finished, drawing panel");
        self.frame_buffer.clear(false);
        let width = self.frame_buffer.width();
        self.frame_buffer.hline(0, layout::SEPARATOR_Y, width, true);
        self.drawn.clear();
        self.redraw_changed();
        self.events.display.publish(&self.frame_buffer.bounds().to_refresh());
    }

    fn show_change(&mut self, cell: Cell, status: Option<String>) {
        self.highlight = Some(cell);
        self.status = status;
        self.status_countdown = self.status_ticks;
        self.refresh();
    }

    /// Redraw whatever changed and publish one refresh covering it.
    fn refresh(&mut self) {
        if !self.is_booted() {
            return;
        }
        if let Some(area) = self.redraw_changed() {
            self.events.display.publish(&area);
        }
    }

    fn redraw_changed(&mut self) -> Option<DisplayRefreshEvent> {
        let event = self.current_state();
        let status = self.status_text();
        let mut dirty: Option<DisplayRefreshEvent> = None;

        for cell in layout::cells() {
            let text = match cell {
                Cell::Status => status.clone(),
                _ => layout::cell_text(cell, &event).unwrap_or_default(),
            };
            let inverted = self.highlight == Some(cell);
            if self
                .drawn
                .get(&cell)
                .is_some_and(|(shown, was_inverted)| *shown == text && *was_inverted == inverted)
            {
                continue;
            }

            let area = layout::rect(cell);
            self.frame_buffer.fill_rect(area, inverted);
            self.font
                .draw_text(&mut self.frame_buffer, area.x + 1, area.y + 1, &text, !inverted, area);
            self.drawn.insert(cell, (text, inverted));

            let area = area.to_refresh();
            dirty = Some(dirty.map_or(area, |d| d.union(&area)));
        }
        dirty
    }
}

/// Presses needed to step from `current` to `target` on a four-way cycle.
/// Zero distance is a full lap.
fn pulse_count(current: usize, target: usize) -> usize {
    match (target + NUM_OPERATORS - current % NUM_OPERATORS) % NUM_OPERATORS {
        0 => NUM_OPERATORS,
        distance => distance,
    }
}

/// Cell to highlight and status line after a released panel button.
fn button_feedback(control: ButtonControl, event: &PresetChangedEvent) -> (Cell, String) {
    let state = &event.state;
    let op = &state.operators[event.operator_to_edit % NUM_OPERATORS];
    let on_off = |on: bool| if on { "ON" } else { "OFF" };

    match control {
        ButtonControl::NextOperator => (Cell::Operator, format!("OPERATOR: {}", event.operator_to_edit + 1)),
        ButtonControl::NextWave => (Cell::Wave, format!("WAVE: {}", op.wave.label())),
        ButtonControl::RatioToggle => (
            Cell::Ratio,
            String::from(if op.use_ratio { "FREQ: RATIO" } else { "FREQ: FIXED" }),
        ),
        ButtonControl::EgAmplitude | ButtonControl::EgFrequency | ButtonControl::EgFilter => {
            let text = layout::cell_text(Cell::EgDestinations, event).unwrap_or_default();
            (Cell::EgDestinations, text)
        }
        ButtonControl::MonoToggle => (
            Cell::Mono,
            String::from(if state.monophonic { "MONOPHONIC" } else { "POLYPHONIC" }),
        ),
        ButtonControl::GlideRetriggerToggle => (
            Cell::GlideRetrigger,
            format!("GLIDE RETRIGGER: {}", on_off(state.glide_retrigger)),
        ),
        ButtonControl::PrevPreset | ButtonControl::NextPreset => {
            (Cell::Preset, format!("PRESET {:02} LOADED", event.preset_num + 1))
        }
        ButtonControl::WritePreset => (Cell::Preset, format!("PRESET {:02} WRITTEN", event.preset_num + 1)),
        ButtonControl::Alt1 | ButtonControl::Alt2 => (Cell::Status, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{FONT_3X5, LOGO};

    fn simulator(events: &EventSystem, boot_ticks: u32) -> DisplaySimulator {
        let config = Armor8Config::new().boot_ticks(boot_ticks).status_ticks(3);
        DisplaySimulator::new(
            events.clone(),
            Font::from_bytes(&FONT_3X5).unwrap(),
            Sprite::from_bytes(&LOGO).unwrap(),
            &config,
        )
    }

    fn recorded<E: Copy + Send + 'static>(
        bus: &crate::event::EventBus<E>,
    ) -> (Arc<Mutex<Vec<E>>>, Subscription) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let subscription = bus.subscribe(move |event: &E| lock(&sink).push(*event));
        (log, subscription)
    }

    #[test]
    fn pulse_count_wraps_and_full_laps_on_zero() {
        assert_eq!(pulse_count(1, 4), 3);
        assert_eq!(pulse_count(4, 1), 1);
        assert_eq!(pulse_count(2, 2), 4);
        assert_eq!(pulse_count(3, 2), 3);
    }

    #[test]
    fn boot_draws_logo_then_full_screen() {
        let events = EventSystem::new();
        let (refreshes, _sub) = recorded(&events.display);
        let mut sim = simulator(&events, 3);

        for _ in 0..3 {
            sim.tick();
            assert!(!sim.is_booted());
        }
        {
            let log = lock(&refreshes);
            assert_eq!(log.len(), 3);
            assert!(log.iter().all(|r| r.width() < 128));
        }

        sim.tick();
        assert!(sim.is_booted());
        let last = *lock(&refreshes).last().unwrap();
        assert_eq!(last, DisplayRefreshEvent::from_size(0, 0, 128, 64));
        assert!(sim.frame_buffer().pixel(0, layout::SEPARATOR_Y));
    }

    #[test]
    fn alt1_routes_freq_pot_to_detune() {
        let events = EventSystem::new();
        let (pots, _sub) = recorded(&events.pots);
        let mut sim = simulator(&events, 0);

        sim.process_freq_or_detune_pot(0.5);
        sim.process_alt1_btn(true);
        sim.process_freq_or_detune_pot(0.25);
        sim.process_alt1_btn(true);
        sim.process_alt1_btn(false);
        sim.process_freq_or_detune_pot(2.0);

        let log = lock(&pots);
        assert_eq!(log[0].control, PotControl::Frequency);
        assert_eq!(log[1].control, PotControl::Detune);
        assert_eq!(log[1].value, 0.25);
        assert_eq!(log[2].control, PotControl::Frequency);
        assert_eq!(log[2].value, 1.0);
    }

    #[test]
    fn alt1_wins_over_alt2() {
        let events = EventSystem::new();
        let (pots, _sub) = recorded(&events.pots);
        let mut sim = simulator(&events, 0);

        sim.process_alt2_btn(true);
        sim.process_atk_or_atk_expo_or_op1_mod_pot(0.1);
        sim.process_sus_or_op3_mod_pot(0.1);
        sim.process_alt1_btn(true);
        sim.process_atk_or_atk_expo_or_op1_mod_pot(0.1);
        sim.process_sus_or_op3_mod_pot(0.1);

        let controls: Vec<_> = lock(&pots).iter().map(|p| p.control).collect();
        assert_eq!(
            controls,
            vec![
                PotControl::OpModulation(0),
                PotControl::OpModulation(2),
                PotControl::AttackExpo,
                PotControl::OpModulation(2),
            ]
        );
    }

    #[test]
    fn buttons_publish_only_state_changes() {
        let events = EventSystem::new();
        let (buttons, _sub) = recorded(&events.buttons);
        let mut sim = simulator(&events, 0);

        sim.process_next_wave_btn(false); // floating stays floating
        sim.process_next_wave_btn(true);
        sim.process_next_wave_btn(true);
        sim.process_next_wave_btn(true); // still held
        sim.process_next_wave_btn(false);
        sim.process_next_wave_btn(false);

        let states: Vec<_> = lock(&buttons).iter().map(|b| b.state).collect();
        assert_eq!(
            states,
            vec![
                ButtonState::Pressed,
                ButtonState::Held,
                ButtonState::Released,
                ButtonState::Floating
            ]
        );
    }

    #[test]
    fn eg_dest_pulses_only_when_different() {
        let events = EventSystem::new();
        let (buttons, _sub) = recorded(&events.buttons);
        let mut sim = simulator(&events, 0);
        let current = sim.current_state().state.operators[0]
            .eg_destinations
            .get(EgModDestination::Amplitude);

        sim.set_eg_dest_amplitude(current);
        assert!(lock(&buttons).is_empty());
        sim.set_eg_dest_amplitude(!current);
        assert_eq!(lock(&buttons).len(), 4);
        assert!(lock(&buttons).iter().all(|b| b.control == ButtonControl::EgAmplitude));
    }

    #[test]
    fn status_line_times_out() {
        let events = EventSystem::new();
        let mut sim = simulator(&events, 0);
        sim.tick();

        sim.process_amp_or_amp_vel_pot(0.5);
        assert_eq!(sim.highlighted(), Some(Cell::Amplitude));
        assert!(sim.status_text().starts_with("AMP: "));

        for _ in 0..3 {
            sim.tick();
        }
        assert_eq!(sim.highlighted(), None);
        assert_eq!(sim.status_text(), "PRESET 01 OP 1");
    }

    #[test]
    fn nothing_changed_means_no_refresh() {
        let events = EventSystem::new();
        let mut sim = simulator(&events, 0);
        sim.tick();
        let (refreshes, _sub) = recorded(&events.display);

        sim.process_alt1_btn(true);
        sim.process_alt1_btn(false);
        sim.tick();
        assert!(lock(&refreshes).is_empty());
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let events = EventSystem::new();
        let (buttons, _sub) = recorded(&events.buttons);
        let mut sim = simulator(&events, 0);
        sim.select_operator(0);
        sim.select_wave(9);
        assert!(lock(&buttons).is_empty());
    }
}
