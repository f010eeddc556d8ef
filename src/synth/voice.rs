use crate::dsp::context::midi_note_to_freq;
use crate::dsp::{EnvelopeState, RenderCtx};
use crate::event::{KeyEvent, PitchEvent};
use crate::preset::VoiceState;
use crate::synth::operator::Operator;
use crate::NUM_OPERATORS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceActivity {
    Free,      // All envelopes idle
    Active,    // Key held, envelopes in attack/decay/sustain
    Releasing, // Key released, envelopes in release phase
}

/// Four operators wired into one FM voice.
pub struct Voice {
    operators: [Operator; NUM_OPERATORS],
    previous_outputs: [f32; NUM_OPERATORS], // one-sample delayed modulation inputs
    sample_rate: f32,

    active_key: Option<KeyEvent>,
    gate: bool,
    age: u64,
    velocity: f32,

    // Pitch in (fractional) MIDI notes
    pitch: f32,
    target_pitch: f32,
    glide_step: f32, // semitones per sample

    bend: f32, // -1.0..1.0
    bend_range: f32,
    glide_time: f32,
    glide_enabled: bool,
    glide_retrigger: bool,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            operators: std::array::from_fn(|_| Operator::new()),
            previous_outputs: [0.0; NUM_OPERATORS],
            sample_rate,
            active_key: None,
            gate: false,
            age: 0,
            velocity: 0.0,
            pitch: 60.0,
            target_pitch: 60.0,
            glide_step: 0.0,
            bend: 0.0,
            bend_range: 1.0,
            glide_time: 0.0,
            glide_enabled: false,
            glide_retrigger: false,
        }
    }

    /// Apply every operator and global parameter of a preset.
    pub fn apply_state(&mut self, state: &VoiceState) {
        for (op, op_state) in self.operators.iter_mut().zip(state.operators.iter()) {
            op.apply_state(op_state);
        }
        self.set_pitch_bend_semitones(state.pitch_bend_semitones);
        self.set_glide_time(state.glide_time);
        self.set_glide_retrigger(state.glide_retrigger);
    }

    pub fn operator(&self, index: usize) -> Option<&Operator> {
        self.operators.get(index)
    }

    pub fn operator_mut(&mut self, index: usize) -> Option<&mut Operator> {
        self.operators.get_mut(index)
    }

    pub fn set_pitch_bend_semitones(&mut self, semitones: u32) {
        self.bend_range = semitones as f32;
    }

    pub fn set_glide_time(&mut self, seconds: f32) {
        self.glide_time = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    }

    pub fn set_glide_retrigger(&mut self, retrigger: bool) {
        self.glide_retrigger = retrigger;
    }

    /// Glide only happens on legato notes of a voice that has glide enabled
    /// (the monophonic voice).
    pub fn set_use_glide(&mut self, use_glide: bool) {
        self.glide_enabled = use_glide;
    }

    pub fn on_key_event(&mut self, event: &KeyEvent, age: u64) {
        if event.pressed {
            self.press(event, age);
        } else if self.gate && self.active_key.is_some_and(|key| key.note == event.note) {
            self.release();
        }
    }

    fn press(&mut self, event: &KeyEvent, age: u64) {
        let legato = self.glide_enabled && self.gate;
        self.target_pitch = event.note as f32;

        if legato && self.glide_time > 0.0 {
            let samples = (self.glide_time * self.sample_rate).max(1.0);
            self.glide_step = (self.target_pitch - self.pitch).abs() / samples;
        } else {
            self.pitch = self.target_pitch;
            self.glide_step = 0.0;
        }

        self.velocity = event.velocity as f32;
        self.active_key = Some(*event);
        self.gate = true;
        self.age = age;

        if legato {
            if self.glide_retrigger {
                self.operators.iter_mut().for_each(Operator::retrigger);
            }
        } else {
            self.previous_outputs = [0.0; NUM_OPERATORS];
            self.operators.iter_mut().for_each(Operator::note_on);
        }
    }

    /// Release all four envelopes.
    pub fn release(&mut self) {
        self.gate = false;
        self.operators.iter_mut().for_each(Operator::note_off);
    }

    pub fn on_pitch_event(&mut self, event: &PitchEvent) {
        self.bend = if event.amount.is_finite() {
            event.amount.clamp(-1.0, 1.0)
        } else {
            0.0
        };
    }

    /// Evaluate the operator graph for one sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.pitch != self.target_pitch {
            let remaining = self.target_pitch - self.pitch;
            if remaining.abs() <= self.glide_step || self.glide_step <= 0.0 {
                self.pitch = self.target_pitch;
            } else {
                self.pitch += self.glide_step.copysign(remaining);
            }
        }

        let frequency = midi_note_to_freq(self.pitch + self.bend * self.bend_range);
        let ctx = RenderCtx::from_freq(self.sample_rate, frequency, self.velocity);
        let inputs = self.previous_outputs;

        let mut mix = 0.0;
        for (op, previous) in self.operators.iter_mut().zip(self.previous_outputs.iter_mut()) {
            let out = op.next_sample(&ctx, &inputs);
            *previous = out;
            mix += out;
        }

        // A finished release hands the voice back with no key.
        if !self.gate && self.active_key.is_some() && self.is_idle() {
            self.active_key = None;
        }
        mix
    }

    pub fn is_idle(&self) -> bool {
        self.operators.iter().all(Operator::is_idle)
    }

    pub fn state(&self) -> VoiceActivity {
        if self.gate {
            VoiceActivity::Active
        } else if self.is_idle() {
            VoiceActivity::Free
        } else {
            VoiceActivity::Releasing
        }
    }

    /// EG stage of the first operator; all four share gate timing.
    pub fn eg_state(&self) -> EnvelopeState {
        self.operators[0].eg_state()
    }

    pub fn active_key(&self) -> Option<&KeyEvent> {
        self.active_key.as_ref()
    }

    pub fn note(&self) -> Option<u8> {
        self.active_key.map(|key| key.note)
    }

    pub fn is_gated(&self) -> bool {
        self.gate
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    /// Current pitch in MIDI notes, excluding pitch bend.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn audible_state() -> VoiceState {
        let mut state = VoiceState::default();
        for op in state.operators.iter_mut() {
            op.amplitude = 0.25;
            op.eg_destinations.amplitude = true;
            op.release = 0.01;
        }
        state
    }

    fn voice() -> Voice {
        let mut voice = Voice::new(SAMPLE_RATE);
        voice.apply_state(&audible_state());
        voice
    }

    fn run(voice: &mut Voice, samples: usize) -> f32 {
        (0..samples).fold(0.0f32, |acc, _| acc.max(voice.next_sample().abs()))
    }

    #[test]
    fn starts_free_and_goes_active_on_note_on() {
        let mut voice = voice();
        assert_eq!(voice.state(), VoiceActivity::Free);

        voice.on_key_event(&KeyEvent::on(60, 100), 1);
        assert_eq!(voice.state(), VoiceActivity::Active);
        assert_eq!(voice.note(), Some(60));
        assert!(run(&mut voice, 480) > 0.0);
    }

    #[test]
    fn note_off_for_other_key_is_ignored() {
        let mut voice = voice();
        voice.on_key_event(&KeyEvent::on(60, 100), 1);
        voice.on_key_event(&KeyEvent::off(62), 2);
        assert_eq!(voice.state(), VoiceActivity::Active);

        voice.on_key_event(&KeyEvent::off(60), 3);
        assert_eq!(voice.state(), VoiceActivity::Releasing);
        run(&mut voice, 2_000);
        assert_eq!(voice.state(), VoiceActivity::Free);
        assert!(voice.is_idle());
    }

    #[test]
    fn finished_release_clears_the_key() {
        let mut voice = voice();
        voice.on_key_event(&KeyEvent::on(62, 100), 1);
        voice.on_key_event(&KeyEvent::off(62), 2);
        run(&mut voice, 10);
        assert_eq!(voice.note(), Some(62));

        run(&mut voice, 2_000);
        assert!(voice.is_idle());
        assert_eq!(voice.note(), None);
        assert!(voice.active_key().is_none());
    }

    #[test]
    fn glide_moves_pitch_linearly_to_target() {
        let mut voice = voice();
        voice.set_use_glide(true);
        voice.set_glide_time(0.01); // 480 samples

        voice.on_key_event(&KeyEvent::on(60, 100), 1);
        assert_eq!(voice.pitch(), 60.0);

        voice.on_key_event(&KeyEvent::on(72, 100), 2);
        run(&mut voice, 240);
        assert!((voice.pitch() - 66.0).abs() < 0.1, "pitch {}", voice.pitch());
        run(&mut voice, 241);
        assert_eq!(voice.pitch(), 72.0);
    }

    #[test]
    fn no_glide_without_legato() {
        let mut voice = voice();
        voice.set_use_glide(true);
        voice.set_glide_time(0.5);
        voice.on_key_event(&KeyEvent::on(60, 100), 1);
        voice.on_key_event(&KeyEvent::off(60), 2);
        voice.on_key_event(&KeyEvent::on(67, 100), 3);
        assert_eq!(voice.pitch(), 67.0);
    }

    #[test]
    fn legato_without_retrigger_keeps_envelope_running() {
        let mut voice = voice();
        voice.set_use_glide(true);
        voice.on_key_event(&KeyEvent::on(60, 100), 1);
        run(&mut voice, 10);
        assert_eq!(voice.eg_state(), EnvelopeState::Sustain);

        voice.on_key_event(&KeyEvent::on(64, 100), 2);
        assert_eq!(voice.eg_state(), EnvelopeState::Sustain);

        voice.set_glide_retrigger(true);
        voice.on_key_event(&KeyEvent::on(67, 100), 3);
        assert_eq!(voice.eg_state(), EnvelopeState::Attack);
    }

    #[test]
    fn pitch_bend_does_not_retrigger() {
        let mut voice = voice();
        voice.on_key_event(&KeyEvent::on(60, 100), 1);
        run(&mut voice, 10);
        voice.on_pitch_event(&PitchEvent { amount: 1.0 });
        assert_eq!(voice.eg_state(), EnvelopeState::Sustain);
        assert_eq!(voice.pitch(), 60.0);
    }
}
