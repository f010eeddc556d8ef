use crate::dsp::{finite_or, Envelope, EnvelopeState, Filter, OscillatorMode, PolyBlepOsc, RenderCtx};
use crate::preset::{EgDestinations, EgModDestination, OperatorState};
use crate::NUM_OPERATORS;

/*
FM Operator
===========

One operator is a small subtractive voice of its own:

    phase mod ──┐
                ▼
    ┌─────┐   ┌───────┐   ┌───────────┐   ┌─────┐
    │ EG  │──▶│  osc  │──▶│ low-pass  │──▶│ amp │──▶ out
    └─────┘   └───────┘   └───────────┘   └─────┘
       │          ▲             ▲            ▲
       └──────────┴─────────────┴────────────┘
            (frequency, cutoff and amplitude
             each follow the EG when enabled)

Frequency is either fixed in Hz or a ratio of the voice's root pitch, then
detuned in cents. The phase modulation input is the weighted sum of the
previous outputs of all four operators (self-feedback included).

Velocity sensitivity blends between "ignore velocity" (0) and "fully
velocity scaled" (1):

    scale = 1 - sens · (1 - velocity / 127)
*/

// Lowest frequency the oscillator is allowed to run at.
const MIN_FREQUENCY: f32 = 0.01;

pub struct Operator {
    osc: PolyBlepOsc,
    eg: Envelope,
    filter: Filter,

    frequency: f32, // Hz, or ratio when use_ratio
    use_ratio: bool,
    detune: i32,        // cents
    detune_factor: f32, // 2^(cents / 1200), cached
    amplitude: f32,
    filter_freq: f32,
    filter_res: f32,
    amp_vel_sens: f32,
    filt_vel_sens: f32,
    eg_destinations: EgDestinations,
    modulation: [f32; NUM_OPERATORS],

    // Shaping parameters kept so `state()` can report them back.
    attack: (f32, f32),
    decay: (f32, f32),
    sustain: f32,
    release: (f32, f32),
}

impl Operator {
    pub fn new() -> Self {
        let mut op = Self {
            osc: PolyBlepOsc::sine(),
            eg: Envelope::new(),
            filter: Filter::new(),
            frequency: 0.0,
            use_ratio: false,
            detune: 0,
            detune_factor: 1.0,
            amplitude: 0.0,
            filter_freq: 0.0,
            filter_res: 0.0,
            amp_vel_sens: 0.0,
            filt_vel_sens: 0.0,
            eg_destinations: EgDestinations::default(),
            modulation: [0.0; NUM_OPERATORS],
            attack: (0.0, 0.0),
            decay: (0.0, 0.0),
            sustain: 1.0,
            release: (0.0, 0.0),
        };
        op.apply_state(&OperatorState::default());
        op
    }

    /// Copy every parameter from a preset snapshot. Running phase and
    /// envelope stage are untouched.
    pub fn apply_state(&mut self, state: &OperatorState) {
        self.set_frequency(state.frequency);
        self.set_ratio(state.use_ratio);
        self.set_wave(state.wave);
        self.set_attack(state.attack, state.attack_expo);
        self.set_decay(state.decay, state.decay_expo);
        self.set_sustain(state.sustain);
        self.set_release(state.release, state.release_expo);
        self.eg_destinations = state.eg_destinations;
        for (source, amount) in state.mod_amounts.iter().enumerate() {
            self.set_modulation(source, *amount);
        }
        self.set_amplitude(state.amplitude);
        self.set_filter_freq(state.filter_freq);
        self.set_filter_res(state.filter_res);
        self.set_vel_sens(state.amp_vel_sens, state.filt_vel_sens);
        self.set_detune(state.detune);
    }

    pub fn state(&self) -> OperatorState {
        OperatorState {
            frequency: self.frequency,
            use_ratio: self.use_ratio,
            wave: self.osc.mode(),
            attack: self.attack.0,
            attack_expo: self.attack.1,
            decay: self.decay.0,
            decay_expo: self.decay.1,
            sustain: self.sustain,
            release: self.release.0,
            release_expo: self.release.1,
            eg_destinations: self.eg_destinations,
            mod_amounts: self.modulation,
            amplitude: self.amplitude,
            filter_freq: self.filter_freq,
            filter_res: self.filter_res,
            amp_vel_sens: self.amp_vel_sens,
            filt_vel_sens: self.filt_vel_sens,
            detune: self.detune,
        }
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = finite_or(frequency, 0.0).max(0.0);
    }

    pub fn set_ratio(&mut self, use_ratio: bool) {
        self.use_ratio = use_ratio;
    }

    pub fn set_wave(&mut self, wave: OscillatorMode) {
        self.osc.set_mode(wave);
    }

    pub fn set_attack(&mut self, seconds: f32, expo: f32) {
        self.attack = (seconds, expo);
        self.eg.set_attack(seconds, expo);
    }

    pub fn set_decay(&mut self, seconds: f32, expo: f32) {
        self.decay = (seconds, expo);
        self.eg.set_decay(seconds, expo);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.sustain = level;
        self.eg.set_sustain(level);
    }

    pub fn set_release(&mut self, seconds: f32, expo: f32) {
        self.release = (seconds, expo);
        self.eg.set_release(seconds, expo);
    }

    pub fn set_eg_destination(&mut self, dest: EgModDestination, on: bool) {
        self.eg_destinations.set(dest, on);
    }

    /// How strongly operator `source` modulates this one. Unknown sources are ignored.
    pub fn set_modulation(&mut self, source: usize, amount: f32) {
        if let Some(slot) = self.modulation.get_mut(source) {
            *slot = finite_or(amount, 0.0);
        }
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = finite_or(amplitude, 0.0).max(0.0);
    }

    pub fn set_filter_freq(&mut self, frequency: f32) {
        self.filter_freq = finite_or(frequency, 0.0).max(0.0);
    }

    pub fn set_filter_res(&mut self, resonance: f32) {
        self.filter_res = finite_or(resonance, 0.0).clamp(0.0, 1.0);
    }

    pub fn set_vel_sens(&mut self, amp: f32, filt: f32) {
        self.set_amp_vel_sens(amp);
        self.set_filt_vel_sens(filt);
    }

    pub fn set_amp_vel_sens(&mut self, sens: f32) {
        self.amp_vel_sens = finite_or(sens, 0.0).clamp(0.0, 1.0);
    }

    pub fn set_filt_vel_sens(&mut self, sens: f32) {
        self.filt_vel_sens = finite_or(sens, 0.0).clamp(0.0, 1.0);
    }

    pub fn set_detune(&mut self, cents: i32) {
        self.detune = cents;
        self.detune_factor = 2.0_f32.powf(cents as f32 / 1200.0);
    }

    pub fn note_on(&mut self) {
        self.osc.reset();
        self.filter.reset();
        self.eg.note_on();
    }

    pub fn note_off(&mut self) {
        self.eg.note_off();
    }

    pub fn retrigger(&mut self) {
        self.eg.retrigger();
    }

    pub fn is_idle(&self) -> bool {
        !self.eg.is_active()
    }

    pub fn eg_level(&self) -> f32 {
        self.eg.level()
    }

    pub fn eg_state(&self) -> EnvelopeState {
        self.eg.state()
    }

    /// Render one sample. `modulation_inputs` are the previous outputs of
    /// the four operators of the same voice.
    #[inline]
    pub fn next_sample(&mut self, ctx: &RenderCtx, modulation_inputs: &[f32; NUM_OPERATORS]) -> f32 {
        self.eg.next_sample(ctx);
        let eg_level = self.eg.level();
        let velocity = ctx.velocity_norm();

        let base = if self.use_ratio {
            ctx.frequency * self.frequency
        } else {
            self.frequency
        };
        let mut frequency = base * self.detune_factor;
        if self.eg_destinations.frequency {
            frequency *= eg_level;
        }
        let nyquist = (ctx.sample_rate * 0.5).max(MIN_FREQUENCY);
        let frequency = finite_or(frequency, MIN_FREQUENCY).clamp(MIN_FREQUENCY, nyquist);

        let phase_mod: f32 = self
            .modulation
            .iter()
            .zip(modulation_inputs)
            .map(|(amount, input)| amount * input)
            .sum();
        let raw = self.osc.next_sample(frequency, ctx.sample_rate, phase_mod);

        let mut cutoff = self.filter_freq * velocity_scale(self.filt_vel_sens, velocity);
        if self.eg_destinations.filter {
            cutoff *= eg_level;
        }
        let filtered = self.filter.next_sample(raw, cutoff, self.filter_res, ctx);

        let mut amplitude = self.amplitude * velocity_scale(self.amp_vel_sens, velocity);
        if self.eg_destinations.amplitude {
            amplitude *= eg_level;
        }
        if amplitude == 0.0 {
            return 0.0;
        }

        finite_or(filtered * amplitude, 0.0)
    }
}

impl Default for Operator {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn velocity_scale(sens: f32, velocity: f32) -> f32 {
    1.0 - sens * (1.0 - velocity)
}
