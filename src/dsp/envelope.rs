use crate::dsp::{finite_or, ExponentialResponse, RenderCtx};

/*
ADSR Envelope Implementation
============================

This module implements the envelope generator (EG) that every operator
carries. Each segment is shaped by its own exponential response curve.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). Depending on
              the operator's EG destinations it scales amplitude, frequency
              and/or filter cutoff.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  progress    Linear position inside the current segment (0.0 to 1.0). It is
              bent by the segment's response curve before becoming a level.

  expo        Curvature of a segment in percent. 0 % is a straight line.


The Shape: Curved Ramps
-----------------------

  Level
    1.0 ┐     .·╲
        │    ·   ╲.__________
    S   │   ·                ╲
        │  .                  ╲.
    0.0 └.·──────────────────────·.→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)

  attack    level = start + (1 - start) · curve(progress)
  decay     level = S + (1 - S) · curve(1 - progress)
  release   level = start · curve(1 - progress)

`start` is the level the segment began from. That is what makes note_off
during attack, and retrigger during release, click-free.


The Math: Time to Increment
---------------------------

    increment = 1 / max(1, round(time_seconds * sample_rate))

A zero-length segment therefore lasts exactly one sample, and progress hits
1.0 after a whole number of samples.


The State Machine
-----------------

    ┌──────┐  note_on   ┌────────┐ progress=1 ┌───────┐ progress=1 ┌─────┐
    │ Idle │ ─────────→ │ Attack │ ─────────→ │ Decay │ ─────────→ │ Sus │
    └──────┘            └────────┘            └───────┘            └─────┘
        ↑                    │ note_off           │ note_off          │
        │                    ↓                    ↓                   │
        │  progress=1   ┌─────────┐ ←─────────────┴───────────────────┘
        └────────────── │ Release │       note_off
                        └─────────┘

retrigger() jumps back to Attack from whatever level the envelope is at.
*/

// Progress within this distance of 1.0 counts as the end of a segment.
const SEGMENT_EPSILON: f32 = 1e-6;

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate just went high, rising to 1.0
    Decay,   // Reached peak, falling to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, falling to 0
}

pub struct Envelope {
    // ADSR parameters
    attack_time: f32,   // seconds to rise start → 1
    decay_time: f32,    // seconds to fall 1 → sustain
    sustain_level: f32, // level to hold (0.0 - 1.0)
    release_time: f32,  // seconds to fall current → 0

    attack_curve: ExponentialResponse,
    decay_curve: ExponentialResponse,
    release_curve: ExponentialResponse,

    // Runtime state (changes every sample)
    stage: EnvelopeState,
    level: f32,
    progress: f32,    // position inside the current segment
    start_level: f32, // level when the current segment began
}

impl Envelope {
    pub fn new() -> Self {
        Self::adsr(0.0, 0.0, 1.0, 0.0)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self {
            attack_time: 0.0,
            decay_time: 0.0,
            sustain_level: 1.0,
            release_time: 0.0,
            attack_curve: ExponentialResponse::default(),
            decay_curve: ExponentialResponse::default(),
            release_curve: ExponentialResponse::default(),
            stage: EnvelopeState::Idle,
            level: 0.0,
            progress: 0.0,
            start_level: 0.0,
        };
        env.set_attack(attack, 0.0);
        env.set_decay(decay, 0.0);
        env.set_sustain(sustain);
        env.set_release(release, 0.0);
        env
    }

    pub fn set_attack(&mut self, seconds: f32, expo: f32) {
        self.attack_time = seconds_or_zero(seconds);
        self.attack_curve = ExponentialResponse::new(expo);
    }

    pub fn set_decay(&mut self, seconds: f32, expo: f32) {
        self.decay_time = seconds_or_zero(seconds);
        self.decay_curve = ExponentialResponse::new(expo);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.sustain_level = finite_or(level, 0.0).clamp(0.0, 1.0);
    }

    pub fn set_release(&mut self, seconds: f32, expo: f32) {
        self.release_time = seconds_or_zero(seconds);
        self.release_curve = ExponentialResponse::new(expo);
    }

    /// Gate high: start the attack phase from zero.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.start_attack();
    }

    /// Restart the attack from the current level without dropping to zero.
    pub fn retrigger(&mut self) {
        self.start_attack();
    }

    fn start_attack(&mut self) {
        self.start_level = self.level;
        self.progress = 0.0;
        self.stage = EnvelopeState::Attack;
    }

    /// Gate low: start the release phase from current level.
    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.start_level = self.level;
        self.progress = 0.0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample. Called once per sample.
    pub fn next_sample(&mut self, ctx: &RenderCtx) {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                if self.advance(self.attack_time, ctx.sample_rate) {
                    self.level = 1.0;
                    self.enter(EnvelopeState::Decay);
                } else {
                    let shaped = self.attack_curve.response(self.progress);
                    self.level = self.start_level + (1.0 - self.start_level) * shaped;
                }
            }

            EnvelopeState::Decay => {
                if self.advance(self.decay_time, ctx.sample_rate) {
                    self.level = self.sustain_level;
                    self.enter(EnvelopeState::Sustain);
                } else {
                    let shaped = self.decay_curve.response(1.0 - self.progress);
                    self.level = self.sustain_level + (1.0 - self.sustain_level) * shaped;
                }
            }

            EnvelopeState::Sustain => {
                // Hold at sustain level until gate goes low
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                if self.advance(self.release_time, ctx.sample_rate) {
                    self.level = 0.0;
                    self.enter(EnvelopeState::Idle);
                } else {
                    let shaped = self.release_curve.response(1.0 - self.progress);
                    self.level = self.start_level * shaped;
                }
            }
        }

        self.level = finite_or(self.level, 0.0).clamp(0.0, 1.0);
    }

    /// Step the segment progress; true once the segment is complete.
    #[inline]
    fn advance(&mut self, seconds: f32, sample_rate: f32) -> bool {
        let samples = finite_or((seconds * sample_rate).round(), 0.0).max(1.0);
        self.progress += 1.0 / samples;
        self.progress >= 1.0 - SEGMENT_EPSILON
    }

    fn enter(&mut self, stage: EnvelopeState) {
        self.stage = stage;
        self.progress = 0.0;
        self.start_level = self.level;
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            self.next_sample(ctx);
            *sample = self.level;
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.progress = 0.0;
        self.start_level = 0.0;
    }

    /// Get the current envelope level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

fn seconds_or_zero(seconds: f32) -> f32 {
    finite_or(seconds, 0.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(SAMPLE_RATE, 440.0, 127.0)
    }

    fn render_samples(env: &mut Envelope, samples: usize) {
        let ctx = ctx();
        for _ in 0..samples {
            env.next_sample(&ctx);
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(0.01, 0.1, 0.7, 0.2);

        env.note_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_eq!(env.state(), EnvelopeState::Decay);
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(0.01, 0.05, sustain, 0.2);

        env.note_on();
        let attack_decay_samples = ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5;
        render_samples(&mut env, attack_decay_samples);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - sustain).abs() < 1e-6, "sustain level should be held");
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(0.01, 0.05, 0.5, release);

        env.note_on();
        render_samples(&mut env, 20);

        env.note_off();
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert_eq!(env.level(), 0.0);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn full_cycle_always_returns_to_rest() {
        let shapes = [
            (0.0, 0.0, 1.0, 0.0, 0.0),
            (0.005, 0.02, 0.3, 0.05, 2.0),
            (0.02, 0.0, 0.0, 0.01, 100.0),
            (0.0, 0.03, 0.8, 0.0, 50.0),
        ];

        for (attack, decay, sustain, release, expo) in shapes {
            let mut env = Envelope::new();
            env.set_attack(attack, expo);
            env.set_decay(decay, expo);
            env.set_sustain(sustain);
            env.set_release(release, expo);

            env.note_on();
            render_samples(&mut env, 100);
            env.note_off();
            render_samples(&mut env, 100);

            assert_eq!(env.state(), EnvelopeState::Idle, "{attack}/{decay}/{sustain}/{release}");
            assert_eq!(env.level(), 0.0);
        }
    }

    #[test]
    fn zero_length_segments_take_one_sample() {
        let mut env = Envelope::adsr(0.0, 0.0, 0.5, 0.0);
        env.note_on();

        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Decay);
        assert_eq!(env.level(), 1.0);

        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Sustain);

        env.note_off();
        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn linear_attack_is_non_decreasing() {
        let mut env = Envelope::adsr(0.05, 0.1, 0.5, 0.1);
        env.note_on();

        let ctx = ctx();
        let mut previous = 0.0;
        while env.state() == EnvelopeState::Attack {
            env.next_sample(&ctx);
            assert!(env.level() >= previous);
            previous = env.level();
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn retrigger_continues_from_current_level() {
        let mut env = Envelope::adsr(0.01, 0.01, 0.8, 0.1);
        env.note_on();
        render_samples(&mut env, 30);
        env.note_off();
        render_samples(&mut env, 20);

        let before = env.level();
        assert!(before > 0.0);

        env.retrigger();
        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Attack);
        assert!(env.level() >= before, "retrigger dropped from {before} to {}", env.level());
    }

    #[test]
    fn levels_stay_in_unit_range_with_garbage_times() {
        let mut env = Envelope::adsr(f32::NAN, -1.0, 4.0, f32::INFINITY);
        env.note_on();
        let ctx = ctx();
        for _ in 0..50 {
            env.next_sample(&ctx);
            assert!((0.0..=1.0).contains(&env.level()));
        }
    }
}
