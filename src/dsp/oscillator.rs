use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::finite_or;

/*
Band-limited Oscillator
=======================

Each operator owns one oscillator. The phase is kept in cycles (0.0..1.0)
and advances by `frequency / sample_rate` every sample. FM on this device is
really phase modulation: the modulation input is added to the phase (also in
cycles) before the waveform is evaluated, and never accumulates.

Waveforms:

  Sine      closed form, sin(2π·t)
  Sawtooth  2t - 1, with a PolyBLEP residual subtracted at the wrap
  Square    ±1, with PolyBLEP residuals at both edges
  Triangle  leaky integral of the band-limited square

PolyBLEP
--------

A naive saw or square jumps instantaneously, which aliases badly. PolyBLEP
replaces the sample on each side of the jump with a 2nd order polynomial
that approximates a band-limited step:

          t < dt        (t/dt)·2 - (t/dt)² - 1
          t > 1 - dt    ((t-1)/dt)² + 2·(t-1)/dt + 1
          otherwise     0

where `dt` is the phase increment. Only the two samples around the edge are
touched, so the cost is a couple of compares per sample.
*/

/// Waveform selected for an operator. The discriminant is the preset wire value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorMode {
    #[default]
    Sine = 0,
    Triangle = 1,
    Square = 2,
    Sawtooth = 3,
}

impl OscillatorMode {
    pub const ALL: [OscillatorMode; 4] = [
        OscillatorMode::Sine,
        OscillatorMode::Triangle,
        OscillatorMode::Square,
        OscillatorMode::Sawtooth,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Cycle forward, wrapping Sawtooth back to Sine.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            OscillatorMode::Sine => "SIN",
            OscillatorMode::Triangle => "TRI",
            OscillatorMode::Square => "SQR",
            OscillatorMode::Sawtooth => "SAW",
        }
    }
}

impl TryFrom<u8> for OscillatorMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value as usize).ok_or(value)
    }
}

// Fraction of the triangle integrator drained per cycle, so DC offsets from
// phase jumps decay at the same rate in cycles at any pitch.
const TRIANGLE_LEAK_PER_CYCLE: f32 = 0.05;

pub struct PolyBlepOsc {
    mode: OscillatorMode,
    phase: f32,    // position in the cycle, 0.0..1.0
    triangle: f32, // integrator state for the triangle wave
}

impl PolyBlepOsc {
    pub fn new(mode: OscillatorMode) -> Self {
        Self {
            mode,
            phase: 0.0,
            triangle: -1.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorMode::Sine)
    }

    pub fn mode(&self) -> OscillatorMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OscillatorMode) {
        self.mode = mode;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Restart the cycle. Called on note-on so every note starts in phase.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.triangle = -1.0;
    }

    /// Produce one sample and advance the phase.
    ///
    /// `phase_offset` is in cycles and only affects this sample.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32, phase_offset: f32) -> f32 {
        let dt = finite_or(frequency / sample_rate, 0.0).clamp(0.0, 0.5);
        let t = wrap(self.phase + finite_or(phase_offset, 0.0));

        let sample = match self.mode {
            OscillatorMode::Sine => (TAU * t).sin(),
            OscillatorMode::Sawtooth => 2.0 * t - 1.0 - poly_blep(t, dt),
            OscillatorMode::Square => square(t, dt),
            OscillatorMode::Triangle => {
                // A half cycle of the square at ±1 integrates to a swing of 2.
                let leak = 1.0 - TRIANGLE_LEAK_PER_CYCLE * dt;
                self.triangle = (self.triangle + 4.0 * dt * square(t, dt)) * leak;
                self.triangle = finite_or(self.triangle, 0.0).clamp(-1.0, 1.0);
                self.triangle
            }
        };

        self.phase = wrap(self.phase + dt);
        sample.clamp(-1.0, 1.0)
    }

    /// Render a block at a fixed frequency with no modulation.
    pub fn render(&mut self, buffer: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate, 0.0);
        }
    }
}

/// Wrap a phase into `0.0..1.0`.
#[inline]
fn wrap(phase: f32) -> f32 {
    let wrapped = phase - phase.floor();
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

#[inline]
fn square(t: f32, dt: f32) -> f32 {
    let naive = if t < 0.5 { 1.0 } else { -1.0 };
    naive + poly_blep(t, dt) - poly_blep(wrap(t + 0.5), dt)
}

#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}
