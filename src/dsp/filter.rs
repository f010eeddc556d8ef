use std::f32::consts::TAU;

use crate::dsp::{finite_or, RenderCtx};

/*
Resonant Low-pass (TPT State-Variable Filter)
=============================================

Every operator runs its oscillator through one of these. The topology-
preserving SVF keeps two integrator states and stays stable while the cutoff
is being swept per sample by the envelope.

  g = tan(π · fc / fs)          prewarped integrator gain
  k = 2 - 2 · resonance         damping; k → 0 is self-oscillation

Resonance is capped below 1.0 so k never reaches zero, and the cutoff is kept
between 20 Hz and 0.49 · fs where tan() is well behaved.
*/

const MIN_CUTOFF: f32 = 20.0;
const MAX_RESONANCE: f32 = 0.98;

pub struct Filter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

impl Filter {
    pub fn new() -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
        }
    }

    #[inline]
    fn compute_g(cutoff_hz: f32, sample_rate: f32) -> f32 {
        let max_cutoff = (sample_rate * 0.49).max(MIN_CUTOFF);
        let cutoff = finite_or(cutoff_hz, max_cutoff).clamp(MIN_CUTOFF, max_cutoff);
        (TAU * cutoff / (2.0 * sample_rate)).tan()
    }

    #[inline]
    fn compute_k(resonance: f32) -> f32 {
        2.0 - 2.0 * finite_or(resonance, 0.0).clamp(0.0, MAX_RESONANCE)
    }

    /// Filter one sample with the given cutoff (Hz) and resonance (0..1).
    #[inline]
    pub fn next_sample(&mut self, sample: f32, cutoff_hz: f32, resonance: f32, ctx: &RenderCtx) -> f32 {
        let g = Self::compute_g(cutoff_hz, ctx.sample_rate);
        let k = Self::compute_k(resonance);

        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = finite_or(sample, 0.0) - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        if !(v2.is_finite() && self.ic1eq.is_finite() && self.ic2eq.is_finite()) {
            self.reset();
            return 0.0;
        }

        v2
    }

    /// Filter a block in place with fixed settings.
    pub fn render(&mut self, buffer: &mut [f32], cutoff_hz: f32, resonance: f32, ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, cutoff_hz, resonance, ctx);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}
