//! Parameter ranges and pot curves.
//!
//! Every pot on the device produces a normalized position in `0.0..=1.0`. A
//! [`ParamRange`] turns that position into a value in the parameter's own
//! unit. Frequencies use a power curve so the lower half of the pot travel
//! covers the musically useful range.

/// Maps a normalized pot position onto `min..=max` as `min + span * p^skew`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub skew: f32,
}

impl ParamRange {
    pub const fn linear(min: f32, max: f32) -> Self {
        Self { min, max, skew: 1.0 }
    }

    pub const fn skewed(min: f32, max: f32, skew: f32) -> Self {
        Self { min, max, skew }
    }

    /// Value for a pot position. Out-of-range or non-finite positions clamp.
    pub fn map(&self, position: f32) -> f32 {
        let p = if position.is_finite() {
            position.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let shaped = if self.skew == 1.0 { p } else { p.powf(self.skew) };
        self.clamp(self.min + (self.max - self.min) * shaped)
    }

    /// Pot position that would produce `value`.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        let linear = ((self.clamp(value) - self.min) / span).clamp(0.0, 1.0);
        if self.skew == 1.0 {
            linear
        } else {
            linear.powf(1.0 / self.skew)
        }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.min
        }
    }
}

// Skew 5.32 puts the pot midpoint at roughly 500 Hz.
pub const FREQUENCY: ParamRange = ParamRange::skewed(1.0, 20_000.0, 5.32);
pub const RATIO: ParamRange = ParamRange::skewed(0.125, 16.0, 2.0);
/// Cents.
pub const DETUNE: ParamRange = ParamRange::linear(-100.0, 100.0);
/// Seconds.
pub const ATTACK: ParamRange = ParamRange::skewed(0.0, 3.0, 2.0);
pub const DECAY: ParamRange = ParamRange::skewed(0.0, 3.0, 2.0);
pub const SUSTAIN: ParamRange = ParamRange::linear(0.0, 1.0);
pub const RELEASE: ParamRange = ParamRange::skewed(0.0, 3.0, 2.0);
/// Envelope curvature in percent.
pub const EXPO: ParamRange = ParamRange::linear(0.0, 100.0);
pub const OP_MOD: ParamRange = ParamRange::linear(0.0, 1.0);
pub const AMPLITUDE: ParamRange = ParamRange::linear(0.0, 1.0);
pub const FILTER_FREQ: ParamRange = ParamRange::skewed(20.0, 20_000.0, 5.38);
pub const FILTER_RES: ParamRange = ParamRange::linear(0.0, 1.0);
pub const VELOCITY: ParamRange = ParamRange::linear(0.0, 1.0);
/// Semitones.
pub const PITCH_BEND: ParamRange = ParamRange::linear(1.0, 12.0);
/// Seconds.
pub const GLIDE_TIME: ParamRange = ParamRange::linear(0.0, 1.0);
