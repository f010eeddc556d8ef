//! Low-level DSP primitives used by the operators.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; routing and modulation live in `synth`.

/// Per-sample render context (sample rate, pitch, velocity).
pub mod context;
/// Attack/decay/sustain/release envelope generator with shaped segments.
pub mod envelope;
/// Resonant low-pass state-variable filter.
pub mod filter;
/// Band-limited oscillator waveforms.
pub mod oscillator;
/// Exponential curve used to shape envelope segments.
pub mod response;

pub use context::RenderCtx;
pub use envelope::{Envelope, EnvelopeState};
pub use filter::Filter;
pub use oscillator::{OscillatorMode, PolyBlepOsc};
pub use response::ExponentialResponse;

/// Replace NaN and infinities with `fallback`.
#[inline]
pub(crate) fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
