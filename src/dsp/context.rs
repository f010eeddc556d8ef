/// Convert a (possibly fractional) MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: f32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69.0) / 12.0)
}

/// Context passed to operators while rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frequency: Root pitch of the voice (Hz), bend and glide already applied
/// - velocity: Intensity/loudness (0.0-127.0, MIDI-style)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    pub velocity: f32,
}

impl RenderCtx {
    /// Create context from MIDI note (keyboard use case)
    pub fn from_note(sample_rate: f32, note: u8, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency: midi_note_to_freq(note as f32),
            velocity,
        }
    }

    /// Create context from direct frequency
    pub fn from_freq(sample_rate: f32, frequency: f32, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            velocity,
        }
    }

    /// Velocity scaled to `0.0..=1.0`.
    #[inline]
    pub fn velocity_norm(&self) -> f32 {
        if self.velocity.is_finite() {
            (self.velocity / 127.0).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
