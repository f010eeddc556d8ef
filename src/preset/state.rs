#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::OscillatorMode;
use crate::NUM_OPERATORS;

/// Which envelope destinations an operator's EG drives.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EgModDestination {
    Amplitude,
    Frequency,
    Filter,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EgDestinations {
    pub amplitude: bool,
    pub frequency: bool,
    pub filter: bool,
}

impl EgDestinations {
    pub fn get(&self, dest: EgModDestination) -> bool {
        match dest {
            EgModDestination::Amplitude => self.amplitude,
            EgModDestination::Frequency => self.frequency,
            EgModDestination::Filter => self.filter,
        }
    }

    pub fn set(&mut self, dest: EgModDestination, on: bool) {
        match dest {
            EgModDestination::Amplitude => self.amplitude = on,
            EgModDestination::Frequency => self.frequency = on,
            EgModDestination::Filter => self.filter = on,
        }
    }
}

/// Every stored parameter of one operator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorState {
    /// Hz in fixed mode, multiple of the root note in ratio mode.
    pub frequency: f32,
    pub use_ratio: bool,
    pub wave: OscillatorMode,
    pub attack: f32,
    pub attack_expo: f32,
    pub decay: f32,
    pub decay_expo: f32,
    pub sustain: f32,
    pub release: f32,
    pub release_expo: f32,
    pub eg_destinations: EgDestinations,
    /// `mod_amounts[i]` is how strongly operator `i` modulates this one.
    pub mod_amounts: [f32; NUM_OPERATORS],
    pub amplitude: f32,
    pub filter_freq: f32,
    pub filter_res: f32,
    pub amp_vel_sens: f32,
    pub filt_vel_sens: f32,
    /// Cents.
    pub detune: i32,
}

impl Default for OperatorState {
    fn default() -> Self {
        Self {
            frequency: 1000.0,
            use_ratio: false,
            wave: OscillatorMode::Sine,
            attack: 0.0,
            attack_expo: 2.0,
            decay: 0.0,
            decay_expo: 2.0,
            sustain: 1.0,
            release: 0.0,
            release_expo: 2.0,
            eg_destinations: EgDestinations::default(),
            mod_amounts: [0.0; NUM_OPERATORS],
            amplitude: 0.0,
            filter_freq: 20_000.0,
            filter_res: 0.0,
            amp_vel_sens: 0.0,
            filt_vel_sens: 0.0,
            detune: 0,
        }
    }
}

/// Complete preset snapshot: four operators plus the voice-wide settings.
///
/// `VoiceState::default()` is the "init" patch every empty or unreadable
/// preset slot is filled with.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceState {
    pub operators: [OperatorState; NUM_OPERATORS],
    pub monophonic: bool,
    pub pitch_bend_semitones: u32,
    pub glide_time: f32,
    pub glide_retrigger: bool,
}

impl Default for VoiceState {
    fn default() -> Self {
        Self {
            operators: [OperatorState::default(); NUM_OPERATORS],
            monophonic: false,
            pitch_bend_semitones: 1,
            glide_time: 0.0,
            glide_retrigger: false,
        }
    }
}

/// Version stamp at the front of the preset file.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, Eq)]
pub struct PresetHeader {
    pub version_major: i32,
    pub version_minor: i32,
    pub version_patch: i32,
    pub initialized: bool,
}

impl PresetHeader {
    /// Layout version written by this crate.
    pub const CURRENT: PresetHeader = PresetHeader {
        version_major: 1,
        version_minor: 0,
        version_patch: 0,
        initialized: true,
    };

    pub fn version(&self) -> (i32, i32, i32) {
        (self.version_major, self.version_minor, self.version_patch)
    }
}

// Headers compare by version only; the initialized flag is bookkeeping.
impl PartialEq for PresetHeader {
    fn eq(&self, other: &Self) -> bool {
        self.version() == other.version()
    }
}
