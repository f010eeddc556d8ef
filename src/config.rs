//! Runtime configuration shared by the voice manager, preset store and display.

use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// File name the ARMor8 firmware uses for its preset table.
pub const DEFAULT_PRESET_FILE: &str = "ARMor8Presets.spf";

/// Builder-style configuration for an ARMor8 instance.
///
/// ```
/// use armor8::Armor8Config;
///
/// let config = Armor8Config::new().sample_rate(44_100.0).voices(4);
/// assert_eq!(config.num_voices, 4);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Armor8Config {
    pub sample_rate: f32,
    pub num_voices: usize,
    pub preset_capacity: usize,
    pub preset_path: PathBuf,
    /// Ticks spent on the loading logo before the first full redraw.
    pub boot_ticks: u32,
    /// Ticks a transient status message stays on screen.
    pub status_ticks: u32,
    pub tick_interval: Duration,
}

impl Armor8Config {
    pub fn new() -> Self {
        Self {
            sample_rate: 48_000.0,
            num_voices: 8,
            preset_capacity: 20,
            preset_path: PathBuf::from(DEFAULT_PRESET_FILE),
            boot_ticks: 100,
            status_ticks: 30,
            tick_interval: Duration::from_millis(33),
        }
    }

    pub fn sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the polyphony. At least one voice is always allocated.
    pub fn voices(mut self, num_voices: usize) -> Self {
        self.num_voices = num_voices.max(1);
        self
    }

    pub fn preset_capacity(mut self, capacity: usize) -> Self {
        self.preset_capacity = capacity.max(1);
        self
    }

    pub fn preset_path(mut self, path: impl AsRef<Path>) -> Self {
        self.preset_path = path.as_ref().to_path_buf();
        self
    }

    pub fn boot_ticks(mut self, ticks: u32) -> Self {
        self.boot_ticks = ticks;
        self
    }

    pub fn status_ticks(mut self, ticks: u32) -> Self {
        self.status_ticks = ticks;
        self
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}

impl Default for Armor8Config {
    fn default() -> Self {
        Self::new()
    }
}
