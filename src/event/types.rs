#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::preset::VoiceState;

/// A key going down or up.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub note: u8,
    pub velocity: u8,
    pub pressed: bool,
    pub timestamp: u32,
}

impl KeyEvent {
    pub fn on(note: u8, velocity: u8) -> Self {
        Self {
            note,
            velocity,
            pressed: true,
            timestamp: 0,
        }
    }

    pub fn off(note: u8) -> Self {
        Self {
            note,
            velocity: 0,
            pressed: false,
            timestamp: 0,
        }
    }

    pub fn at(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Pitch wheel position in `-1.0..=1.0`. Voices scale it by their bend range.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEvent {
    pub amount: f32,
}

/// Logical parameter a pot turn is aimed at, after Alt routing.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PotControl {
    Frequency,
    Detune,
    Attack,
    AttackExpo,
    Decay,
    DecayExpo,
    Sustain,
    Release,
    ReleaseExpo,
    /// Modulation from source operator `n` (0-based) into the edited operator.
    OpModulation(usize),
    Amplitude,
    AmpVelSens,
    FilterFreq,
    FilterRes,
    FiltVelSens,
    PitchBend,
    GlideTime,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotEvent {
    pub control: PotControl,
    /// Normalized pot position, `0.0..=1.0`.
    pub value: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonControl {
    NextOperator,
    NextWave,
    RatioToggle,
    EgAmplitude,
    EgFrequency,
    EgFilter,
    MonoToggle,
    GlideRetriggerToggle,
    PrevPreset,
    NextPreset,
    WritePreset,
    Alt1,
    Alt2,
}

/// Debounced button state, advanced once per scan.
///
/// ```text
/// Floating ──down──▶ Pressed ──down──▶ Held
///    ▲                  │               │
///    └──up── Released ◀─┴──────up───────┘
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Floating,
    Pressed,
    Held,
    Released,
}

impl ButtonState {
    /// State after one more scan with the switch `down` or not.
    pub fn next(self, down: bool) -> Self {
        match (self, down) {
            (ButtonState::Floating | ButtonState::Released, true) => ButtonState::Pressed,
            (ButtonState::Pressed | ButtonState::Held, true) => ButtonState::Held,
            (ButtonState::Pressed | ButtonState::Held, false) => ButtonState::Released,
            (ButtonState::Floating | ButtonState::Released, false) => ButtonState::Floating,
        }
    }

    /// Pressed or held.
    pub fn is_down(self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Held)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub control: ButtonControl,
    pub state: ButtonState,
}

/// Published by the voice manager after every applied change.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetChangedEvent {
    pub state: VoiceState,
    /// 0-based.
    pub operator_to_edit: usize,
    pub preset_num: usize,
}

/// Inclusive rectangle of the frame buffer that changed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRefreshEvent {
    pub x_start: u32,
    pub y_start: u32,
    pub x_end: u32,
    pub y_end: u32,
}

impl DisplayRefreshEvent {
    /// Rectangle `width` × `height` pixels with its top-left corner at (`x`, `y`).
    /// Both dimensions must be non-zero.
    pub fn from_size(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x_start: x,
            y_start: y,
            x_end: x + width.max(1) - 1,
            y_end: y + height.max(1) - 1,
        }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x_start..=self.x_end).contains(&x) && (self.y_start..=self.y_end).contains(&y)
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x_start: self.x_start.min(other.x_start),
            y_start: self.y_start.min(other.y_start),
            x_end: self.x_end.max(other.x_end),
            y_end: self.y_end.max(other.y_end),
        }
    }

    pub fn width(&self) -> u32 {
        self.x_end - self.x_start + 1
    }

    pub fn height(&self) -> u32 {
        self.y_end - self.y_start + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_walks_the_pulse_sequence() {
        let mut state = ButtonState::Floating;
        let mut seen = Vec::new();
        for down in [true, true, false, false] {
            state = state.next(down);
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                ButtonState::Pressed,
                ButtonState::Held,
                ButtonState::Released,
                ButtonState::Floating
            ]
        );
    }

    #[test]
    fn quick_tap_skips_held() {
        assert_eq!(ButtonState::Pressed.next(false), ButtonState::Released);
        assert_eq!(ButtonState::Released.next(true), ButtonState::Pressed);
    }

    #[test]
    fn refresh_rect_union_and_contains() {
        let a = DisplayRefreshEvent::from_size(0, 0, 10, 7);
        let b = DisplayRefreshEvent::from_size(40, 20, 5, 5);
        let both = a.union(&b);
        assert_eq!(both, DisplayRefreshEvent { x_start: 0, y_start: 0, x_end: 44, y_end: 24 });
        assert!(both.contains(44, 24));
        assert!(!both.contains(45, 0));
        assert_eq!(a.width(), 10);
        assert_eq!(a.height(), 7);
    }
}
