//! Publish/subscribe wiring between device input, the voice manager and the UI.

pub mod bus;
pub mod types;

pub use bus::{EventBus, Subscription};
pub use types::{
    ButtonControl, ButtonEvent, ButtonState, DisplayRefreshEvent, KeyEvent, PitchEvent, PotControl,
    PotEvent, PresetChangedEvent,
};

/// One bus per event kind. Cloning shares the buses.
#[derive(Clone, Default)]
pub struct EventSystem {
    pub keys: EventBus<KeyEvent>,
    pub pitch: EventBus<PitchEvent>,
    pub pots: EventBus<PotEvent>,
    pub buttons: EventBus<ButtonEvent>,
    pub presets: EventBus<PresetChangedEvent>,
    pub display: EventBus<DisplayRefreshEvent>,
}

impl EventSystem {
    pub fn new() -> Self {
        Self::default()
    }
}
