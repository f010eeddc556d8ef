//! Versioned binary preset storage.
//!
//! A preset file is a [`PresetHeader`] followed by a fixed number of
//! [`VoiceState`] records. Files written by older firmware are migrated in
//! place by [`PresetStore::upgrade_presets`].

pub mod codec;
pub mod error;
pub mod file;
pub mod state;
pub mod store;
pub mod upgrade;

pub use codec::{PresetRecord, RecordLayout};
pub use error::PresetError;
pub use file::{FsPresetFile, MemoryPresetFile, PresetFile};
pub use state::{EgDestinations, EgModDestination, OperatorState, PresetHeader, VoiceState};
pub use store::PresetStore;
pub use upgrade::{migrate, Migration, PresetUpgrader};
