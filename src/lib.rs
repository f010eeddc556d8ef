pub mod assets; // Built-in font and logo bitmaps
pub mod config;
pub mod dsp;
pub mod event; // Typed publish/subscribe buses between input, synth and UI
pub mod io;
pub mod params; // Pot curves and parameter ranges
pub mod preset; // Versioned binary preset storage
pub mod synth; // Operators, voices and the voice manager
pub mod ui; // Embedded LCD simulator

pub use config::Armor8Config;

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Operators per voice.
pub const NUM_OPERATORS: usize = 4;
