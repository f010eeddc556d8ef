//! Boundary between raw MIDI input and the synth's message queue.

pub mod converter;
pub mod midi;

pub use converter::midi_to_synth;
pub use midi::MidiEvent;
