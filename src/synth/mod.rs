// Purpose: FM operators, voices and the voice manager
// This layer sits above the DSP primitives and below the event system

pub mod manager;
pub mod message;
pub mod operator;
pub mod voice;

pub use manager::VoiceManager;
pub use message::{MessageReceiver, NoMessages, SynthMessage};
pub use operator::Operator;
pub use voice::{Voice, VoiceActivity};
