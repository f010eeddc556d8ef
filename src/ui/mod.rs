//! Simulation of the ARMor8 front panel: a 128x64 monochrome screen plus
//! the pots and buttons that drive the synth through the event buses.

pub mod font;
pub mod framebuffer;
pub mod layout;
pub mod simulator;
pub mod sprite;

pub use font::Font;
pub use framebuffer::{ColorProfile, FrameBuffer, Pixel, Rect, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use layout::Cell;
pub use simulator::DisplaySimulator;
pub use sprite::Sprite;
