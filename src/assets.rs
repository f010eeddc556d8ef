//! Built-in bitmaps for the display and the error raised when loading one.

use std::fmt;

/// A font or sprite byte buffer that does not describe a usable bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Fewer bytes than the header promises.
    Truncated { expected: usize, actual: usize },
    /// A zero width, height or glyph count.
    EmptyBitmap,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Truncated { expected, actual } => {
                write!(f, "bitmap needs {} bytes, got {}", expected, actual)
            }
            AssetError::EmptyBitmap => write!(f, "bitmap has no pixels"),
        }
    }
}

impl std::error::Error for AssetError {}

pub const FONT_3X5: [u8; 299] = [
    0x03, 0x05, 0x20, 0x3B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x40, 0x40,
    0x00, 0x40, 0xA0, 0xA0, 0x00, 0x00, 0x00, 0xA0, 0xE0, 0xA0, 0xE0, 0xA0,
    0x60, 0xC0, 0x40, 0x60, 0xC0, 0xA0, 0x20, 0x40, 0x80, 0xA0, 0x40, 0xA0,
    0x40, 0xA0, 0x60, 0x40, 0x40, 0x00, 0x00, 0x00, 0x20, 0x40, 0x40, 0x40,
    0x20, 0x80, 0x40, 0x40, 0x40, 0x80, 0x00, 0xA0, 0x40, 0xA0, 0x00, 0x00,
    0x40, 0xE0, 0x40, 0x00, 0x00, 0x00, 0x00, 0x40, 0x80, 0x00, 0x00, 0xE0,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x20, 0x20, 0x40, 0x80, 0x80,
    0xE0, 0xA0, 0xA0, 0xA0, 0xE0, 0x40, 0xC0, 0x40, 0x40, 0xE0, 0xE0, 0x20,
    0xE0, 0x80, 0xE0, 0xE0, 0x20, 0x60, 0x20, 0xE0, 0xA0, 0xA0, 0xE0, 0x20,
    0x20, 0xE0, 0x80, 0xE0, 0x20, 0xE0, 0xE0, 0x80, 0xE0, 0xA0, 0xE0, 0xE0,
    0x20, 0x40, 0x40, 0x40, 0xE0, 0xA0, 0xE0, 0xA0, 0xE0, 0xE0, 0xA0, 0xE0,
    0x20, 0xE0, 0x00, 0x40, 0x00, 0x40, 0x00, 0x00, 0x40, 0x00, 0x40, 0x80,
    0x20, 0x40, 0x80, 0x40, 0x20, 0x00, 0xE0, 0x00, 0xE0, 0x00, 0x80, 0x40,
    0x20, 0x40, 0x80, 0xE0, 0x20, 0x60, 0x00, 0x40, 0xE0, 0xA0, 0xA0, 0x80,
    0xE0, 0x40, 0xA0, 0xE0, 0xA0, 0xA0, 0xC0, 0xA0, 0xC0, 0xA0, 0xC0, 0x60,
    0x80, 0x80, 0x80, 0x60, 0xC0, 0xA0, 0xA0, 0xA0, 0xC0, 0xE0, 0x80, 0xC0,
    0x80, 0xE0, 0xE0, 0x80, 0xC0, 0x80, 0x80, 0x60, 0x80, 0xA0, 0xA0, 0x60,
    0xA0, 0xA0, 0xE0, 0xA0, 0xA0, 0xE0, 0x40, 0x40, 0x40, 0xE0, 0x20, 0x20,
    0x20, 0xA0, 0x40, 0xA0, 0xA0, 0xC0, 0xA0, 0xA0, 0x80, 0x80, 0x80, 0x80,
    0xE0, 0xA0, 0xE0, 0xE0, 0xA0, 0xA0, 0xC0, 0xA0, 0xA0, 0xA0, 0xA0, 0x40,
    0xA0, 0xA0, 0xA0, 0x40, 0xC0, 0xA0, 0xC0, 0x80, 0x80, 0x40, 0xA0, 0xA0,
    0xC0, 0x60, 0xC0, 0xA0, 0xC0, 0xA0, 0xA0, 0x60, 0x80, 0x40, 0x20, 0xC0,
    0xE0, 0x40, 0x40, 0x40, 0x40, 0xA0, 0xA0, 0xA0, 0xA0, 0xE0, 0xA0, 0xA0,
    0xA0, 0xA0, 0x40, 0xA0, 0xA0, 0xE0, 0xE0, 0xA0, 0xA0, 0xA0, 0x40, 0xA0,
    0xA0, 0xA0, 0xA0, 0x40, 0x40, 0x40, 0xE0, 0x20, 0x40, 0x80, 0xE0,
];

pub const LOGO: [u8; 98] = [
    0x30, 0x10, 0x18, 0x78, 0x66, 0x18, 0x78, 0x7E, 0x18, 0x78, 0x66, 0x18,
    0x78, 0x7E, 0x66, 0x66, 0x7E, 0x66, 0x66, 0x66, 0x66, 0x66, 0x7E, 0x66,
    0x66, 0x66, 0x7E, 0x78, 0x7E, 0x66, 0x78, 0x7E, 0x7E, 0x78, 0x7E, 0x66,
    0x78, 0x7E, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x18, 0x66, 0x7E, 0x66, 0x66, 0x66, 0x18,
    0x66, 0x7E, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08, 0x00, 0x08,
    0x00, 0x08, 0x00, 0x77, 0x00, 0x77, 0x00, 0x77, 0x80, 0x80, 0x80, 0x80,
    0x80, 0x80, 0x77, 0x00, 0x77, 0x00, 0x77, 0x00, 0x08, 0x00, 0x08, 0x00,
    0x08, 0x00,
];
