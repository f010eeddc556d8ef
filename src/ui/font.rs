use crate::assets::AssetError;
use crate::ui::framebuffer::{FrameBuffer, Rect};

const HEADER_LEN: usize = 4;

/// Fixed-width bitmap font, at most 8 pixels wide.
///
/// Byte layout: `[glyph width, glyph height, first char, glyph count]`
/// followed by `height` row bytes per glyph, MSB-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    width: u8,
    height: u8,
    first_char: u8,
    glyph_count: u8,
    glyphs: Vec<u8>,
}

impl Font {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let header = bytes.get(..HEADER_LEN).ok_or(AssetError::Truncated {
            expected: HEADER_LEN,
            actual: bytes.len(),
        })?;
        let (width, height, first_char, glyph_count) = (header[0], header[1], header[2], header[3]);
        if width == 0 || width > 8 || height == 0 || glyph_count == 0 {
            return Err(AssetError::EmptyBitmap);
        }

        let expected = HEADER_LEN + height as usize * glyph_count as usize;
        if bytes.len() < expected {
            return Err(AssetError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            width,
            height,
            first_char,
            glyph_count,
            glyphs: bytes[HEADER_LEN..expected].to_vec(),
        })
    }

    pub fn glyph_width(&self) -> u32 {
        self.width as u32
    }

    pub fn glyph_height(&self) -> u32 {
        self.height as u32
    }

    /// Horizontal distance between characters, one column of spacing.
    pub fn advance(&self) -> u32 {
        self.width as u32 + 1
    }

    pub fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.advance()
    }

    /// Row bytes for `ch`. Lowercase falls back to uppercase, anything else
    /// outside the font draws blank.
    fn glyph(&self, ch: char) -> Option<&[u8]> {
        let index = |c: char| {
            let code = u32::from(c).checked_sub(self.first_char as u32)?;
            (code < self.glyph_count as u32).then_some(code as usize)
        };
        let slot = index(ch).or_else(|| index(ch.to_ascii_uppercase()))?;
        let rows = self.height as usize;
        self.glyphs.get(slot * rows..(slot + 1) * rows)
    }

    pub fn glyph_pixel(&self, ch: char, x: u32, y: u32) -> bool {
        if x >= self.width as u32 {
            return false;
        }
        self.glyph(ch)
            .and_then(|rows| rows.get(y as usize))
            .is_some_and(|row| row & (0x80 >> x) != 0)
    }

    /// Draw `text` with its top-left corner at (`x`, `y`). Glyph pixels set
    /// to `on`, background pixels to `!on`; nothing outside `clip` is touched.
    pub fn draw_text(&self, fb: &mut FrameBuffer, x: u32, y: u32, text: &str, on: bool, clip: Rect) {
        for (i, ch) in text.chars().enumerate() {
            let origin = x + i as u32 * self.advance();
            if origin >= clip.x + clip.width {
                break;
            }
            for gy in 0..self.height as u32 {
                for gx in 0..self.advance() {
                    let (px, py) = (origin + gx, y + gy);
                    if clip.contains(px, py) {
                        let lit = self.glyph_pixel(ch, gx, gy);
                        fb.set_pixel(px, py, lit == on);
                    }
                }
            }
        }
    }
}
