use crate::assets::AssetError;
use crate::ui::framebuffer::{FrameBuffer, Rect};

/// Opaque 1-bit image: `[width, height]` then rows packed MSB-left, each
/// row padded to a whole byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    stride: usize,
    rows: Vec<u8>,
}

impl Sprite {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let &[width, height, ..] = bytes else {
            return Err(AssetError::Truncated {
                expected: 2,
                actual: bytes.len(),
            });
        };
        if width == 0 || height == 0 {
            return Err(AssetError::EmptyBitmap);
        }

        let stride = (width as usize).div_ceil(8);
        let expected = 2 + stride * height as usize;
        if bytes.len() < expected {
            return Err(AssetError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            stride,
            rows: bytes[2..expected].to_vec(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.rows[y as usize * self.stride + x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Blit with the top-left corner at (`x`, `y`), returning the area drawn.
    pub fn draw(&self, fb: &mut FrameBuffer, x: u32, y: u32) -> Rect {
        for sy in 0..self.height {
            for sx in 0..self.width {
                fb.set_pixel(x + sx, y + sy, self.pixel(sx, sy));
            }
        }
        Rect::new(x, y, self.width, self.height)
    }
}
