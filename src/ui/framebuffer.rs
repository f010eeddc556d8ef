/*
Frame buffer
============

The ARMor8 screen is a 128x64 monochrome panel. Pixels are packed one bit
each, row after row, with the most significant bit of each byte holding the
leftmost pixel:

    byte 0          byte 1                    byte 15
    7 6 5 4 3 2 1 0 7 6 5 4 3 2 1 0   ...   ... 1 0
    x=0 .........x=7 x=8 ......x=15         x=127       row 0
    x=0 ...                                              row 1 (byte 16..)

Drawing is clipped to the buffer; writes outside it are ignored and reads
outside it return "off". The host copies only the rectangle named by each
`DisplayRefreshEvent` out of `bytes()`.
*/

use crate::event::DisplayRefreshEvent;

pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub on: bool,
}

/// How pixels are packed into the buffer bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorProfile {
    #[default]
    Monochrome1Bit,
}

impl ColorProfile {
    /// Bytes per row of `width` pixels.
    pub fn stride(self, width: u32) -> usize {
        match self {
            ColorProfile::Monochrome1Bit => (width as usize).div_ceil(8),
        }
    }

    pub fn get_pixel(self, bytes: &[u8], stride: usize, x: u32, y: u32) -> Pixel {
        match self {
            ColorProfile::Monochrome1Bit => {
                let index = y as usize * stride + x as usize / 8;
                let mask = 0x80u8 >> (x % 8);
                Pixel {
                    on: bytes.get(index).is_some_and(|byte| byte & mask != 0),
                }
            }
        }
    }

    pub fn put_pixel(self, bytes: &mut [u8], stride: usize, x: u32, y: u32, pixel: Pixel) {
        match self {
            ColorProfile::Monochrome1Bit => {
                let index = y as usize * stride + x as usize / 8;
                let mask = 0x80u8 >> (x % 8);
                if let Some(byte) = bytes.get_mut(index) {
                    if pixel.on {
                        *byte |= mask;
                    } else {
                        *byte &= !mask;
                    }
                }
            }
        }
    }
}

/// Axis-aligned rectangle in pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn to_refresh(&self) -> DisplayRefreshEvent {
        DisplayRefreshEvent::from_size(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    stride: usize,
    profile: ColorProfile,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, profile: ColorProfile) -> Self {
        let stride = profile.stride(width);
        Self {
            width,
            height,
            stride,
            profile,
            pixels: vec![0; stride * height as usize],
        }
    }

    /// The ARMor8 panel.
    pub fn screen() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT, ColorProfile::Monochrome1Bit)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn profile(&self) -> ColorProfile {
        self.profile
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.profile.get_pixel(&self.pixels, self.stride, x, y).on
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.profile
            .put_pixel(&mut self.pixels, self.stride, x, y, Pixel { on });
    }

    pub fn fill_rect(&mut self, rect: Rect, on: bool) {
        let x_end = (rect.x + rect.width).min(self.width);
        let y_end = (rect.y + rect.height).min(self.height);
        for y in rect.y..y_end {
            for x in rect.x..x_end {
                self.set_pixel(x, y, on);
            }
        }
    }

    pub fn hline(&mut self, x: u32, y: u32, width: u32, on: bool) {
        self.fill_rect(Rect::new(x, y, width, 1), on);
    }

    pub fn clear(&mut self, on: bool) {
        self.pixels.fill(if on { 0xFF } else { 0x00 });
    }
}
