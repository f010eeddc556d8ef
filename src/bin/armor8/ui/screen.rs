//! Host-side copy of the panel LCD
//!
//! Only the rectangle named by each refresh event is copied out of the
//! frame buffer, the same way the hardware driver streams a dirty region.

use armor8::event::DisplayRefreshEvent;
use armor8::ui::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::{Block, Borders, Widget},
};

const PIXEL_ON: Color = Color::Rgb(0, 97, 252);
const PIXEL_OFF: Color = Color::Black;

/// Terminal cells needed to show the whole screen with half-block glyphs.
pub const SCREEN_COLS: u16 = SCREEN_WIDTH as u16;
pub const SCREEN_ROWS: u16 = (SCREEN_HEIGHT / 2) as u16;

pub struct LcdImage {
    pixels: Vec<bool>,
}

impl LcdImage {
    pub fn new() -> Self {
        Self {
            pixels: vec![false; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize],
        }
    }

    /// Copy the inclusive rectangle `region` from `frame_buffer`.
    pub fn copy_region(&mut self, frame_buffer: &FrameBuffer, region: &DisplayRefreshEvent) {
        let x_end = region.x_end.min(SCREEN_WIDTH - 1);
        let y_end = region.y_end.min(SCREEN_HEIGHT - 1);
        for y in region.y_start..=y_end {
            for x in region.x_start..=x_end {
                self.pixels[(y * SCREEN_WIDTH + x) as usize] = frame_buffer.pixel(x, y);
            }
        }
    }

    fn pixel(&self, x: u32, y: u32) -> bool {
        self.pixels
            .get((y * SCREEN_WIDTH + x) as usize)
            .copied()
            .unwrap_or(false)
    }
}

impl Widget for &LcdImage {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().title(" ARMor8 ").borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        // Each cell shows two pixel rows: the upper half block takes the
        // top pixel as foreground and the bottom pixel as background.
        for row in 0..inner.height.min(SCREEN_ROWS) {
            for col in 0..inner.width.min(SCREEN_COLS) {
                let (x, y) = (col as u32, row as u32 * 2);
                let top = if self.pixel(x, y) { PIXEL_ON } else { PIXEL_OFF };
                let bottom = if self.pixel(x, y + 1) { PIXEL_ON } else { PIXEL_OFF };
                if let Some(cell) = buf.cell_mut((inner.x + col, inner.y + row)) {
                    cell.set_char('▀').set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}
