//! `PixelSink` on top of any embedded-graphics `DrawTarget`.
//!
//! Lets panels that only come with a `DrawTarget` driver (e.g. `mipidsi`)
//! take the windowed pixel stream. Single pixels are collected per row and
//! flushed with `fill_contiguous`; batches become `fill_solid` rectangles,
//! whole rows at a time where the cursor allows.

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::color::Color;
use crate::hal::PixelSink;

/// Pixels buffered per row before an early flush.
pub const ROW_BUFFER: usize = 64;

pub struct DrawTargetSink<D> {
    target: D,
    // Current window, x1/y1 exclusive.
    x0: u16,
    x1: u16,
    y1: u16,
    // Write cursor.
    x: u16,
    y: u16,
    // Pending single pixels, starting at (row_x, y).
    row: heapless::Vec<Rgb565, ROW_BUFFER>,
    row_x: u16,
}

/// Undo the panel channel order so embedded-graphics sees real colors.
fn to_rgb565(color: Color) -> Rgb565 {
    let raw = color.into_inner();
    let raw = if cfg!(feature = "bgr") {
        (raw & 0x1F) << 11 | (raw & 0x07E0) | raw >> 11
    } else {
        raw
    };
    Rgb565::from(RawU16::new(raw))
}

fn area(x: u16, y: u16, w: u16, h: u16) -> Rectangle {
    Rectangle::new(
        Point::new(i32::from(x), i32::from(y)),
        Size::new(u32::from(w), u32::from(h)),
    )
}

impl<D> DrawTargetSink<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(target: D) -> Self {
        Self {
            target,
            x0: 0,
            x1: 0,
            y1: 0,
            x: 0,
            y: 0,
            row: heapless::Vec::new(),
            row_x: 0,
        }
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }

    // Nothing more fits in the window.
    #[inline]
    fn exhausted(&self) -> bool {
        self.x0 >= self.x1 || self.y >= self.y1
    }

    fn flush_row(&mut self) -> Result<(), D::Error> {
        if self.row.is_empty() {
            return Ok(());
        }
        let len = self.row.len() as u16;
        self.target
            .fill_contiguous(&area(self.row_x, self.y, len, 1), self.row.iter().copied())?;
        self.row.clear();
        Ok(())
    }

    // Move the cursor `n` pixels along the current row, wrapping at the end.
    fn advance(&mut self, n: u16) {
        self.x += n;
        if self.x >= self.x1 {
            self.x = self.x0;
            self.y += 1;
        }
    }
}

impl<D> PixelSink for DrawTargetSink<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    type Error = D::Error;

    fn set_draw_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error> {
        self.flush_row()?;
        self.x0 = x0;
        self.x1 = x1;
        self.y1 = y1;
        self.x = x0;
        self.y = y0;
        Ok(())
    }

    fn draw_pixel(&mut self, color: Color) -> Result<(), Self::Error> {
        if self.exhausted() {
            return Ok(());
        }
        if self.row.is_empty() {
            self.row_x = self.x;
        }
        // Cannot fail: the row is flushed as soon as it fills up.
        let _ = self.row.push(to_rgb565(color));
        if self.row.is_full() || self.x + 1 >= self.x1 {
            self.flush_row()?;
        }
        self.advance(1);
        Ok(())
    }

    fn fill_batch(&mut self, color: Color, count: u32) -> Result<(), Self::Error> {
        self.flush_row()?;
        let color = to_rgb565(color);
        let mut count = count;

        while count > 0 && !self.exhausted() {
            let width = self.x1 - self.x0;
            if self.x == self.x0 && count >= u32::from(width) {
                let rows = (count / u32::from(width)).min(u32::from(self.y1 - self.y)) as u16;
                self.target.fill_solid(&area(self.x0, self.y, width, rows), color)?;
                self.y += rows;
                count -= u32::from(rows) * u32::from(width);
            } else {
                let seg = count.min(u32::from(self.x1 - self.x)) as u16;
                self.target.fill_solid(&area(self.x, self.y, seg, 1), color)?;
                count -= u32::from(seg);
                self.advance(seg);
            }
        }
        Ok(())
    }

    fn end_draw(&mut self) -> Result<(), Self::Error> {
        self.flush_row()
    }
}
