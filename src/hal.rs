//! Pixel sink contract implemented by display drivers.
//!
//! There is no frame buffer anywhere in this crate: every draw call opens a
//! window on the panel and streams pixels into it in row-major order.

use crate::color::Color;

/// A display (or anything else) that accepts a window followed by a stream of
/// pixels.
pub trait PixelSink {
    type Error;

    /// Declare the target rectangle for the following pixel writes.
    /// `x1` and `y1` are exclusive.
    fn set_draw_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error>;

    /// Push one pixel at the window's write cursor.
    fn draw_pixel(&mut self, color: Color) -> Result<(), Self::Error>;

    /// Push `count` pixels of the same color.
    fn fill_batch(&mut self, color: Color, count: u32) -> Result<(), Self::Error> {
        for _ in 0..count {
            self.draw_pixel(color)?;
        }
        Ok(())
    }

    /// Push a run of pixels.
    fn fill_array(&mut self, colors: &[Color]) -> Result<(), Self::Error> {
        for &c in colors {
            self.draw_pixel(c)?;
        }
        Ok(())
    }

    /// Close the current write burst.
    fn end_draw(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<S: PixelSink + ?Sized> PixelSink for &mut S {
    type Error = S::Error;

    #[inline]
    fn set_draw_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error> {
        (**self).set_draw_window(x0, y0, x1, y1)
    }

    #[inline]
    fn draw_pixel(&mut self, color: Color) -> Result<(), Self::Error> {
        (**self).draw_pixel(color)
    }

    #[inline]
    fn fill_batch(&mut self, color: Color, count: u32) -> Result<(), Self::Error> {
        (**self).fill_batch(color, count)
    }

    #[inline]
    fn fill_array(&mut self, colors: &[Color]) -> Result<(), Self::Error> {
        (**self).fill_array(colors)
    }

    #[inline]
    fn end_draw(&mut self) -> Result<(), Self::Error> {
        (**self).end_draw()
    }
}

/// Push `count` copies of `color`, using the single-pixel path for one.
#[inline]
pub(crate) fn emit<S: PixelSink>(sink: &mut S, color: Color, count: u32) -> Result<(), S::Error> {
    match count {
        0 => Ok(()),
        1 => sink.draw_pixel(color),
        n => sink.fill_batch(color, n),
    }
}

/// Exclusive window end, clamped to the coordinate range.
#[inline]
pub(crate) fn window_end(start: u16, len: u16) -> u16 {
    start.saturating_add(len)
}

/// Fill a `w` x `h` rectangle with one color.
pub fn fill_rect<S: PixelSink>(
    sink: &mut S,
    x: u16,
    y: u16,
    w: u16,
    h: u16,
    color: Color,
) -> Result<(), S::Error> {
    if w == 0 || h == 0 {
        return Ok(());
    }
    sink.set_draw_window(x, y, window_end(x, w), window_end(y, h))?;
    sink.fill_batch(color, u32::from(w) * u32::from(h))?;
    sink.end_draw()
}
