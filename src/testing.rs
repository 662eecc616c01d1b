//! Test-only sinks and helpers.

use crate::color::{Color, Rgb};
use crate::hal::PixelSink;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::raw::RawData;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Window(u16, u16, u16, u16),
    Pixel(u16),
    Batch(u16, u32),
    Array(Vec<u16>),
    End,
}

/// Records every sink call verbatim.
#[derive(Default)]
pub struct RecordingSink {
    pub calls: Vec<Call>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All pixels pushed, with batches expanded.
    pub fn pixels(&self) -> Vec<u16> {
        let mut out = Vec::new();
        for call in &self.calls {
            match call {
                Call::Pixel(c) => out.push(*c),
                Call::Batch(c, n) => out.extend(core::iter::repeat(*c).take(*n as usize)),
                Call::Array(cs) => out.extend_from_slice(cs),
                Call::Window(..) | Call::End => {}
            }
        }
        out
    }

    pub fn windows(&self) -> Vec<(u16, u16, u16, u16)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                Call::Window(a, b, c, d) => Some((a, b, c, d)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl PixelSink for RecordingSink {
    type Error = Infallible;

    fn set_draw_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error> {
        self.calls.push(Call::Window(x0, y0, x1, y1));
        Ok(())
    }

    fn draw_pixel(&mut self, color: Color) -> Result<(), Self::Error> {
        self.calls.push(Call::Pixel(color.into_inner()));
        Ok(())
    }

    fn fill_batch(&mut self, color: Color, count: u32) -> Result<(), Self::Error> {
        self.calls.push(Call::Batch(color.into_inner(), count));
        Ok(())
    }

    fn fill_array(&mut self, colors: &[Color]) -> Result<(), Self::Error> {
        self.calls.push(Call::Array(colors.iter().map(|c| c.into_inner()).collect()));
        Ok(())
    }

    fn end_draw(&mut self) -> Result<(), Self::Error> {
        self.calls.push(Call::End);
        Ok(())
    }
}

/// Deterministic pseudo-random test picture with flat areas, gradients and
/// a few transparent pixels, so every opcode shows up in its encoding.
pub fn test_picture(width: usize, height: usize) -> Vec<Option<Rgb>> {
    let mut seed = 0x2545_f491u32;
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let px = match (x / 4 + y / 3) % 5 {
                0 => Some(Rgb::new(4, 8, 12)),
                1 => Some(Rgb::new((x % 32) as u8, (y * 2 % 64) as u8, 10)),
                2 => Some(Rgb::new(seed as u8, (seed >> 8) as u8, (seed >> 16) as u8)),
                3 if seed % 7 == 0 => None,
                _ => Some(Rgb::new(31 - (x % 32) as u8, 40, (y % 32) as u8)),
            };
            out.push(px);
        }
    }
    out
}
