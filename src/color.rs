//! 16-bit (5-6-5) color handling.
//!
//! The panel only ever sees a packed 16-bit word. Which end of that word holds
//! red is a build-time choice (feature `bgr`) so the same assets can drive
//! panels wired either way. Everything before packing works on native channel
//! widths: r and b in 0..=31, g in 0..=63.

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{IntoStorage, RgbColor};

/// A packed color exactly as it is sent to the panel.
pub type Color = RawU16;

/// Running color state of the decoder, in native channel widths.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r: r & 0x1F, g: g & 0x3F, b: b & 0x1F }
    }

    /// Split a stream-order (r<<11 | g<<5 | b) word into channels.
    pub const fn from_565(word: u16) -> Self {
        Self {
            r: ((word >> 11) & 0x1F) as u8,
            g: ((word >> 5) & 0x3F) as u8,
            b: (word & 0x1F) as u8,
        }
    }

    /// Color cache slot for this color.
    #[inline]
    pub const fn hash(self) -> usize {
        (self.r as usize * 3 + self.g as usize * 5 + self.b as usize * 7) & 63
    }

    /// Pack into the panel's channel order.
    #[inline]
    pub fn pack(self) -> Color {
        pack(self.r, self.g, self.b)
    }
}

impl From<Rgb565> for Rgb {
    fn from(c: Rgb565) -> Self {
        Self::new(c.r(), c.g(), c.b())
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "bgr")] {
        #[inline]
        pub fn pack(r: u8, g: u8, b: u8) -> Color {
            RawU16::new(((b as u16 & 0x1F) << 11) | ((g as u16 & 0x3F) << 5) | (r as u16 & 0x1F))
        }
    } else {
        #[inline]
        pub fn pack(r: u8, g: u8, b: u8) -> Color {
            RawU16::new(((r as u16 & 0x1F) << 11) | ((g as u16 & 0x3F) << 5) | (b as u16 & 0x1F))
        }
    }
}

/// Convert an embedded-graphics color into panel order.
pub fn from_rgb565(c: Rgb565) -> Color {
    if cfg!(feature = "bgr") {
        Rgb::from(c).pack()
    } else {
        RawU16::new(c.into_storage())
    }
}

/// Foreground/background pair threaded through every render call.
///
/// `background` doubles as the color of transparent pixels in full-color
/// images; `foreground` is only used by the monochrome glyph codecs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Style {
    pub foreground: Color,
    pub background: Color,
}

impl Style {
    pub const fn new(foreground: Color, background: Color) -> Self {
        Self { foreground, background }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(RawU16::new(0xFFFF), RawU16::new(0x0000))
    }
}
