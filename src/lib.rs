//! Streaming 16-bit graphics for panels without a frame buffer.
//!
//! Images and glyphs are stored in a compact opcode stream and decoded
//! straight into a [`PixelSink`], optionally cropped on the fly. The text and
//! progress-bar renderers on top only redraw what changed since the last call.

#![cfg_attr(not(test), no_std)]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

pub mod cache;
pub mod clip;
pub mod co5300;
pub mod codec;
pub mod color;
#[cfg(any(test, feature = "alloc"))]
pub mod encode;
pub mod font;
pub mod hal;
pub mod image;
pub mod mono;
pub mod progress;
pub mod target;
pub mod text;

#[cfg(any(feature = "esp32s3-disp143Oled", feature = "devkit-esp32s3-disp128"))]
pub mod display;
#[cfg(feature = "esp32s3")]
pub mod wiring;

#[cfg(test)]
mod testing;

pub use color::{Color, Rgb, Style};
pub use font::{Font, Glyph};
pub use hal::{fill_rect, PixelSink};
pub use image::{fill_image, fill_image_region, Image};
pub use progress::{fill_progress_bar, Direction};
pub use text::{fill_text, fill_text_center, fill_text_left, fill_text_right, Fill};

/// Build-time switches this copy of the crate was compiled with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Bits per pixel on the wire. Always 16.
    pub color_depth: u8,
    pub bgr: bool,
    pub packbits: bool,
    pub mono_bitmap: bool,
    pub wide_glyphs: bool,
    pub encoder: bool,
}

pub const CAPABILITIES: Capabilities = Capabilities {
    color_depth: 16,
    bgr: cfg!(feature = "bgr"),
    packbits: cfg!(feature = "packbits"),
    mono_bitmap: cfg!(feature = "mono-bitmap"),
    wide_glyphs: cfg!(feature = "wide-glyphs"),
    encoder: cfg!(feature = "alloc"),
};
