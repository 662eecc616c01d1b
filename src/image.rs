//! Compressed image resources and the two ways of drawing them.

use crate::clip::decode_region;
use crate::codec::decode;
use crate::color::Style;
use crate::hal::{window_end, PixelSink};

/// A compressed image. The stream carries no dimensions of its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Image<'a> {
    pub data: &'a [u8],
    pub width: u16,
    pub height: u16,
}

impl<'a> Image<'a> {
    pub const fn new(data: &'a [u8], width: u16, height: u16) -> Self {
        Self { data, width, height }
    }

    pub fn pixel_count(&self) -> u32 {
        u32::from(self.width) * u32::from(self.height)
    }

    /// Draw the whole image with its top-left corner at (x, y).
    pub fn draw<S: PixelSink>(&self, sink: &mut S, style: &Style, x: u16, y: u16) -> Result<(), S::Error> {
        fill_image(sink, style, self.data, x, y, self.width, self.height)
    }
}

/// Decode a `width` x `height` stream into the window at (x, y).
pub fn fill_image<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    data: &[u8],
    x: u16,
    y: u16,
    width: u16,
    height: u16,
) -> Result<(), S::Error> {
    sink.set_draw_window(x, y, window_end(x, width), window_end(y, height))?;
    decode(sink, data, u32::from(width) * u32::from(height), style.background)?;
    sink.end_draw()
}

/// Draw the `width` x `height` part of `image` starting at (src_x, src_y)
/// to the screen at (x, y).
///
/// The crop must lie inside the image.
#[allow(clippy::too_many_arguments)]
pub fn fill_image_region<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    image: &Image<'_>,
    src_x: u16,
    src_y: u16,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
) -> Result<(), S::Error> {
    sink.set_draw_window(x, y, window_end(x, width), window_end(y, height))?;
    let skip = u32::from(src_y) * u32::from(image.width) + u32::from(src_x);
    decode_region(sink, image.data, skip, image.width, width, height, style.background)?;
    sink.end_draw()
}
