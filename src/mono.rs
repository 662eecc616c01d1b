//! One-bit-per-pixel glyph codecs: PackBits-compressed and raw bitmaps.
//!
//! Both expand bytes MSB first, a set bit is foreground. The pixel budget is
//! `width * height`; padding bits in the last byte are not sent.

use crate::color::{Color, Style};
use crate::hal::{emit, window_end, PixelSink};

/// Send up to 8 pixels of `bits`, collapsing equal neighbours into batches.
fn expand<S: PixelSink>(
    sink: &mut S,
    bits: u8,
    take: u32,
    style: &Style,
) -> Result<(), S::Error> {
    let mut i = 0;
    while i < take {
        let on = bits & (0x80 >> i) != 0;
        let mut n = 1;
        while i + n < take && (bits & (0x80 >> (i + n)) != 0) == on {
            n += 1;
        }
        let color: Color = if on { style.foreground } else { style.background };
        emit(sink, color, n)?;
        i += n;
    }
    Ok(())
}

/// Pixels left to send, capped to one byte's worth.
#[inline]
fn chunk(remaining: u32) -> u32 {
    remaining.min(8)
}

/// Draw a PackBits-compressed bitmap.
///
/// Block headers: `0..=127` copies the next `n + 1` bytes, `-127..=-1` repeats
/// the next byte `1 - n` times, `-128` is ignored.
pub fn fill_packbits<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    data: &[u8],
    x: u16,
    y: u16,
    width: u16,
    height: u16,
) -> Result<(), S::Error> {
    sink.set_draw_window(x, y, window_end(x, width), window_end(y, height))?;

    let mut remaining = u32::from(width) * u32::from(height);
    let mut bytes = data.iter().copied();

    while remaining > 0 {
        let Some(header) = bytes.next() else {
            log::warn!("packbits stream ended with {} pixels left", remaining);
            break;
        };
        match header as i8 {
            -128 => {}
            n @ 0.. => {
                for _ in 0..=n {
                    let Some(b) = bytes.next() else { break };
                    let take = chunk(remaining);
                    expand(sink, b, take, style)?;
                    remaining -= take;
                    if remaining == 0 {
                        break;
                    }
                }
            }
            n => {
                let Some(b) = bytes.next() else { break };
                for _ in 0..(1 - i16::from(n)) {
                    let take = chunk(remaining);
                    expand(sink, b, take, style)?;
                    remaining -= take;
                    if remaining == 0 {
                        break;
                    }
                }
            }
        }
    }
    sink.end_draw()
}

/// Draw an uncompressed packed bitmap, `(width * height + 7) / 8` bytes.
pub fn fill_bitmap<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    data: &[u8],
    x: u16,
    y: u16,
    width: u16,
    height: u16,
) -> Result<(), S::Error> {
    sink.set_draw_window(x, y, window_end(x, width), window_end(y, height))?;

    let mut remaining = u32::from(width) * u32::from(height);
    for &b in data {
        if remaining == 0 {
            break;
        }
        let take = chunk(remaining);
        expand(sink, b, take, style)?;
        remaining -= take;
    }
    sink.end_draw()
}

/// Bytes used by one packed bitmap of the given size.
pub const fn bitmap_len(width: u16, height: u16) -> usize {
    (width as usize * height as usize + 7) >> 3
}
