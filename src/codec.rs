//! Streaming decoder for the compressed pixel format.
//!
//! The stream is a flat sequence of opcodes with no header, no length and no
//! end marker. Dimensions always come from the resource that owns the bytes,
//! and the caller's pixel budget decides when decoding stops.
//!
//! ```plain
//! 00iiiiii            INDEX  running color = cache[i]
//! 01rrggbb            DIFF   r,g,b += field - 2        (each -2..=1)
//! 10gggggg rrrrbbbb   LUMA   g += dg; r += dg + dr - 8; b += dg + db - 8  (dg = field - 32)
//! 11nnnnnn            RUN    repeat running color n + 1 times (n < 62)
//! 11111110 hi lo      RGB    running color = 565 word (big-endian, r in the high bits)
//! 11111111            TRANS  one background pixel, running color untouched
//! ```
//!
//! Assets are produced by a trusted build step, so a malformed stream gives
//! garbage pixels. It never reads outside the byte slice: a stream that ends
//! early just ends the decode.

use crate::cache::ColorCache;
use crate::color::{Color, Rgb};
use crate::hal::{emit, PixelSink};

pub const OP_INDEX: u8 = 0b0000_0000;
pub const OP_DIFF: u8 = 0b0100_0000;
pub const OP_LUMA: u8 = 0b1000_0000;
pub const OP_RUN: u8 = 0b1100_0000;
pub const OP_RGB565: u8 = 0b1111_1110;
pub const OP_TRANSPARENT: u8 = 0b1111_1111;

const MASK_2: u8 = 0b1100_0000;

/// Longest run a single RUN opcode can express.
pub const MAX_RUN: u8 = 62;

/// One decoded opcode: `count` consecutive pixels of `color`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub color: Color,
    pub count: u8,
}

impl Run {
    #[inline]
    const fn single(color: Color) -> Self {
        Self { color, count: 1 }
    }
}

/// Lazy pixel producer over one compressed stream.
///
/// Owns the color cache and running color for exactly one decode; build a
/// new one for every image. The iterator ends when the input runs out, which
/// for well-formed assets only happens after the caller stopped pulling.
pub struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    cache: ColorCache,
    current: Rgb,
    background: Color,
}

impl<'a> Decoder<'a> {
    /// `background` is what transparent pixels turn into.
    pub fn new(input: &'a [u8], background: Color) -> Self {
        Self {
            input,
            pos: 0,
            cache: ColorCache::new(),
            current: Rgb::default(),
            background,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn byte(&mut self) -> Option<u8> {
        let b = *self.input.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }
}

#[inline]
fn add_wrapping(channel: u8, delta: i16, mask: u8) -> u8 {
    ((i16::from(channel) + delta) & i16::from(mask)) as u8
}

impl Iterator for Decoder<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let op = self.byte()?;

        match op & MASK_2 {
            OP_INDEX => {
                // The slot already holds this color; no cache write.
                self.current = self.cache.get(op);
                return Some(Run::single(self.current.pack()));
            }
            OP_DIFF => {
                let c = &mut self.current;
                c.r = add_wrapping(c.r, i16::from((op >> 4) & 3) - 2, 0x1F);
                c.g = add_wrapping(c.g, i16::from((op >> 2) & 3) - 2, 0x3F);
                c.b = add_wrapping(c.b, i16::from(op & 3) - 2, 0x1F);
            }
            OP_LUMA => {
                let b2 = self.byte()?;
                let vg = i16::from(op & 0x3F) - 32;
                let c = &mut self.current;
                c.r = add_wrapping(c.r, vg - 8 + i16::from(b2 >> 4), 0x1F);
                c.g = add_wrapping(c.g, vg, 0x3F);
                c.b = add_wrapping(c.b, vg - 8 + i16::from(b2 & 0x0F), 0x1F);
            }
            _ => match op {
                OP_TRANSPARENT => return Some(Run::single(self.background)),
                OP_RGB565 => {
                    let hi = self.byte()?;
                    let lo = self.byte()?;
                    self.current = Rgb::from_565(u16::from_be_bytes([hi, lo]));
                }
                _ => {
                    return Some(Run {
                        color: self.current.pack(),
                        count: (op & 0x3F) + 1,
                    })
                }
            },
        }

        self.cache.store(self.current);
        Some(Run::single(self.current.pack()))
    }
}

/// Decode `pixel_count` pixels from `input` into the sink's current window.
///
/// The caller must already have opened a window of matching size. A run that
/// would overshoot the budget is cut short.
pub fn decode<S: PixelSink>(
    sink: &mut S,
    input: &[u8],
    pixel_count: u32,
    background: Color,
) -> Result<(), S::Error> {
    let mut remaining = pixel_count;
    let mut decoder = Decoder::new(input, background);

    while remaining > 0 {
        let Some(run) = decoder.next() else {
            log::warn!("image stream ended with {} pixels left", remaining);
            break;
        };
        let n = u32::from(run.count).min(remaining);
        emit(sink, run.color, n)?;
        remaining -= n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::pack;
    use crate::encode::encode_pixels;
    use crate::testing::{test_picture, Call, RecordingSink};
    use embedded_graphics::pixelcolor::raw::{RawData, RawU16};

    const BG: u16 = 0x1234;

    fn decode_all(input: &[u8], count: u32) -> RecordingSink {
        let mut sink = RecordingSink::new();
        decode(&mut sink, input, count, RawU16::new(BG)).unwrap();
        sink
    }

    fn px(r: u8, g: u8, b: u8) -> u16 {
        pack(r, g, b).into_inner()
    }

    #[test_log::test]
    fn raw_rgb_then_diff_then_luma() {
        let stream = [
            OP_RGB565, 0b10000_100000_10000u16.to_be_bytes()[0], 0b10000_100000_10000u16.to_be_bytes()[1],
            OP_DIFF | 0b11_00_10, // r+1, g-2, b+0
            OP_LUMA | (32 + 5), 0x8A, // g+5, r+5, b+7
        ];
        let sink = decode_all(&stream, 3);
        assert_eq!(
            sink.pixels(),
            vec![px(16, 32, 16), px(17, 30, 16), px(22, 35, 23)]
        );
    }

    #[test_log::test]
    fn diff_wraps_inside_channel_width() {
        // From black, -2 on every channel wraps to the top of each range.
        let sink = decode_all(&[OP_DIFF], 1);
        assert_eq!(sink.pixels(), vec![px(30, 62, 30)]);
    }

    #[test_log::test]
    fn run_repeats_running_color_and_skips_cache() {
        let stream = [OP_DIFF | 0b11_10_10, OP_RUN | 3, OP_INDEX | Rgb::new(1, 0, 0).hash() as u8];
        let sink = decode_all(&stream, 6);
        assert_eq!(
            sink.calls,
            vec![
                Call::Pixel(px(1, 0, 0)),
                Call::Batch(px(1, 0, 0), 4),
                Call::Pixel(px(1, 0, 0)),
            ]
        );
    }

    #[test_log::test]
    fn transparent_emits_background_and_keeps_state() {
        let stream = [OP_DIFF | 0b11_11_11, OP_TRANSPARENT, OP_RUN];
        let sink = decode_all(&stream, 3);
        assert_eq!(sink.pixels(), vec![px(1, 1, 1), BG, px(1, 1, 1)]);
    }

    #[test_log::test]
    fn index_reads_last_color_stored_in_slot() {
        // (0,2,1) and (4,1,0) share slot 17; the later one wins.
        let stream = [
            OP_RGB565, 0x00, 0x41, // (0,2,1)
            OP_RGB565, 0x20, 0x20, // (4,1,0)
            OP_INDEX | 17,
            OP_INDEX, // slot 0 still black
        ];
        let sink = decode_all(&stream, 4);
        assert_eq!(
            sink.pixels(),
            vec![px(0, 2, 1), px(4, 1, 0), px(4, 1, 0), px(0, 0, 0)]
        );
    }

    #[test_log::test]
    fn index_sweep_over_all_slots() {
        // Store one color per slot through RGB ops, then read each back.
        let mut stream = Vec::new();
        let mut by_slot = [None; 64];
        for r in 0..32u8 {
            for g in [0u8, 9, 18, 27] {
                let c = Rgb::new(r, g, 31 - r);
                let word = (u16::from(c.r) << 11) | (u16::from(c.g) << 5) | u16::from(c.b);
                stream.push(OP_RGB565);
                stream.extend_from_slice(&word.to_be_bytes());
                by_slot[c.hash()] = Some(c);
            }
        }
        let stored = 128;
        for slot in 0..64u8 {
            stream.push(OP_INDEX | slot);
        }
        let sink = decode_all(&stream, stored + 64);
        let pixels = sink.pixels();
        for slot in 0..64 {
            let want = by_slot[slot].unwrap_or_default().pack().into_inner();
            assert_eq!(pixels[stored as usize + slot], want, "slot {slot}");
        }
    }

    #[test_log::test]
    fn budget_cuts_trailing_run() {
        let sink = decode_all(&[OP_RUN | 40], 10);
        assert_eq!(sink.calls, vec![Call::Batch(px(0, 0, 0), 10)]);
    }

    #[test_log::test]
    fn truncated_stream_stops_without_panicking() {
        let sink = decode_all(&[OP_DIFF, OP_RGB565, 0x12], 5);
        assert_eq!(sink.pixels().len(), 1);
        let sink = decode_all(&[OP_LUMA], 5);
        assert!(sink.pixels().is_empty());
    }

    #[test_log::test]
    fn decoding_is_deterministic_and_matches_source() {
        let picture = test_picture(23, 17);
        let stream = encode_pixels(&picture);
        let a = decode_all(&stream, picture.len() as u32);
        let b = decode_all(&stream, picture.len() as u32);
        assert_eq!(a.calls, b.calls);

        let want: Vec<u16> = picture
            .iter()
            .map(|p| p.map_or(BG, |c| c.pack().into_inner()))
            .collect();
        assert_eq!(a.pixels(), want);
    }

    #[test_log::test]
    fn decoder_consumes_whole_stream() {
        let picture = test_picture(9, 9);
        let stream = encode_pixels(&picture);
        let mut decoder = Decoder::new(&stream, RawU16::new(BG));
        let total: u32 = decoder.by_ref().map(|r| u32::from(r.count)).sum();
        assert_eq!(total, 81);
        assert_eq!(decoder.position(), stream.len());
    }
}
