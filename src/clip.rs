//! Decoding a rectangular crop out of a compressed image.
//!
//! The stream can only be read front to back, so every pixel up to the end of
//! the crop is decoded to keep the cache and running color right. Pixels
//! outside the crop are dropped on the floor. Decoding stops as soon as the
//! last crop row is complete, leaving the rest of the stream unread.

use crate::codec::Decoder;
use crate::color::Color;
use crate::hal::{emit, PixelSink};

/// A stretch of consecutive pixels that is either all visible or all hidden.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub len: u32,
    pub visible: bool,
}

/// Alternating skip/emit zones over the row-major pixel sequence.
///
/// `remaining` counts pixels until the next zone flip. A skip zone between two
/// crop rows is `image_width - width` long; when that is zero the emit zone
/// simply restarts on the next row.
#[derive(Clone, Debug)]
pub struct Zones {
    remaining: u32,
    emitting: bool,
    rows_left: u16,
    gap: u32,
    width: u32,
}

impl Zones {
    pub fn new(skip: u32, image_width: u16, width: u16, height: u16) -> Self {
        Self {
            remaining: skip,
            emitting: false,
            rows_left: height,
            gap: u32::from(image_width.saturating_sub(width)),
            width: u32::from(width),
        }
    }

    /// True once the last crop pixel has been handed out.
    pub fn is_done(&self) -> bool {
        self.rows_left == 0 && (self.remaining == 0 || !self.emitting)
    }

    fn flip(&mut self) -> bool {
        if self.rows_left == 0 {
            return false;
        }
        if self.emitting && self.gap != 0 {
            self.emitting = false;
            self.remaining = self.gap;
        } else {
            self.emitting = true;
            self.remaining = self.width;
            self.rows_left -= 1;
        }
        true
    }

    /// Take up to `count` pixels from the current zone.
    pub fn take(&mut self, count: u32) -> Option<Span> {
        if count == 0 {
            return Some(Span { len: 0, visible: self.emitting });
        }
        while self.remaining == 0 {
            if !self.flip() {
                return None;
            }
        }
        let len = count.min(self.remaining);
        self.remaining -= len;
        Some(Span { len, visible: self.emitting })
    }
}

/// Decode `input` but only emit the `width` x `height` crop that starts
/// `skip` pixels into an image `image_width` pixels wide.
///
/// The caller opens a `width` x `height` window first.
pub fn decode_region<S: PixelSink>(
    sink: &mut S,
    input: &[u8],
    skip: u32,
    image_width: u16,
    width: u16,
    height: u16,
    background: Color,
) -> Result<(), S::Error> {
    if width == 0 || height == 0 {
        return Ok(());
    }
    debug_assert!(width <= image_width, "crop wider than image");

    let mut zones = Zones::new(skip, image_width, width, height);

    for run in Decoder::new(input, background) {
        let mut left = u32::from(run.count);
        // A run may straddle several zone edges; split it without rereading.
        while left > 0 {
            let Some(span) = zones.take(left) else {
                return Ok(());
            };
            if span.visible {
                emit(sink, run.color, span.len)?;
            }
            left -= span.len;
        }
        if zones.is_done() {
            return Ok(());
        }
    }

    log::warn!("image stream ended before crop was complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, OP_DIFF, OP_RUN};
    use crate::color::pack;
    use crate::encode::encode_pixels;
    use crate::testing::{test_picture, Call, RecordingSink};
    use embedded_graphics::pixelcolor::raw::{RawData, RawU16};

    const BG: RawU16 = RawU16::new(0xBEEF);

    fn crop(input: &[u8], skip: u32, iw: u16, w: u16, h: u16) -> RecordingSink {
        let mut sink = RecordingSink::new();
        decode_region(&mut sink, input, skip, iw, w, h, BG).unwrap();
        sink
    }

    fn full(input: &[u8], count: u32) -> Vec<u16> {
        let mut sink = RecordingSink::new();
        decode(&mut sink, input, count, BG).unwrap();
        sink.pixels()
    }

    #[test_log::test]
    fn zones_walk_rows() {
        // 5 wide image, crop of 2x2 at (1, 1).
        let mut z = Zones::new(6, 5, 2, 2);
        assert_eq!(z.take(10), Some(Span { len: 6, visible: false }));
        assert_eq!(z.take(10), Some(Span { len: 2, visible: true }));
        assert_eq!(z.take(10), Some(Span { len: 3, visible: false }));
        assert_eq!(z.take(1), Some(Span { len: 1, visible: true }));
        assert!(!z.is_done());
        assert_eq!(z.take(1), Some(Span { len: 1, visible: true }));
        assert!(z.is_done());
        assert_eq!(z.take(1), None);
    }

    #[test_log::test]
    fn full_width_crop_has_no_gap() {
        let mut z = Zones::new(0, 4, 4, 2);
        assert_eq!(z.take(100), Some(Span { len: 4, visible: true }));
        assert_eq!(z.take(100), Some(Span { len: 4, visible: true }));
        assert!(z.is_done());
    }

    #[test_log::test]
    fn crop_equal_to_image_matches_full_decode() {
        let (w, h) = (19u16, 11u16);
        let stream = encode_pixels(&test_picture(w.into(), h.into()));
        let n = u32::from(w) * u32::from(h);

        let b = crop(&stream, 0, w, w, h);
        assert_eq!(full(&stream, n), b.pixels());
    }

    #[test_log::test]
    fn interior_crops_match_full_decode() {
        let (iw, ih) = (21usize, 13usize);
        let stream = encode_pixels(&test_picture(iw, ih));
        let reference = full(&stream, (iw * ih) as u32);

        for &(sx, sy, w, h) in &[(0, 0, 5, 3), (3, 2, 7, 4), (20, 12, 1, 1), (0, 5, 21, 2), (10, 0, 11, 13), (4, 4, 1, 9)] {
            let got = crop(&stream, (sy * iw + sx) as u32, iw as u16, w as u16, h as u16).pixels();
            assert_eq!(got.len(), w * h, "crop {sx},{sy} {w}x{h}");
            for row in 0..h {
                for col in 0..w {
                    let want = reference[(sy + row) * iw + sx + col];
                    assert_eq!(got[row * w + col], want, "crop {sx},{sy} pixel {col},{row}");
                }
            }
        }
    }

    #[test_log::test]
    fn run_straddling_edges_equals_single_pixels() {
        // 8 wide image. One colored pixel then a 15 pixel run crossing the
        // crop (x 2..5, rows 0..2) on both sides of each row.
        let with_run = [OP_DIFF | 0b11_11_11, OP_RUN | 14];
        let mut singles = vec![OP_DIFF | 0b11_11_11];
        singles.extend(core::iter::repeat(OP_RUN).take(15));

        let a = crop(&with_run, 2, 8, 3, 2);
        let b = crop(&singles, 2, 8, 3, 2);
        assert_eq!(a.pixels(), b.pixels());
        let c = pack(1, 1, 1).into_inner();
        assert_eq!(a.pixels(), vec![c; 6]);
        // The run is split into one batch per visible row.
        assert_eq!(a.calls, vec![Call::Batch(c, 3), Call::Batch(c, 3)]);
    }

    #[test_log::test]
    fn stops_reading_after_last_row() {
        let picture = test_picture(10, 10);
        let stream = encode_pixels(&picture);
        // Only the first row is needed, so a stream cut right after it (plus
        // a dangling opcode) decodes the same.
        let mut truncated = encode_pixels(&picture[..10]);
        truncated.extend_from_slice(&[0xFE]);
        let a = crop(&stream, 0, 10, 10, 1);
        let b = crop(&truncated, 0, 10, 10, 1);
        assert_eq!(a.calls, b.calls);
        assert_eq!(a.pixels().len(), 10);
    }

    #[test_log::test]
    fn zero_sized_crop_is_silent() {
        let sink = crop(&[OP_RUN | 10], 0, 4, 0, 3);
        assert!(sink.calls.is_empty());
        let sink = crop(&[OP_RUN | 10], 0, 4, 3, 0);
        assert!(sink.calls.is_empty());
    }
}
