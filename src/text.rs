//! Differential text rendering for fixed-width fonts.
//!
//! The caller keeps whatever string it drew last time and passes it back as
//! `prev`. Only character cells whose content changed are redrawn; the cursor
//! always advances by the glyph width, so cell positions depend on nothing but
//! the character count.
//!
//! Strings are byte strings. With the `wide-glyphs` feature a byte above 127
//! starts a two-byte character drawn two cells wide.

use crate::color::{Color, Style};
use crate::font::{fill_char, fill_wide_char, wide_code, Font};
use crate::hal::{fill_rect, PixelSink};
use crate::image::{fill_image_region, Image};

/// What to paint over cells a shorter string no longer covers.
#[derive(Copy, Clone, Debug)]
pub enum Fill<'a> {
    Solid(Color),
    /// Part of a background image lying under the text box.
    Image(&'a Image<'a>),
}

impl Fill<'_> {
    /// Paint `w` x `h` at (x, y). For image fills, `image_left` is the screen
    /// x of the image's left edge and the image top sits at `y`.
    #[allow(clippy::too_many_arguments)]
    fn paint<S: PixelSink>(
        &self,
        sink: &mut S,
        style: &Style,
        image_left: u16,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
    ) -> Result<(), S::Error> {
        match *self {
            Fill::Solid(color) => fill_rect(sink, x, y, w, h, color),
            Fill::Image(image) => {
                let src_x = x.saturating_sub(image_left).min(image.width);
                let w = w.min(image.width - src_x);
                let h = h.min(image.height);
                if w == 0 || h == 0 {
                    return Ok(());
                }
                fill_image_region(sink, style, image, src_x, 0, x, y, w, h)
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Char {
    Narrow(u8),
    Wide(u16),
}

impl Char {
    /// Bytes taken in the string, which is also cells taken on screen.
    fn len(self) -> usize {
        match self {
            Char::Narrow(_) => 1,
            Char::Wide(_) => 2,
        }
    }
}

fn char_at(s: &[u8], i: usize) -> Option<Char> {
    let c = *s.get(i)?;
    if cfg!(feature = "wide-glyphs") && c > 127 {
        Some(Char::Wide(wide_code(c, s.get(i + 1).copied().unwrap_or(0))))
    } else {
        Some(Char::Narrow(c))
    }
}

/// Draw `text` at (x, y), skipping cells whose character is unchanged from
/// `prev`. A character counts as unchanged only if `prev` has the same one
/// starting in the same cell.
///
/// Returns the x just past the last cell.
pub fn fill_text<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    font: &Font<'_>,
    x: u16,
    y: u16,
    text: &[u8],
    prev: &[u8],
) -> Result<u16, S::Error> {
    let cell = u16::from(font.width);
    let (mut i, mut j) = (0, 0);
    let mut x = x;

    while let Some(ch) = char_at(text, i) {
        while j < i {
            match char_at(prev, j) {
                Some(old) => j += old.len(),
                None => break,
            }
        }
        if j != i || char_at(prev, j) != Some(ch) {
            match ch {
                Char::Narrow(code) => fill_char(sink, style, font, x, y, code)?,
                Char::Wide(code) => fill_wide_char(sink, style, font, x, y, code)?,
            }
        }
        i += ch.len();
        x = x.saturating_add(cell * ch.len() as u16);
    }
    Ok(x)
}

/// Left-aligned text starting at `x`. Cells left over from a longer `prev`
/// are painted with `fill`; an image fill has its left edge at `x`.
#[allow(clippy::too_many_arguments)]
pub fn fill_text_left<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    font: &Font<'_>,
    x: u16,
    y: u16,
    text: &[u8],
    prev: &[u8],
    fill: Fill<'_>,
) -> Result<u16, S::Error> {
    let end = fill_text(sink, style, font, x, y, text, prev)?;
    if prev.len() > text.len() {
        let vacated = font.text_width(&prev[text.len()..]);
        fill.paint(sink, style, x, end, y, vacated, u16::from(font.height))?;
    }
    Ok(end)
}

/// Right-aligned text ending at `x`.
///
/// A length change shifts every cell, so the whole string is redrawn and the
/// strip the old string covered beyond the new one is painted with `fill`.
/// An image fill has its right edge at `x`.
#[allow(clippy::too_many_arguments)]
pub fn fill_text_right<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    font: &Font<'_>,
    x: u16,
    y: u16,
    text: &[u8],
    prev: &[u8],
    fill: Fill<'_>,
) -> Result<u16, S::Error> {
    let new_start = x.saturating_sub(font.text_width(text));
    let old_start = x.saturating_sub(font.text_width(prev));

    let mut prev = prev;
    if prev.len() != text.len() {
        prev = b"";
        if old_start < new_start {
            let image_left = match fill {
                Fill::Image(image) => x.saturating_sub(image.width),
                Fill::Solid(_) => 0,
            };
            fill.paint(sink, style, image_left, old_start, y, new_start - old_start, u16::from(font.height))?;
        }
    }

    fill_text(sink, style, font, new_start, y, text, prev)?;
    Ok(x)
}

/// Text centered in `[x, x + width)`.
///
/// On a length change the string is redrawn in full; if it got shorter the
/// whole box is painted with `fill` first. An image fill spans the box.
#[allow(clippy::too_many_arguments)]
pub fn fill_text_center<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    font: &Font<'_>,
    x: u16,
    y: u16,
    width: u16,
    text: &[u8],
    prev: &[u8],
    fill: Fill<'_>,
) -> Result<(), S::Error> {
    let offset = width.saturating_sub(font.text_width(text)) / 2;

    let mut prev = prev;
    if prev.len() != text.len() {
        if prev.len() > text.len() {
            fill.paint(sink, style, x, x, y, width, u16::from(font.height))?;
        }
        prev = b"";
    }

    fill_text(sink, style, font, x.saturating_add(offset), y, text, prev)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{OP_DIFF, OP_RGB565, OP_RUN};
    use crate::color::pack;
    use crate::font::{AsciiIndex, Compression, GlyphEntry};
    use crate::testing::{Call, RecordingSink};
    use embedded_graphics::pixelcolor::raw::{RawData, RawU16};

    // 4x4 glyphs for 'A'..='Z', two bytes each.
    static POOL: [u8; 52] = {
        let mut p = [0u8; 52];
        let mut i = 0;
        while i < 52 {
            p[i] = (i / 2) as u8 + 1;
            i += 1;
        }
        p
    };
    static OFFSETS: [u16; 26] = {
        let mut o = [0u16; 26];
        let mut i = 0;
        while i < 26 {
            o[i] = i as u16 * 2;
            i += 1;
        }
        o
    };
    static WIDE: [GlyphEntry<u16>; 1] = [GlyphEntry::new(wide_code(0xD6, 0xD0), 0)];

    const FONT: Font<'static> = Font {
        ascii: AsciiIndex::Direct { base: b'A', offsets: &OFFSETS },
        wide: &WIDE,
        pool: &POOL,
        width: 4,
        height: 4,
        compression: Compression::Monochrome,
    };

    const FILL: u16 = 0x07E0;

    fn style() -> Style {
        Style::new(RawU16::new(0xFFFF), RawU16::new(0x0000))
    }

    /// x of every glyph window opened, in order.
    fn glyph_xs(sink: &RecordingSink) -> Vec<u16> {
        sink.windows().iter().filter(|w| w.3 - w.1 == 4 && w.2 - w.0 <= 8).map(|w| w.0).collect()
    }

    #[test_log::test]
    fn only_changed_cell_is_redrawn() {
        let mut sink = RecordingSink::new();
        let end = fill_text(&mut sink, &style(), &FONT, 10, 0, b"AXC", b"ABC").unwrap();
        assert_eq!(end, 22);
        assert_eq!(sink.windows(), vec![(14, 0, 18, 4)]);
    }

    #[test_log::test]
    fn identical_text_draws_nothing() {
        let mut sink = RecordingSink::new();
        fill_text(&mut sink, &style(), &FONT, 0, 0, b"HELLO", b"HELLO").unwrap();
        assert!(sink.calls.is_empty());
    }

    #[test_log::test]
    fn longer_text_draws_new_tail() {
        let mut sink = RecordingSink::new();
        fill_text(&mut sink, &style(), &FONT, 0, 0, b"ABCD", b"AB").unwrap();
        assert_eq!(glyph_xs(&sink), vec![8, 12]);
    }

    #[test_log::test]
    fn undefined_glyph_still_advances() {
        let mut sink = RecordingSink::new();
        let end = fill_text(&mut sink, &style(), &FONT, 0, 0, b"a?Z", b"").unwrap();
        assert_eq!(end, 12);
        assert_eq!(glyph_xs(&sink), vec![8]);
    }

    #[test_log::test]
    fn left_aligned_fills_vacated_cell() {
        let mut sink = RecordingSink::new();
        let end = fill_text_left(&mut sink, &style(), &FONT, 20, 30, b"A", b"AB", Fill::Solid(RawU16::new(FILL))).unwrap();
        assert_eq!(end, 24);
        assert_eq!(
            sink.calls,
            vec![Call::Window(24, 30, 28, 34), Call::Batch(FILL, 16), Call::End]
        );
    }

    #[test_log::test]
    fn left_aligned_image_fill_uses_matching_columns() {
        // 12x4 background: column c is color c (via raw RGB + runs per row).
        let mut data = Vec::new();
        for _row in 0..4 {
            for col in 0..12u16 {
                data.push(OP_RGB565);
                data.extend_from_slice(&col.to_be_bytes());
            }
        }
        let bg = Image::new(&data, 12, 4);
        let mut sink = RecordingSink::new();
        fill_text_left(&mut sink, &style(), &FONT, 100, 0, b"A", b"ABC", Fill::Image(&bg)).unwrap();

        assert_eq!(sink.windows(), vec![(104, 0, 112, 4)]);
        let want: Vec<u16> = (0..4)
            .flat_map(|_| (4..12u16).map(|c| pack(0, 0, c as u8).into_inner()))
            .collect();
        assert_eq!(sink.pixels(), want);
    }

    #[test_log::test]
    fn right_aligned_same_length_is_differential() {
        let mut sink = RecordingSink::new();
        let x = fill_text_right(&mut sink, &style(), &FONT, 100, 0, b"AB", b"AC", Fill::Solid(RawU16::new(FILL))).unwrap();
        assert_eq!(x, 100);
        assert_eq!(glyph_xs(&sink), vec![96]);
    }

    #[test_log::test]
    fn right_aligned_shrink_fills_and_redraws() {
        let mut sink = RecordingSink::new();
        fill_text_right(&mut sink, &style(), &FONT, 100, 0, b"AB", b"ABCD", Fill::Solid(RawU16::new(FILL))).unwrap();
        assert_eq!(sink.calls[0], Call::Window(84, 0, 92, 4));
        assert_eq!(sink.calls[1], Call::Batch(FILL, 32));
        assert_eq!(glyph_xs(&sink)[1..], [92, 96]);
    }

    #[test_log::test]
    fn right_aligned_grow_redraws_without_fill() {
        let mut sink = RecordingSink::new();
        fill_text_right(&mut sink, &style(), &FONT, 100, 0, b"ABC", b"BC", Fill::Solid(RawU16::new(FILL))).unwrap();
        assert_eq!(glyph_xs(&sink), vec![88, 92, 96]);
        assert!(!sink.calls.contains(&Call::Batch(FILL, 16)));
    }

    #[test_log::test]
    fn right_aligned_image_fill_is_anchored_at_right_edge() {
        let data = [OP_DIFF | 0b11_11_11, OP_RUN | 61, OP_RUN | 61, OP_RUN | 61];
        let bg = Image::new(&data, 16, 4);
        let mut sink = RecordingSink::new();
        fill_text_right(&mut sink, &style(), &FONT, 50, 0, b"A", b"ABC", Fill::Image(&bg)).unwrap();
        // Old text covered 38..50, new 46..50; the strip 38..46 is image
        // columns 4..12 since the image spans 34..50.
        assert_eq!(sink.windows()[0], (38, 0, 46, 4));
        assert_eq!(sink.calls.iter().filter(|c| **c == Call::End).count(), 2);
    }

    #[test_log::test]
    fn centered_shrink_fills_whole_box() {
        let mut sink = RecordingSink::new();
        fill_text_center(&mut sink, &style(), &FONT, 0, 0, 40, b"AB", b"ABC", Fill::Solid(RawU16::new(FILL))).unwrap();
        assert_eq!(sink.calls[0], Call::Window(0, 0, 40, 4));
        assert_eq!(sink.calls[1], Call::Batch(FILL, 160));
        assert_eq!(glyph_xs(&sink), vec![16, 20]);
    }

    #[test_log::test]
    fn centered_same_length_is_differential() {
        let mut sink = RecordingSink::new();
        fill_text_center(&mut sink, &style(), &FONT, 0, 0, 40, b"AB", b"AC", Fill::Solid(RawU16::new(FILL))).unwrap();
        assert_eq!(sink.windows(), vec![(20, 0, 24, 4)]);
    }

    #[cfg(feature = "wide-glyphs")]
    #[test_log::test]
    fn wide_characters_take_two_cells() {
        let mut sink = RecordingSink::new();
        let text = [0xD6, 0xD0, b'A'];
        let end = fill_text(&mut sink, &style(), &FONT, 0, 0, &text, b"").unwrap();
        assert_eq!(end, 12);
        assert_eq!(sink.windows(), vec![(0, 0, 8, 4), (8, 0, 12, 4)]);

        sink.clear();
        fill_text(&mut sink, &style(), &FONT, 0, 0, &text, &[0xD6, 0xD0, b'B']).unwrap();
        assert_eq!(sink.windows(), vec![(8, 0, 12, 4)]);

        // Two narrow cells replaced by one wide one; 'A' stays in its cell.
        sink.clear();
        fill_text(&mut sink, &style(), &FONT, 0, 0, &text, b"XYA").unwrap();
        assert_eq!(sink.windows(), vec![(0, 0, 8, 4)]);

        // The reverse: 'A' now starts mid-way through the old wide glyph.
        sink.clear();
        fill_text(&mut sink, &style(), &FONT, 0, 0, b"XA", &[0xD6, 0xD0]).unwrap();
        assert_eq!(sink.windows(), vec![(0, 0, 4, 4), (4, 0, 8, 4)]);
    }
}
