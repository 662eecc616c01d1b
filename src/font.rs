//! Fixed-width fonts built from compressed glyph tables.
//!
//! A font is a glyph pool plus one or two indexes into it. Single-byte codes
//! are either addressed directly (`code - base`) or looked up in a sorted
//! table; double-byte codes always go through a sorted table.

use crate::color::Style;
use crate::hal::PixelSink;
use crate::image::fill_image;
#[cfg(feature = "mono-bitmap")]
use crate::mono::{bitmap_len, fill_bitmap};
#[cfg(feature = "packbits")]
use crate::mono::fill_packbits;

/// Offset table entry marking a code with no glyph.
pub const GLYPH_UNDEFINED: u16 = 0xFFFF;

/// How glyph bytes in the pool are encoded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Compression {
    /// Full-color compressed stream.
    Qoi,
    /// PackBits-compressed 1-bpp bitmap.
    PackBits,
    /// Raw 1-bpp bitmap.
    Monochrome,
}

/// Sorted-table entry: a character code and its glyph's pool offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlyphEntry<C> {
    pub code: C,
    pub offset: u16,
}

impl<C> GlyphEntry<C> {
    pub const fn new(code: C, offset: u16) -> Self {
        Self { code, offset }
    }
}

/// Index for single-byte codes.
#[derive(Copy, Clone, Debug)]
pub enum AsciiIndex<'a> {
    /// `offsets[code - base]` is the pool offset, or [`GLYPH_UNDEFINED`].
    Direct { base: u8, offsets: &'a [u16] },
    /// Raw bitmaps of `count` glyphs stored back to back in the pool, no
    /// offset table.
    #[cfg(feature = "mono-bitmap")]
    Packed { base: u8, count: u8 },
    /// Sorted by code, searched.
    Sorted(&'a [GlyphEntry<u8>]),
}

/// A resolved glyph, ready to draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Glyph<'a> {
    pub data: &'a [u8],
    pub width: u16,
    pub height: u16,
    pub compression: Compression,
}

#[derive(Copy, Clone, Debug)]
pub struct Font<'a> {
    pub ascii: AsciiIndex<'a>,
    /// Double-byte index, sorted by code. Empty when the font has none.
    pub wide: &'a [GlyphEntry<u16>],
    pub pool: &'a [u8],
    /// Glyph width in pixels; double-byte glyphs are twice as wide.
    pub width: u8,
    pub height: u8,
    pub compression: Compression,
}

/// Binary search of a table sorted ascending by code.
pub fn search<C: Ord + Copy>(table: &[GlyphEntry<C>], code: C) -> Option<usize> {
    let (mut low, mut high) = (0, table.len());
    while low < high {
        let mid = (low + high) / 2;
        match table[mid].code.cmp(&code) {
            core::cmp::Ordering::Less => low = mid + 1,
            core::cmp::Ordering::Greater => high = mid,
            core::cmp::Ordering::Equal => return Some(mid),
        }
    }
    None
}

cfg_if::cfg_if! {
    if #[cfg(target_endian = "little")] {
        /// Double-byte character code as stored in the wide index.
        #[inline]
        pub const fn wide_code(first: u8, second: u8) -> u16 {
            (first as u16) << 8 | second as u16
        }
    } else {
        /// Double-byte character code as stored in the wide index.
        #[inline]
        pub const fn wide_code(first: u8, second: u8) -> u16 {
            first as u16 | (second as u16) << 8
        }
    }
}

impl<'a> Font<'a> {
    /// Width in pixels of `text` (double-byte characters count two bytes
    /// and are two glyphs wide, so bytes times width holds for both).
    pub fn text_width(&self, text: &[u8]) -> u16 {
        (text.len() as u16).saturating_mul(u16::from(self.width))
    }

    fn glyph_at(&self, offset: u16, width: u16) -> Option<Glyph<'a>> {
        if offset == GLYPH_UNDEFINED {
            return None;
        }
        Some(Glyph {
            data: self.pool.get(usize::from(offset)..)?,
            width,
            height: u16::from(self.height),
            compression: self.compression,
        })
    }

    /// Look up a single-byte character.
    pub fn resolve(&self, code: u8) -> Option<Glyph<'a>> {
        let width = u16::from(self.width);
        match self.ascii {
            AsciiIndex::Direct { base, offsets } => {
                let idx = code.checked_sub(base)?;
                let offset = *offsets.get(usize::from(idx))?;
                self.glyph_at(offset, width)
            }
            #[cfg(feature = "mono-bitmap")]
            AsciiIndex::Packed { base, count } => {
                let idx = code.checked_sub(base).filter(|&i| i < count)?;
                let size = bitmap_len(width, u16::from(self.height));
                let start = size * usize::from(idx);
                Some(Glyph {
                    data: self.pool.get(start..start + size)?,
                    width,
                    height: u16::from(self.height),
                    compression: Compression::Monochrome,
                })
            }
            AsciiIndex::Sorted(table) => {
                let idx = search(table, code)?;
                self.glyph_at(table[idx].offset, width)
            }
        }
    }

    /// Look up a double-byte character.
    pub fn resolve_wide(&self, code: u16) -> Option<Glyph<'a>> {
        let idx = search(self.wide, code)?;
        self.glyph_at(self.wide[idx].offset, u16::from(self.width) * 2)
    }
}

impl Glyph<'_> {
    /// Draw with the top-left corner at (x, y).
    ///
    /// Codecs left out of the build fall back to the full-color decoder.
    pub fn draw<S: PixelSink>(&self, sink: &mut S, style: &Style, x: u16, y: u16) -> Result<(), S::Error> {
        match self.compression {
            #[cfg(feature = "packbits")]
            Compression::PackBits => fill_packbits(sink, style, self.data, x, y, self.width, self.height),
            #[cfg(feature = "mono-bitmap")]
            Compression::Monochrome => fill_bitmap(sink, style, self.data, x, y, self.width, self.height),
            #[allow(unreachable_patterns)]
            _ => fill_image(sink, style, self.data, x, y, self.width, self.height),
        }
    }
}

/// Resolve and draw one single-byte character. Undefined codes draw nothing.
pub fn fill_char<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    font: &Font<'_>,
    x: u16,
    y: u16,
    code: u8,
) -> Result<(), S::Error> {
    match font.resolve(code) {
        Some(glyph) => glyph.draw(sink, style, x, y),
        None => {
            log::trace!("no glyph for {:#04x}", code);
            Ok(())
        }
    }
}

/// Resolve and draw one double-byte character.
pub fn fill_wide_char<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    font: &Font<'_>,
    x: u16,
    y: u16,
    code: u16,
) -> Result<(), S::Error> {
    match font.resolve_wide(code) {
        Some(glyph) => glyph.draw(sink, style, x, y),
        None => {
            log::trace!("no wide glyph for {:#06x}", code);
            Ok(())
        }
    }
}
