//! Asset-side encoders: the compressed pixel stream, PackBits and packed
//! 1-bpp bitmaps.
//!
//! These run at build time (or in tests) and need an allocator. The stream
//! encoder mirrors the decoder's cache and running color exactly, so its
//! output is decodable by [`crate::codec::Decoder`] with no side channel.

use alloc::vec::Vec;

use crate::cache::ColorCache;
use crate::codec::{OP_DIFF, OP_INDEX, OP_LUMA, OP_RGB565, OP_RUN, OP_TRANSPARENT, MAX_RUN};
use crate::color::Rgb;

/// Encode a row-major picture. `None` marks a transparent pixel.
pub fn encode_pixels(pixels: &[Option<Rgb>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len());
    let mut cache = ColorCache::new();
    let mut running = Rgb::default();
    let mut i = 0;

    while i < pixels.len() {
        let Some(c) = pixels[i] else {
            out.push(OP_TRANSPARENT);
            i += 1;
            continue;
        };

        if c == running {
            let mut run = 1u8;
            while run < MAX_RUN && pixels.get(i + usize::from(run)) == Some(&Some(c)) {
                run += 1;
            }
            out.push(OP_RUN | (run - 1));
            i += usize::from(run);
            continue;
        }

        if let Some(slot) = cache.find(c) {
            out.push(OP_INDEX | slot);
        } else {
            cache.store(c);
            encode_delta(&mut out, running, c);
        }
        running = c;
        i += 1;
    }
    out
}

fn encode_delta(out: &mut Vec<u8>, prev: Rgb, c: Rgb) {
    let dr = i16::from(c.r) - i16::from(prev.r);
    let dg = i16::from(c.g) - i16::from(prev.g);
    let db = i16::from(c.b) - i16::from(prev.b);

    let small = |d: i16| (-2..=1).contains(&d);
    if small(dr) && small(dg) && small(db) {
        out.push(OP_DIFF | ((dr + 2) as u8) << 4 | ((dg + 2) as u8) << 2 | (db + 2) as u8);
        return;
    }

    let (dr_dg, db_dg) = (dr - dg, db - dg);
    let nibble = |d: i16| (-8..=7).contains(&d);
    if (-32..=31).contains(&dg) && nibble(dr_dg) && nibble(db_dg) {
        out.push(OP_LUMA | (dg + 32) as u8);
        out.push(((dr_dg + 8) as u8) << 4 | (db_dg + 8) as u8);
        return;
    }

    let word = (u16::from(c.r) << 11) | (u16::from(c.g) << 5) | u16::from(c.b);
    out.push(OP_RGB565);
    out.extend_from_slice(&word.to_be_bytes());
}

/// PackBits-compress a byte string.
///
/// Repeat blocks are used for two or more equal bytes at the current
/// position; a literal block stops early once three equal bytes follow.
pub fn packbits(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 64 + 1);
    let mut i = 0;

    while i < data.len() {
        let mut run = 1;
        while run < 128 && i + run < data.len() && data[i] == data[i + run] {
            run += 1;
        }

        if run > 1 {
            out.push((1 - run as i16) as i8 as u8);
            out.push(data[i]);
            i += run;
            continue;
        }

        let mut len = 0;
        while len < 128 && i + len < data.len() {
            let at = i + len;
            if at + 2 < data.len() && data[at] == data[at + 1] && data[at] == data[at + 2] {
                break;
            }
            len += 1;
        }
        out.push((len - 1) as u8);
        out.extend_from_slice(&data[i..i + len]);
        i += len;
    }
    out
}

/// Pack one bool per pixel into bytes, MSB first. The tail is zero-padded.
pub fn pack_bitmap(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &on)| acc | (u8::from(on) << (7 - i)))
        })
        .collect()
}
