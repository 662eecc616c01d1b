//! Recently-seen color table used by the INDEX opcode.

use crate::color::Rgb;

pub const CACHE_SLOTS: usize = 64;

/// 64 slots of (r, g, b), addressed by [`Rgb::hash`].
///
/// Lives on the stack of a single decode call. Every decode starts from an
/// all-black table, so nothing leaks between images.
#[derive(Clone, Debug)]
pub struct ColorCache {
    slots: [Rgb; CACHE_SLOTS],
}

impl ColorCache {
    pub const fn new() -> Self {
        Self { slots: [Rgb { r: 0, g: 0, b: 0 }; CACHE_SLOTS] }
    }

    #[inline]
    pub fn get(&self, index: u8) -> Rgb {
        self.slots[usize::from(index) & (CACHE_SLOTS - 1)]
    }

    /// Overwrite the slot `color` hashes to.
    #[inline]
    pub fn store(&mut self, color: Rgb) {
        self.slots[color.hash()] = color;
    }

    /// Slot index `color` would occupy, if it is the one stored there.
    pub fn find(&self, color: Rgb) -> Option<u8> {
        let slot = color.hash();
        (self.slots[slot] == color).then_some(slot as u8)
    }
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new()
    }
}
