//! Differential progress bars drawn from a "full" and an "empty" image.
//!
//! Both images have the bar's size and sit at the same screen position. A
//! value change only redraws the strip between the old and new value, taken
//! from the full image when the bar grows and the empty one when it shrinks.

use crate::color::Style;
use crate::hal::PixelSink;
use crate::image::{fill_image_region, Image};

/// The edge the bar grows from, named by the direction it grows in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Grows from the right edge leftwards.
    Left,
    /// Grows from the left edge rightwards.
    Right,
    /// Grows from the bottom edge upwards.
    Top,
    /// Grows from the top edge downwards.
    Bottom,
}

/// Redraw the bar at (x, y) for a change from `old` to `new` pixels filled.
///
/// Values are clamped to the image extent along the bar. Equal values draw
/// nothing.
#[allow(clippy::too_many_arguments)]
pub fn fill_progress_bar<S: PixelSink>(
    sink: &mut S,
    style: &Style,
    x: u16,
    y: u16,
    new: u16,
    old: u16,
    full: &Image<'_>,
    empty: &Image<'_>,
    direction: Direction,
) -> Result<(), S::Error> {
    if new == old {
        log::trace!("progress unchanged at {}", new);
        return Ok(());
    }
    let image = if new > old { full } else { empty };

    let extent = match direction {
        Direction::Left | Direction::Right => image.width,
        Direction::Top | Direction::Bottom => image.height,
    };
    let end = new.max(old).min(extent);
    let start = new.min(old).min(end);
    let len = end - start;
    if len == 0 {
        return Ok(());
    }

    match direction {
        Direction::Right => {
            fill_image_region(sink, style, image, start, 0, x.saturating_add(start), y, len, image.height)
        }
        Direction::Left => {
            let from = extent - end;
            fill_image_region(sink, style, image, from, 0, x.saturating_add(from), y, len, image.height)
        }
        Direction::Bottom => {
            fill_image_region(sink, style, image, 0, start, x, y.saturating_add(start), image.width, len)
        }
        Direction::Top => {
            let from = extent - end;
            fill_image_region(sink, style, image, 0, from, x, y.saturating_add(from), image.width, len)
        }
    }
}
