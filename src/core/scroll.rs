//! Scroll window over a list
//!
//! Pure computation of which slice of a list is visible given the current
//! selection, the number of items and the viewport height. The result
//! always contains the selection and never scrolls past either end.

use std::ops::Range;

/// Visible portion of a list after clamping
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScrollWindow {
    /// Selection clamped to `[0, count - 1]` (0 for an empty list)
    pub selected: usize,
    /// Index of the first visible item
    pub offset: usize,
    /// Indices of the visible items
    pub visible: Range<usize>,
}

impl ScrollWindow {
    pub fn has_more_above(&self) -> bool {
        self.offset > 0
    }

    pub fn has_more_below(&self, count: usize) -> bool {
        self.visible.end < count
    }
}

/// Clamp selection and scroll offset to the data and viewport
///
/// # Rules
/// - Selection clamps to `[0, count - 1]`, or 0 when `count == 0`
/// - Selection above the offset snaps the offset to it
/// - Selection at or past `offset + viewport` advances the offset so the
///   selection is the last visible row
/// - The offset is clamped to `[0, max(0, count - viewport)]`
///
/// A zero viewport is treated as one row.
pub fn scroll_window(
    selected: usize,
    count: usize,
    viewport: usize,
    previous_offset: usize,
) -> ScrollWindow {
    let viewport = viewport.max(1);

    if count == 0 {
        return ScrollWindow {
            selected: 0,
            offset: 0,
            visible: 0..0,
        };
    }

    let selected = selected.min(count - 1);
    let mut offset = previous_offset;

    if selected < offset {
        offset = selected;
    } else if selected >= offset + viewport {
        offset = selected + 1 - viewport;
    }

    let max_offset = count.saturating_sub(viewport);
    offset = offset.min(max_offset);

    ScrollWindow {
        selected,
        offset,
        visible: offset..(offset + viewport).min(count),
    }
}

/// Apply a signed movement to a selection without underflowing
pub fn move_selection(selected: usize, delta: isize) -> usize {
    if delta < 0 {
        selected.saturating_sub(delta.unsigned_abs())
    } else {
        selected.saturating_add(delta.unsigned_abs())
    }
}
