//! Scrollable list math.
//!
//! Fixed-height lists (workers, upgrades) use [`ListCursor`]. The settings
//! list has items of different heights and uses the `*_variable` helpers,
//! which take the per-item heights instead of a row count.

/// Selection and scroll offset of one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListCursor {
    /// Selected item index.
    pub selected: usize,
    /// Index of the first visible item.
    pub offset: usize,
}

impl ListCursor {
    /// Move the selection by `delta`, clamped to the list, and scroll so it
    /// stays visible.
    pub fn step(&mut self, delta: isize, total: usize, visible: usize) {
        let last = total.saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(last);
        self.follow(total, visible);
    }

    /// Jump to an index, clamped.
    pub fn select(&mut self, index: usize, total: usize, visible: usize) {
        self.selected = index.min(total.saturating_sub(1));
        self.follow(total, visible);
    }

    /// Re-clamp after the list or viewport changed.
    pub fn follow(&mut self, total: usize, visible: usize) {
        self.selected = self.selected.min(total.saturating_sub(1));
        self.offset = ensure_visible(self.selected, self.offset, visible, total);
    }
}

/// Scroll offset that keeps `selected` inside a window of `visible` items.
#[must_use]
pub fn ensure_visible(selected: usize, offset: usize, visible: usize, total: usize) -> usize {
    let mut offset = offset;
    if selected < offset {
        offset = selected;
    } else if visible > 0 && selected >= offset + visible {
        offset = selected + 1 - visible;
    }
    offset.min(total.saturating_sub(visible))
}

/// Items `[start, end)` that fit in `panel_height` rows starting at `offset`.
#[must_use]
pub fn visible_range(heights: &[usize], panel_height: usize, offset: usize) -> (usize, usize) {
    let mut used = 0;
    let mut end = offset;
    for (i, h) in heights.iter().enumerate().skip(offset) {
        if used + h > panel_height {
            break;
        }
        used += h;
        end = i + 1;
    }
    (offset, end.max(offset))
}

/// Variable-height counterpart of [`ensure_visible`].
#[must_use]
pub fn ensure_visible_variable(
    selected: usize,
    offset: usize,
    heights: &[usize],
    panel_height: usize,
) -> usize {
    let (start, end) = visible_range(heights, panel_height, offset);
    if (start..end).contains(&selected) {
        return offset;
    }
    if selected < start {
        return selected;
    }

    // Walk back from the selection until the panel is full.
    let mut new_offset = selected;
    let mut used = 0;
    for i in (0..=selected.min(heights.len().saturating_sub(1))).rev() {
        if used + heights[i] > panel_height {
            break;
        }
        used += heights[i];
        new_offset = i;
    }
    new_offset
}

/// Position and length of a scrollbar thumb, relative to the panel top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scrollbar {
    /// First row of the thumb.
    pub y: usize,
    /// Rows covered by the thumb.
    pub height: usize,
}

/// Thumb for a list of `total` items showing `visible` of them from
/// `offset`, drawn over `panel_height` rows. `None` when everything fits.
#[must_use]
pub fn scrollbar(total: usize, visible: usize, offset: usize, panel_height: usize) -> Option<Scrollbar> {
    if total <= visible || total == 0 {
        return None;
    }
    let height = (panel_height * visible / total).max(1);
    let max_scroll = total - visible;
    let y = (panel_height.saturating_sub(height)) * offset.min(max_scroll) / max_scroll;
    Some(Scrollbar { y, height })
}
