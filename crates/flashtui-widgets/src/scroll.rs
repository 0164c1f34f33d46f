#![forbid(unsafe_code)]

//! Cursor and viewport over a list of rows.
//!
//! [`ScrollState`] keeps a cursor and a viewport offset for `len` rows shown
//! `height` at a time. Single-row moves keep a look-ahead margin of
//! `threshold` rows between the cursor and the viewport edge while rows
//! remain beyond it; paging moves cursor and viewport together, each clamped
//! on its own.
//!
//! After every operation:
//! - `cursor < len` (or no cursor)
//! - `offset <= max_offset()`
//! - `offset <= cursor < offset + height`

use std::ops::Range;

/// Scroll position of a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    cursor: Option<usize>,
    offset: usize,
    height: usize,
    len: usize,
    threshold: usize,
}

impl ScrollState {
    /// A state for `len` rows, cursor on the first row if there is one.
    #[must_use]
    pub fn new(len: usize, height: usize, threshold: usize) -> Self {
        Self {
            cursor: (len > 0).then_some(0),
            offset: 0,
            height: height.max(1),
            len,
            threshold,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Largest offset that still fills the viewport.
    #[must_use]
    pub fn max_offset(&self) -> usize {
        self.len.saturating_sub(self.height)
    }

    /// Change the viewport height (clamped to at least one row), keeping the
    /// cursor visible.
    pub fn set_height(&mut self, height: usize) {
        self.height = height.max(1);
        self.offset = self.offset.min(self.max_offset());
        self.reveal_cursor();
    }

    pub fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
    }

    /// Drop the selection. The next movement selects the first row again.
    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Cursor to use for a movement, starting over at the top when there is
    /// none. `None` only for an empty list.
    fn start(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        match self.cursor {
            Some(cursor) => Some(cursor),
            None => {
                self.cursor = Some(0);
                self.offset = 0;
                None
            }
        }
    }

    fn reveal_cursor(&mut self) {
        if let Some(cursor) = self.cursor {
            if cursor < self.offset {
                self.offset = cursor;
            } else if cursor >= self.offset + self.height {
                self.offset = cursor + 1 - self.height;
            }
        }
    }

    /// Move the cursor one row down.
    ///
    /// The viewport follows by one row when the cursor was already inside
    /// the trailing margin and rows remain below it.
    pub fn move_down(&mut self) {
        let Some(cursor) = self.start() else {
            return;
        };
        let past = cursor + self.threshold > self.offset + self.height;
        let unseen = self.offset + self.height < self.len;
        if cursor + 1 < self.len {
            self.cursor = Some(cursor + 1);
        }
        if past && unseen {
            self.offset += 1;
        }
        self.reveal_cursor();
    }

    /// Move the cursor one row up.
    ///
    /// The viewport follows by one row when the cursor lands inside the
    /// leading margin and the viewport is not at the top.
    pub fn move_up(&mut self) {
        let Some(cursor) = self.start() else {
            return;
        };
        let cursor = cursor.saturating_sub(1);
        self.cursor = Some(cursor);
        if cursor < self.offset + self.threshold && self.offset > 0 {
            self.offset -= 1;
        }
        self.reveal_cursor();
    }

    /// Move cursor and viewport down by up to `count` rows each.
    /// `usize::MAX` jumps to the bottom.
    pub fn page_down(&mut self, count: usize) {
        let Some(cursor) = self.start() else {
            return;
        };
        let max_offset = self.max_offset();
        self.offset += count.min(max_offset.saturating_sub(self.offset));
        self.cursor = Some(cursor + count.min(self.len - 1 - cursor));
        self.reveal_cursor();
    }

    /// Move cursor and viewport up by up to `count` rows each.
    /// `usize::MAX` jumps to the top.
    pub fn page_up(&mut self, count: usize) {
        let Some(cursor) = self.start() else {
            return;
        };
        self.offset -= count.min(self.offset);
        self.cursor = Some(cursor - count.min(cursor));
        self.reveal_cursor();
    }

    /// Move the cursor to `target` by paging the difference.
    pub fn jump_to(&mut self, target: usize) {
        if self.len == 0 {
            return;
        }
        let target = target.min(self.len - 1);
        let cursor = self.cursor.unwrap_or(0);
        if self.cursor.is_none() {
            self.cursor = Some(0);
            self.offset = 0;
        }
        if target > cursor {
            self.page_down(target - cursor);
        } else if target < cursor {
            self.page_up(cursor - target);
        }
    }

    /// Row indices currently in the viewport.
    #[must_use]
    pub fn visible_range(&self) -> Range<usize> {
        self.offset..(self.offset + self.height).min(self.len)
    }

    /// Viewport row of the cursor, if it is visible.
    #[must_use]
    pub fn cursor_row(&self) -> Option<usize> {
        let cursor = self.cursor?;
        self.visible_range()
            .contains(&cursor)
            .then(|| cursor - self.offset)
    }
}
