#![forbid(unsafe_code)]

//! A scrollable block of styled lines.

use std::io;

use flashtui_core::Surface;
use flashtui_style::TagTable;
use flashtui_text::wrap::wrap_styled;
use flashtui_text::{StyledText, render};

use crate::align::{Align, print_runs_aligned};

/// Styled lines shown `height` at a time from a scroll position.
#[derive(Debug, Clone, Default)]
pub struct TextPad {
    lines: Vec<StyledText>,
    scroll: usize,
    height: usize,
}

impl TextPad {
    #[must_use]
    pub fn new(height: usize) -> Self {
        Self {
            lines: Vec::new(),
            scroll: 0,
            height,
        }
    }

    /// Render `markup`, wrap it to `width` and show it from the top.
    pub fn set_markup(&mut self, markup: &str, tags: &TagTable, width: usize) {
        self.set_lines(wrap_styled(&render(markup, tags), width));
    }

    /// Replace the content and scroll back to the top.
    pub fn set_lines(&mut self, lines: Vec<StyledText>) {
        self.lines = lines;
        self.scroll = 0;
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    #[must_use]
    pub fn lines(&self) -> &[StyledText] {
        &self.lines
    }

    #[must_use]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.height)
    }

    /// Scroll one line down if content remains below. Returns whether it
    /// moved.
    pub fn scroll_down(&mut self) -> bool {
        let moved = self.scroll + self.height < self.lines.len();
        if moved {
            self.scroll += 1;
        }
        moved
    }

    /// Scroll one line up if not at the top. Returns whether it moved.
    pub fn scroll_up(&mut self) -> bool {
        let moved = self.scroll > 0;
        if moved {
            self.scroll -= 1;
        }
        moved
    }

    /// Scroll so `row` is the first visible line, as far as possible.
    pub fn scroll_to(&mut self, row: usize) {
        self.scroll = row.min(self.max_scroll());
    }

    /// Clear `height` rows from `top` and draw the visible lines.
    pub fn draw(&self, surface: &mut dyn Surface, top: u16, align: Align) -> io::Result<()> {
        let height = u16::try_from(self.height).unwrap_or(u16::MAX);
        surface.clear_region(top, height)?;
        for (row, line) in (top..top.saturating_add(height)).zip(self.lines.iter().skip(self.scroll))
        {
            print_runs_aligned(surface, row, align, &line.to_runs())?;
        }
        Ok(())
    }
}
