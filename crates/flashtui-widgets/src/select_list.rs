#![forbid(unsafe_code)]

//! A scrollable, searchable list to pick one item from.
//!
//! Every item is shown on one row as three fields (left, center, right)
//! produced by a formatting function. The fields are render markup and are
//! styled independently; the cursor row is drawn in standout across the
//! full width.
//!
//! # Keys
//!
//! | Key            | Command       |
//! |----------------|---------------|
//! | `h` `q`        | back, nothing selected |
//! | `j` `k` / arrows | move one row |
//! | `f` `b` / PgDn PgUp | page by a screen |
//! | `d` `u`        | page by half a screen |
//! | `g` `G` / Home End | top / bottom |
//! | `l` / Enter    | select        |
//! | `/`            | search (live) |
//! | `n` `N`        | next / previous match |
//!
//! The search keys are only bound when the list has a match predicate.
//! Views embedding a list layer their own bindings on top of these.

use std::io;

use flashtui_core::cell::overlay;
use flashtui_core::{AttrMask, AttributedRun, KeyCode, KeyEvent, Surface};
use flashtui_style::TagTable;
use flashtui_text::render;
use flashtui_text::render::escape;

use crate::align::{Align, print_runs_aligned};
use crate::dispatch::{Outcome, View};
use crate::input_line::InputLine;
use crate::scroll::ScrollState;

const DEFAULT_HELP: &str = "hq=back  jk=navigate  l=select";

/// Row formatter: `(left, center, right)` render markup.
pub type Formatter<T> = fn(&T) -> (String, String, String);

/// Search predicate: whether an item matches a query.
pub type Predicate<T> = fn(&T, &str) -> bool;

/// Commands understood by every [`SelectList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCommand {
    Back,
    Down,
    Up,
    PageDown,
    PageUp,
    HalfDown,
    HalfUp,
    Top,
    Bottom,
    Select,
    Search,
    NextMatch,
    PrevMatch,
}

/// Items with a cursor, a viewport and an optional search.
#[derive(Debug, Clone)]
pub struct SelectList<T> {
    items: Vec<T>,
    format: Formatter<T>,
    predicate: Option<Predicate<T>>,
    scroll: ScrollState,
    matches: Vec<bool>,
    query: String,
    head: String,
    foot: String,
    dirty: bool,
}

impl<T> SelectList<T> {
    /// A list titled `prompt` with the default key help.
    #[must_use]
    pub fn new(prompt: &str, items: Vec<T>, format: Formatter<T>) -> Self {
        let len = items.len();
        Self {
            items,
            format,
            predicate: None,
            scroll: ScrollState::new(len, 1, 2),
            matches: vec![false; len],
            query: String::new(),
            head: format!("{prompt}  |  {DEFAULT_HELP}"),
            foot: String::new(),
            dirty: true,
        }
    }

    /// Replace the key help shown after the title.
    #[must_use]
    pub fn with_help(mut self, prompt: &str, help: &str) -> Self {
        self.head = format!("{prompt}  |  {help}");
        self
    }

    /// Enable searching with `predicate`.
    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate<T>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    #[must_use]
    pub fn matches(&self) -> &[bool] {
        &self.matches
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.scroll.cursor()
    }

    /// The item under the cursor, if any.
    #[must_use]
    pub fn confirm(&self) -> Option<&T> {
        self.scroll.cursor().and_then(|i| self.items.get(i))
    }

    /// Replace the item at `index`, re-testing it against the search.
    /// Returns the old item, or `None` if `index` is out of range.
    pub fn replace_item(&mut self, index: usize, item: T) -> Option<T> {
        let slot = self.items.get_mut(index)?;
        let old = std::mem::replace(slot, item);
        if let Some(pred) = self.predicate
            && !self.query.is_empty()
        {
            self.matches[index] = pred(&self.items[index], &self.query);
        }
        self.dirty = true;
        Some(old)
    }

    /// Drop the selection.
    pub fn no_selection(&mut self) {
        self.scroll.clear_cursor();
    }

    /// Whether the chrome needs redrawing; clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Replace every item, keeping cursor, viewport and search.
    ///
    /// # Panics
    ///
    /// If `items` has a different length: the scroll position would no
    /// longer describe the list.
    pub fn replace_items(&mut self, items: Vec<T>) {
        assert_eq!(
            items.len(),
            self.items.len(),
            "cannot change the number of rows of a list in place"
        );
        self.items = items;
        self.recompute_matches();
    }

    /// Fit the viewport to a screen `rows` tall: the main area between the
    /// chrome, with a margin of a sixth of the screen.
    pub fn fit(&mut self, rows: u16) {
        let height = usize::from(rows.saturating_sub(4)).max(1);
        let threshold = (usize::from(rows) / 6).max(2);
        if height != self.scroll.height() || threshold != self.scroll.threshold() {
            self.scroll.set_height(height);
            self.scroll.set_threshold(threshold);
            self.dirty = true;
        }
    }

    /// Set the viewport height and look-ahead margin directly.
    pub fn resize(&mut self, height: usize, threshold: usize) {
        self.scroll.set_height(height);
        self.scroll.set_threshold(threshold);
    }

    fn recompute_matches(&mut self) {
        self.matches = match self.predicate {
            Some(pred) if !self.query.is_empty() => {
                self.items.iter().map(|item| pred(item, &self.query)).collect()
            }
            _ => vec![false; self.items.len()],
        };
    }

    /// Evaluate `query` against every item, then move to the first match at
    /// or after the cursor. Returns the index moved to.
    pub fn search(&mut self, query: &str) -> Option<usize> {
        self.query = query.to_string();
        self.recompute_matches();
        let found = self.find_match(0, true);
        flashtui_core::debug!(query, found = ?found, "list search");
        found
    }

    /// Move to the next match, starting `skip` rows below the cursor and
    /// wrapping around.
    pub fn next_match(&mut self, skip: usize) -> Option<usize> {
        self.find_match(skip, true)
    }

    /// Move to the previous match, starting `skip` rows above the cursor and
    /// wrapping around.
    pub fn prev_match(&mut self, skip: usize) -> Option<usize> {
        self.find_match(skip, false)
    }

    fn find_match(&mut self, skip: usize, forward: bool) -> Option<usize> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }
        let cursor = self.scroll.cursor().unwrap_or(0);
        let found = (0..len)
            .map(|step| {
                let distance = (skip + step) % len;
                if forward {
                    (cursor + distance) % len
                } else {
                    (cursor + len - distance) % len
                }
            })
            .find(|&i| self.matches[i])?;
        self.scroll.jump_to(found);
        Some(found)
    }

    fn clear_search(&mut self) {
        self.query.clear();
        self.recompute_matches();
    }

    fn report_miss(&mut self) {
        self.foot = format!("Pattern not found: {}", escape(&self.query));
        self.dirty = true;
    }

    /// Base key bindings.
    #[must_use]
    pub fn binding(&self, key: &KeyEvent) -> Option<ListCommand> {
        if key.ctrl() || key.alt() {
            return None;
        }
        let cmd = match key.code {
            KeyCode::Char('h' | 'q') => ListCommand::Back,
            KeyCode::Char('j') | KeyCode::Down => ListCommand::Down,
            KeyCode::Char('k') | KeyCode::Up => ListCommand::Up,
            KeyCode::Char('f') | KeyCode::PageDown => ListCommand::PageDown,
            KeyCode::Char('b') | KeyCode::PageUp => ListCommand::PageUp,
            KeyCode::Char('d') => ListCommand::HalfDown,
            KeyCode::Char('u') => ListCommand::HalfUp,
            KeyCode::Char('g') | KeyCode::Home => ListCommand::Top,
            KeyCode::Char('G') | KeyCode::End => ListCommand::Bottom,
            KeyCode::Char('l') | KeyCode::Enter => ListCommand::Select,
            KeyCode::Char('/') if self.predicate.is_some() => ListCommand::Search,
            KeyCode::Char('n') if self.predicate.is_some() => ListCommand::NextMatch,
            KeyCode::Char('N') if self.predicate.is_some() => ListCommand::PrevMatch,
            _ => return None,
        };
        Some(cmd)
    }

    /// Keys a list lets its parent handle.
    #[must_use]
    pub fn defers(&self, key: &KeyEvent) -> bool {
        key.is_char(':')
    }

    /// Run a base command. `top` is the first row of the list on screen.
    pub fn execute(
        &mut self,
        cmd: ListCommand,
        surface: &mut dyn Surface,
        tags: &TagTable,
        top: u16,
    ) -> io::Result<Outcome> {
        let page = self.scroll.height();
        match cmd {
            ListCommand::Back => {
                self.no_selection();
                return Ok(Outcome::Terminate);
            }
            ListCommand::Select => return Ok(Outcome::Terminate),
            ListCommand::Down => self.scroll.move_down(),
            ListCommand::Up => self.scroll.move_up(),
            ListCommand::PageDown => self.scroll.page_down(page),
            ListCommand::PageUp => self.scroll.page_up(page),
            ListCommand::HalfDown => self.scroll.page_down(page / 2),
            ListCommand::HalfUp => self.scroll.page_up(page / 2),
            ListCommand::Top => self.scroll.page_up(usize::MAX),
            ListCommand::Bottom => self.scroll.page_down(usize::MAX),
            ListCommand::Search => self.live_search(surface, tags, top)?,
            ListCommand::NextMatch | ListCommand::PrevMatch => {
                if !self.query.is_empty() {
                    let found = if cmd == ListCommand::NextMatch {
                        self.next_match(1)
                    } else {
                        self.prev_match(1)
                    };
                    if found.is_none() {
                        self.report_miss();
                    }
                }
            }
        }
        Ok(Outcome::Continue)
    }

    /// Prompt for a query on the footer row, searching as it is typed.
    ///
    /// Every edit searches from where the cursor was when the prompt opened.
    /// Cancelling, or accepting an empty query, restores that position.
    fn live_search(&mut self, surface: &mut dyn Surface, tags: &TagTable, top: u16) -> io::Result<()> {
        let snapshot = self.scroll;
        let query = InputLine::new("/")
            .quit_on_empty(true)
            .read_with(surface, |query, surface| {
                self.scroll = snapshot;
                if query.is_empty() {
                    self.clear_search();
                } else {
                    self.search(query);
                }
                self.draw(surface, tags, top)
            })?;
        self.dirty = true;
        if query.is_empty() {
            self.scroll = snapshot;
            self.clear_search();
        } else if !self.matches.contains(&true) {
            self.report_miss();
        }
        flashtui_core::debug!(query = %self.query, "search finished");
        Ok(())
    }

    /// Draw the rows in the viewport starting at screen row `top`.
    pub fn draw(&self, surface: &mut dyn Surface, tags: &TagTable, top: u16) -> io::Result<()> {
        let (_, cols) = surface.measure();
        let height = u16::try_from(self.scroll.height()).unwrap_or(u16::MAX);
        surface.clear_region(top, height)?;

        let cursor = self.scroll.cursor();
        for index in self.scroll.visible_range() {
            let row = top.saturating_add(u16::try_from(index - self.scroll.offset()).unwrap_or(u16::MAX));
            let selected = cursor == Some(index);
            if selected {
                let fill = vec![AttributedRun::new(' ', AttrMask::STANDOUT); usize::from(cols)];
                surface.draw(row, 0, &fill)?;
            }
            let (left, center, right) = (self.format)(&self.items[index]);
            for (align, markup) in [
                (Align::Left, format!(" {left}")),
                (Align::Center, center),
                (Align::Right, format!("{right} ")),
            ] {
                let mut runs = render(&markup, tags).to_runs();
                if selected {
                    overlay(&mut runs, AttrMask::STANDOUT);
                }
                print_runs_aligned(surface, row, align, &runs)?;
            }
        }
        Ok(())
    }
}

impl<T> View for SelectList<T> {
    fn header(&self) -> &str {
        &self.head
    }

    fn footer(&self) -> &str {
        &self.foot
    }

    fn set_footer(&mut self, footer: String) {
        self.foot = footer;
        self.dirty = true;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
