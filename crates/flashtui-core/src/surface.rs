#![forbid(unsafe_code)]

//! The drawing surface every view renders onto.
//!
//! A [`Surface`] is a grid of character cells addressed by `(row, col)` from
//! the top-left corner. Views never talk to the terminal directly; the real
//! terminal is [`crate::terminal_session::TerminalSession`], and tests use the
//! in-memory [`HeadlessSurface`] with a scripted key queue.
//!
//! Drawing past the right edge or below the bottom row is clipped silently.

use std::collections::VecDeque;
use std::io;

use crate::cell::{AttrMask, AttributedRun};
use crate::event::KeyEvent;

/// A character-cell display with blocking key input.
pub trait Surface {
    /// Current size as `(rows, cols)`.
    fn measure(&self) -> (u16, u16);

    /// Draw `runs` starting at `(row, col)`, clipping at the right edge.
    fn draw(&mut self, row: u16, col: u16, runs: &[AttributedRun]) -> io::Result<()>;

    /// Block until the next key press.
    fn read_key(&mut self) -> io::Result<KeyEvent>;

    /// Blank `height` rows starting at `top`.
    fn clear_region(&mut self, top: u16, height: u16) -> io::Result<()>;

    /// Show the cursor at `(row, col)`, or hide it with `None`.
    fn set_cursor(&mut self, at: Option<(u16, u16)>) -> io::Result<()>;

    /// Push pending output to the display.
    fn flush(&mut self) -> io::Result<()>;

    /// Hand the terminal back to the shell (e.g. to run an editor).
    fn suspend(&mut self) -> io::Result<()>;

    /// Take the terminal back after [`Surface::suspend`].
    fn resume(&mut self) -> io::Result<()>;

    /// Whether colour attributes can be displayed.
    fn supports_color(&self) -> bool;

    /// Blank the whole surface.
    fn clear(&mut self) -> io::Result<()> {
        let (rows, _) = self.measure();
        self.clear_region(0, rows)
    }
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn measure(&self) -> (u16, u16) {
        (**self).measure()
    }

    fn draw(&mut self, row: u16, col: u16, runs: &[AttributedRun]) -> io::Result<()> {
        (**self).draw(row, col, runs)
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        (**self).read_key()
    }

    fn clear_region(&mut self, top: u16, height: u16) -> io::Result<()> {
        (**self).clear_region(top, height)
    }

    fn set_cursor(&mut self, at: Option<(u16, u16)>) -> io::Result<()> {
        (**self).set_cursor(at)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn suspend(&mut self) -> io::Result<()> {
        (**self).suspend()
    }

    fn resume(&mut self) -> io::Result<()> {
        (**self).resume()
    }

    fn supports_color(&self) -> bool {
        (**self).supports_color()
    }
}

/// In-memory surface with a scripted key queue.
///
/// `read_key` pops the next scripted key and fails with
/// [`io::ErrorKind::UnexpectedEof`] once the script is exhausted, so a view
/// loop under test always terminates.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    rows: u16,
    cols: u16,
    grid: Vec<Vec<AttributedRun>>,
    keys: VecDeque<KeyEvent>,
    cursor: Option<(u16, u16)>,
    color: bool,
    suspended: bool,
    suspend_count: usize,
    flush_count: usize,
}

impl HeadlessSurface {
    /// Create a blank `rows` x `cols` surface with colour support.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            grid: blank_grid(rows, cols),
            keys: VecDeque::new(),
            cursor: None,
            color: true,
            suspended: false,
            suspend_count: 0,
            flush_count: 0,
        }
    }

    /// Set whether the surface reports colour support.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Queue keys to be returned by `read_key`, in order.
    #[must_use]
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Queue each character of `text` as a plain key press.
    #[must_use]
    pub fn with_typed(mut self, text: &str) -> Self {
        self.keys.extend(text.chars().map(KeyEvent::char));
        self
    }

    /// Queue one more key.
    pub fn push_key(&mut self, key: impl Into<KeyEvent>) {
        self.keys.push_back(key.into());
    }

    /// Number of scripted keys not yet read.
    #[must_use]
    pub fn pending_keys(&self) -> usize {
        self.keys.len()
    }

    /// Change the size, discarding the current contents.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.rows = rows;
        self.cols = cols;
        self.grid = blank_grid(rows, cols);
    }

    /// The cell at `(row, col)`, if inside the surface.
    #[must_use]
    pub fn cell(&self, row: u16, col: u16) -> Option<AttributedRun> {
        self.grid
            .get(usize::from(row))
            .and_then(|line| line.get(usize::from(col)))
            .copied()
    }

    /// The text of `row` with trailing blanks removed.
    #[must_use]
    pub fn row_text(&self, row: u16) -> String {
        self.grid
            .get(usize::from(row))
            .map(|line| line.iter().map(|c| c.ch).collect::<String>())
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default()
    }

    /// The attributes of every cell in `row`.
    #[must_use]
    pub fn row_attrs(&self, row: u16) -> Vec<AttrMask> {
        self.grid
            .get(usize::from(row))
            .map(|line| line.iter().map(|c| c.attrs).collect())
            .unwrap_or_default()
    }

    /// All rows joined by newlines, trailing blanks removed per row.
    #[must_use]
    pub fn screen_text(&self) -> String {
        (0..self.rows)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any row contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        (0..self.rows).any(|row| self.row_text(row).contains(needle))
    }

    /// The visible cursor position, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    /// Whether the surface is currently suspended.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// How many times `suspend` has been called.
    #[must_use]
    pub fn suspend_count(&self) -> usize {
        self.suspend_count
    }

    /// How many times `flush` has been called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }
}

fn blank_grid(rows: u16, cols: u16) -> Vec<Vec<AttributedRun>> {
    vec![vec![AttributedRun::plain(' '); usize::from(cols)]; usize::from(rows)]
}

impl Surface for HeadlessSurface {
    fn measure(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    fn draw(&mut self, row: u16, col: u16, runs: &[AttributedRun]) -> io::Result<()> {
        let Some(line) = self.grid.get_mut(usize::from(row)) else {
            return Ok(());
        };
        for (slot, run) in line.iter_mut().skip(usize::from(col)).zip(runs) {
            *slot = *run;
        }
        Ok(())
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        self.keys.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "scripted key queue exhausted")
        })
    }

    fn clear_region(&mut self, top: u16, height: u16) -> io::Result<()> {
        let start = usize::from(top);
        let end = start.saturating_add(usize::from(height));
        for line in self.grid.iter_mut().take(end).skip(start) {
            line.fill(AttributedRun::plain(' '));
        }
        Ok(())
    }

    fn set_cursor(&mut self, at: Option<(u16, u16)>) -> io::Result<()> {
        self.cursor = at;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_count += 1;
        Ok(())
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.suspended = true;
        self.suspend_count += 1;
        Ok(())
    }

    fn resume(&mut self) -> io::Result<()> {
        self.suspended = false;
        Ok(())
    }

    fn supports_color(&self) -> bool {
        self.color
    }
}
