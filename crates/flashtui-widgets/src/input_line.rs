#![forbid(unsafe_code)]

//! Single-line text entry on the bottom row.
//!
//! Printable ASCII is appended, Backspace deletes the last character,
//! Enter accepts and Escape cancels. A cancelled read returns the empty
//! string, which callers treat as "no input".

use std::io;

use flashtui_core::{AttributedRun, KeyCode, KeyEvent, Surface};

/// Effect of one key on an [`InputLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The text changed.
    Edited,
    /// Enter was pressed.
    Accepted,
    /// Escape was pressed, or the text was erased with `quit_on_empty` set.
    Cancelled,
    /// The key has no meaning here.
    Ignored,
}

/// A prompt followed by editable text.
#[derive(Debug, Clone, Default)]
pub struct InputLine {
    prompt: String,
    text: String,
    quit_on_empty: bool,
}

impl InputLine {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Start with `text` already entered.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Cancel when Backspace is pressed on empty text.
    #[must_use]
    pub fn quit_on_empty(mut self, quit: bool) -> Self {
        self.quit_on_empty = quit;
        self
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Apply one key.
    pub fn handle_key(&mut self, key: &KeyEvent) -> InputEvent {
        match key.code {
            KeyCode::Enter => InputEvent::Accepted,
            KeyCode::Escape => InputEvent::Cancelled,
            KeyCode::Backspace | KeyCode::Delete | KeyCode::Char('\x7f') => {
                if self.text.pop().is_some() {
                    InputEvent::Edited
                } else if self.quit_on_empty {
                    InputEvent::Cancelled
                } else {
                    InputEvent::Ignored
                }
            }
            _ => match key.printable() {
                Some(c) => {
                    self.text.push(c);
                    InputEvent::Edited
                }
                None => InputEvent::Ignored,
            },
        }
    }

    /// Draw prompt and text on the bottom row and place the cursor after
    /// them.
    pub fn draw(&self, surface: &mut dyn Surface) -> io::Result<()> {
        let (rows, cols) = surface.measure();
        let row = rows.saturating_sub(1);
        let limit = usize::from(cols.saturating_sub(1));
        let runs: Vec<AttributedRun> = self
            .prompt
            .chars()
            .chain(self.text.chars())
            .take(limit)
            .map(AttributedRun::plain)
            .collect();
        surface.clear_region(row, 1)?;
        surface.draw(row, 0, &runs)?;
        let col = u16::try_from(runs.len()).unwrap_or(u16::MAX);
        surface.set_cursor(Some((row, col)))?;
        surface.flush()
    }

    /// Read a line. Returns `""` when cancelled.
    pub fn read(self, surface: &mut dyn Surface) -> io::Result<String> {
        self.read_with(surface, |_, _| Ok(()))
    }

    /// Read a line, calling `on_update` with the current text before every
    /// redraw (including the first).
    pub fn read_with<F>(mut self, surface: &mut dyn Surface, mut on_update: F) -> io::Result<String>
    where
        F: FnMut(&str, &mut dyn Surface) -> io::Result<()>,
    {
        let result = loop {
            on_update(&self.text, surface)?;
            self.draw(surface)?;
            let key = match surface.read_key() {
                Ok(key) => key,
                Err(err) => {
                    surface.set_cursor(None)?;
                    return Err(err);
                }
            };
            match self.handle_key(&key) {
                InputEvent::Accepted => break std::mem::take(&mut self.text),
                InputEvent::Cancelled => break String::new(),
                InputEvent::Edited | InputEvent::Ignored => {}
            }
        };
        surface.set_cursor(None)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashtui_core::{HeadlessSurface, Modifiers};

    fn enter() -> KeyEvent {
        KeyEvent::new(KeyCode::Enter)
    }

    #[test]
    fn typing_and_backspace() {
        let mut line = InputLine::new(":");
        for c in "quiz".chars() {
            assert_eq!(line.handle_key(&KeyEvent::char(c)), InputEvent::Edited);
        }
        assert_eq!(line.handle_key(&KeyEvent::new(KeyCode::Backspace)), InputEvent::Edited);
        assert_eq!(line.handle_key(&KeyEvent::char('t')), InputEvent::Edited);
        assert_eq!(line.text(), "quit");
    }

    #[test]
    fn non_printable_ignored() {
        let mut line = InputLine::new("");
        assert_eq!(line.handle_key(&KeyEvent::new(KeyCode::Up)), InputEvent::Ignored);
        assert_eq!(line.handle_key(&KeyEvent::char('é')), InputEvent::Ignored);
        let ctrl_c = KeyEvent::char('c').with_modifiers(Modifiers::CTRL);
        assert_eq!(line.handle_key(&ctrl_c), InputEvent::Ignored);
        assert_eq!(line.text(), "");
    }

    #[test]
    fn backspace_on_empty() {
        let mut line = InputLine::new("/");
        assert_eq!(line.handle_key(&KeyEvent::new(KeyCode::Backspace)), InputEvent::Ignored);
        let mut line = InputLine::new("/").quit_on_empty(true);
        assert_eq!(line.handle_key(&KeyEvent::new(KeyCode::Backspace)), InputEvent::Cancelled);
    }

    #[test]
    fn read_returns_text_on_enter() {
        let mut surface = HeadlessSurface::new(3, 20)
            .with_typed("browse cat")
            .with_keys([enter()]);
        let text = InputLine::new(":").read(&mut surface).unwrap();
        assert_eq!(text, "browse cat");
        assert_eq!(surface.cursor(), None);
        assert_eq!(surface.row_text(2), ":browse cat");
    }

    #[test]
    fn escape_returns_empty() {
        let mut surface = HeadlessSurface::new(3, 20)
            .with_typed("abc")
            .with_keys([KeyEvent::new(KeyCode::Escape)]);
        assert_eq!(InputLine::new(":").read(&mut surface).unwrap(), "");
    }

    #[test]
    fn on_update_sees_every_state() {
        let mut surface = HeadlessSurface::new(3, 20)
            .with_typed("ab")
            .with_keys([KeyEvent::new(KeyCode::Backspace), enter()]);
        let mut seen = Vec::new();
        let text = InputLine::new("/")
            .read_with(&mut surface, |text, _| {
                seen.push(text.to_string());
                Ok(())
            })
            .unwrap();
        assert_eq!(text, "a");
        assert_eq!(seen, vec!["", "a", "ab", "a"]);
    }

    #[test]
    fn draw_clips_and_places_cursor() {
        let mut surface = HeadlessSurface::new(2, 6);
        InputLine::new(":").with_text("abcdefgh").draw(&mut surface).unwrap();
        assert_eq!(surface.row_text(1), ":abcd");
        assert_eq!(surface.cursor(), Some((1, 5)));
    }
}
