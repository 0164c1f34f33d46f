#![forbid(unsafe_code)]

//! Screen chrome shared by every view.
//!
//! ```text
//! row 0         header
//! row 1         ------------------------
//! rows 2..r-2   main area
//! row r-2       ------------------------
//! row r-1       footer / status / prompt
//! ```

use std::io;

use flashtui_core::{AttributedRun, Surface};
use flashtui_style::TagTable;
use flashtui_text::wrap::wrap;

use crate::align::{Align, print_aligned};
use crate::input_line::InputLine;

const RULE: char = '-';
const PAUSE_NOTE: &str = " (Press any key to continue) ";

/// First row and height of the main area for a surface `rows` tall.
#[must_use]
pub fn main_area(rows: u16) -> (u16, u16) {
    (2, rows.saturating_sub(4))
}

fn footer_row(surface: &dyn Surface) -> u16 {
    surface.measure().0.saturating_sub(1)
}

fn rule(surface: &mut dyn Surface, row: u16) -> io::Result<()> {
    let (_, cols) = surface.measure();
    let runs = vec![AttributedRun::plain(RULE); usize::from(cols)];
    surface.draw(row, 0, &runs)
}

/// Clear the header row and print `head` (render markup) in it.
pub fn set_head(surface: &mut dyn Surface, tags: &TagTable, head: &str) -> io::Result<()> {
    surface.clear_region(0, 1)?;
    print_aligned(surface, tags, 0, Align::Left, head)
}

/// Clear the footer row and print `foot` (render markup) in it.
pub fn set_foot(surface: &mut dyn Surface, tags: &TagTable, foot: &str) -> io::Result<()> {
    let row = footer_row(surface);
    surface.clear_region(row, 1)?;
    print_aligned(surface, tags, row, Align::Left, foot)
}

/// Clear the screen and draw header, rules and footer.
pub fn draw_chrome(
    surface: &mut dyn Surface,
    tags: &TagTable,
    head: &str,
    foot: &str,
) -> io::Result<()> {
    surface.clear()?;
    let (rows, _) = surface.measure();
    set_head(surface, tags, head)?;
    rule(surface, 1)?;
    rule(surface, rows.saturating_sub(2))?;
    set_foot(surface, tags, foot)
}

/// Show plain `text` in the main area. With `pause`, wait for any key.
pub fn dump_debug(surface: &mut dyn Surface, text: &str, pause: bool) -> io::Result<()> {
    let (rows, cols) = surface.measure();
    let (top, height) = main_area(rows);
    surface.clear_region(top, height)?;

    let mut message = text.to_string();
    if pause {
        message.push_str(PAUSE_NOTE);
    }
    for (i, line) in wrap(&message, usize::from(cols))
        .iter()
        .take(usize::from(height))
        .enumerate()
    {
        let runs: Vec<AttributedRun> = line.chars().map(AttributedRun::plain).collect();
        let row = top.saturating_add(u16::try_from(i).unwrap_or(u16::MAX));
        surface.draw(row, 0, &runs)?;
    }
    surface.flush()?;
    if pause {
        surface.read_key()?;
    }
    Ok(())
}

/// Read a line on the footer row after `prompt`. Escape yields `""`.
pub fn prompt(surface: &mut dyn Surface, prompt: &str) -> io::Result<String> {
    InputLine::new(prompt).read(surface)
}

/// Ask a yes/no question until the answer starts with `y` or `n`.
pub fn ask_yn(surface: &mut dyn Surface, question: &str) -> io::Result<bool> {
    let text = format!("{question} (y/n) :");
    loop {
        let answer = prompt(surface, &text)?;
        match answer.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashtui_core::{HeadlessSurface, KeyCode, KeyEvent};

    #[test]
    fn chrome_layout() {
        let tags = TagTable::with_defaults(true);
        let mut surface = HeadlessSurface::new(6, 8);
        draw_chrome(&mut surface, &tags, "<u>Head</u>", "foot").unwrap();
        assert_eq!(surface.row_text(0), "Head");
        assert_eq!(surface.row_text(1), "--------");
        assert_eq!(surface.row_text(2), "");
        assert_eq!(surface.row_text(4), "--------");
        assert_eq!(surface.row_text(5), "foot");
        assert!(surface.row_attrs(0)[0].contains(flashtui_core::AttrMask::UNDERLINE));
    }

    #[test]
    fn set_foot_replaces_previous_text() {
        let tags = TagTable::new();
        let mut surface = HeadlessSurface::new(4, 10);
        set_foot(&mut surface, &tags, "long status").unwrap();
        set_foot(&mut surface, &tags, "ok").unwrap();
        assert_eq!(surface.row_text(3), "ok");
    }

    #[test]
    fn main_area_geometry() {
        assert_eq!(main_area(24), (2, 20));
        assert_eq!(main_area(3), (2, 0));
    }

    #[test]
    fn dump_debug_waits_for_key_when_paused() {
        let mut surface = HeadlessSurface::new(6, 40).with_typed("x");
        dump_debug(&mut surface, "oops", true).unwrap();
        assert_eq!(surface.row_text(2), "oops (Press any key to continue)");
        assert_eq!(surface.pending_keys(), 0);

        let mut surface = HeadlessSurface::new(6, 40).with_typed("x");
        dump_debug(&mut surface, "fine", false).unwrap();
        assert_eq!(surface.pending_keys(), 1);
    }

    #[test]
    fn ask_yn_repeats_until_answer() {
        let mut surface = HeadlessSurface::new(4, 30)
            .with_typed("maybe")
            .with_keys([KeyEvent::new(KeyCode::Enter)])
            .with_typed("Yes")
            .with_keys([KeyEvent::new(KeyCode::Enter)]);
        assert!(ask_yn(&mut surface, "Save?").unwrap());
        assert_eq!(surface.pending_keys(), 0);
    }

    #[test]
    fn ask_yn_no() {
        let mut surface = HeadlessSurface::new(4, 30)
            .with_typed("n")
            .with_keys([KeyEvent::new(KeyCode::Enter)]);
        assert!(!ask_yn(&mut surface, "Save?").unwrap());
    }
}
