#![forbid(unsafe_code)]

//! Left, centered and right-aligned single-row printing.

use std::io;

use flashtui_core::{AttributedRun, Surface};
use flashtui_style::TagTable;
use flashtui_text::render;

/// Horizontal placement of a row of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Column where `len` characters start in a row `width` wide.
///
/// Text wider than the row always starts at column 0 and is clipped on the
/// right.
#[must_use]
pub fn align_start(align: Align, width: usize, len: usize) -> usize {
    let room = width.saturating_sub(len);
    match align {
        Align::Left => 0,
        Align::Center => room / 2,
        Align::Right => room,
    }
}

/// Draw `runs` on `row` with the given alignment.
pub fn print_runs_aligned(
    surface: &mut dyn Surface,
    row: u16,
    align: Align,
    runs: &[AttributedRun],
) -> io::Result<()> {
    let (_, cols) = surface.measure();
    let start = align_start(align, usize::from(cols), runs.len());
    let start = u16::try_from(start).unwrap_or(u16::MAX);
    surface.draw(row, start, runs)
}

/// Render `markup` and draw it on `row` with the given alignment.
pub fn print_aligned(
    surface: &mut dyn Surface,
    tags: &TagTable,
    row: u16,
    align: Align,
    markup: &str,
) -> io::Result<()> {
    print_runs_aligned(surface, row, align, &render(markup, tags).to_runs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashtui_core::{AttrMask, HeadlessSurface};

    #[test]
    fn start_columns() {
        assert_eq!(align_start(Align::Left, 10, 4), 0);
        assert_eq!(align_start(Align::Center, 10, 4), 3);
        assert_eq!(align_start(Align::Right, 10, 4), 6);
        assert_eq!(align_start(Align::Right, 3, 5), 0);
        assert_eq!(align_start(Align::Center, 3, 5), 0);
    }

    #[test]
    fn three_alignments_share_a_row() {
        let tags = TagTable::with_defaults(true);
        let mut surface = HeadlessSurface::new(2, 12);
        print_aligned(&mut surface, &tags, 0, Align::Left, "ab").unwrap();
        print_aligned(&mut surface, &tags, 0, Align::Center, "<b>cd</b>").unwrap();
        print_aligned(&mut surface, &tags, 0, Align::Right, "ef").unwrap();
        assert_eq!(surface.row_text(0), "ab   cd   ef");
        assert_eq!(surface.cell(0, 5).map(|c| c.attrs), Some(AttrMask::BOLD));
        assert_eq!(surface.cell(0, 0).map(|c| c.attrs), Some(AttrMask::empty()));
    }

    #[test]
    fn overlong_text_is_clipped() {
        let tags = TagTable::new();
        let mut surface = HeadlessSurface::new(1, 4);
        print_aligned(&mut surface, &tags, 0, Align::Right, "abcdef").unwrap();
        assert_eq!(surface.row_text(0), "abcd");
    }
}
