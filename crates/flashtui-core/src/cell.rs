#![forbid(unsafe_code)]

//! Display attributes for a single character cell.
//!
//! An [`AttrMask`] is the set of terminal attributes a character is drawn
//! with. Attributes combine by bitwise OR; the three colour bits are mutually
//! exclusive in practice, and when more than one is set the surface picks the
//! first of blue, red, green.

use bitflags::bitflags;

bitflags! {
    /// Terminal display attributes for one character.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttrMask: u8 {
        /// Bold / increased intensity.
        const BOLD      = 1 << 0;
        /// Italic.
        const ITALIC    = 1 << 1;
        /// Underline.
        const UNDERLINE = 1 << 2;
        /// Standout (reverse video).
        const STANDOUT  = 1 << 3;
        /// Blue foreground.
        const BLUE      = 1 << 4;
        /// Red foreground.
        const RED       = 1 << 5;
        /// Green foreground.
        const GREEN     = 1 << 6;
    }
}

/// Foreground colour selected by an [`AttrMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskColor {
    Blue,
    Red,
    Green,
}

impl AttrMask {
    /// All colour bits.
    pub const COLORS: Self = Self::BLUE.union(Self::RED).union(Self::GREEN);

    /// The foreground colour carried by this mask, if any.
    #[must_use]
    pub fn color(self) -> Option<MaskColor> {
        if self.contains(Self::BLUE) {
            Some(MaskColor::Blue)
        } else if self.contains(Self::RED) {
            Some(MaskColor::Red)
        } else if self.contains(Self::GREEN) {
            Some(MaskColor::Green)
        } else {
            None
        }
    }

    /// The mask with its colour bits removed.
    #[must_use]
    pub fn without_color(self) -> Self {
        self.difference(Self::COLORS)
    }
}

/// A character paired with the attributes it is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributedRun {
    pub ch: char,
    pub attrs: AttrMask,
}

impl AttributedRun {
    #[must_use]
    pub const fn new(ch: char, attrs: AttrMask) -> Self {
        Self { ch, attrs }
    }

    /// A character with no attributes.
    #[must_use]
    pub const fn plain(ch: char) -> Self {
        Self::new(ch, AttrMask::empty())
    }
}

/// Attribute every character of `text` with the same mask.
#[must_use]
pub fn uniform_runs(text: &str, attrs: AttrMask) -> Vec<AttributedRun> {
    text.chars().map(|ch| AttributedRun::new(ch, attrs)).collect()
}

/// OR `extra` into every run, e.g. to highlight a cursor row.
pub fn overlay(runs: &mut [AttributedRun], extra: AttrMask) {
    for run in runs {
        run.attrs |= extra;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_prefers_blue_then_red() {
        assert_eq!(AttrMask::BOLD.color(), None);
        assert_eq!((AttrMask::RED | AttrMask::GREEN).color(), Some(MaskColor::Red));
        assert_eq!(AttrMask::COLORS.color(), Some(MaskColor::Blue));
    }

    #[test]
    fn without_color_keeps_styles() {
        let mask = AttrMask::BOLD | AttrMask::GREEN | AttrMask::UNDERLINE;
        assert_eq!(mask.without_color(), AttrMask::BOLD | AttrMask::UNDERLINE);
    }

    #[test]
    fn uniform_and_overlay() {
        let mut runs = uniform_runs("ab", AttrMask::BOLD);
        assert_eq!(runs.len(), 2);
        overlay(&mut runs, AttrMask::STANDOUT);
        assert!(runs.iter().all(|r| r.attrs == AttrMask::BOLD | AttrMask::STANDOUT));
        assert_eq!(runs[1].ch, 'b');
    }
}
