#![forbid(unsafe_code)]

//! Render markup to characters and display attributes.
//!
//! Render markup is plain text with angle-bracket tags naming entries of a
//! [`TagTable`]:
//!
//! ```text
//! <blue>12</blue> <red>3</red> <u>Deck</u>
//! ```
//!
//! - opening a known tag ORs its bits into the running mask
//! - closing a tag removes its most recent open entry and rebuilds the mask
//!   from the entries still open, so overlapping and repeated tags never
//!   leave stale bits behind
//! - unknown tags, and closing tags with no open entry, are ignored
//! - `&lt;`, `&gt;` and `&amp;` stand for literal characters
//! - a `<` that does not start a well-formed `<name>` or `</name>` is
//!   literal
//!
//! Rendering never fails: markup comes from this workspace, not from users.
//!
//! # Example
//! ```
//! use flashtui_core::AttrMask;
//! use flashtui_style::TagTable;
//! use flashtui_text::render;
//!
//! let tags = TagTable::new().with("red", AttrMask::RED);
//! let styled = render("<red>X</red>Y", &tags);
//! assert_eq!(styled.text, "XY");
//! assert_eq!(styled.attrs, vec![AttrMask::RED, AttrMask::empty()]);
//! ```

use flashtui_core::{AttrMask, AttributedRun};
use flashtui_style::TagTable;

/// Plain text with one attribute mask per character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    pub text: String,
    pub attrs: Vec<AttrMask>,
}

impl StyledText {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text with the same mask on every character.
    #[must_use]
    pub fn uniform(text: &str, attrs: AttrMask) -> Self {
        Self {
            text: text.to_string(),
            attrs: vec![attrs; text.chars().count()],
        }
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn push(&mut self, ch: char, attrs: AttrMask) {
        self.text.push(ch);
        self.attrs.push(attrs);
    }

    /// Characters paired with their masks.
    pub fn runs(&self) -> impl Iterator<Item = AttributedRun> + '_ {
        self.text
            .chars()
            .zip(self.attrs.iter().copied())
            .map(|(ch, attrs)| AttributedRun::new(ch, attrs))
    }

    /// The runs collected, e.g. for [`flashtui_core::Surface::draw`].
    #[must_use]
    pub fn to_runs(&self) -> Vec<AttributedRun> {
        self.runs().collect()
    }
}

impl FromIterator<AttributedRun> for StyledText {
    fn from_iter<I: IntoIterator<Item = AttributedRun>>(iter: I) -> Self {
        let mut styled = Self::new();
        for run in iter {
            styled.push(run.ch, run.attrs);
        }
        styled
    }
}

/// Renders markup against a borrowed [`TagTable`].
#[derive(Debug, Clone, Copy)]
pub struct StyleRenderer<'t> {
    tags: &'t TagTable,
}

impl<'t> StyleRenderer<'t> {
    #[must_use]
    pub fn new(tags: &'t TagTable) -> Self {
        Self { tags }
    }

    #[must_use]
    pub fn tags(&self) -> &'t TagTable {
        self.tags
    }

    /// Render `markup` into text and per-character masks.
    #[must_use]
    pub fn render(&self, markup: &str) -> StyledText {
        let mut out = StyledText {
            text: String::with_capacity(markup.len()),
            attrs: Vec::with_capacity(markup.len()),
        };
        let mut stack: Vec<(&str, AttrMask)> = Vec::new();
        let mut current = AttrMask::empty();
        let mut rest = markup;

        while let Some(c) = rest.chars().next() {
            match c {
                '<' => {
                    let Some((closing, name, len)) = tag_at(rest) else {
                        out.push('<', current);
                        rest = &rest[1..];
                        continue;
                    };
                    rest = &rest[len..];
                    if closing {
                        if let Some(idx) = stack.iter().rposition(|(open, _)| *open == name) {
                            stack.remove(idx);
                            current = stack
                                .iter()
                                .fold(AttrMask::empty(), |acc, (_, bits)| acc | *bits);
                        }
                    } else if let Some(bits) = self.tags.get(name) {
                        stack.push((name, bits));
                        current |= bits;
                    }
                }
                '&' => {
                    let entity = [("&lt;", '<'), ("&gt;", '>'), ("&amp;", '&')]
                        .into_iter()
                        .find(|(spelling, _)| rest.starts_with(spelling));
                    match entity {
                        Some((spelling, ch)) => {
                            out.push(ch, current);
                            rest = &rest[spelling.len()..];
                        }
                        None => {
                            out.push('&', current);
                            rest = &rest[1..];
                        }
                    }
                }
                c => {
                    out.push(c, current);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        out
    }
}

/// Recognize `<name>` or `</name>` at the start of `s`, returning whether it
/// closes, the name, and the byte length of the tag.
fn tag_at(s: &str) -> Option<(bool, &str, usize)> {
    let body = s.strip_prefix('<')?;
    let (closing, body) = match body.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, body),
    };
    let end = body.find('>')?;
    let name = &body[..end];
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some((closing, name, 1 + usize::from(closing) + end + 1))
}

/// Render `markup` against `tags`.
#[must_use]
pub fn render(markup: &str, tags: &TagTable) -> StyledText {
    StyleRenderer::new(tags).render(markup)
}

/// Escape text so it renders literally inside markup.
#[must_use]
pub fn escape(text: &str) -> String {
    crate::html::escape_text(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> TagTable {
        TagTable::with_defaults(true)
    }

    #[test]
    fn red_then_plain() {
        let tags = TagTable::new().with("red", AttrMask::RED);
        let styled = render("<red>X</red>Y", &tags);
        assert_eq!(styled.text, "XY");
        assert_eq!(styled.attrs, vec![AttrMask::RED, AttrMask::empty()]);
    }

    #[test]
    fn nested_tags_combine() {
        let styled = render("<b>a<u>b</u>c</b>", &tags());
        assert_eq!(styled.text, "abc");
        assert_eq!(
            styled.attrs,
            vec![
                AttrMask::BOLD,
                AttrMask::BOLD | AttrMask::UNDERLINE,
                AttrMask::BOLD,
            ]
        );
    }

    #[test]
    fn overlapping_tags() {
        let styled = render("<b>a<i>b</b>c</i>d", &tags());
        assert_eq!(
            styled.attrs,
            vec![
                AttrMask::BOLD,
                AttrMask::BOLD | AttrMask::ITALIC,
                AttrMask::ITALIC,
                AttrMask::empty(),
            ]
        );
    }

    #[test]
    fn repeated_tag_keeps_outer_bits() {
        let styled = render("<b><b>a</b>b</b>c", &tags());
        assert_eq!(
            styled.attrs,
            vec![AttrMask::BOLD, AttrMask::BOLD, AttrMask::empty()]
        );
    }

    #[test]
    fn unknown_tags_ignored() {
        let styled = render("<blink>a</blink></b>b<ul>c</ul>", &tags());
        assert_eq!(styled.text, "abc");
        assert!(styled.attrs.iter().all(|a| a.is_empty()));
    }

    #[test]
    fn entities_are_literal_chars() {
        let styled = render("&lt;b&gt; &amp; &nbsp;", &tags());
        assert_eq!(styled.text, "<b> & &nbsp;");
        assert_eq!(styled.len(), styled.text.chars().count());
    }

    #[test]
    fn stray_lt_is_literal() {
        let styled = render("<b>x</b> 1 <2", &tags());
        assert_eq!(styled.text, "x 1 <2");
        let styled = render("a < b <b>c</b>", &tags());
        assert_eq!(styled.text, "a < b c");
        assert_eq!(styled.attrs[6], AttrMask::BOLD);
    }

    #[test]
    fn monochrome_table() {
        let styled = render("<green>7</green>", &TagTable::with_defaults(false));
        assert_eq!(styled.attrs, vec![AttrMask::BOLD]);
    }

    #[test]
    fn runs_pair_chars_with_masks() {
        let styled = render("<so>hi</so>!", &tags());
        let runs = styled.to_runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0], AttributedRun::new('h', AttrMask::STANDOUT));
        assert_eq!(runs[2], AttributedRun::plain('!'));
        let back: StyledText = runs.into_iter().collect();
        assert_eq!(back, styled);
    }

    #[test]
    fn uniform_text() {
        let styled = StyledText::uniform("ab", AttrMask::RED);
        assert_eq!(styled.attrs, vec![AttrMask::RED; 2]);
    }

    #[test]
    fn escape_round_trips_through_render() {
        let raw = "a<b>&c";
        assert_eq!(render(&escape(raw), &tags()).text, raw);
    }
}
