#![forbid(unsafe_code)]

//! Greedy word wrapping by character count.
//!
//! Every character is one cell wide. Lines break at the last space that
//! fits; the space itself is dropped. Words longer than the width are split
//! hard. Explicit newlines always break, and a final newline does not add an
//! empty line.

use std::ops::Range;

use crate::lines::lines;
use crate::render::StyledText;

/// Break one newline-free line of `chars` into ranges of at most `width`
/// characters. An empty line yields a single empty range.
#[must_use]
pub fn wrap_ranges(chars: &[char], width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut ranges = Vec::new();
    let mut start = 0;
    loop {
        if chars.len() - start <= width {
            ranges.push(start..chars.len());
            return ranges;
        }
        let window = &chars[start..=start + width];
        match window.iter().rposition(|c| *c == ' ') {
            Some(space) if space > 0 => {
                ranges.push(start..start + space);
                start += space + 1;
            }
            _ => {
                ranges.push(start..start + width);
                start += width;
            }
        }
    }
}

/// Wrap plain text to `width` columns.
///
/// ```
/// use flashtui_text::wrap::wrap;
///
/// assert_eq!(wrap("the quick brown fox", 10), vec!["the quick", "brown fox"]);
/// ```
#[must_use]
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines(text) {
        let chars: Vec<char> = line.text.chars().collect();
        out.extend(
            wrap_ranges(&chars, width)
                .into_iter()
                .map(|r| chars[r].iter().collect::<String>()),
        );
    }
    out
}

/// Wrap styled text to `width` columns, keeping each character's mask.
#[must_use]
pub fn wrap_styled(styled: &StyledText, width: usize) -> Vec<StyledText> {
    let chars: Vec<char> = styled.text.chars().collect();
    let mut out = Vec::new();
    for line in lines(&styled.text) {
        // Byte offsets from `lines` map to char offsets through the prefix.
        let first = styled.text[..line.offset].chars().count();
        let count = line.text.chars().count();
        let line_chars = &chars[first..first + count];
        let line_attrs = &styled.attrs[first..first + count];
        for range in wrap_ranges(line_chars, width) {
            out.push(StyledText {
                text: line_chars[range.clone()].iter().collect(),
                attrs: line_attrs[range].to_vec(),
            });
        }
    }
    out
}
