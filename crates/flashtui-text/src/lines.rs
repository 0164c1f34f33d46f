#![forbid(unsafe_code)]

//! Line iteration that knows which line is last.
//!
//! `str::split('\n')` produces a trailing empty segment for text ending in a
//! newline. [`lines`] drops that segment and reports `is_last` on the final
//! real line instead, so callers never post-process the split result.

/// One line of a text, without its terminating `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Zero-based line number.
    pub index: usize,
    /// Whether no further line follows.
    pub is_last: bool,
    /// Byte offset of the line within the original text.
    pub offset: usize,
    pub text: &'a str,
}

/// Iterator returned by [`lines`].
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    rest: Option<&'a str>,
    offset: usize,
    index: usize,
}

/// Iterate over the lines of `text`.
///
/// An empty text has no lines; a final `\n` does not start a new line.
///
/// ```
/// use flashtui_text::lines::lines;
///
/// let got: Vec<_> = lines("a\n\nb\n").map(|l| (l.text, l.is_last)).collect();
/// assert_eq!(got, vec![("a", false), ("", false), ("b", true)]);
/// ```
#[must_use]
pub fn lines(text: &str) -> Lines<'_> {
    Lines {
        rest: Some(text),
        offset: 0,
        index: 0,
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.filter(|r| !r.is_empty())?;
        let (text, remainder) = match rest.find('\n') {
            Some(i) => (&rest[..i], Some(&rest[i + 1..])),
            None => (rest, None),
        };
        let line = Line {
            index: self.index,
            is_last: remainder.is_none_or(str::is_empty),
            offset: self.offset,
            text,
        };
        self.index += 1;
        self.offset += text.len() + 1;
        self.rest = remainder;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> Vec<(usize, bool, usize, &str)> {
        lines(text)
            .map(|l| (l.index, l.is_last, l.offset, l.text))
            .collect()
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(collect("").is_empty());
    }

    #[test]
    fn single_line() {
        assert_eq!(collect("abc"), vec![(0, true, 0, "abc")]);
    }

    #[test]
    fn trailing_newline_dropped() {
        assert_eq!(collect("abc\n"), vec![(0, true, 0, "abc")]);
        assert_eq!(collect("\n"), vec![(0, true, 0, "")]);
    }

    #[test]
    fn interior_empty_lines_kept() {
        assert_eq!(
            collect("a\n\nbc\n\n"),
            vec![
                (0, false, 0, "a"),
                (1, false, 2, ""),
                (2, false, 3, "bc"),
                (3, true, 6, ""),
            ]
        );
    }

    #[test]
    fn matches_split_without_trailing_artifact() {
        for text in ["x", "x\ny", "\nx", "x\n\n\ny", "\n\n"] {
            let mut expected: Vec<&str> = text.split('\n').collect();
            if text.ends_with('\n') {
                expected.pop();
            }
            let got: Vec<&str> = lines(text).map(|l| l.text).collect();
            assert_eq!(got, expected, "text {text:?}");
        }
    }
}
