#![forbid(unsafe_code)]

//! Structural errors from the markup codec and the card parser.

use thiserror::Error;

/// A structural problem in stored or editable text.
///
/// Positions are byte offsets into the input that was being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `<` opened a tag that never reached its closing `>`.
    #[error("unterminated tag starting at byte {position}")]
    UnterminatedTag { position: usize },

    /// A closing tag that does not match the innermost open tag.
    #[error("{}", unmatched_message(expected.as_deref(), found, *position))]
    UnmatchedTag {
        expected: Option<String>,
        found: String,
        position: usize,
    },

    /// A tag still open at the end of the input.
    #[error("unclosed tag <{tag}> opened at byte {position}")]
    UnclosedTag { tag: String, position: usize },

    /// A backslash followed by something other than `\`, `b`, `B`, `i`,
    /// `I`, `u` or `U`. `escape` is `None` for a trailing backslash.
    #[error("{}", invalid_escape_message(*escape, *position))]
    InvalidEscape {
        escape: Option<char>,
        position: usize,
    },
}

impl ParseError {
    /// Byte offset of the problem in the parsed input.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::UnterminatedTag { position }
            | Self::UnmatchedTag { position, .. }
            | Self::UnclosedTag { position, .. }
            | Self::InvalidEscape { position, .. } => *position,
        }
    }
}

fn unmatched_message(expected: Option<&str>, found: &str, position: usize) -> String {
    match expected {
        Some(expected) => format!(
            "unmatched tag at byte {position}: expected </{expected}>, found </{found}>"
        ),
        None => format!(
            "unexpected closing tag </{found}> at byte {position} with no open tag"
        ),
    }
}

fn invalid_escape_message(escape: Option<char>, position: usize) -> String {
    match escape {
        Some(c) => format!("invalid escape \\{c} at byte {position}"),
        None => format!("trailing backslash at byte {position}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ParseError::UnmatchedTag {
            expected: Some("div".into()),
            found: "span".into(),
            position: 7,
        };
        assert_eq!(
            err.to_string(),
            "unmatched tag at byte 7: expected </div>, found </span>"
        );
        let err = ParseError::UnmatchedTag {
            expected: None,
            found: "p".into(),
            position: 0,
        };
        assert!(err.to_string().contains("no open tag"));
        let err = ParseError::InvalidEscape {
            escape: Some('z'),
            position: 1,
        };
        assert_eq!(err.to_string(), "invalid escape \\z at byte 1");
        assert_eq!(err.position(), 1);
        let err = ParseError::InvalidEscape {
            escape: None,
            position: 3,
        };
        assert_eq!(err.to_string(), "trailing backslash at byte 3");
    }
}
