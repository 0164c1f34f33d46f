#![forbid(unsafe_code)]

//! Conversion between stored note fields and editable text.
//!
//! # Editable text
//!
//! Plain text, one line per stored block, with backslash escapes for the
//! inline styles a user may want to keep:
//!
//! | escape | meaning |
//! |--------|---------|
//! | `\b` / `\B` | open / close bold |
//! | `\i` / `\I` | open / close italic |
//! | `\u` / `\U` | open / close underline |
//! | `\\` | a literal backslash |
//!
//! Any other escape is an error; nothing is ever guessed.
//!
//! # Stored text
//!
//! The HTML subset written by the note editor of the desktop client: text,
//! entities, `<br>`, `<div>` blocks and `<b>`/`<i>`/`<u>`. [`decode`] accepts
//! arbitrary other elements and drops them (keeping their text) but requires
//! container elements to nest properly.
//!
//! # Example
//! ```
//! use flashtui_text::codec::{decode, encode};
//!
//! assert_eq!(decode("line1<br>line2").unwrap(), "line1\nline2");
//! assert_eq!(encode("line1\nline2").unwrap(), "line1<div>line2</div>");
//! assert_eq!(encode("a\\bb\\B").unwrap(), "a<b>b</b>");
//! assert!(encode("a\\zb").is_err());
//! ```

use crate::error::ParseError;
use crate::html::{self, Token, Tokenizer};
use crate::lines::lines;

/// Inline tags that survive decoding as escapes, with their open and close
/// escape letters.
const INLINE_ESCAPES: &[(&str, char, char)] = &[("b", 'b', 'B'), ("i", 'i', 'I'), ("u", 'u', 'U')];

fn inline_escape(name: &str) -> Option<(char, char)> {
    INLINE_ESCAPES
        .iter()
        .find(|(tag, _, _)| *tag == name)
        .map(|&(_, open, close)| (open, close))
}

/// Decode stored rich text into editable text.
///
/// # Errors
///
/// - [`ParseError::UnterminatedTag`] when a tag never reaches its `>`
/// - [`ParseError::UnmatchedTag`] when a closing tag does not match the
///   innermost open container (or nothing is open)
/// - [`ParseError::UnclosedTag`] when a container is still open at the end
pub fn decode(stored: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(stored.len());
    let mut stack: Vec<(String, usize)> = Vec::new();
    // Nothing emitted and no tag seen yet.
    let mut at_start = true;

    for token in Tokenizer::new(stored) {
        match token? {
            Token::Text(raw) => {
                if raw.is_empty() {
                    continue;
                }
                for c in html::decode_entities(raw).chars() {
                    if c == '\\' {
                        out.push_str("\\\\");
                    } else {
                        out.push(c);
                    }
                }
            }
            Token::Open(tag) => {
                let name = tag.name.as_str();
                if let Some((open, _)) = inline_escape(name) {
                    if !tag.self_closing {
                        out.push('\\');
                        out.push(open);
                    }
                } else if name == "br" {
                    out.push('\n');
                } else if html::is_void(name) {
                    // dropped
                } else {
                    if name == "div" && !at_start {
                        out.push('\n');
                    }
                    if !tag.self_closing {
                        stack.push((tag.name, tag.position));
                    }
                }
            }
            Token::Close { name, position } => {
                // Inline styles map to escapes one to one and are not stack-checked.
                if let Some((_, close)) = inline_escape(&name) {
                    out.push('\\');
                    out.push(close);
                } else if !html::is_void(&name) {
                    match stack.pop() {
                        Some((open, _)) if open == name => {}
                        top => {
                            return Err(ParseError::UnmatchedTag {
                                expected: top.map(|(open, _)| open),
                                found: name,
                                position,
                            });
                        }
                    }
                }
            }
        }
        at_start = false;
    }

    if let Some((tag, position)) = stack.pop() {
        return Err(ParseError::UnclosedTag { tag, position });
    }
    Ok(out)
}

/// Encode editable text into stored rich text.
///
/// The first line is emitted bare, every later non-empty line as
/// `<div>line</div>` and every later empty line as `<br>`. A final newline
/// does not produce an extra line.
///
/// # Errors
///
/// [`ParseError::InvalidEscape`] for an unknown escape or a trailing
/// backslash, positioned at the backslash.
pub fn encode(editable: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(editable.len() + 16);
    for line in lines(editable) {
        let body = encode_line(line.text, line.offset)?;
        if line.index == 0 {
            if body.is_empty() && !line.is_last {
                out.push_str("<div></div>");
            } else {
                out.push_str(&body);
            }
        } else if body.is_empty() {
            out.push_str("<br>");
        } else {
            out.push_str("<div>");
            out.push_str(&body);
            out.push_str("</div>");
        }
    }
    Ok(out)
}

fn encode_line(line: &str, offset: usize) -> Result<String, ParseError> {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\\' => match chars.next() {
                Some((_, '\\')) => out.push('\\'),
                Some((_, esc)) => {
                    let tag = INLINE_ESCAPES.iter().find_map(|&(tag, open, close)| {
                        if esc == open {
                            Some(("<", tag))
                        } else if esc == close {
                            Some(("</", tag))
                        } else {
                            None
                        }
                    });
                    let Some((prefix, tag)) = tag else {
                        return Err(ParseError::InvalidEscape {
                            escape: Some(esc),
                            position: offset + i,
                        });
                    };
                    out.push_str(prefix);
                    out.push_str(tag);
                    out.push('>');
                }
                None => {
                    return Err(ParseError::InvalidEscape {
                        escape: None,
                        position: offset + i,
                    });
                }
            },
            c => out.push(c),
        }
    }
    Ok(out)
}
