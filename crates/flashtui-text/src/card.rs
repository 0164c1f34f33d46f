#![forbid(unsafe_code)]

//! Card HTML to render markup.
//!
//! Rendered card sides are full HTML documents produced by the card
//! templates. [`parse_card`] keeps only what a terminal can show:
//!
//! - `<br>` becomes a newline; a `<div>` starts a new line unless the output
//!   is empty or already ends in one
//! - active cloze spans (`class` containing `cloze` but not `cloze-inactive`)
//!   are wrapped in `<blue>`..`</blue>`
//! - `<b>`, `<i>`, `<u>` are passed through as render tags
//! - text inside `<style>` and `<script>` is dropped
//! - everything else disappears, keeping its text
//!
//! Text is re-escaped, so the result never contains a literal `<` outside
//! a render tag.

use flashtui_style::tag_table::CLOZE_TAG;

use crate::error::ParseError;
use crate::html::{self, StartTag, Token, Tokenizer};

const PASSTHROUGH: &[&str] = &["b", "i", "u"];
const HIDDEN: &[&str] = &["style", "script"];

#[derive(Debug)]
struct Open {
    name: String,
    cloze: bool,
}

fn is_active_cloze(tag: &StartTag) -> bool {
    let mut cloze = false;
    for class in tag.classes() {
        match class {
            "cloze-inactive" => return false,
            "cloze" => cloze = true,
            _ => {}
        }
    }
    cloze
}

/// Convert one rendered card side into render markup.
///
/// # Errors
///
/// - [`ParseError::UnterminatedTag`] when a tag never reaches its `>`
/// - [`ParseError::UnmatchedTag`] when a closing tag names an element that
///   is not open
///
/// Elements left open at the end are closed implicitly.
pub fn parse_card(card: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(card.len());
    let mut stack: Vec<Open> = Vec::new();
    let mut hidden_depth = 0usize;

    for token in Tokenizer::new(card) {
        match token? {
            Token::Text(raw) => {
                if hidden_depth == 0 {
                    out.push_str(&html::escape_text(&html::decode_entities(raw)));
                }
            }
            Token::Open(tag) => {
                let name = tag.name.as_str();
                if PASSTHROUGH.contains(&name) {
                    if !tag.self_closing {
                        out.push('<');
                        out.push_str(name);
                        out.push('>');
                    }
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if html::is_void(name) || tag.self_closing {
                    continue;
                }
                if name == "div" && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                let cloze = is_active_cloze(&tag);
                if cloze {
                    out.push('<');
                    out.push_str(CLOZE_TAG);
                    out.push('>');
                }
                if HIDDEN.contains(&name) {
                    hidden_depth += 1;
                }
                stack.push(Open {
                    name: tag.name,
                    cloze,
                });
            }
            Token::Close { name, position } => {
                if PASSTHROUGH.contains(&name.as_str()) {
                    out.push_str("</");
                    out.push_str(&name);
                    out.push('>');
                    continue;
                }
                if html::is_void(&name) {
                    continue;
                }
                let Some(idx) = stack.iter().rposition(|open| open.name == name) else {
                    return Err(ParseError::UnmatchedTag {
                        expected: stack.last().map(|open| open.name.clone()),
                        found: name,
                        position,
                    });
                };
                for open in stack.drain(idx..).rev() {
                    close(&mut out, &open, &mut hidden_depth);
                }
            }
        }
    }

    for open in stack.iter().rev() {
        close(&mut out, open, &mut hidden_depth);
    }
    Ok(out)
}

fn close(out: &mut String, open: &Open, hidden_depth: &mut usize) {
    if open.cloze {
        out.push_str("</");
        out.push_str(CLOZE_TAG);
        out.push('>');
    }
    if HIDDEN.contains(&open.name.as_str()) {
        *hidden_depth = hidden_depth.saturating_sub(1);
    }
}
