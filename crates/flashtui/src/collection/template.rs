#![forbid(unsafe_code)]

//! Card sides from note fields.
//!
//! Basic notes show the first field as the question and add the second on
//! the answer side. Cloze notes mark deletions in the first field as
//! `{{c1::text}}` or `{{c1::text::hint}}`; card `ord` N hides every `cN`
//! deletion on the question side and reveals it on the answer side, while
//! the other deletions are always shown. The second field of a cloze note
//! is extra text for the answer side.

use serde::{Deserialize, Serialize};

/// How a note's fields become card sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    #[default]
    Basic,
    Cloze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Question,
    Answer,
}

/// Question side of card `ord`.
#[must_use]
pub fn question(kind: NoteKind, fields: &[String], ord: u32) -> String {
    render(kind, fields, ord, Side::Question)
}

/// Answer side of card `ord`.
#[must_use]
pub fn answer(kind: NoteKind, fields: &[String], ord: u32) -> String {
    render(kind, fields, ord, Side::Answer)
}

fn render(kind: NoteKind, fields: &[String], ord: u32, side: Side) -> String {
    let first = fields.first().map_or("", String::as_str);
    let second = fields.get(1).map_or("", String::as_str);
    let mut out = match kind {
        NoteKind::Basic => first.to_string(),
        NoteKind::Cloze => cloze(first, ord, side),
    };
    if side == Side::Answer && !second.is_empty() {
        out.push_str("<br><br>");
        out.push_str(second);
    }
    out
}

/// A `{{cN::text}}` or `{{cN::text::hint}}` deletion at the start of `s`,
/// with the byte length it spans.
fn deletion_at(s: &str) -> Option<(u32, &str, Option<&str>, usize)> {
    let body = s.strip_prefix("{{c")?;
    let digits = body.find(|c: char| !c.is_ascii_digit())?;
    let number: u32 = body[..digits].parse().ok()?;
    let body = body[digits..].strip_prefix("::")?;
    let end = body.find("}}")?;
    let inner = &body[..end];
    let (text, hint) = match inner.split_once("::") {
        Some((text, hint)) => (text, Some(hint)),
        None => (inner, None),
    };
    let len = 3 + digits + 2 + end + 2;
    Some((number, text, hint, len))
}

fn cloze(text: &str, ord: u32, side: Side) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    let mut rest = text;
    while let Some(start) = rest.find("{{c") {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let Some((number, inner, hint, len)) = deletion_at(rest) else {
            out.push_str("{{c");
            rest = &rest[3..];
            continue;
        };
        if number != ord {
            out.push_str(&format!(r#"<span class="cloze-inactive">{inner}</span>"#));
        } else if side == Side::Question {
            let shown = hint.unwrap_or("...");
            out.push_str(&format!(r#"<span class="cloze">[{shown}]</span>"#));
        } else {
            out.push_str(&format!(r#"<span class="cloze">{inner}</span>"#));
        }
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}
