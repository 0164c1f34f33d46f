#![forbid(unsafe_code)]

//! A small tokenizer for the HTML subset found in note fields and cards.
//!
//! The tokenizer only splits the input; it does not check nesting. Callers
//! ([`crate::codec`], [`crate::card`]) keep their own tag stacks because they
//! disagree about what a mismatch means.
//!
//! # Rules
//!
//! - `<` followed by an ASCII letter starts an opening tag, `</` a closing
//!   tag, `<!` a comment or declaration. Any other `<` is literal text.
//! - A started tag must reach its `>` (quoted attribute values may contain
//!   `>`), otherwise the input is rejected with
//!   [`ParseError::UnterminatedTag`].
//! - Comments and declarations are skipped entirely.
//! - Tag and attribute names are lowercased; attribute values are kept as
//!   written, entities included.

use std::borrow::Cow;

use crate::error::ParseError;

/// Elements that never have content and are never closed.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Whether `name` is a void element.
#[must_use]
pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// One lexical unit of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw text between tags, entities not yet decoded.
    Text(&'a str),
    /// `<name attr=value ...>` or `<name ... />`.
    Open(StartTag),
    /// `</name>`.
    Close { name: String, position: usize },
}

/// A parsed opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub self_closing: bool,
    pub position: usize,
}

impl StartTag {
    /// Value of the first attribute called `name`.
    #[cfg(test)]
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every whitespace-separated token of every `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .iter()
            .filter(|(key, _)| key == "class")
            .flat_map(|(_, value)| value.split_ascii_whitespace())
    }
}

/// Iterator over the [`Token`]s of an input string.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            failed: false,
        }
    }

    /// Find the `>` ending a tag that starts at `start`, skipping quoted
    /// attribute values. Returns the byte index of the `>`.
    fn find_tag_end(&self, start: usize) -> Option<usize> {
        let mut quote: Option<u8> = None;
        for (i, &b) in self.input.as_bytes().iter().enumerate().skip(start) {
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => quote = Some(b),
                None if b == b'>' => return Some(i),
                None => {}
            }
        }
        None
    }

    fn markup_token(&mut self, start: usize) -> Result<Option<Token<'a>>, ParseError> {
        let rest = &self.input[start..];
        if let Some(after) = rest.strip_prefix("<!--") {
            let end = after
                .find("-->")
                .ok_or(ParseError::UnterminatedTag { position: start })?;
            self.pos = start + 4 + end + 3;
            return Ok(None);
        }
        let end = self
            .find_tag_end(start + 1)
            .ok_or(ParseError::UnterminatedTag { position: start })?;
        self.pos = end + 1;
        let inner = &self.input[start + 1..end];

        if inner.starts_with('!') || inner.starts_with('?') {
            return Ok(None);
        }
        if let Some(closing) = inner.strip_prefix('/') {
            let name = tag_name(closing);
            if name.is_empty() {
                return Ok(None);
            }
            return Ok(Some(Token::Close {
                name,
                position: start,
            }));
        }
        Ok(Some(Token::Open(parse_start_tag(inner, start))))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed || self.pos >= self.input.len() {
                return None;
            }
            let input = self.input;
            let start = self.pos;
            let rest = &input[start..];

            if rest.starts_with('<') && starts_markup(&rest[1..]) {
                match self.markup_token(start) {
                    Ok(Some(token)) => return Some(Ok(token)),
                    Ok(None) => continue,
                    Err(err) => {
                        self.failed = true;
                        return Some(Err(err));
                    }
                }
            }

            // Text runs to the next `<`; a literal `<` is a text run of its own.
            let skip = usize::from(rest.starts_with('<'));
            let len = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
            self.pos = start + len;
            return Some(Ok(Token::Text(&rest[..len])));
        }
    }
}

fn starts_markup(after_lt: &str) -> bool {
    after_lt
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

fn tag_name(s: &str) -> String {
    s.chars()
        .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn parse_start_tag(inner: &str, position: usize) -> StartTag {
    let trimmed = inner.trim_end();
    let (body, self_closing) = match trimmed.strip_suffix('/') {
        Some(body) => (body, true),
        None => (trimmed, false),
    };
    let name = tag_name(body);
    let attrs = parse_attrs(&body[name.len()..]);
    StartTag {
        name,
        attrs,
        self_closing,
        position,
    }
}

fn parse_attrs(mut s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    loop {
        s = s.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if s.is_empty() {
            return attrs;
        }
        let key_len = s
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(s.len());
        let key = s[..key_len].to_ascii_lowercase();
        s = s[key_len..].trim_start();

        let Some(after_eq) = s.strip_prefix('=') else {
            attrs.push((key, String::new()));
            continue;
        };
        let after_eq = after_eq.trim_start();
        let (value, rest) = match after_eq.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &after_eq[1..];
                match body.find(q) {
                    Some(end) => (&body[..end], &body[end + 1..]),
                    None => (body, ""),
                }
            }
            _ => {
                let end = after_eq
                    .find(char::is_whitespace)
                    .unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            }
        };
        attrs.push((key, value.to_string()));
        s = rest;
    }
}

/// Decode the character entity starting at the `&` that begins `s`.
///
/// Returns the decoded character and the byte length of the entity, or
/// `None` when `s` does not start with a recognized entity.
#[must_use]
pub fn decode_entity(s: &str) -> Option<(char, usize)> {
    let body = s.strip_prefix('&')?;
    let semi = body.find(';')?;
    if semi == 0 || semi > 10 {
        return None;
    }
    let name = &body[..semi];
    let ch = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((ch, semi + 2))
}

/// Decode every recognized entity in `text`; unknown ones stay verbatim.
#[must_use]
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match decode_entity(rest) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Escape `&`, `<` and `>` as entities.
#[must_use]
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
