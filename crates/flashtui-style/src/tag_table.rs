#![forbid(unsafe_code)]

//! Registry of markup tag names.
//!
//! A [`TagTable`] maps the tag names of the render mini-language (`<b>`,
//! `<blue>`, ...) to the [`AttrMask`] bits they switch on. It is built once at
//! start-up, after the surface has reported whether it can show colour, and
//! is only read afterwards: renderers take it by shared reference.
//!
//! # Example
//! ```
//! use flashtui_core::AttrMask;
//! use flashtui_style::TagTable;
//!
//! let tags = TagTable::with_defaults(true);
//! assert_eq!(tags.get("b"), Some(AttrMask::BOLD));
//! assert_eq!(tags.get("blue"), Some(AttrMask::BLUE));
//! assert_eq!(tags.get("marquee"), None);
//!
//! // Compose several tags (bits are ORed)
//! let heading = tags.compose(&["b", "u"]);
//! assert_eq!(heading, AttrMask::BOLD | AttrMask::UNDERLINE);
//! ```

use std::collections::HashMap;

use flashtui_core::AttrMask;

/// Tag used to highlight active cloze deletions.
pub const CLOZE_TAG: &str = "blue";

/// Immutable-after-construction mapping from tag name to attribute bits.
///
/// Tag names are matched exactly; the markup producers in this workspace
/// only ever emit lowercase names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTable {
    tags: HashMap<String, AttrMask>,
}

impl TagTable {
    /// Create an empty table. Every tag is unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the standard table.
    ///
    /// - `normal`: no attributes
    /// - `so`: standout
    /// - `b`, `i`, `u`: bold, italic, underline
    /// - `blue`, `red`, `green`: the colour, or bold when `color` is false so
    ///   coloured spans stay distinguishable on a monochrome terminal
    #[must_use]
    pub fn with_defaults(color: bool) -> Self {
        let colored = |bits: AttrMask| if color { bits } else { AttrMask::BOLD };
        Self::new()
            .with("normal", AttrMask::empty())
            .with("so", AttrMask::STANDOUT)
            .with("b", AttrMask::BOLD)
            .with("i", AttrMask::ITALIC)
            .with("u", AttrMask::UNDERLINE)
            .with("blue", colored(AttrMask::BLUE))
            .with("red", colored(AttrMask::RED))
            .with("green", colored(AttrMask::GREEN))
    }

    /// Builder-style [`TagTable::define`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, attrs: AttrMask) -> Self {
        self.define(name, attrs);
        self
    }

    /// Define a tag, replacing any previous definition.
    pub fn define(&mut self, name: impl Into<String>, attrs: AttrMask) {
        let name = name.into();
        flashtui_core::trace!(tag = %name, bits = attrs.bits(), "tag defined");
        self.tags.insert(name, attrs);
    }

    /// Attribute bits for `name`, or `None` for an unknown tag.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<AttrMask> {
        self.tags.get(name).copied()
    }

    /// Whether `name` is a known tag.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// OR together the bits of every known tag in `names`; unknown names
    /// contribute nothing.
    #[must_use]
    pub fn compose(&self, names: &[&str]) -> AttrMask {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .fold(AttrMask::empty(), |acc, bits| acc | bits)
    }

    /// Known tag names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
