#![forbid(unsafe_code)]

//! Text handling for flashtui.
//!
//! Three text formats meet here:
//!
//! - **stored** rich text: the HTML subset kept in note fields and card
//!   templates (`<br>`, `<div>`, `<b>`, entities, ...)
//! - **editable** text: what a user edits in `$EDITOR`, plain text with
//!   backslash escapes (`\b`..`\B` for bold, `\\` for a backslash)
//! - **render markup**: angle-bracket tags naming entries of a
//!   [`flashtui_style::TagTable`], e.g. `<blue>cloze</blue>`
//!
//! [`codec`] converts between stored and editable text, [`card`] turns
//! stored card HTML into render markup, and [`render`] turns render markup
//! into characters and attributes.

pub mod card;
pub mod codec;
pub mod error;
pub mod html;
pub mod lines;
pub mod render;
pub mod wrap;

pub use card::parse_card;
pub use codec::{decode, encode};
pub use error::ParseError;
pub use render::{StyleRenderer, StyledText, render};
