#![forbid(unsafe_code)]

//! Widgets for flashtui.
//!
//! Everything here draws onto a [`flashtui_core::Surface`] and reads keys
//! from it; nothing holds the surface between calls.

pub mod align;
pub mod chrome;
pub mod dispatch;
pub mod input_line;
pub mod scroll;
pub mod select_list;
pub mod text_pad;

pub use align::Align;
pub use dispatch::{Bindings, KeyHandler, Outcome, ParentLink, View, dispatch, forward};
pub use input_line::InputLine;
pub use scroll::ScrollState;
pub use select_list::{ListCommand, SelectList};
pub use text_pad::TextPad;
