#![forbid(unsafe_code)]

//! Core: key events, attributed cells, the drawing surface and the terminal
//! session behind it.

pub mod cell;
pub mod event;
pub mod logging;
pub mod surface;
#[cfg(not(target_arch = "wasm32"))]
pub mod terminal_session;

pub use cell::{AttrMask, AttributedRun};
pub use event::{KeyCode, KeyEvent, Modifiers};
pub use surface::{HeadlessSurface, Surface};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, info_span, trace, warn};
