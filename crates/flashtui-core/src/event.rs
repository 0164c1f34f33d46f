#![forbid(unsafe_code)]

//! Key and resize events.
//!
//! Views react to single key presses, so the event model is small. Crossterm
//! events are mapped here at the terminal boundary and nothing above
//! `flashtui-core` sees a crossterm type. Keys flashtui has no binding for
//! (function keys, tab, arrows left and right) are dropped during mapping.

use bitflags::bitflags;
#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

/// An input event read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize { rows: u16, cols: u16 },
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    /// `false` for key releases on terminals that report them.
    pub pressed: bool,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            pressed: true,
        }
    }

    /// A plain character press.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.code == KeyCode::Char(c)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// The printable ASCII character carried by this key, if any.
    /// Ctrl and Alt chords are never printable.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.ctrl() && !self.alt() && (' '..='~').contains(&c) => Some(c),
            _ => None,
        }
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// The keys views can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Event {
    /// Map a crossterm event. `None` for events views never see (mouse,
    /// focus, paste, unbound keys).
    #[must_use]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => KeyEvent::from_crossterm(key).map(Self::Key),
            cte::Event::Resize(cols, rows) => Some(Self::Resize { rows, cols }),
            _ => None,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyEvent {
    fn from_crossterm(event: cte::KeyEvent) -> Option<Self> {
        let code = match event.code {
            cte::KeyCode::Char(c) => KeyCode::Char(c),
            cte::KeyCode::Enter => KeyCode::Enter,
            cte::KeyCode::Esc => KeyCode::Escape,
            cte::KeyCode::Backspace => KeyCode::Backspace,
            cte::KeyCode::Delete => KeyCode::Delete,
            cte::KeyCode::Up => KeyCode::Up,
            cte::KeyCode::Down => KeyCode::Down,
            cte::KeyCode::PageUp => KeyCode::PageUp,
            cte::KeyCode::PageDown => KeyCode::PageDown,
            cte::KeyCode::Home => KeyCode::Home,
            cte::KeyCode::End => KeyCode::End,
            _ => return None,
        };
        let mut modifiers = Modifiers::empty();
        for (from, to) in [
            (cte::KeyModifiers::SHIFT, Modifiers::SHIFT),
            (cte::KeyModifiers::ALT, Modifiers::ALT),
            (cte::KeyModifiers::META, Modifiers::ALT),
            (cte::KeyModifiers::CONTROL, Modifiers::CTRL),
        ] {
            if event.modifiers.contains(from) {
                modifiers |= to;
            }
        }
        Some(Self {
            code,
            modifiers,
            pressed: event.kind != cte::KeyEventKind::Release,
        })
    }
}
