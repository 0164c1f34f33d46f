#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! [`TerminalSession`] owns raw mode and the alternate screen for as long as
//! it lives and implements [`Surface`] on top of crossterm.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Drop restores previous state** - cursor shown, alternate screen left,
//!    raw mode disabled, stdout flushed.
//!
//! 2. **Panic safety** - a panic hook (installed once per process) performs
//!    a best-effort cleanup before the previous hook prints the message, so the
//!    panic text lands on a sane terminal.
//!
//! 3. **Signals** - on Unix, SIGINT and SIGTERM restore the terminal before
//!    the process exits with `128 + signal`.
//!
//! 4. **Suspend/resume** - [`Surface::suspend`] undoes every mode so an
//!    external program (the note editor) can own the tty; [`Surface::resume`]
//!    re-enables them.
//!
//! # Usage
//!
//! ```no_run
//! use flashtui_core::surface::Surface;
//! use flashtui_core::terminal_session::{SessionOptions, TerminalSession};
//!
//! let mut session = TerminalSession::new(SessionOptions::default())?;
//! let (rows, cols) = session.measure();
//! let key = session.read_key()?;
//! // `session` restores the terminal when dropped
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, BufWriter, Stdout, Write};
use std::sync::OnceLock;

use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

use crate::cell::{AttrMask, AttributedRun, MaskColor};
use crate::event::{Event, KeyEvent};
use crate::surface::Surface;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Terminal session configuration options.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Switch to the alternate screen buffer, preserving scrollback.
    pub alternate_screen: bool,

    /// Report colour support even when the terminal advertises none.
    ///
    /// `None` means detect: colour is on unless `NO_COLOR` is set or the
    /// terminal reports fewer than 8 colours.
    pub force_color: Option<bool>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            force_color: None,
        }
    }
}

/// A terminal session that restores terminal state on drop.
pub struct TerminalSession {
    out: BufWriter<Stdout>,
    options: SessionOptions,
    size: (u16, u16),
    color: bool,
    active: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl std::fmt::Debug for TerminalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSession")
            .field("options", &self.options)
            .field("size", &self.size)
            .field("color", &self.color)
            .field("active", &self.active)
            .finish()
    }
}

impl TerminalSession {
    /// Enter raw mode and, if requested, the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled or the terminal size
    /// cannot be queried.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        let (cols, rows) = terminal::size()?;
        let color = options.force_color.unwrap_or_else(detect_color);

        let mut session = Self {
            out: BufWriter::new(io::stdout()),
            options,
            size: (rows, cols),
            color,
            active: false,
            #[cfg(unix)]
            signal_guard: Some(SignalGuard::new()?),
        };
        session.enter()?;
        #[cfg(feature = "tracing")]
        tracing::info!(rows, cols, color, "terminal session started");
        Ok(session)
    }

    /// Get the session options.
    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        if self.options.alternate_screen {
            queue!(self.out, terminal::EnterAlternateScreen)?;
        }
        queue!(
            self.out,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        self.out.flush()?;
        #[cfg(feature = "tracing")]
        tracing::debug!("terminal modes enabled");
        Ok(())
    }

    /// Undo every mode. Errors are ignored: this runs on drop and suspend.
    fn leave(&mut self) {
        if !self.active {
            return;
        }
        let _ = queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            cursor::Show
        );
        if self.options.alternate_screen {
            let _ = queue!(self.out, terminal::LeaveAlternateScreen);
        }
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
        self.active = false;
        #[cfg(feature = "tracing")]
        tracing::debug!("terminal modes disabled");
    }

    fn queue_attrs(&mut self, attrs: AttrMask) -> io::Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        if attrs.contains(AttrMask::BOLD) {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if attrs.contains(AttrMask::ITALIC) {
            queue!(self.out, SetAttribute(Attribute::Italic))?;
        }
        if attrs.contains(AttrMask::UNDERLINE) {
            queue!(self.out, SetAttribute(Attribute::Underlined))?;
        }
        if attrs.contains(AttrMask::STANDOUT) {
            queue!(self.out, SetAttribute(Attribute::Reverse))?;
        }
        if self.color
            && let Some(color) = attrs.color()
        {
            let color = match color {
                MaskColor::Blue => Color::Blue,
                MaskColor::Red => Color::Red,
                MaskColor::Green => Color::Green,
            };
            queue!(self.out, SetForegroundColor(color))?;
        }
        Ok(())
    }
}

impl Surface for TerminalSession {
    fn measure(&self) -> (u16, u16) {
        self.size
    }

    fn draw(&mut self, row: u16, col: u16, runs: &[AttributedRun]) -> io::Result<()> {
        let (rows, cols) = self.size;
        if row >= rows || col >= cols {
            return Ok(());
        }
        let visible = usize::from(cols - col).min(runs.len());
        let runs = &runs[..visible];

        queue!(self.out, cursor::MoveTo(col, row))?;
        let mut start = 0;
        while start < runs.len() {
            let attrs = runs[start].attrs;
            let end = runs[start..]
                .iter()
                .position(|r| r.attrs != attrs)
                .map_or(runs.len(), |n| start + n);
            let text: String = runs[start..end].iter().map(|r| r.ch).collect();
            self.queue_attrs(attrs)?;
            queue!(self.out, Print(text))?;
            start = end;
        }
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            let event = crossterm::event::read()?;
            match Event::from_crossterm(event) {
                Some(Event::Key(key)) if key.pressed => return Ok(key),
                Some(Event::Resize { rows, cols }) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(rows, cols, "terminal resized");
                    self.size = (rows, cols);
                }
                _ => {}
            }
        }
    }

    fn clear_region(&mut self, top: u16, height: u16) -> io::Result<()> {
        let bottom = top.saturating_add(height).min(self.size.0);
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        for row in top..bottom {
            queue!(
                self.out,
                cursor::MoveTo(0, row),
                terminal::Clear(terminal::ClearType::CurrentLine)
            )?;
        }
        Ok(())
    }

    fn set_cursor(&mut self, at: Option<(u16, u16)>) -> io::Result<()> {
        match at {
            Some((row, col)) => queue!(self.out, cursor::MoveTo(col, row), cursor::Show),
            None => queue!(self.out, cursor::Hide),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn suspend(&mut self) -> io::Result<()> {
        #[cfg(feature = "tracing")]
        tracing::info!("suspending terminal session");
        self.leave();
        Ok(())
    }

    fn resume(&mut self) -> io::Result<()> {
        self.enter()?;
        let (cols, rows) = terminal::size()?;
        self.size = (rows, cols);
        #[cfg(feature = "tracing")]
        tracing::info!(rows, cols, "terminal session resumed");
        Ok(())
    }

    fn supports_color(&self) -> bool {
        self.color
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();
        self.leave();
    }
}

fn detect_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    crossterm::style::available_color_count() >= 8
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetAttribute(Attribute::Reset),
        cursor::Show,
        terminal::LeaveAlternateScreen
    );
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                #[cfg(feature = "tracing")]
                tracing::warn!(signal, "termination signal received, cleaning up");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_options_default_uses_alternate_screen() {
        let opts = SessionOptions::default();
        assert!(opts.alternate_screen);
        assert_eq!(opts.force_color, None);
    }

    #[test]
    fn panic_hook_installs_once() {
        install_panic_hook();
        install_panic_hook();
    }
}
