use flashtui_core::{KeyCode, KeyEvent};
use flashtui_text::render::escape;
use flashtui_widgets::chrome::{draw_chrome, dump_debug, prompt};
use flashtui_widgets::{Bindings, KeyHandler, Outcome, ParentLink, View, dispatch, forward};

use crate::app::App;
use crate::commands::{Command, HELP};
use crate::error::{Error, Result};
use crate::views::{DeckManager, NoteBrowser};

const HEAD: &str = "Main Menu  |  q=quit  d=decks  :=command";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Quit,
    Decks,
    /// Read a `:` command line.
    Command,
}

/// The root view. Every other view reaches it with `:`.
#[derive(Debug)]
pub struct MainMenu {
    foot: String,
    dirty: bool,
    parent: ParentLink<'static, App, Error>,
}

impl Default for MainMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl MainMenu {
    #[must_use]
    pub fn new() -> Self {
        Self {
            foot: String::new(),
            dirty: true,
            parent: ParentLink::root(),
        }
    }

    /// Show a plain-text message in the footer of the first screen.
    pub fn notify(&mut self, message: &str) {
        self.foot = escape(message);
        self.dirty = true;
    }

    /// Open the deck list, then take keys until the user quits.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures and collection errors from any nested view.
    pub fn run(&mut self, app: &mut App) -> Result<()> {
        let notice = std::mem::take(&mut self.foot);
        self.open_decks(app, notice)?;
        self.dirty = true;
        while !app.quitting {
            if std::mem::take(&mut self.dirty) {
                draw_chrome(app.surface.as_mut(), &app.tags, HEAD, &self.foot)?;
                dump_debug(app.surface.as_mut(), HELP, false)?;
            }
            app.surface.flush()?;
            let key = app.surface.read_key()?;
            if dispatch(self, key, app)? == Outcome::Terminate {
                break;
            }
        }
        Ok(())
    }

    fn open_decks(&mut self, app: &mut App, footer: String) -> Result<()> {
        let mut decks = DeckManager::new(app, ParentLink::new(&mut *self))?;
        if !footer.is_empty() {
            decks.set_footer(footer);
        }
        decks.run(app)
    }

    /// Browse the notes matching `query`; a status message if there are none.
    fn open_browser(&mut self, app: &mut App, query: &str) -> Result<Option<String>> {
        let ids = app.collection.find_notes(query)?;
        if ids.is_empty() {
            return Ok(Some(format!("No notes match: {}", escape(query))));
        }
        let mut browser = NoteBrowser::new(app, &ids, ParentLink::new(&mut *self))?;
        browser.run(app)?;
        Ok(None)
    }

    /// Prompt for and run one `:` command. Returns a status message.
    fn command(&mut self, app: &mut App) -> Result<Option<String>> {
        let line = prompt(app.surface.as_mut(), ":")?;
        tracing::debug!(%line, "command");
        match Command::parse(&line) {
            None => Ok(None),
            Some(Command::Quit) => {
                app.quitting = true;
                Ok(None)
            }
            Some(Command::Decks) => {
                self.open_decks(app, String::new())?;
                Ok(None)
            }
            Some(Command::Browse(query)) => self.open_browser(app, &query),
            Some(Command::Help) => {
                dump_debug(app.surface.as_mut(), HELP, true)?;
                Ok(None)
            }
            Some(Command::Unknown(line)) => Ok(Some(format!("Unknown command: {}", escape(&line)))),
        }
    }
}

impl View for MainMenu {
    fn header(&self) -> &str {
        HEAD
    }

    fn footer(&self) -> &str {
        &self.foot
    }

    fn set_footer(&mut self, footer: String) {
        self.foot = footer;
        self.dirty = true;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl Bindings<'static, App, Error> for MainMenu {
    type Command = MenuCommand;

    fn binding(&self, key: &KeyEvent) -> Option<MenuCommand> {
        if key.ctrl() || key.alt() {
            return None;
        }
        match key.code {
            KeyCode::Char('q') => Some(MenuCommand::Quit),
            KeyCode::Char('d') => Some(MenuCommand::Decks),
            KeyCode::Char(':') => Some(MenuCommand::Command),
            _ => None,
        }
    }

    fn defers(&self, _key: &KeyEvent) -> bool {
        false
    }

    fn execute(
        &mut self,
        cmd: MenuCommand,
        leaf: Option<&mut dyn View>,
        app: &mut App,
    ) -> Result<Outcome> {
        let status = match cmd {
            MenuCommand::Quit => {
                app.quitting = true;
                return Ok(Outcome::Terminate);
            }
            MenuCommand::Decks => {
                self.open_decks(app, String::new())?;
                None
            }
            MenuCommand::Command => self.command(app)?,
        };

        let target: &mut dyn View = match leaf {
            Some(leaf) => leaf,
            None => self,
        };
        target.mark_dirty();
        if let Some(status) = status {
            target.set_footer(status);
        }
        Ok(if app.quitting {
            Outcome::Terminate
        } else {
            Outcome::Continue
        })
    }

    fn parent(&mut self) -> &mut ParentLink<'static, App, Error> {
        &mut self.parent
    }
}

impl KeyHandler<App, Error> for MainMenu {
    fn handle_forwarded(
        &mut self,
        key: KeyEvent,
        leaf: &mut dyn View,
        app: &mut App,
    ) -> Result<Outcome> {
        forward(self, key, leaf, app)
    }
}
