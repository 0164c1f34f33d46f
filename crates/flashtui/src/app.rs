//! State shared by every view.

use flashtui_core::Surface;
use flashtui_style::TagTable;

use crate::collection::Collection;
use crate::config::Config;
use crate::error::Result;
use crate::views::MainMenu;

/// Context handed to every view loop and key handler.
pub struct App {
    pub surface: Box<dyn Surface>,
    pub collection: Box<dyn Collection>,
    pub tags: TagTable,
    pub config: Config,
    /// Set by `:q`; every view loop stops when it sees it.
    pub quitting: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("size", &self.surface.measure())
            .field("config", &self.config)
            .field("quitting", &self.quitting)
            .finish_non_exhaustive()
    }
}

impl App {
    #[must_use]
    pub fn new(surface: Box<dyn Surface>, collection: Box<dyn Collection>, config: Config) -> Self {
        let tags = TagTable::with_defaults(surface.supports_color());
        Self {
            surface,
            collection,
            tags,
            config,
            quitting: false,
        }
    }

    /// Run the main menu until the user quits. `notices` are problems found
    /// while starting up; the first is shown in the footer.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures and collection errors. The collection is saved
    /// on a normal exit.
    pub fn run(&mut self, notices: &[String]) -> Result<()> {
        let mut menu = MainMenu::new();
        if let Some(notice) = notices.first() {
            menu.notify(notice);
        }
        menu.run(self)?;
        self.collection.save()?;
        tracing::info!("collection saved, exiting");
        Ok(())
    }

    /// Rows and columns of the screen.
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        self.surface.measure()
    }
}
