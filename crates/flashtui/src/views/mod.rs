//! The screens of the program.
//!
//! Each view runs its own modal loop on the [`App`] and links to the view
//! that started it, so keys it does not bind (`:` in particular) reach the
//! main menu through [`flashtui_widgets::dispatch`].

mod browser;
mod deck_manager;
mod main_menu;
pub mod note_editor;
mod reviewer;

pub use browser::{BrowseCommand, NoteBrowser, NoteRow};
pub use deck_manager::{DeckCommand, DeckManager};
pub use main_menu::{MainMenu, MenuCommand};
pub use reviewer::{ReviewCommand, Reviewer};

use flashtui_widgets::chrome::draw_chrome;
use flashtui_widgets::{Bindings, Outcome, SelectList, View, dispatch};

use crate::app::App;
use crate::error::{Error, Result};

/// First screen row of a list.
pub(crate) const LIST_TOP: u16 = 2;

/// A view whose body is a [`SelectList`].
pub(crate) trait ListView<'p>: Bindings<'p, App, Error> {
    type Item;

    fn list(&mut self) -> &mut SelectList<Self::Item>;
}

/// Draw, read a key, dispatch; until the view terminates or the app quits.
pub(crate) fn run_list<'p, V: ListView<'p>>(view: &mut V, app: &mut App) -> Result<()> {
    loop {
        let (rows, _) = app.size();
        let list = view.list();
        list.fit(rows);
        if list.take_dirty() {
            draw_chrome(app.surface.as_mut(), &app.tags, list.header(), list.footer())?;
        }
        list.draw(app.surface.as_mut(), &app.tags, LIST_TOP)?;
        app.surface.flush()?;

        let key = app.surface.read_key()?;
        if dispatch(view, key, app)? == Outcome::Terminate || app.quitting {
            return Ok(());
        }
    }
}
