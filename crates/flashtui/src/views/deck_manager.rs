use flashtui_core::{KeyCode, KeyEvent};
use flashtui_text::render::escape;
use flashtui_widgets::{Bindings, ListCommand, Outcome, ParentLink, SelectList, View};

use crate::app::App;
use crate::collection::DeckInfo;
use crate::error::{Error, Result};
use crate::views::{LIST_TOP, ListView, Reviewer, run_list};

const TITLE: &str = "Select a Deck";
const HELP: &str = "q=quit  jk=navigate  l=study  L=study-all  r=refresh  /=search";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckCommand {
    List(ListCommand),
    /// Review the deck under the cursor.
    Study,
    /// Review every deck with due cards, in list order.
    StudyAll,
    Refresh,
}

fn format_deck(deck: &DeckInfo) -> (String, String, String) {
    let c = deck.counts;
    (
        escape(&deck.name),
        String::new(),
        format!(
            "<blue>{}</blue> <red>{}</red> <green>{}</green>",
            c.new, c.learning, c.review
        ),
    )
}

fn name_contains(deck: &DeckInfo, query: &str) -> bool {
    deck.name.contains(query)
}

fn load_decks(app: &App) -> Result<Vec<DeckInfo>> {
    let mut decks = app.collection.decks()?;
    if app.config.hide_child_decks {
        decks.retain(|deck| !deck.name.contains("::"));
    }
    Ok(decks)
}

fn deck_list(decks: Vec<DeckInfo>) -> SelectList<DeckInfo> {
    SelectList::new(TITLE, decks, format_deck)
        .with_help(TITLE, HELP)
        .with_predicate(name_contains)
}

/// Decks with their due counts.
#[derive(Debug)]
pub struct DeckManager<'p> {
    list: SelectList<DeckInfo>,
    parent: ParentLink<'p, App, Error>,
}

impl<'p> DeckManager<'p> {
    /// # Errors
    ///
    /// If the collection cannot list its decks.
    pub fn new(app: &App, parent: ParentLink<'p, App, Error>) -> Result<Self> {
        let decks = load_decks(app)?;
        tracing::debug!(decks = decks.len(), "deck list opened");
        Ok(Self {
            list: deck_list(decks),
            parent,
        })
    }

    #[must_use]
    pub fn decks(&self) -> &[DeckInfo] {
        self.list.items()
    }

    /// # Errors
    ///
    /// Terminal I/O failures and collection errors.
    pub fn run(&mut self, app: &mut App) -> Result<()> {
        run_list(self, app)
    }

    fn refresh(&mut self, app: &App) -> Result<()> {
        let decks = load_decks(app)?;
        if decks.len() == self.list.len() {
            self.list.replace_items(decks);
        } else {
            self.list = deck_list(decks);
        }
        self.list.mark_dirty();
        Ok(())
    }

    fn study(&mut self, app: &mut App, decks: Vec<DeckInfo>) -> Result<()> {
        let answered = Reviewer::new(decks).run(app)?;
        self.refresh(app)?;
        let status = match answered {
            0 => "Nothing due".to_string(),
            1 => "Reviewed 1 card".to_string(),
            n => format!("Reviewed {n} cards"),
        };
        self.list.set_footer(status);
        Ok(())
    }
}

impl View for DeckManager<'_> {
    fn header(&self) -> &str {
        self.list.header()
    }

    fn footer(&self) -> &str {
        self.list.footer()
    }

    fn set_footer(&mut self, footer: String) {
        self.list.set_footer(footer);
    }

    fn mark_dirty(&mut self) {
        self.list.mark_dirty();
    }
}

impl<'p> Bindings<'p, App, Error> for DeckManager<'p> {
    type Command = DeckCommand;

    fn binding(&self, key: &KeyEvent) -> Option<DeckCommand> {
        if key.ctrl() || key.alt() {
            return None;
        }
        match key.code {
            KeyCode::Char('l') | KeyCode::Enter => Some(DeckCommand::Study),
            KeyCode::Char('L') => Some(DeckCommand::StudyAll),
            KeyCode::Char('r') => Some(DeckCommand::Refresh),
            KeyCode::Char('h') => None,
            _ => self.list.binding(key).map(DeckCommand::List),
        }
    }

    fn defers(&self, key: &KeyEvent) -> bool {
        self.list.defers(key)
    }

    fn execute(
        &mut self,
        cmd: DeckCommand,
        _leaf: Option<&mut dyn View>,
        app: &mut App,
    ) -> Result<Outcome> {
        match cmd {
            DeckCommand::List(cmd) => {
                return Ok(self
                    .list
                    .execute(cmd, app.surface.as_mut(), &app.tags, LIST_TOP)?);
            }
            DeckCommand::Study => {
                if let Some(deck) = self.list.confirm().cloned() {
                    tracing::info!(deck = %deck.name, "studying deck");
                    self.study(app, vec![deck])?;
                }
            }
            DeckCommand::StudyAll => {
                let due: Vec<DeckInfo> = self
                    .list
                    .items()
                    .iter()
                    .filter(|deck| !deck.counts.is_empty())
                    .cloned()
                    .collect();
                if due.is_empty() {
                    self.list.set_footer("Nothing due".to_string());
                } else {
                    tracing::info!(decks = due.len(), "studying all due decks");
                    self.study(app, due)?;
                }
            }
            DeckCommand::Refresh => self.refresh(app)?,
        }
        Ok(Outcome::Continue)
    }

    fn parent(&mut self) -> &mut ParentLink<'p, App, Error> {
        &mut self.parent
    }
}

impl<'p> ListView<'p> for DeckManager<'p> {
    type Item = DeckInfo;

    fn list(&mut self) -> &mut SelectList<DeckInfo> {
        &mut self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;
    use crate::config::Config;
    use crate::testing::TestApp;

    fn manager(t: &TestApp) -> DeckManager<'static> {
        DeckManager::new(&t.app, ParentLink::root()).unwrap()
    }

    fn names(decks: &[DeckInfo]) -> Vec<&str> {
        decks.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn lists_decks_with_counts() {
        let mut t = TestApp::new("q");
        let mut decks = manager(&t);
        assert_eq!(names(decks.decks()), ["Art", "Art::Modern", "Geography"]);
        decks.run(&mut t.app).unwrap();

        assert!(t.row_text(0).starts_with("Select a Deck  |  q=quit"));
        assert_eq!(t.row_text(2), format!(" Art{}0 1 1", " ".repeat(70)));
        assert!(t.row_text(4).starts_with(" Geography"));
        assert!(t.row_text(4).ends_with("1 0 0"));
    }

    #[test]
    fn child_decks_hidden_by_config() {
        let config = Config {
            hide_child_decks: true,
            ..Config::default()
        };
        let t = TestApp::with_config("", config);
        assert_eq!(names(manager(&t).decks()), ["Art", "Geography"]);
    }

    #[test]
    fn h_does_not_leave_the_deck_list() {
        let mut t = TestApp::new("hq");
        let mut decks = manager(&t);
        decks.run(&mut t.app).unwrap();
        assert_eq!(t.pending_keys(), 0);
        assert_eq!(decks.list.selected_index(), None);
    }

    #[test]
    fn study_reviews_selected_deck_and_refreshes_counts() {
        // Art holds a learning card and a due review card
        let mut t = TestApp::new("l33q");
        let mut decks = manager(&t);
        decks.run(&mut t.app).unwrap();

        assert!(decks.decks()[0].counts.is_empty());
        assert_eq!(decks.footer(), "Reviewed 2 cards");
        let saved = t.saved();
        let art = saved.decks().unwrap();
        assert!(art.iter().find(|d| d.name == "Art").unwrap().counts.is_empty());
    }

    #[test]
    fn study_all_walks_every_due_deck() {
        let mut t = TestApp::new("L333q");
        let mut decks = manager(&t);
        decks.run(&mut t.app).unwrap();
        assert!(decks.decks().iter().all(|d| d.counts.is_empty()));
        assert_eq!(decks.footer(), "Reviewed 3 cards");
    }

    #[test]
    fn study_all_with_nothing_due() {
        let mut t = TestApp::new("L333L");
        let mut decks = manager(&t);
        // the script runs out on the final screen
        assert!(decks.run(&mut t.app).is_err());
        assert_eq!(decks.footer(), "Nothing due");
    }

    #[test]
    fn empty_deck_reports_nothing_due() {
        let mut t = TestApp::new("jlq");
        let mut decks = manager(&t);
        decks.run(&mut t.app).unwrap();
        assert_eq!(decks.footer(), "Nothing due");
    }

    #[test]
    fn search_by_name() {
        let mut t = TestApp::new("/Geo\n");
        let mut decks = manager(&t);
        assert!(decks.run(&mut t.app).is_err());
        assert_eq!(decks.list.selected_index(), Some(2));
    }
}
