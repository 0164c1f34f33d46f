use flashtui_core::{KeyCode, KeyEvent};
use flashtui_text::decode;
use flashtui_text::render::escape;
use flashtui_widgets::{Bindings, ListCommand, Outcome, ParentLink, SelectList, View};

use crate::app::App;
use crate::collection::{Collection, NoteId};
use crate::error::{Error, Result};
use crate::views::note_editor::edit_note;
use crate::views::{LIST_TOP, ListView, run_list};

const HELP: &str = "q=back  jk=navigate  l=edit  /=search";

/// One note in the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: NoteId,
    /// Fields as editable text.
    pub fields: Vec<String>,
    /// Fields joined on one line, shortened to fit (render markup).
    pub summary: String,
    /// Decks holding the note's cards (render markup).
    pub decks: String,
}

impl NoteRow {
    /// # Errors
    ///
    /// If the note does not exist.
    pub fn load(collection: &dyn Collection, id: NoteId, cols: u16) -> Result<Self> {
        let note = collection.note(id)?;
        let fields: Vec<String> = note
            .fields
            .iter()
            .map(|field| {
                decode(field).unwrap_or_else(|err| {
                    tracing::warn!(note = id, %err, "showing undecodable field as stored");
                    field.clone()
                })
            })
            .collect();
        let width = 2 * usize::from(cols).saturating_sub(6) / 3;
        Ok(Self {
            id,
            summary: escape(&summarize(&fields, width)),
            decks: escape(&collection.note_decks(id)?.join(", ")),
            fields,
        })
    }
}

/// Fields joined by ` / ` on a single line, cut to `width` characters with
/// `...` marking the cut.
#[must_use]
pub fn summarize(fields: &[String], width: usize) -> String {
    let line = fields.join(" / ").replace('\n', " ");
    if line.chars().count() <= width {
        return line;
    }
    let mut cut: String = line.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

fn format_row(row: &NoteRow) -> (String, String, String) {
    (row.summary.clone(), String::new(), row.decks.clone())
}

fn field_contains(row: &NoteRow, query: &str) -> bool {
    row.fields.iter().any(|field| field.contains(query))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseCommand {
    List(ListCommand),
    Edit,
}

/// A list of notes to pick one to edit.
#[derive(Debug)]
pub struct NoteBrowser<'p> {
    list: SelectList<NoteRow>,
    parent: ParentLink<'p, App, Error>,
}

impl<'p> NoteBrowser<'p> {
    /// # Errors
    ///
    /// If one of the notes does not exist.
    pub fn new(app: &App, ids: &[NoteId], parent: ParentLink<'p, App, Error>) -> Result<Self> {
        let (_, cols) = app.size();
        let rows = ids
            .iter()
            .map(|&id| NoteRow::load(app.collection.as_ref(), id, cols))
            .collect::<Result<Vec<_>>>()?;
        let title = format!("Select a Note to edit ({} matches)", rows.len());
        tracing::debug!(notes = rows.len(), "note browser opened");
        Ok(Self {
            list: SelectList::new(&title, rows, format_row)
                .with_help(&title, HELP)
                .with_predicate(field_contains),
            parent,
        })
    }

    #[must_use]
    pub fn rows(&self) -> &[NoteRow] {
        self.list.items()
    }

    /// # Errors
    ///
    /// Terminal I/O failures and collection errors.
    pub fn run(&mut self, app: &mut App) -> Result<()> {
        run_list(self, app)
    }

    fn edit(&mut self, app: &mut App, index: usize) -> Result<()> {
        let id = self.list.items()[index].id;
        let report = edit_note(app, id)?;
        let (_, cols) = app.size();
        let row = NoteRow::load(app.collection.as_ref(), id, cols)?;
        self.list.replace_item(index, row);
        self.list.set_footer(report.status());
        Ok(())
    }
}

impl View for NoteBrowser<'_> {
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

impl<'p> Bindings<'p, App, Error> for NoteBrowser<'p> {
    type Command = BrowseCommand;

    fn binding(&self, key: &KeyEvent) -> Option<BrowseCommand> {
        if key.ctrl() || key.alt() {
            return None;
        }
        match key.code {
            KeyCode::Char('l') | KeyCode::Enter => Some(BrowseCommand::Edit),
            _ => self.list.binding(key).map(BrowseCommand::List),
        }
    }

    fn defers(&self, key: &KeyEvent) -> bool {
        self.list.defers(key)
    }

    fn execute(
        &mut self,
        cmd: BrowseCommand,
        _leaf: Option<&mut dyn View>,
        app: &mut App,
    ) -> Result<Outcome> {
        match cmd {
            BrowseCommand::List(cmd) => Ok(self
                .list
                .execute(cmd, app.surface.as_mut(), &app.tags, LIST_TOP)?),
            BrowseCommand::Edit => {
                if let Some(index) = self.list.selected_index() {
                    self.edit(app, index)?;
                }
                Ok(Outcome::Continue)
            }
        }
    }

    fn parent(&mut self) -> &mut ParentLink<'p, App, Error> {
        &mut self.parent
    }
}

impl<'p> ListView<'p> for NoteBrowser<'p> {
    type Item = NoteRow;

    fn list(&mut self) -> &mut SelectList<NoteRow> {
        &mut self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::TestApp;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn summary_fits_width() {
        let fields = strings(&["one\ntwo", "three"]);
        assert_eq!(summarize(&fields, 40), "one two / three");
        assert_eq!(summarize(&fields, 10), "one two...");
        assert_eq!(summarize(&fields, 15), "one two / three");
    }

    #[test]
    fn rows_show_fields_and_decks() {
        let mut t = TestApp::new("q");
        let mut browser = NoteBrowser::new(&t.app, &[12, 11], ParentLink::root()).unwrap();
        assert_eq!(browser.rows()[1].fields, strings(&["Mona Lisa", "da \\bVinci\\B"]));
        browser.run(&mut t.app).unwrap();

        assert!(t.row_text(0).starts_with("Select a Note to edit (2 matches)  |  q=back"));
        let first = t.row_text(2);
        assert!(first.starts_with(" Starry Night / van Gogh"));
        assert!(first.ends_with("Art, Geography"));
        assert!(t.row_text(3).starts_with(" Mona Lisa / da \\bVinci\\B"));
    }

    #[test]
    fn search_matches_decoded_fields() {
        let mut t = TestApp::new("/Vinci\n");
        let mut browser = NoteBrowser::new(&t.app, &[12, 13, 11], ParentLink::root()).unwrap();
        assert!(browser.run(&mut t.app).is_err());
        assert_eq!(browser.list.selected_index(), Some(2));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn edit_refreshes_row_and_reports() {
        let config = Config {
            editor: Some("sed -i s/Starry/Stormy/".into()),
            ..Config::default()
        };
        let mut t = TestApp::with_config("lq", config);
        let mut browser = NoteBrowser::new(&t.app, &[12], ParentLink::root()).unwrap();
        browser.run(&mut t.app).unwrap();

        assert_eq!(browser.rows()[0].fields[0], "Stormy Night");
        assert_eq!(browser.footer(), "Note updated");
        assert!(t.row_text(2).starts_with(" Stormy Night"));
        assert_eq!(t.suspend_count(), 1);
    }
}
