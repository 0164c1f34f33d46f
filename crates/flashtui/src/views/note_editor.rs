//! Editing a note in an external editor.
//!
//! The fields are decoded to editable text and written to a temporary file,
//! one after another, separated by a [`FIELD_SEPARATOR`] line. The terminal
//! is handed to the editor; afterwards every changed field is encoded back.
//! A field that fails to encode keeps its stored value and is reported,
//! and the user is offered another go in the editor.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use flashtui_text::render::escape;
use flashtui_text::{decode, encode};
use flashtui_widgets::chrome::ask_yn;

use crate::app::App;
use crate::collection::{Note, NoteId};
use crate::config::Config;
use crate::error::Result;

pub const FIELD_SEPARATOR: &str = "%%%% next field %%%%";

/// What an edit did to the note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditReport {
    /// Fields stored with new values.
    pub changed: usize,
    /// Plain-text descriptions of everything that was not saved.
    pub problems: Vec<String>,
}

impl EditReport {
    fn failed(problem: String) -> Self {
        tracing::warn!("{problem}");
        Self {
            changed: 0,
            problems: vec![problem],
        }
    }

    /// One-line summary for the footer (render markup).
    #[must_use]
    pub fn status(&self) -> String {
        match (self.changed, self.problems.is_empty()) {
            (0, true) => "Note unchanged".to_string(),
            (_, true) => "Note updated".to_string(),
            (changed, false) => {
                let prefix = if changed == 0 {
                    "Note unchanged"
                } else {
                    "Note partly updated"
                };
                format!("{prefix}: {}", escape(&self.problems.join("; ")))
            }
        }
    }
}

/// Program and arguments used to edit a file: the configured editor, then
/// `$VISUAL`, then `$EDITOR`, then `vi`.
#[must_use]
pub fn editor_command(config: &Config) -> Vec<String> {
    let chosen = config
        .editor
        .clone()
        .or_else(|| std::env::var("VISUAL").ok())
        .or_else(|| std::env::var("EDITOR").ok())
        .filter(|editor| !editor.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string());
    chosen.split_whitespace().map(str::to_string).collect()
}

/// The editable file for `fields`.
#[must_use]
pub fn join_fields(fields: &[String]) -> String {
    let mut text = fields.join(&format!("\n{FIELD_SEPARATOR}\n"));
    text.push('\n');
    text
}

/// Split an edited file back into fields. The final newline is dropped.
#[must_use]
pub fn split_fields(text: &str) -> Vec<String> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    let mut fields: Vec<Vec<&str>> = vec![Vec::new()];
    for line in text.split('\n') {
        if line.trim_end_matches('\r') == FIELD_SEPARATOR {
            fields.push(Vec::new());
        } else if let Some(field) = fields.last_mut() {
            field.push(line);
        }
    }
    fields.into_iter().map(|lines| lines.join("\n")).collect()
}

/// Run the editor on `path` with the terminal suspended. A problem if it
/// could not be started or failed.
fn run_editor(app: &mut App, path: &Path) -> Result<Option<String>> {
    let command = editor_command(&app.config);
    let Some((program, args)) = command.split_first() else {
        return Ok(Some("no editor configured".to_string()));
    };
    tracing::info!(%program, path = %path.display(), "starting editor");

    app.surface.suspend()?;
    let status = Command::new(program).args(args).arg(path).status();
    app.surface.resume()?;

    Ok(match status {
        Ok(status) if status.success() => None,
        Ok(status) => Some(format!("editor {program} failed ({status})")),
        Err(err) => Some(format!("cannot run editor {program}: {err}")),
    })
}

/// Check the edited file against the note, encoding every changed field.
/// Returns the updated note and what happened.
fn apply_edit(note: &Note, editable: &[String], text: &str) -> (Note, EditReport) {
    let mut updated = note.clone();
    let edited = split_fields(text);
    if edited.len() != editable.len() {
        let problem = format!("expected {} fields, found {}", editable.len(), edited.len());
        return (updated, EditReport::failed(problem));
    }
    let mut report = EditReport::default();
    for (i, (old, new)) in editable.iter().zip(&edited).enumerate() {
        if old == new {
            continue;
        }
        match encode(new) {
            Ok(stored) => {
                updated.fields[i] = stored;
                report.changed += 1;
            }
            Err(err) => {
                tracing::warn!(note = note.id, field = i + 1, %err, "edited field not saved");
                report.problems.push(format!("field {}: {err}", i + 1));
            }
        }
    }
    (updated, report)
}

/// Edit note `id` in the external editor and store the changed fields.
///
/// When the edited text cannot be saved in full the user may go back to the
/// editor, starting from what they wrote.
///
/// # Errors
///
/// Terminal and temporary file I/O failures and collection errors. Problems
/// with the editor or the edited text are reported, not returned.
pub fn edit_note(app: &mut App, id: NoteId) -> Result<EditReport> {
    let note = app.collection.note(id)?;
    let mut editable = Vec::with_capacity(note.fields.len());
    for (i, field) in note.fields.iter().enumerate() {
        match decode(field) {
            Ok(text) => editable.push(text),
            Err(err) => return Ok(EditReport::failed(format!("field {}: {err}", i + 1))),
        }
    }

    let mut file = tempfile::Builder::new()
        .prefix("flashtui-note-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(join_fields(&editable).as_bytes())?;
    file.flush()?;

    let (updated, report) = loop {
        if let Some(problem) = run_editor(app, file.path())? {
            return Ok(EditReport::failed(problem));
        }
        let text = match fs::read_to_string(file.path()) {
            Ok(text) => text,
            Err(err) => return Ok(EditReport::failed(format!("cannot read edited file: {err}"))),
        };
        let (updated, report) = apply_edit(&note, &editable, &text);
        if report.problems.is_empty() {
            break (updated, report);
        }
        let question = format!("{}. Edit again?", report.problems.join("; "));
        if !ask_yn(app.surface.as_mut(), &question)? {
            break (updated, report);
        }
    };

    if report.changed > 0 {
        app.collection.update_note(&updated)?;
    }
    tracing::info!(note = id, changed = report.changed, problems = report.problems.len(), "note edited");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestApp;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn split_inverts_join() {
        for fields in [
            strings(&["front", "back"]),
            strings(&["a\nb", ""]),
            strings(&["", "x"]),
            strings(&[""]),
            strings(&["one", "two\n", "three"]),
        ] {
            assert_eq!(split_fields(&join_fields(&fields)), fields);
        }
    }

    #[test]
    fn split_tolerates_crlf_and_missing_newline() {
        let text = format!("a\r\n{FIELD_SEPARATOR}\r\nb");
        assert_eq!(split_fields(&text), strings(&["a\r", "b"]));
    }

    #[test]
    fn configured_editor_wins_and_splits_arguments() {
        let config = Config {
            editor: Some("code --wait".into()),
            ..Config::default()
        };
        assert_eq!(editor_command(&config), strings(&["code", "--wait"]));
    }

    #[test]
    fn status_lines() {
        assert_eq!(EditReport::default().status(), "Note unchanged");
        let updated = EditReport {
            changed: 2,
            problems: Vec::new(),
        };
        assert_eq!(updated.status(), "Note updated");
        let partial = EditReport {
            changed: 1,
            problems: strings(&["field 2: bad <escape>"]),
        };
        assert_eq!(
            partial.status(),
            "Note partly updated: field 2: bad &lt;escape&gt;"
        );
    }

    fn with_editor(editor: &str, script: &str) -> TestApp {
        let config = Config {
            editor: Some(editor.into()),
            ..Config::default()
        };
        TestApp::with_config(script, config)
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn untouched_file_changes_nothing() {
        let mut t = with_editor("true", "");
        let report = edit_note(&mut t.app, 11).unwrap();
        assert_eq!(report, EditReport::default());
        assert_eq!(t.suspend_count(), 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn edited_field_is_encoded_and_stored() {
        let mut t = with_editor("sed -i s/Mona/Monna/", "");
        let report = edit_note(&mut t.app, 11).unwrap();
        assert_eq!(report.changed, 1);
        let note = t.app.collection.note(11).unwrap();
        assert_eq!(note.fields, strings(&["Monna Lisa", "da <b>Vinci</b>"]));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn bad_escape_keeps_stored_value() {
        let mut t = with_editor(r"sed -i s/Lisa/\\q/", "n\n");
        let report = edit_note(&mut t.app, 11).unwrap();
        assert_eq!(report.changed, 0);
        assert_eq!(report.problems.len(), 1);
        assert!(report.problems[0].starts_with("field 1"));
        assert_eq!(t.app.collection.note(11).unwrap().fields[0], "Mona Lisa");
        assert_eq!(t.pending_keys(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn removed_separator_rejects_the_edit() {
        let mut t = with_editor("sed -i /%%%%/d", "n\n");
        let report = edit_note(&mut t.app, 12).unwrap();
        assert_eq!(report.changed, 0);
        assert_eq!(report.problems, strings(&["expected 2 fields, found 1"]));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn retry_starts_from_the_edited_text() {
        // the first pass breaks field 1, the second repairs it
        let mut t = with_editor(r"sed -i -e s/\\q/Gioconda/ -e s/Mona/\\q/", "y\n");
        let report = edit_note(&mut t.app, 11).unwrap();
        assert_eq!(t.suspend_count(), 2);
        assert_eq!(report.changed, 1);
        assert_eq!(t.app.collection.note(11).unwrap().fields[0], "Gioconda Lisa");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn unreadable_edit_is_reported_and_note_kept() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("binary.txt");
        fs::write(&binary, b"Mona \xff Lisa\n").unwrap();
        let mut t = with_editor(&format!("cp {}", binary.display()), "");
        let report = edit_note(&mut t.app, 11).unwrap();
        assert_eq!(report.changed, 0);
        assert_eq!(report.problems.len(), 1);
        assert!(report.problems[0].starts_with("cannot read edited file"));
        assert_eq!(
            t.app.collection.note(11).unwrap().fields,
            strings(&["Mona Lisa", "da <b>Vinci</b>"])
        );
    }

    #[test]
    fn missing_editor_is_reported() {
        let mut t = with_editor("flashtui-test-no-such-editor", "");
        let report = edit_note(&mut t.app, 12).unwrap();
        assert!(report.problems[0].starts_with("cannot run editor"));
        assert_eq!(t.suspend_count(), 1);
    }

    #[test]
    fn unknown_note_is_an_error() {
        let mut t = with_editor("true", "");
        assert!(edit_note(&mut t.app, 999).is_err());
    }
}
