#![forbid(unsafe_code)]

//! A collection stored as one JSON file.
//!
//! ```json
//! {
//!   "decks": [{ "id": 1, "name": "Geography" }],
//!   "notes": [{ "id": 10, "kind": "cloze", "fields": ["{{c1::Paris}} is in France", ""] }],
//!   "cards": [{ "id": 100, "note": 10, "deck": 1, "ord": 1, "queue": "new", "due": 0 }]
//! }
//! ```
//!
//! # Scheduling
//!
//! A plain queue, not spaced repetition. New and learning cards are always
//! due; review cards are due once their `due` day (days since the Unix
//! epoch) has come. Cards are shown new first, then learning, then review.
//! `Again` puts a card back into learning; any other answer moves it to
//! review, due again after 1 (hard), 3 (good) or 7 (easy) days.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::template::{self, NoteKind};
use super::{
    Card, CardId, Collection, CollectionError, Counts, DeckId, DeckInfo, Ease, Note, NoteId,
    Queue, Result,
};

const DEFAULT_DECK: &str = "Default";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Store {
    #[serde(default)]
    decks: Vec<DeckRecord>,
    #[serde(default)]
    notes: Vec<NoteRecord>,
    #[serde(default)]
    cards: Vec<CardRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeckRecord {
    id: DeckId,
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoteRecord {
    id: NoteId,
    #[serde(default)]
    kind: NoteKind,
    fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CardRecord {
    id: CardId,
    note: NoteId,
    deck: DeckId,
    #[serde(default)]
    ord: u32,
    #[serde(default)]
    queue: Queue,
    #[serde(default)]
    due: u64,
}

/// File-backed [`Collection`].
#[derive(Debug, Clone)]
pub struct JsonCollection {
    path: PathBuf,
    store: Store,
    current: Option<DeckId>,
    today: u64,
    dirty: bool,
}

fn days_since_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() / 86_400)
        .unwrap_or(0)
}

impl JsonCollection {
    /// Load the collection at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|source| CollectionError::Read {
            path: path.clone(),
            source,
        })?;
        let collection = Self::from_json(path, &text)?;
        tracing::info!(
            path = %collection.path.display(),
            decks = collection.store.decks.len(),
            notes = collection.store.notes.len(),
            cards = collection.store.cards.len(),
            "collection opened"
        );
        Ok(collection)
    }

    /// Parse a collection that will be saved to `path`.
    pub fn from_json(path: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let path = path.into();
        let store = serde_json::from_str(text).map_err(|source| CollectionError::Format {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            store,
            current: None,
            today: days_since_epoch(),
            dirty: false,
        })
    }

    /// Pretend today is day `today` (days since the Unix epoch).
    #[must_use]
    pub fn with_today(mut self, today: u64) -> Self {
        self.today = today;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are changes not yet saved.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn is_due(&self, card: &CardRecord) -> bool {
        match card.queue {
            Queue::New | Queue::Learning => true,
            Queue::Review => card.due <= self.today,
        }
    }

    fn deck_counts(&self, deck: DeckId) -> Counts {
        let mut counts = Counts::default();
        for card in self
            .store
            .cards
            .iter()
            .filter(|c| c.deck == deck && self.is_due(c))
        {
            counts.add(card.queue);
        }
        counts
    }

    fn note_record(&self, id: NoteId) -> Result<&NoteRecord> {
        self.store
            .notes
            .iter()
            .find(|n| n.id == id)
            .ok_or(CollectionError::UnknownNote(id))
    }

    fn deck_name(&self, id: DeckId) -> Option<&str> {
        self.store
            .decks
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.as_str())
    }
}

impl Collection for JsonCollection {
    fn decks(&self) -> Result<Vec<DeckInfo>> {
        let mut decks: Vec<DeckInfo> = self
            .store
            .decks
            .iter()
            .filter(|d| d.name != DEFAULT_DECK || self.store.cards.iter().any(|c| c.deck == d.id))
            .map(|d| DeckInfo {
                id: d.id,
                name: d.name.clone(),
                counts: self.deck_counts(d.id),
            })
            .collect();
        decks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(decks)
    }

    fn set_current_deck(&mut self, deck: DeckId) -> Result<()> {
        if self.deck_name(deck).is_none() {
            return Err(CollectionError::UnknownDeck(deck));
        }
        self.current = Some(deck);
        Ok(())
    }

    fn counts(&self) -> Counts {
        self.current
            .map(|deck| self.deck_counts(deck))
            .unwrap_or_default()
    }

    fn next_card(&mut self) -> Result<Option<Card>> {
        let Some(deck) = self.current else {
            return Ok(None);
        };
        let Some(record) = self
            .store
            .cards
            .iter()
            .filter(|c| c.deck == deck && self.is_due(c))
            .min_by_key(|c| (c.queue, c.due, c.id))
        else {
            return Ok(None);
        };
        let note = self.note_record(record.note)?;
        Ok(Some(Card {
            id: record.id,
            note: record.note,
            deck: record.deck,
            queue: record.queue,
            question: template::question(note.kind, &note.fields, record.ord),
            answer: template::answer(note.kind, &note.fields, record.ord),
        }))
    }

    fn answer_card(&mut self, card: CardId, ease: Ease) -> Result<()> {
        let today = self.today;
        let record = self
            .store
            .cards
            .iter_mut()
            .find(|c| c.id == card)
            .ok_or(CollectionError::UnknownCard(card))?;
        let (queue, due) = match ease {
            Ease::Again => (Queue::Learning, today),
            Ease::Hard => (Queue::Review, today + 1),
            Ease::Good => (Queue::Review, today + 3),
            Ease::Easy => (Queue::Review, today + 7),
        };
        record.queue = queue;
        record.due = due;
        self.dirty = true;
        tracing::debug!(card, ?ease, ?queue, due, "card answered");
        Ok(())
    }

    fn find_notes(&self, query: &str) -> Result<Vec<NoteId>> {
        let query = query.to_lowercase();
        Ok(self
            .store
            .notes
            .iter()
            .filter(|n| {
                query.is_empty() || n.fields.iter().any(|f| f.to_lowercase().contains(&query))
            })
            .map(|n| n.id)
            .collect())
    }

    fn note(&self, id: NoteId) -> Result<Note> {
        let record = self.note_record(id)?;
        Ok(Note {
            id,
            fields: record.fields.clone(),
        })
    }

    fn update_note(&mut self, note: &Note) -> Result<()> {
        let record = self
            .store
            .notes
            .iter_mut()
            .find(|n| n.id == note.id)
            .ok_or(CollectionError::UnknownNote(note.id))?;
        if record.fields.len() != note.fields.len() {
            return Err(CollectionError::FieldCount {
                note: note.id,
                expected: record.fields.len(),
                found: note.fields.len(),
            });
        }
        record.fields.clone_from(&note.fields);
        self.dirty = true;
        Ok(())
    }

    fn note_decks(&self, id: NoteId) -> Result<Vec<String>> {
        self.note_record(id)?;
        let mut names: Vec<String> = self
            .store
            .cards
            .iter()
            .filter(|c| c.note == id)
            .filter_map(|c| self.deck_name(c.deck))
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Write through a temporary file next to the collection, then rename it
    /// over the original.
    fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let write_err = |source| CollectionError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let text = serde_json::to_string_pretty(&self.store).map_err(|source| {
            CollectionError::Format {
                path: self.path.clone(),
                source,
            }
        })?;
        let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        file.write_all(text.as_bytes()).map_err(write_err)?;
        file.persist(&self.path)
            .map_err(|err| write_err(err.error))?;
        self.dirty = false;
        tracing::info!(path = %self.path.display(), "collection saved");
        Ok(())
    }
}
