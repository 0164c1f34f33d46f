#![forbid(unsafe_code)]

//! The flashcard collection seen by the views.
//!
//! Views only talk to [`Collection`]; [`json::JsonCollection`] is the
//! file-backed implementation used by the binary and the tests.

pub mod json;
pub mod template;

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json::JsonCollection;

pub type DeckId = u64;
pub type NoteId = u64;
pub type CardId = u64;

pub type Result<T> = std::result::Result<T, CollectionError>;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("cannot read collection {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write collection {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid collection {path}: {source}")]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no deck with id {0}")]
    UnknownDeck(DeckId),

    #[error("no note with id {0}")]
    UnknownNote(NoteId),

    #[error("no card with id {0}")]
    UnknownCard(CardId),

    #[error("note {note} has {found} fields, expected {expected}")]
    FieldCount {
        note: NoteId,
        expected: usize,
        found: usize,
    },
}

/// Scheduling queue of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Queue {
    #[default]
    New,
    Learning,
    Review,
}

/// Due cards per queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub new: usize,
    pub learning: usize,
    pub review: usize,
}

impl Counts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new == 0 && self.learning == 0 && self.review == 0
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.new + self.learning + self.review
    }

    pub(crate) fn add(&mut self, queue: Queue) {
        match queue {
            Queue::New => self.new += 1,
            Queue::Learning => self.learning += 1,
            Queue::Review => self.review += 1,
        }
    }
}

/// A deck with its due counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckInfo {
    pub id: DeckId,
    pub name: String,
    pub counts: Counts,
}

/// A card ready to be shown: both sides rendered to card HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub note: NoteId,
    pub deck: DeckId,
    pub queue: Queue,
    pub question: String,
    pub answer: String,
}

/// Answer buttons, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ease {
    Again,
    Hard,
    Good,
    Easy,
}

/// A note: stored rich-text fields in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub fields: Vec<String>,
}

/// Decks, a per-deck study queue, and notes.
///
/// The scheduler state is per collection: [`Collection::set_current_deck`]
/// selects the deck that [`Collection::next_card`] and
/// [`Collection::counts`] look at.
pub trait Collection {
    /// Every deck, sorted by name.
    fn decks(&self) -> Result<Vec<DeckInfo>>;

    fn set_current_deck(&mut self, deck: DeckId) -> Result<()>;

    /// Due counts of the current deck.
    fn counts(&self) -> Counts;

    /// The next due card of the current deck.
    fn next_card(&mut self) -> Result<Option<Card>>;

    fn answer_card(&mut self, card: CardId, ease: Ease) -> Result<()>;

    /// Notes with a field containing `query` (case-insensitive); all notes
    /// for an empty query.
    fn find_notes(&self, query: &str) -> Result<Vec<NoteId>>;

    fn note(&self, id: NoteId) -> Result<Note>;

    /// Store new field values. The field count must not change.
    fn update_note(&mut self, note: &Note) -> Result<()>;

    /// Names of the decks holding cards of the note.
    fn note_decks(&self, id: NoteId) -> Result<Vec<String>>;

    /// Persist pending changes.
    fn save(&mut self) -> Result<()>;
}
