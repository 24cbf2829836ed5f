//! Note records and the notebook that stores them.
//!
//! A note's title is derived from its text: the first line of the trimmed
//! text, cut to a maximum number of characters. Notes are kept newest
//! first; a note that is saved for the first time goes to the front.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::storage::{Storage, StorageError};

/// Storage key for the [`Notebook`].
pub const NOTES_KEY: &str = "notes";

const ID_LEN: usize = 16;

/// One note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created: u64,
    /// Last modification time, milliseconds since the Unix epoch.
    pub modified: u64,
    pub text: String,
    /// Caret offset in characters.
    pub caret: usize,
}

impl Note {
    /// A new note holding `text`, with the caret at its end.
    pub fn new(id: impl Into<String>, text: &str, max_title_chars: usize, now: u64) -> Self {
        Self {
            id: id.into(),
            title: derive_title(text, max_title_chars),
            created: now,
            modified: now,
            text: text.to_string(),
            caret: text.chars().count(),
        }
    }

    /// A note made from text selected on a page, citing the page address.
    pub fn from_selection(
        selection: &str,
        page_url: Option<&str>,
        max_title_chars: usize,
        now: u64,
    ) -> Self {
        let text = match page_url {
            Some(url) if !url.is_empty() => format!("{selection}\n\n\u{2014} {url}"),
            _ => selection.to_string(),
        };
        Self::new(new_id(), &text, max_title_chars, now)
    }
}

/// First line of the trimmed text, at most `max_chars` characters, with
/// trailing whitespace removed.
pub fn derive_title(text: &str, max_chars: usize) -> String {
    let first_line = text.trim().lines().next().unwrap_or_default();
    let cut: String = first_line.chars().take(max_chars).collect();
    cut.trim_end().to_string()
}

/// A fresh random note id.
pub fn new_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// How the note list is ordered for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Alphabetical by title, ignoring case.
    Title,
    /// Most recently modified first.
    #[default]
    Modified,
    /// Most recently created first.
    Created,
}

/// All notes, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Notebook {
    pub fn load<S: Storage>(storage: &S) -> Result<Self, StorageError> {
        storage.load(NOTES_KEY, Self::default())
    }

    pub fn save<S: Storage>(&self, storage: &S) -> Result<(), StorageError> {
        storage.save(NOTES_KEY, self)
    }

    pub fn find(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Notes whose text contains `query`, ignoring case, in stored order.
    ///
    /// An empty query matches every note.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        let query = query.to_lowercase();
        self.notes
            .iter()
            .filter(|note| note.text.to_lowercase().contains(&query))
            .collect()
    }

    /// All notes in display order. Ties keep their stored order.
    pub fn sorted(&self, order: SortOrder) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self.notes.iter().collect();
        sort_notes(&mut notes, order);
        notes
    }

    /// Delete the note `id`, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<Note> {
        let index = self.notes.iter().position(|note| note.id == id)?;
        Some(self.notes.remove(index))
    }

    /// Drop notes with only whitespace in them. Returns how many went.
    pub fn prune_empty(&mut self) -> usize {
        let before = self.notes.len();
        self.notes.retain(|note| !note.text.trim().is_empty());
        before - self.notes.len()
    }

    /// Put `note` at the front.
    pub fn prepend(&mut self, note: Note) {
        self.notes.insert(0, note);
    }

    /// Record new text and caret for the note `id`, creating it if needed.
    ///
    /// Returns the stored note.
    pub fn upsert(
        &mut self,
        id: &str,
        text: &str,
        caret: usize,
        max_title_chars: usize,
        now: u64,
    ) -> &Note {
        let title = derive_title(text, max_title_chars);

        match self.notes.iter().position(|note| note.id == id) {
            Some(index) => {
                let note = &mut self.notes[index];
                note.modified = now;
                note.text = text.to_string();
                note.caret = caret;
                note.title = title;
                &self.notes[index]
            }
            None => {
                let mut note = Note::new(id, text, max_title_chars, now);
                note.caret = caret;
                self.prepend(note);
                &self.notes[0]
            }
        }
    }
}

/// Order `notes` for display.
pub fn sort_notes(notes: &mut [&Note], order: SortOrder) {
    match order {
        SortOrder::Title => notes.sort_by_cached_key(|note| note.title.to_uppercase()),
        SortOrder::Modified => notes.sort_by(|a, b| b.modified.cmp(&a.modified)),
        SortOrder::Created => notes.sort_by(|a, b| b.created.cmp(&a.created)),
    }
}
