//! Group progress notes as an append-log keyed by client timestamp.
//!
//! Clients identify a note by the timestamp string they attached when
//! creating it. The log keeps append order in a sequence-keyed map and
//! resolves keys through an index, so update and delete never splice a
//! positional array.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Client-supplied timestamp identifying a note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteKey(String);

impl NoteKey {
    pub fn new(key: impl Into<String>) -> Result<Self, NoteError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(NoteError::EmptyKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A free-text progress note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressNote {
    pub timestamp: NoteKey,
    pub text: String,
}

impl ProgressNote {
    pub fn new(timestamp: NoteKey, text: impl Into<String>) -> Result<Self, NoteError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(NoteError::EmptyText);
        }
        Ok(Self { timestamp, text })
    }
}

/// Note log failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
    #[error("Note timestamp cannot be empty")]
    EmptyKey,
    #[error("Note text cannot be empty")]
    EmptyText,
    #[error("A note with timestamp '{0}' already exists")]
    Duplicate(NoteKey),
    #[error("No note with timestamp '{0}'")]
    NotFound(NoteKey),
}

/// Ordered note log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProgressNote>", into = "Vec<ProgressNote>")]
pub struct NoteLog {
    entries: BTreeMap<u64, ProgressNote>,
    index: HashMap<NoteKey, u64>,
    next_seq: u64,
}

impl NoteLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a note at the end of the log.
    pub fn append(&mut self, note: ProgressNote) -> Result<(), NoteError> {
        if self.index.contains_key(&note.timestamp) {
            return Err(NoteError::Duplicate(note.timestamp));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(note.timestamp.clone(), seq);
        self.entries.insert(seq, note);
        Ok(())
    }

    /// Replaces the text of the note with `key`, keeping its position.
    pub fn replace(&mut self, key: &NoteKey, text: impl Into<String>) -> Result<&ProgressNote, NoteError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(NoteError::EmptyText);
        }
        let seq = *self
            .index
            .get(key)
            .ok_or_else(|| NoteError::NotFound(key.clone()))?;
        let entry = self
            .entries
            .get_mut(&seq)
            .ok_or_else(|| NoteError::NotFound(key.clone()))?;
        entry.text = text;
        Ok(entry)
    }

    /// Removes and returns the note with `key`.
    pub fn remove(&mut self, key: &NoteKey) -> Result<ProgressNote, NoteError> {
        let seq = self
            .index
            .remove(key)
            .ok_or_else(|| NoteError::NotFound(key.clone()))?;
        self.entries
            .remove(&seq)
            .ok_or_else(|| NoteError::NotFound(key.clone()))
    }

    pub fn get(&self, key: &NoteKey) -> Option<&ProgressNote> {
        self.index.get(key).and_then(|seq| self.entries.get(seq))
    }

    /// Notes in append order.
    pub fn iter(&self) -> impl Iterator<Item = &ProgressNote> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<ProgressNote>> for NoteLog {
    type Error = NoteError;

    fn try_from(notes: Vec<ProgressNote>) -> Result<Self, Self::Error> {
        let mut log = NoteLog::new();
        for note in notes {
            log.append(note)?;
        }
        Ok(log)
    }
}

impl From<NoteLog> for Vec<ProgressNote> {
    fn from(log: NoteLog) -> Self {
        log.entries.into_values().collect()
    }
}
