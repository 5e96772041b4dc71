#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/*
Note Registry
=============

The registry is the whole of the piano's configured state: an ordered list
of notes plus a lookup from trigger key to note.

  index   Display order of a note. Fixed when the registry is built and never
          changed by rebinding, so the UI can use it as the key's handle.

  key     The single uppercase letter that plays the note. Keys are unique
          across the registry at all times.

The lookup is derived from the list. Rebinding validates everything first
and only then touches the map and the note, so a rejected rebind leaves both
exactly as they were.

Default layout (home row, C major from middle C):

    A   S   D   F   G   H   J   K
    C4  D4  E4  F4  G4  A4  B4  C5
*/

/// Default home-row layout: (trigger key, tone label, frequency in Hz)
pub const DEFAULT_NOTES: [(char, &str, f32); 8] = [
    ('A', "C4", 261.63),
    ('S', "D4", 293.66),
    ('D', "E4", 329.63),
    ('F', "F4", 349.23),
    ('G', "G4", 392.0),
    ('H', "A4", 440.0),
    ('J', "B4", 493.88),
    ('K', "C5", 523.25),
];

/// A single playable note.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Trigger key (always an uppercase ASCII letter)
    pub key: char,
    /// Human readable name, e.g. "C4"
    pub label: String,
    /// Pitch in Hz
    pub frequency: f32,
}

impl Note {
    pub fn new(key: char, label: impl Into<String>, frequency: f32) -> Self {
        Self {
            key: key.to_ascii_uppercase(),
            label: label.into(),
            frequency,
        }
    }
}

/// Why a rebind was refused. The registry is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RebindError {
    /// Input was not exactly one letter A-Z
    #[error("`{0}` is not a single letter A-Z")]
    InvalidKey(String),
    /// The letter already triggers a different note
    #[error("This key is already assigned to another sound!")]
    KeyInUse { key: char, owner: usize },
    /// No note at this index
    #[error("no note at index {0}")]
    NoSuchNote(usize),
    /// Rebinding is suspended while a sequence is playing
    #[error("cannot rebind while a sequence is playing")]
    Busy,
}

impl RebindError {
    /// Rejections the user should be told about. Malformed input is dropped
    /// without a notice.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, RebindError::KeyInUse { .. })
    }
}

/// Ordered notes plus the trigger key lookup.
#[derive(Debug, Clone)]
pub struct KeyMap {
    notes: Vec<Note>,
    by_key: HashMap<char, usize>,
}

impl KeyMap {
    /// Build a registry from notes in display order.
    ///
    /// Returns `None` if a trigger key is not a letter or appears twice.
    pub fn new(notes: Vec<Note>) -> Option<Self> {
        let mut by_key = HashMap::with_capacity(notes.len());
        for (index, note) in notes.iter().enumerate() {
            if !note.key.is_ascii_uppercase() || by_key.insert(note.key, index).is_some() {
                return None;
            }
        }
        Some(Self { notes, by_key })
    }

    /// Resolve a key to its note. Case-insensitive.
    pub fn lookup(&self, key: char) -> Option<&Note> {
        self.index_of(key).map(|index| &self.notes[index])
    }

    /// Resolve a key to the index of its note. Case-insensitive.
    pub fn index_of(&self, key: char) -> Option<usize> {
        self.by_key.get(&key.to_ascii_uppercase()).copied()
    }

    /// Rebind the note at `index` to the letter in `input`.
    ///
    /// Rebinding a note to the key it already has succeeds and changes
    /// nothing.
    pub fn rebind(&mut self, index: usize, input: &str) -> Result<(), RebindError> {
        let new_key = parse_key(input)?;
        let old_key = self
            .notes
            .get(index)
            .map(|note| note.key)
            .ok_or(RebindError::NoSuchNote(index))?;

        match self.by_key.get(&new_key) {
            Some(&owner) if owner == index => return Ok(()),
            Some(&owner) => {
                return Err(RebindError::KeyInUse {
                    key: new_key,
                    owner,
                })
            }
            None => {}
        }

        self.by_key.remove(&old_key);
        self.notes[index].key = new_key;
        self.by_key.insert(new_key, index);

        log::info!(
            "rebound {} from {} to {}",
            self.notes[index].label,
            old_key,
            new_key
        );
        Ok(())
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Whether `key` currently plays something. Case-insensitive.
    pub fn is_mapped(&self, key: char) -> bool {
        self.index_of(key).is_some()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let notes: Vec<Note> = DEFAULT_NOTES
            .iter()
            .map(|&(key, label, frequency)| Note::new(key, label, frequency))
            .collect();
        let by_key = notes
            .iter()
            .enumerate()
            .map(|(index, note)| (note.key, index))
            .collect();
        Self { notes, by_key }
    }
}

/// Accept exactly one ASCII letter, returned uppercase.
fn parse_key(input: &str) -> Result<char, RebindError> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_uppercase()),
        _ => Err(RebindError::InvalidKey(input.to_string())),
    }
}
