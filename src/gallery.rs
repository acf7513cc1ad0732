//! Persisted gallery of saved entries for one category
//!
//! The gallery is read from storage once, when opened, and written back in
//! full after every append or delete. The in-memory list and the stored
//! list never disagree: a failed write rolls the change back.
//!
//! Galleries written by older versions are accepted:
//! - `{"name", "color"}`: a color entry holding an `rgb(...)` string
//! - `{"name", "animalData": {"type", "animals", "imageUrl", ...}}`: a mixed entry
//! - `{"name", "animalData": {"type": "single", "emoji", "animal"}}`: a single pick
//!
//! Any element with a readable `name` is kept. Fields that cannot be read
//! fall back to their defaults, and an unreadable artifact leaves the entry
//! with a placeholder.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::color::parse_color;
use crate::models::{Artifact, EntryId, SavedEntry};
use crate::storage::{Storage, StorageError};

pub struct GalleryStore {
    key: String,
    storage: Arc<dyn Storage>,
    entries: Vec<SavedEntry>,
    next_id: u64,
}

impl std::fmt::Debug for GalleryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryStore")
            .field("key", &self.key)
            .field("entries", &self.entries)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl GalleryStore {
    /// Load the gallery stored under `key`.
    ///
    /// A missing key or a value that is not a JSON array yields an empty
    /// gallery. Array elements without a string `name` are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the backend itself fails.
    pub fn open(storage: Arc<dyn Storage>, key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        let entries = match storage.load(&key)? {
            Some(raw) => parse_entries(&key, &raw),
            None => Vec::new(),
        };

        let mut gallery = Self { key, storage, entries, next_id: 1 };
        gallery.assign_ids();
        debug!(key = %gallery.key, entries = gallery.entries.len(), "gallery opened");
        Ok(gallery)
    }

    /// Give every entry a unique non-zero id, keeping existing ones where
    /// possible.
    ///
    /// Stored ids too close to `u64::MAX` to leave room for the entries that
    /// need fresh ids cause the whole gallery to be renumbered from 1.
    fn assign_ids(&mut self) {
        let mut seen = HashSet::new();
        let fresh = self.entries.iter().filter(|e| e.id.0 == 0 || !seen.insert(e.id)).count() as u64;
        let max = self.entries.iter().map(|e| e.id.0).max().unwrap_or(0);
        if max.checked_add(fresh).map_or(true, |last| last >= u64::MAX - 1) {
            warn!(key = %self.key, max, "stored ids exhausted, renumbering gallery");
            self.renumber();
            return;
        }

        seen.clear();
        self.next_id = max + 1;
        for entry in &mut self.entries {
            if entry.id.0 == 0 || !seen.insert(entry.id) {
                entry.id = EntryId(self.next_id);
                seen.insert(entry.id);
                self.next_id += 1;
            }
        }
    }

    fn renumber(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.id = EntryId(index as u64 + 1);
        }
        self.next_id = self.entries.len() as u64 + 1;
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Entries in save order.
    pub fn list(&self) -> &[SavedEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&SavedEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, assigning it a fresh id. Returns that id.
    pub fn append(&mut self, mut entry: SavedEntry) -> Result<EntryId, StorageError> {
        if self.next_id == u64::MAX {
            self.renumber();
        }
        let id = EntryId(self.next_id);
        entry.id = id;
        self.entries.push(entry);

        if let Err(e) = self.persist() {
            self.entries.pop();
            return Err(e);
        }

        self.next_id += 1;
        debug!(key = %self.key, %id, "entry appended");
        Ok(id)
    }

    /// Delete by stable id. Unknown ids are a no-op returning `Ok(None)`.
    pub fn delete(&mut self, id: EntryId) -> Result<Option<SavedEntry>, StorageError> {
        match self.position(id) {
            Some(index) => self.delete_at(index),
            None => Ok(None),
        }
    }

    /// Delete by position. Out-of-range indices are a no-op returning `Ok(None)`.
    pub fn delete_at(&mut self, index: usize) -> Result<Option<SavedEntry>, StorageError> {
        if index >= self.entries.len() {
            return Ok(None);
        }

        let removed = self.entries.remove(index);
        if let Err(e) = self.persist() {
            self.entries.insert(index, removed);
            return Err(e);
        }

        debug!(key = %self.key, id = %removed.id, "entry deleted");
        Ok(Some(removed))
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.entries)
            .map_err(|source| StorageError::Serialize { key: self.key.clone(), source })?;
        self.storage.store(&self.key, &json)
    }
}

fn parse_entries(key: &str, raw: &str) -> Vec<SavedEntry> {
    let values = match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(key, error = %e, "gallery is not a JSON array, starting empty");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let entry = parse_entry(key, index, value);
            if entry.is_none() {
                warn!(key, index, "skipping gallery entry without a name");
            }
            entry
        })
        .collect()
}

fn parse_entry(key: &str, index: usize, value: Value) -> Option<SavedEntry> {
    let object = value.as_object()?;
    let name = object.get("name")?.as_str()?.to_string();
    let id = object.get("id").and_then(Value::as_u64).map(EntryId).unwrap_or_default();

    if !object.contains_key("artifact") {
        if let Some(color) = object.get("color") {
            return Some(SavedEntry {
                id,
                name,
                artifact: color.as_str().and_then(|c| parse_color(c).ok()).map(Artifact::color),
                source_ids: Vec::new(),
            });
        }
        if let Some(data) = object.get("animalData") {
            let (artifact, source_ids) = parse_legacy_mix(data);
            return Some(SavedEntry { id, name, artifact, source_ids });
        }
    }

    let artifact = object.get("artifact").and_then(|raw| {
        let artifact = serde_json::from_value::<Artifact>(raw.clone()).ok();
        if artifact.is_none() {
            warn!(key, index, "unreadable artifact, showing a placeholder");
        }
        artifact
    });

    Some(SavedEntry {
        id,
        name,
        artifact,
        source_ids: object.get("source_ids").map(string_list).unwrap_or_default(),
    })
}

/// Read an `animalData` payload into an artifact and its source ids.
///
/// Mixed entries carry `animals` and `imageUrl`; single picks carry
/// `animal` and the `emoji` they were shown with.
fn parse_legacy_mix(data: &Value) -> (Option<Artifact>, Vec<String>) {
    let text = |field: &str| {
        data.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut source_ids = data.get("animals").map(string_list).unwrap_or_default();
    if source_ids.is_empty() {
        source_ids.extend(text("animal"));
    }

    let artifact = match (text("imageUrl"), text("emoji")) {
        (Some(url), _) => Some(Artifact::image(url)),
        (None, Some(glyph)) => Some(Artifact::emoji(glyph)),
        (None, None) => None,
    };
    (artifact, source_ids)
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}
