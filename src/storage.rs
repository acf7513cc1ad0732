//! Durable key/value storage for galleries
//!
//! One key per category; the value is the whole serialized gallery. Keys
//! are read once when a gallery opens and rewritten wholesale on every
//! change, so a backend only needs `load` and `store`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

/// Error type for storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// File I/O error
    #[error("storage I/O error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    /// Key contains characters that cannot be used as a file name
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
    /// Value could not be serialized
    #[error("cannot serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// Backend lock poisoned by a panicking writer
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A process-wide durable string store.
pub trait Storage: Send + Sync {
    /// `Ok(None)` when the key has never been written.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous gallery intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let io_err = |source: io::Error| StorageError::Io { key: key.to_string(), source };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;

        debug!(path = %path.display(), bytes = value.len(), "stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.load("k").unwrap().is_none());
        storage.store("k", "[1]").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_round_trip_and_overwrite() {
        let temp = TempDir::new().expect("should create temp dir");
        let storage = FileStorage::new(temp.path().join("data"));

        assert!(storage.load("savedColors").unwrap().is_none());
        storage.store("savedColors", "[]").unwrap();
        storage.store("savedColors", "[{\"name\":\"x\"}]").unwrap();

        assert_eq!(storage.load("savedColors").unwrap().as_deref(), Some("[{\"name\":\"x\"}]"));
        assert!(temp.path().join("data/savedColors.json").exists());
        assert!(!temp.path().join("data/savedColors.json.tmp").exists());
    }

    #[test]
    fn test_file_rejects_path_like_keys() {
        let temp = TempDir::new().expect("should create temp dir");
        let storage = FileStorage::new(temp.path());
        assert!(matches!(storage.store("../escape", "x"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(storage.load(""), Err(StorageError::InvalidKey(_))));
    }
}
