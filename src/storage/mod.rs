//! Local Key-Value Store
//!
//! A small string-to-string store persisted as one JSON object, the
//! terminal counterpart of browser local storage. A write re-reads the
//! file, changes only its own key and replaces the file through a
//! temporary file and an atomic rename, so keys written by another
//! process in the meantime survive.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::errors::StorageError;

const STORE_FILE: &str = "local_storage.json";

/// Persistent key-value store backed by a single JSON file
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStore {
    /// Open the store inside `data_dir`, creating the directory if needed.
    ///
    /// A missing file is an empty store. A corrupt one is logged and treated
    /// as empty; it is replaced on the next write.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir).map_err(|e| StorageError::Io {
            path: data_dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let path = data_dir.join(STORE_FILE);
        let entries = read_entries(&path);
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Write one key. The in-memory view changes only once the file has.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let mut entries = read_entries(&self.path);
        entries.insert(key.to_string(), value.into());
        self.write(&entries)?;
        self.entries = entries;
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = read_entries(&self.path);
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        self.entries = entries;
        Ok(())
    }

    /// Decode a JSON-encoded value. Absent keys are `Ok(None)`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        self.get(key)
            .map(|raw| serde_json::from_str::<T>(raw))
            .transpose()
    }

    /// Store `value` JSON-encoded under `key`.
    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|e| StorageError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set(key, encoded)
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |e: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        };
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let json = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Encode {
            key: STORE_FILE.to_string(),
            message: e.to_string(),
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

/// Current file contents. Missing or unreadable files read as empty.
fn read_entries(path: &Path) -> BTreeMap<String, String> {
    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable store {}: {}", path.display(), e);
                BTreeMap::new()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(e) => {
            warn!("Failed to read store {}: {}", path.display(), e);
            BTreeMap::new()
        }
    }
}
