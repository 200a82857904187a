//! Key-value persistence providers
//!
//! The store keeps its whole collection in one named slot. Providers only
//! move strings in and out of that slot.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PersistenceError;

/// A string key-value store
pub trait Persistence {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace the value stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Keep a copy of `value` next to the `key` slot before it is replaced
    fn backup(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.set(&format!("{}.bak", key), value)
    }
}

/// Provider backed by a directory with one `<key>.json` file per slot
#[derive(Debug, Clone)]
pub struct FileProvider {
    base_path: PathBuf,
}

impl FileProvider {
    /// Use `path` as the storage directory; created on first write
    pub fn new(path: impl AsRef<Path>) -> Self {
        let base_path = path.as_ref().to_path_buf();
        debug!(?base_path, "FileProvider::new");
        Self { base_path }
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    /// Path of the backup file for `key`
    pub fn backup_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json.bak", key))
    }
}

impl Persistence for FileProvider {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "Slot file absent");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.base_path)?;

        // temp + rename so readers never see a half-written slot
        let path = self.slot_path(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;

        debug!(?path, bytes = value.len(), "Slot written");
        Ok(())
    }

    fn backup(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.base_path)?;
        let path = self.backup_path(key);
        fs::write(&path, value)?;

        debug!(?path, bytes = value.len(), "Slot backed up");
        Ok(())
    }
}

/// Provider that keeps slots in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    slots: HashMap<String, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot with raw content
    pub fn with_slot(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(key.into(), value.into());
        self
    }
}

impl Persistence for MemoryProvider {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
