//! Durable key-value storage.
//!
//! Spyglass persists its fault-injection configuration across process
//! restarts through the [`KeyValueStorage`] trait: a synchronous
//! get/set-by-string-key interface. Two implementations are provided:
//! [`MemoryStorage`] for tests and ephemeral sessions, and [`FileStorage`]
//! backed by a flat JSON object file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::error::StorageResult;

/// Synchronous durable key-value storage.
///
/// Implementations must tolerate corrupt or missing data: `get` returns
/// `None` rather than raising when the backing store is unreadable.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove the value stored under `key`.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-memory storage. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// File-backed storage holding a single flat JSON object.
///
/// Every `set` rewrites the whole file. A missing or corrupt file reads as
/// empty; writes recreate it.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles against the backing file.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Create storage backed by the given file path.
    ///
    /// The file is not created until the first `set`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> HashMap<String, String> {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "Corrupt storage file, starting empty"
                );
                HashMap::new()
            }
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.write_lock.lock();
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load();
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
