//! Key-value storage port.
//!
//! Values are opaque strings (JSON in practice). Listeners subscribed to a
//! key are called after every successful write to that key.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};

/// Callback invoked with `(key, value)` after a write.
pub type StorageListener = Box<dyn FnMut(&str, &str)>;

/// A string key-value store.
pub trait Storage {
    /// Read a value. `Ok(None)` means the key has never been written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value and notify the key's listeners.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Register a listener for writes to `key`.
    fn subscribe(&mut self, key: &str, listener: StorageListener);
}

#[derive(Default)]
struct Listeners(Vec<(String, StorageListener)>);

impl Listeners {
    fn add(&mut self, key: &str, listener: StorageListener) {
        self.0.push((key.to_string(), listener));
    }

    fn notify(&mut self, key: &str, value: &str) {
        for (watched, listener) in &mut self.0 {
            if watched == key {
                listener(key, value);
            }
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} listener(s)", self.0.len())
    }
}

/// In-process storage, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    listeners: Listeners,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value without notifying listeners.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.listeners.notify(key, value);
        Ok(())
    }

    fn subscribe(&mut self, key: &str, listener: StorageListener) {
        self.listeners.add(key, listener);
    }
}

/// Storage backed by one `<key>.json` file per key inside a directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
    listeners: Listeners,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            listeners: Listeners::default(),
        })
    }

    /// The backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        // Write then rename so a crash never leaves a half-written value.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        self.listeners.notify(key, value);
        Ok(())
    }

    fn subscribe(&mut self, key: &str, listener: StorageListener) {
        self.listeners.add(key, listener);
    }
}
