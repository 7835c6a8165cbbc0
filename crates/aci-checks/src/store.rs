//! Cross-poll counter state.
//!
//! Rate computation needs the previous sample for every counter it tracks.
//! The store is injected so checks stay deterministic under test: unit
//! tests use [`MemoryValueStore`], the runner persists a JSON file between
//! polls via [`FileValueStore`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The previous observation for one counter key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterState {
    pub timestamp: f64,
    pub value: f64,
}

/// Keyed get/set storage for [`CounterState`] entries.
///
/// Keys are `<namespace>.<entity-id>.<metric>` strings. Entries for
/// entities that vanish from the fabric simply go unread.
pub trait ValueStore {
    fn get(&self, key: &str) -> Option<CounterState>;
    fn set(&mut self, key: &str, state: CounterState);
}

/// Volatile store for tests and one-shot evaluation.
#[derive(Debug, Default)]
pub struct MemoryValueStore {
    entries: HashMap<String, CounterState>,
}

impl MemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ValueStore for MemoryValueStore {
    fn get(&self, key: &str) -> Option<CounterState> {
        self.entries.get(key).copied()
    }

    fn set(&mut self, key: &str, state: CounterState) {
        self.entries.insert(key.to_string(), state);
    }
}

/// Errors from loading or persisting a file-backed store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read value store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write value store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("value store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON-file-backed store, loaded once per poll and saved after checking.
///
/// A missing file is an empty store (first poll); a file that exists but
/// does not parse is a hard error rather than a silent state reset.
#[derive(Debug)]
pub struct FileValueStore {
    path: PathBuf,
    entries: HashMap<String, CounterState>,
}

impl FileValueStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "value store absent, starting empty");
            return Ok(Self {
                path,
                entries: HashMap::new(),
            });
        }

        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let entries: HashMap<String, CounterState> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "value store loaded");
        Ok(Self { path, entries })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        let file = fs::File::create(&self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        serde_json::to_writer_pretty(file, &self.entries).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "value store saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ValueStore for FileValueStore {
    fn get(&self, key: &str) -> Option<CounterState> {
        self.entries.get(key).copied()
    }

    fn set(&mut self, key: &str, state: CounterState) {
        self.entries.insert(key.to_string(), state);
    }
}
