//! Persisted view-state stores
//!
//! Visibility, stack order, and the orientation booleans survive across
//! sessions. They round-trip through a generic key-value collaborator
//! ([`KeyValueStore`]): a flat JSON-serializable object keyed by string,
//! with unknown or missing keys defaulting gracefully.
//!
//! # Components
//!
//! - [`KeyValueStore`] - get/set JSON values by string key
//! - [`JsonFileStore`] - file-backed implementation (one flat JSON object)
//! - [`MemoryStore`] - in-memory implementation for tests and ephemeral hosts
//! - [`VisibilityStore`] / [`ViewFlags`] - per-series shown/hidden map and
//!   the independent scalar booleans
//! - [`StackOrderStore`] - persisted draw-order permutation of clients
//!
//! Persistence failures here are never fatal: these are cosmetic
//! preferences, so a failed write is logged and the in-memory value stays
//! authoritative for the session.

pub mod stack_order;
pub mod visibility;

pub use stack_order::{move_to_front, reconcile, StackOrderStore};
pub use visibility::{ViewFlags, VisibilityStore};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{BandVisError, Result};

/// Generic persistence collaborator: get/set JSON values by string key
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// Read and deserialize a typed value, `None` on absence or shape mismatch
///
/// A persisted value that no longer parses is treated the same as a missing
/// one: the caller falls back to its default.
pub fn get_typed<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Discarding malformed persisted value '{}': {}", key, e);
            None
        }
    }
}

/// Serialize and store a typed value
pub fn set_typed<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_value(value)
        .map_err(|e| BandVisError::Serialization(format!("Failed to serialize '{}': {}", key, e)))?;
    store.set(key, json)
}

/// File-backed store: one flat JSON object, rewritten on every set
///
/// The file is read once at open; a missing or unparsable file yields an
/// empty store (logged, not surfaced; see module docs).
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading existing entries if present
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
                Ok(entries) => {
                    tracing::debug!("Loaded {} view-state entries from {:?}", entries.len(), path);
                    entries
                }
                Err(e) => {
                    tracing::warn!("Failed to parse view state {:?}: {}, starting empty", path, e);
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Self { path, entries }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| BandVisError::Serialization(format!("Failed to serialize view state: {}", e)))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
            .map_err(|e| BandVisError::Store(format!("Failed to write {:?}: {}", self.path, e)))
    }
}

/// In-memory store for tests and hosts without persistence
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
