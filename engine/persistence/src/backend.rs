//! Persistence backend trait and implementations

use crate::config::PersistenceConfig;
use crate::error::{PersistenceError, Result};
use crate::keys::validate_key;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Abstract trait for key/value persistence backends
///
/// Implementations must be last-write-wins: a `read_value` after `write_value` returns
/// the most recently written document for that key.
pub trait PersistedStore: Send + Sync {
    /// Read the raw JSON document stored under `key`
    ///
    /// Returns `Ok(None)` when nothing is stored and `Err(PersistenceError::Corruption)`
    /// when something is stored but is not valid JSON.
    fn read_value(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the document stored under `key`
    fn write_value(&self, key: &str, value: &Value) -> Result<()>;

    /// Delete the document stored under `key`, returning whether one existed
    fn remove(&self, key: &str) -> Result<bool>;

    /// Get the configuration
    fn config(&self) -> &PersistenceConfig;
}

/// Typed helpers over any [`PersistedStore`]
pub trait PersistedStoreExt: PersistedStore {
    /// Read a typed value, falling back when the key is missing or unreadable
    ///
    /// Corrupt or mistyped documents are logged at `warn` and replaced by `fallback`;
    /// they are never surfaced to the caller.
    fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.read_checked(key) {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!(key = key, error = %e, "Ignoring corrupt persisted value, using fallback");
                fallback
            }
        }
    }

    /// Read a typed value, reporting corruption instead of hiding it
    fn read_checked<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_value(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| PersistenceError::corruption(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    /// Serialize and write a typed value
    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.write_value(key, &value)
    }
}

impl<S: PersistedStore + ?Sized> PersistedStoreExt for S {}

fn checked_key(key: &str) -> Result<()> {
    if validate_key(key) {
        Ok(())
    } else {
        Err(PersistenceError::invalid_key(key))
    }
}

/// Local file-based persistence backend
///
/// Each key maps to one JSON file inside the data directory. Writes land in a temp
/// file first and are renamed over the target.
pub struct LocalPersistence {
    config: PersistenceConfig,
}

impl LocalPersistence {
    /// Create a new local persistence backend, creating the data directory if needed
    pub fn new(config: PersistenceConfig) -> Result<Self> {
        // Validate configuration
        config.validate().map_err(PersistenceError::config)?;

        // Ensure data directory exists
        fs::create_dir_all(&config.data_dir)?;

        tracing::info!("Local persistence backend initialized at: {:?}", config.data_dir);

        Ok(Self { config })
    }

    /// Create a new local persistence backend with default config
    pub fn with_default_config(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let config = PersistenceConfig::new(data_dir);
        Self::new(config)
    }

    /// Get the data directory
    pub fn data_dir(&self) -> &PathBuf {
        &self.config.data_dir
    }
}

impl PersistedStore for LocalPersistence {
    fn read_value(&self, key: &str) -> Result<Option<Value>> {
        checked_key(key)?;
        let path = self.config.path_for_key(key);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| PersistenceError::corruption(format!("{}: {}", path.display(), e)))
    }

    fn write_value(&self, key: &str, value: &Value) -> Result<()> {
        checked_key(key)?;
        let path = self.config.path_for_key(key);
        let tmp_path = path.with_extension(format!("{}.tmp", self.config.file_extension));

        let content = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            if self.config.fsync_every_write {
                file.sync_all()?;
            }
        }
        fs::rename(&tmp_path, &path)?;

        tracing::debug!(key = key, bytes = content.len(), "Persisted value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        checked_key(key)?;
        match fs::remove_file(self.config.path_for_key(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn config(&self) -> &PersistenceConfig {
        &self.config
    }
}

/// In-memory persistence backend (for testing)
pub struct InMemoryPersistence {
    config: PersistenceConfig,
    values: RwLock<HashMap<String, Value>>,
    writes: AtomicU64,
}

impl InMemoryPersistence {
    /// Create a new in-memory persistence backend
    pub fn new(config: PersistenceConfig) -> Self {
        Self { config, values: RwLock::new(HashMap::new()), writes: AtomicU64::new(0) }
    }

    /// Create a new in-memory persistence backend with default config
    pub fn with_default_config() -> Self {
        Self::new(PersistenceConfig::default())
    }

    /// Seed a raw document, bypassing serialization (used to simulate corruption)
    pub fn insert_raw(&self, key: &str, value: Value) {
        self.values.write().insert(key.to_string(), value);
    }

    /// Number of writes performed so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::with_default_config()
    }
}

impl PersistedStore for InMemoryPersistence {
    fn read_value(&self, key: &str) -> Result<Option<Value>> {
        checked_key(key)?;
        Ok(self.values.read().get(key).cloned())
    }

    fn write_value(&self, key: &str, value: &Value) -> Result<()> {
        checked_key(key)?;
        self.values.write().insert(key.to_string(), value.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        checked_key(key)?;
        Ok(self.values.write().remove(key).is_some())
    }

    fn config(&self) -> &PersistenceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_round_trip_and_fallback() {
        let store = InMemoryPersistence::default();
        let missing: Vec<String> = store.read("selectedCoinIds", vec!["fallback".to_string()]);
        assert_eq!(missing, vec!["fallback".to_string()]);

        store.write("selectedCoinIds", &vec!["bitcoin", "ethereum"]).unwrap();
        let ids: Vec<String> = store.read("selectedCoinIds", Vec::new());
        assert_eq!(ids, vec!["bitcoin".to_string(), "ethereum".to_string()]);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_mistyped_value_falls_back() {
        let store = InMemoryPersistence::default();
        store.insert_raw("selectedCoinIds", json!({"not": "a list"}));

        let ids: Vec<String> = store.read("selectedCoinIds", Vec::new());
        assert!(ids.is_empty());

        let checked = store.read_checked::<Vec<String>>("selectedCoinIds");
        assert!(matches!(checked, Err(PersistenceError::Corruption(_))));
    }

    #[test]
    fn test_last_write_wins() {
        let store = InMemoryPersistence::default();
        store.write("k", &1).unwrap();
        store.write("k", &2).unwrap();
        assert_eq!(store.read("k", 0), 2);
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert_eq!(store.read("k", 0), 0);
    }

    #[test]
    fn test_write_count_across_threads() {
        let store = InMemoryPersistence::default();
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..25 {
                        store.write(&format!("w{worker}"), &i).unwrap();
                    }
                });
            }
        });

        assert_eq!(store.write_count(), 100);
        assert_eq!(store.read("w3", -1), 24);
    }

    #[test]
    fn test_invalid_key_rejected() {
        let store = InMemoryPersistence::default();
        assert!(matches!(store.write("../etc", &1), Err(PersistenceError::InvalidKey(_))));
    }

    #[test]
    fn test_dyn_store_helpers() {
        let store: std::sync::Arc<dyn PersistedStore> =
            std::sync::Arc::new(InMemoryPersistence::default());
        store.write("k", &"v").unwrap();
        assert_eq!(store.read("k", String::new()), "v");
    }
}
