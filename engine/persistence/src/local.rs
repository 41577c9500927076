//! Local file-based persistence implementation

use crate::backend::LocalPersistence;
use crate::config::PersistenceConfig;
use crate::error::Result;

/// Create a new local persistence instance with default configuration
pub fn create_local_persistence(
    data_dir: impl Into<std::path::PathBuf>,
) -> Result<LocalPersistence> {
    LocalPersistence::with_default_config(data_dir)
}

/// Create a new local persistence instance with custom configuration
pub fn create_local_persistence_with_config(config: PersistenceConfig) -> Result<LocalPersistence> {
    LocalPersistence::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{PersistedStore, PersistedStoreExt};
    use crate::error::PersistenceError;
    use crate::keys::StorageKeys;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_local_persistence_creation() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("nested").join("store");

        let persistence = create_local_persistence(data_dir.clone()).unwrap();
        assert_eq!(persistence.data_dir(), &data_dir);
        assert!(data_dir.exists());
    }

    #[test]
    fn test_selection_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let persistence = create_local_persistence(temp_dir.path()).unwrap();
            persistence
                .write(StorageKeys::SELECTED_COIN_IDS, &vec!["bitcoin", "solana"])
                .unwrap();
        }

        let persistence = create_local_persistence(temp_dir.path()).unwrap();
        let ids: Vec<String> = persistence.read(StorageKeys::SELECTED_COIN_IDS, Vec::new());
        assert_eq!(ids, vec!["bitcoin".to_string(), "solana".to_string()]);

        // No temp files left behind
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_reported_and_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = create_local_persistence(temp_dir.path()).unwrap();

        fs::write(temp_dir.path().join("selectedCoinIds.json"), "[\"bitcoin\",").unwrap();

        assert!(matches!(
            persistence.read_value(StorageKeys::SELECTED_COIN_IDS),
            Err(PersistenceError::Corruption(_))
        ));
        let ids: Vec<String> = persistence.read(StorageKeys::SELECTED_COIN_IDS, Vec::new());
        assert!(ids.is_empty());
    }

    #[test]
    fn test_missing_and_removed_keys() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = create_local_persistence(temp_dir.path()).unwrap();
        let key = StorageKeys::more_info("bitcoin");

        assert!(persistence.read_value(&key).unwrap().is_none());
        persistence.write(&key, &serde_json::json!({"usd": 1.0})).unwrap();
        assert!(persistence.remove(&key).unwrap());
        assert!(persistence.read_value(&key).unwrap().is_none());
        assert!(!persistence.remove(&key).unwrap());
    }

    #[test]
    fn test_pretty_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = PersistenceConfig {
            pretty: true,
            fsync_every_write: true,
            ..PersistenceConfig::new(temp_dir.path())
        };
        let persistence = create_local_persistence_with_config(config).unwrap();
        persistence.write("prefs", &serde_json::json!({"a": 1})).unwrap();

        let raw = fs::read_to_string(temp_dir.path().join("prefs.json")).unwrap();
        assert!(raw.contains('\n'));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = PersistenceConfig {
            file_extension: String::new(),
            ..PersistenceConfig::new(temp_dir.path())
        };
        assert!(matches!(
            create_local_persistence_with_config(config),
            Err(PersistenceError::Config(_))
        ));
    }
}
