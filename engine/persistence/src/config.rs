//! Configuration for the persistence layer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the persistence layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Base directory for persisted values
    pub data_dir: PathBuf,

    /// Extension used for value files
    pub file_extension: String,

    /// Whether to pretty-print JSON documents on disk
    pub pretty: bool,

    /// Whether to fsync every write (for maximum durability)
    pub fsync_every_write: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            file_extension: "json".to_string(),
            pretty: false,
            fsync_every_write: false,
        }
    }
}

impl PersistenceConfig {
    /// Create a new configuration with custom data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Default::default() }
    }

    /// Get the file path that holds the value for `key`
    pub fn path_for_key(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", key, self.file_extension))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.file_extension.is_empty() {
            return Err("file_extension must not be empty".to_string());
        }

        if self.file_extension.contains(|c| matches!(c, '/' | '\\' | '.')) {
            return Err(format!("Invalid file_extension: {}", self.file_extension));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for_key() {
        let config = PersistenceConfig::new("/tmp/coin-desk");
        assert_eq!(
            config.path_for_key("selectedCoinIds"),
            PathBuf::from("/tmp/coin-desk/selectedCoinIds.json")
        );
    }

    #[test]
    fn test_validate_rejects_bad_extension() {
        let config = PersistenceConfig { file_extension: String::new(), ..Default::default() };
        assert!(config.validate().is_err());

        let config = PersistenceConfig { file_extension: "../x".to_string(), ..Default::default() };
        assert!(config.validate().is_err());

        assert!(PersistenceConfig::default().validate().is_ok());
    }
}
