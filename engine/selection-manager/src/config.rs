//! Configuration for the selection manager

use crate::DEFAULT_MAX_SELECTED;
use persistence::StorageKeys;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum number of selected coins
    pub max_size: usize,

    /// Storage key holding the ordered id list
    pub storage_key: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SELECTED,
            storage_key: StorageKeys::SELECTED_COIN_IDS.to_string(),
        }
    }
}

impl SelectionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_size == 0 {
            return Err("selection.max_size must be greater than 0".to_string());
        }

        if !persistence::keys::validate_key(&self.storage_key) {
            return Err(format!("selection.storage_key is not a valid key: {}", self.storage_key));
        }

        Ok(())
    }
}
