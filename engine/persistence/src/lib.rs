//! # Persistence Layer
//!
//! This crate provides the key/value persistence used by Coin Desk. It replaces browser
//! local storage: every value is a JSON document stored under a string key, writes are
//! write-through and last-write-wins.
//!
//! ## Architecture
//!
//! - **PersistedStore**: Abstract trait for different storage backends
//! - **LocalPersistence**: One JSON file per key inside a data directory
//! - **InMemoryPersistence**: Map-backed store for tests and ephemeral sessions
//!
//! ## Usage
//!
//! ```rust
//! use persistence::{create_local_persistence, PersistedStoreExt, StorageKeys};
//! use tempfile::TempDir;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let temp_dir = TempDir::new()?;
//!     let store = create_local_persistence(temp_dir.path())?;
//!
//!     store.write(StorageKeys::SELECTED_COIN_IDS, &vec!["bitcoin".to_string()])?;
//!     let ids: Vec<String> = store.read(StorageKeys::SELECTED_COIN_IDS, Vec::new());
//!     assert_eq!(ids, vec!["bitcoin".to_string()]);
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod keys;
pub mod local;

pub use backend::{InMemoryPersistence, LocalPersistence, PersistedStore, PersistedStoreExt};
pub use config::PersistenceConfig;
pub use error::{PersistenceError, Result};
pub use keys::StorageKeys;
pub use local::{create_local_persistence, create_local_persistence_with_config};

/// Re-export common types for convenience
pub use serde::{de::DeserializeOwned, Deserialize, Serialize};
