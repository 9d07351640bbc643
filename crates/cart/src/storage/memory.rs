//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{KeyValueStore, StorageError};

/// In-process key-value store.
///
/// Clones share the same entries, so a test can keep one handle and hand
/// another to the cart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value without going through the async trait.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the lock was poisoned.
    pub fn get_now(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    /// Write a value without going through the async trait.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the lock was poisoned.
    pub fn set_now(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.get_now(key)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.set_now(key, value)
    }
}
