//! In-memory adapter: `KeyValueStore` backed by a `HashMap`.
//!
//! Used when the SQLite file cannot be opened, and by tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::StorageError;
use crate::ports::KeyValueStore;

/// Process-local key-value store. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl KeyValueStore for MemoryStore {
    type Error = StorageError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.lock()?.remove(key);
        Ok(())
    }
}
