//! SQLite adapter: Implementation of `KeyValueStore`.
//!
//! Provides local persistence for the intake snapshot, the intro flag and the
//! latest prediction result. Everything lives in one `kv` table keyed by the
//! storage key constants in [`crate::application`].
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`. A poisoned mutex surfaces as
//! [`StorageError::LockPoisoned`]; callers treat storage failures as
//! best-effort and keep running on in-memory state.
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::ports::KeyValueStore;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// SQLite storage adapter.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store with the given database path.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        tracing::debug!(path = %path.as_ref().display(), "Opened SQLite store");
        Ok(store)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    type Error = StorageError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        tracing::trace!(key, "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        tracing::trace!(key, "Removed value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kv_roundtrip() {
        let store = SqliteStore::in_memory().expect("Should create db");

        assert!(store.get("health-risk-form-values").expect("Should read").is_none());

        store
            .set("health-risk-form-values", r#"{"age":"40"}"#)
            .expect("Should save");
        assert_eq!(
            store.get("health-risk-form-values").expect("Should read").as_deref(),
            Some(r#"{"age":"40"}"#)
        );

        store
            .set("health-risk-form-values", r#"{"age":"41"}"#)
            .expect("Should overwrite");
        assert_eq!(
            store.get("health-risk-form-values").expect("Should read").as_deref(),
            Some(r#"{"age":"41"}"#)
        );

        store.remove("health-risk-form-values").expect("Should delete");
        assert!(store.get("health-risk-form-values").expect("Should read").is_none());
    }

    #[test]
    fn test_remove_absent_key() {
        let store = SqliteStore::in_memory().expect("Should create db");
        store.remove("missing").expect("Removing nothing is fine");
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("riskscreen.db");

        {
            let store = SqliteStore::new(&path).expect("Should open");
            store.set("health-risk-intro-ack", "true").expect("Should save");
        }

        let store = SqliteStore::new(&path).expect("Should reopen");
        assert_eq!(
            store.get("health-risk-intro-ack").expect("Should read").as_deref(),
            Some("true")
        );
    }
}
