//! Storage port: Key-value persistence.
//!
//! The intake session keeps its snapshot, the latest result and the intro
//! flag behind this trait so the backend (SQLite, in-memory) can be swapped.

/// String key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a value.
    ///
    /// # Returns
    /// `None` if the key is absent.
    ///
    /// # Errors
    /// Returns error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Insert or overwrite a value.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete a value. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    type Error = S::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        (**self).remove(key)
    }
}
