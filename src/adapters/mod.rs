//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external libraries:
//! - `http`: reqwest client for the prediction service
//! - `mock`: canned prediction service for offline runs
//! - `sqlite`: SQLite key-value store
//! - `memory`: in-memory key-value store
//! - `sanitize`: redaction of intake answers in logs

pub mod http;
pub mod memory;
pub mod mock;
pub mod sanitize;
pub mod sqlite;

pub use http::HttpPredictionClient;
pub use memory::MemoryStore;
pub use mock::MockPredictionClient;
pub use sqlite::{SqliteStore, StorageError};
