//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the intake core and the outside world (prediction service,
//! persisted state).

mod predictor;
mod storage;

pub use predictor::{HealthStatus, PredictionError, PredictionService, FALLBACK_ERROR_MESSAGE};
pub use storage::KeyValueStore;
