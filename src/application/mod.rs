//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod health;
mod intake;
mod results;

pub use health::HealthAdvisory;
pub use intake::{IntakeError, IntakeSession, Phase, ADVISORY_MESSAGE};
pub use results::{load_latest, resolve, store_latest, IntroGate};

/// Storage key for the intake snapshot.
pub const FORM_VALUES_KEY: &str = "health-risk-form-values";

/// Storage key for the latest canonical result.
pub const LATEST_RESULT_KEY: &str = "health-risk-latest-result";

/// Storage key for the intro acknowledgement flag.
pub const INTRO_ACK_KEY: &str = "health-risk-intro-ack";
