//! Latest-result persistence and the intro gate.

use serde_json::Value;

use super::{INTRO_ACK_KEY, LATEST_RESULT_KEY};
use crate::domain::{normalize, PredictionResult};
use crate::ports::KeyValueStore;

/// Persist a result as the latest one. Failures are logged and dropped.
pub fn store_latest<S: KeyValueStore>(store: &S, result: &PredictionResult) {
    let json = match result.to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialise latest result");
            return;
        }
    };
    if let Err(e) = store.set(LATEST_RESULT_KEY, &json) {
        tracing::warn!(error = %e, "Failed to persist latest result");
    }
}

/// Load the stored latest result, normalised on read.
///
/// Missing, unreadable or corrupt entries yield `None`.
pub fn load_latest<S: KeyValueStore>(store: &S) -> Option<PredictionResult> {
    let raw = match store.get(LATEST_RESULT_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read latest result");
            return None;
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(value) if !value.is_null() => Some(normalize(&value)),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Stored latest result is corrupt, ignoring");
            None
        }
    }
}

/// Result to show: the one handed off by a submission, else the stored one.
pub fn resolve<S: KeyValueStore>(
    handed_off: Option<PredictionResult>,
    store: &S,
) -> Option<PredictionResult> {
    handed_off.or_else(|| load_latest(store))
}

/// Tracks whether the intro screen has been acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroGate {
    acknowledged: bool,
}

impl IntroGate {
    /// Read the flag. Anything other than a stored `"true"` means unacknowledged.
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let acknowledged = match store.get(INTRO_ACK_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read intro flag");
                false
            }
        };
        Self { acknowledged }
    }

    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Mark the intro as seen and persist the flag (best-effort).
    pub fn acknowledge<S: KeyValueStore>(&mut self, store: &S) {
        self.acknowledged = true;
        if let Err(e) = store.set(INTRO_ACK_KEY, "true") {
            tracing::warn!(error = %e, "Failed to persist intro flag");
        }
    }
}
