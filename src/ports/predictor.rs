//! Prediction port: The external risk prediction service.
//!
//! The service is a black box that accepts a [`PredictionPayload`] and answers
//! with a result body of either known shape. Bodies are returned undecoded;
//! normalisation belongs to the domain.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::PredictionPayload;

/// Shown when the service gives no usable error message.
pub const FALLBACK_ERROR_MESSAGE: &str =
    "Unable to reach the prediction API. Verify the backend service and try again.";

/// Error type for prediction service calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("Prediction service unreachable at {0}")]
    Unreachable(String),

    #[error("Prediction request timed out after {0}s")]
    Timeout(u64),

    #[error("Prediction service returned HTTP {status}")]
    Status {
        status: u16,
        /// `message` field of the error body, when the body carried one.
        message: Option<String>,
    },

    #[error("Prediction service returned an unreadable body: {0}")]
    InvalidResponse(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl PredictionError {
    /// Message to show the user: the service's own message when it sent one,
    /// otherwise [`FALLBACK_ERROR_MESSAGE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

impl HealthStatus {
    /// Whether the service reports itself as OK.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Trait for the prediction service.
pub trait PredictionService: Send + Sync {
    /// Submit a payload and return the raw response body.
    ///
    /// # Errors
    /// Returns error if the service cannot be reached, times out, or answers
    /// with a non-success status.
    fn predict(&self, payload: &PredictionPayload) -> Result<Value, PredictionError>;

    /// Query the service's health endpoint.
    ///
    /// # Errors
    /// Returns error if the service cannot be reached or answers badly.
    fn health(&self) -> Result<HealthStatus, PredictionError>;

    /// Human-readable location of the service, for messages.
    fn endpoint(&self) -> String;
}

impl<P: PredictionService + ?Sized> PredictionService for std::sync::Arc<P> {
    fn predict(&self, payload: &PredictionPayload) -> Result<Value, PredictionError> {
        (**self).predict(payload)
    }

    fn health(&self) -> Result<HealthStatus, PredictionError> {
        (**self).health()
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}
