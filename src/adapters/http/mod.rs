//! HTTP adapter: `PredictionService` over the prediction REST API.
//!
//! - `POST {base}/predict` with the stringified payload as a JSON object
//! - `GET {base}/health` returning `{ "status": ... }`
//!
//! Requests use a fixed timeout and are never retried.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::PredictionPayload;
use crate::ports::{HealthStatus, PredictionError, PredictionService};

/// Error body shape the service uses for failures.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Blocking HTTP client for the prediction service.
pub struct HttpPredictionClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpPredictionClient {
    /// Create a client for the service at `base_url`.
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, PredictionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PredictionError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> PredictionError {
        if e.is_timeout() {
            PredictionError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            PredictionError::Unreachable(self.base_url.clone())
        } else {
            PredictionError::Client(e.to_string())
        }
    }

    /// Turn a non-success response into `PredictionError::Status`.
    fn status_error(response: reqwest::blocking::Response) -> PredictionError {
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);
        tracing::warn!(status, "Prediction service returned an error status");
        PredictionError::Status { status, message }
    }
}

impl PredictionService for HttpPredictionClient {
    fn predict(&self, payload: &PredictionPayload) -> Result<Value, PredictionError> {
        let url = format!("{}/predict", self.base_url);
        tracing::info!(%url, "Submitting prediction request");

        let response = self
            .client
            .post(&url)
            .json(&payload.to_wire())
            .send()
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response));
        }

        response
            .json::<Value>()
            .map_err(|e| PredictionError::InvalidResponse(e.to_string()))
    }

    fn health(&self) -> Result<HealthStatus, PredictionError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response));
        }

        response
            .json::<HealthStatus>()
            .map_err(|e| PredictionError::InvalidResponse(e.to_string()))
    }

    fn endpoint(&self) -> String {
        self.base_url.clone()
    }
}
