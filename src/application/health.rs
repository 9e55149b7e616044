//! Prediction service health advisory.
//!
//! Checked once at startup. The outcome is shown to the user but never gates
//! submission.

use crate::ports::PredictionService;

/// Outcome of a health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthAdvisory {
    Healthy,
    /// The service answered without an OK status.
    Degraded,
    /// The service could not be reached; holds the probed URL.
    Unreachable(String),
    /// Probe not run (mock mode).
    Skipped,
}

impl HealthAdvisory {
    /// Probe the service's health endpoint.
    pub fn check<P: PredictionService + ?Sized>(client: &P) -> Self {
        match client.health() {
            Ok(status) if status.is_ok() => {
                tracing::info!("Prediction service healthy");
                Self::Healthy
            }
            Ok(status) => {
                tracing::warn!(status = %status.status, "Prediction service not OK");
                Self::Degraded
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prediction service health check failed");
                Self::Unreachable(format!("{}/health", client.endpoint()))
            }
        }
    }

    /// Warning to display, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Healthy | Self::Skipped => None,
            Self::Degraded => {
                Some("Prediction service responded but did not report an OK status.".to_string())
            }
            Self::Unreachable(url) => Some(format!("Unable to reach the prediction service at {url}.")),
        }
    }
}
