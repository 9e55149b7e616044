//! Background submission worker.
//!
//! The prediction request blocks for up to the HTTP timeout, so it runs on its
//! own thread and reports back over a channel the main loop polls.

use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde_json::Value;

use crate::domain::PredictionPayload;
use crate::ports::{PredictionError, PredictionService};

/// Progress updates from the submission worker.
#[derive(Debug, Clone)]
pub enum SubmissionProgress {
    /// Request handed to the client
    Sending,
    /// Service answered (or failed)
    Finished(Result<Value, PredictionError>),
}

/// Reported when the worker thread exits without an outcome.
pub const WORKER_LOST_MESSAGE: &str = "Submission worker stopped before the service answered";

/// Handle to a running submission.
pub struct SubmissionHandle {
    progress_rx: Receiver<SubmissionProgress>,
    finished: Cell<bool>,
    _handle: JoinHandle<()>,
}

impl SubmissionHandle {
    /// Try to receive the next progress update (non-blocking).
    ///
    /// A worker that died before sending its outcome is reported once as a
    /// failed `Finished`.
    #[must_use]
    pub fn try_recv(&self) -> Option<SubmissionProgress> {
        if self.finished.get() {
            return None;
        }
        match self.progress_rx.try_recv() {
            Ok(progress) => {
                if matches!(progress, SubmissionProgress::Finished(_)) {
                    self.finished.set(true);
                }
                Some(progress)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::error!("Submission worker exited without an outcome");
                self.finished.set(true);
                Some(SubmissionProgress::Finished(Err(PredictionError::Client(
                    WORKER_LOST_MESSAGE.to_string(),
                ))))
            }
        }
    }
}

/// Runs one prediction request in the background.
pub struct SubmissionWorker;

impl SubmissionWorker {
    /// Spawn a background submission.
    pub fn spawn(
        client: Arc<dyn PredictionService>,
        payload: PredictionPayload,
    ) -> SubmissionHandle {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run(client.as_ref(), &payload, &tx);
        });

        SubmissionHandle {
            progress_rx: rx,
            finished: Cell::new(false),
            _handle: handle,
        }
    }

    fn run(client: &dyn PredictionService, payload: &PredictionPayload, tx: &Sender<SubmissionProgress>) {
        let _ = tx.send(SubmissionProgress::Sending);
        let outcome = client.predict(payload);
        let _ = tx.send(SubmissionProgress::Finished(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MockPredictionClient;
    use crate::domain::FormValues;
    use std::time::{Duration, Instant};

    #[test]
    fn test_worker_reports_outcome() {
        let payload = PredictionPayload::from_values(&FormValues::sample());
        let handle = SubmissionWorker::spawn(Arc::new(MockPredictionClient::new()), payload);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while Instant::now() < deadline {
            match handle.try_recv() {
                Some(event) => {
                    let done = matches!(event, SubmissionProgress::Finished(_));
                    events.push(event);
                    if done {
                        break;
                    }
                }
                None => thread::sleep(Duration::from_millis(5)),
            }
        }

        assert!(matches!(events.first(), Some(SubmissionProgress::Sending)));
        match events.last() {
            Some(SubmissionProgress::Finished(Ok(body))) => {
                assert_eq!(body["overall"]["risk_level"], "High");
            }
            other => panic!("expected a finished submission, got {other:?}"),
        }
        assert!(handle.try_recv().is_none());
    }

    /// Service whose request handler panics on the worker thread.
    struct PanickingService;

    impl PredictionService for PanickingService {
        fn predict(&self, _payload: &PredictionPayload) -> Result<Value, PredictionError> {
            panic!("service crashed");
        }

        fn health(&self) -> Result<crate::ports::HealthStatus, PredictionError> {
            Err(PredictionError::Unreachable("down".to_string()))
        }

        fn endpoint(&self) -> String {
            "panicking".to_string()
        }
    }

    #[test]
    fn test_dead_worker_reports_failure() {
        let payload = PredictionPayload::from_values(&FormValues::sample());
        let handle = SubmissionWorker::spawn(Arc::new(PanickingService), payload);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outcome = None;
        while Instant::now() < deadline {
            match handle.try_recv() {
                Some(SubmissionProgress::Finished(result)) => {
                    outcome = Some(result);
                    break;
                }
                Some(SubmissionProgress::Sending) => {}
                None => thread::sleep(Duration::from_millis(5)),
            }
        }

        assert_eq!(
            outcome,
            Some(Err(PredictionError::Client(WORKER_LOST_MESSAGE.to_string())))
        );
        assert!(handle.try_recv().is_none());
    }
}
