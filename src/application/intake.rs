//! Intake session: The step state machine behind the form.
//!
//! Owns the raw values, per-field errors, the active step and the submission
//! phase. Every value change is persisted to the store; persistence failures
//! are logged and otherwise ignored.

use serde_json::Value;

use super::{results, FORM_VALUES_KEY};
use crate::domain::form::FieldValueError;
use crate::domain::{
    normalize, validate_fields, Field, FieldValue, FormErrors, FormValues, PredictionPayload,
    PredictionResult, StepDefinition, LAST_STEP, STEPS,
};
use crate::ports::{KeyValueStore, PredictionError, PredictionService};

/// Shown when a step has empty required fields.
pub const ADVISORY_MESSAGE: &str = "Please complete the highlighted inputs before proceeding.";

/// Submission phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    /// A prediction request is in flight; navigation is locked.
    Submitting,
}

/// Rejected session operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeError {
    #[error("{} required field(s) are empty", .0.len())]
    Incomplete(FormErrors),

    #[error("A submission is already in progress")]
    Busy,

    #[error("Submission is only possible from the last step (currently on step {0})")]
    NotOnLastStep(usize),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

/// Multi-step intake state.
pub struct IntakeSession<S: KeyValueStore> {
    store: S,
    values: FormValues,
    errors: FormErrors,
    step: usize,
    message: Option<String>,
    api_error: Option<String>,
    phase: Phase,
}

impl<S: KeyValueStore> IntakeSession<S> {
    /// Start a session at step 0, restoring values from the store when a
    /// readable snapshot exists.
    pub fn load(store: S) -> Self {
        let values = match store.get(FORM_VALUES_KEY) {
            Ok(Some(raw)) => FormValues::from_snapshot(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored intake snapshot is corrupt, using defaults");
                FormValues::default()
            }),
            Ok(None) => FormValues::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read intake snapshot, using defaults");
                FormValues::default()
            }
        };

        Self {
            store,
            values,
            errors: FormErrors::new(),
            step: 0,
            message: None,
            api_error: None,
            phase: Phase::Editing,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn current_step(&self) -> &'static StepDefinition {
        &STEPS[self.step]
    }

    pub fn is_last_step(&self) -> bool {
        self.step == LAST_STEP
    }

    /// Advisory message from the last failed step check.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// User-facing error from the last failed submission.
    pub fn api_error(&self) -> Option<&str> {
        self.api_error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Set a field, clear its error without re-validating, and persist.
    ///
    /// # Errors
    /// Returns error if the value is not valid for the stress slider. The
    /// session is left unchanged in that case.
    pub fn update_field(&mut self, field: Field, value: FieldValue) -> Result<(), FieldValueError> {
        self.values.set(field, value)?;
        self.errors.clear(field);
        self.persist();
        Ok(())
    }

    /// Validate the current step and move forward.
    ///
    /// # Returns
    /// The new step index (unchanged on the last step).
    ///
    /// # Errors
    /// `Incomplete` with this step's failing fields, or `Busy` while
    /// submitting. The step index is unchanged on error.
    pub fn advance(&mut self) -> Result<usize, IntakeError> {
        self.ensure_editing()?;
        self.check_current_step()?;
        self.step = (self.step + 1).min(LAST_STEP);
        tracing::debug!(step = self.step, "Advanced intake step");
        Ok(self.step)
    }

    /// Move back one step without validation.
    ///
    /// # Errors
    /// `Busy` while submitting.
    pub fn retreat(&mut self) -> Result<usize, IntakeError> {
        self.ensure_editing()?;
        self.message = None;
        self.step = self.step.saturating_sub(1);
        Ok(self.step)
    }

    /// Restore defaults, return to step 0 and delete the stored snapshot.
    ///
    /// # Errors
    /// `Busy` while submitting.
    pub fn reset(&mut self) -> Result<(), IntakeError> {
        self.ensure_editing()?;
        self.values.wipe();
        self.errors = FormErrors::new();
        self.message = None;
        self.api_error = None;
        self.step = 0;
        if let Err(e) = self.store.remove(FORM_VALUES_KEY) {
            tracing::warn!(error = %e, "Failed to delete intake snapshot");
        }
        tracing::info!("Intake reset");
        Ok(())
    }

    /// Validate the current step and enter the submitting phase.
    ///
    /// # Returns
    /// The payload to send.
    ///
    /// # Errors
    /// `Busy`, `NotOnLastStep` or `Incomplete`; the phase is unchanged on
    /// error.
    pub fn begin_submission(&mut self) -> Result<PredictionPayload, IntakeError> {
        self.ensure_editing()?;
        if !self.is_last_step() {
            return Err(IntakeError::NotOnLastStep(self.step));
        }
        self.check_current_step()?;
        self.api_error = None;
        self.phase = Phase::Submitting;
        tracing::info!("Submitting intake for prediction");
        Ok(PredictionPayload::from_values(&self.values))
    }

    /// Leave the submitting phase with the service outcome.
    ///
    /// On success the body is normalised and stored as the latest result. On
    /// failure the user-facing message is kept in [`Self::api_error`]; values
    /// and step are untouched either way.
    ///
    /// # Errors
    /// `Prediction` if the service call failed.
    pub fn finish_submission(
        &mut self,
        outcome: Result<Value, PredictionError>,
    ) -> Result<PredictionResult, IntakeError> {
        self.phase = Phase::Editing;
        match outcome {
            Ok(body) => {
                let result = normalize(&body);
                results::store_latest(&self.store, &result);
                tracing::info!(risk_level = %result.overall.risk_level, "Prediction received");
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prediction request failed");
                self.api_error = Some(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Validate, call the service and normalise the answer in one go.
    ///
    /// # Errors
    /// As [`Self::begin_submission`] and [`Self::finish_submission`].
    pub fn submit<P: PredictionService + ?Sized>(
        &mut self,
        client: &P,
    ) -> Result<PredictionResult, IntakeError> {
        let payload = self.begin_submission()?;
        let outcome = client.predict(&payload);
        self.finish_submission(outcome)
    }

    fn ensure_editing(&self) -> Result<(), IntakeError> {
        if self.is_submitting() {
            return Err(IntakeError::Busy);
        }
        Ok(())
    }

    /// Run the step validator, merging failures into the error state.
    fn check_current_step(&mut self) -> Result<(), IntakeError> {
        let failures = validate_fields(self.current_step().fields, &self.values);
        if failures.is_empty() {
            self.message = None;
            return Ok(());
        }
        self.errors.merge(&failures);
        self.message = Some(ADVISORY_MESSAGE.to_string());
        tracing::debug!(step = self.step, missing = failures.len(), "Step incomplete");
        Err(IntakeError::Incomplete(failures))
    }

    fn persist(&self) {
        match self.values.to_snapshot() {
            Ok(snapshot) => {
                if let Err(e) = self.store.set(FORM_VALUES_KEY, &snapshot) {
                    tracing::warn!(error = %e, "Failed to persist intake snapshot");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialise intake snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryStore, StorageError};
    use crate::application::LATEST_RESULT_KEY;
    use crate::domain::ResultSummary;
    use crate::ports::{HealthStatus, FALLBACK_ERROR_MESSAGE};
    use serde_json::json;
    use std::sync::Mutex;

    /// Prediction service returning a scripted outcome and recording payloads.
    struct ScriptedService {
        outcome: Result<Value, PredictionError>,
        calls: Mutex<Vec<PredictionPayload>>,
    }

    impl ScriptedService {
        fn answering(body: Value) -> Self {
            Self {
                outcome: Ok(body),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: PredictionError) -> Self {
            Self {
                outcome: Err(err),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().expect("Lock").len()
        }
    }

    impl PredictionService for ScriptedService {
        fn predict(&self, payload: &PredictionPayload) -> Result<Value, PredictionError> {
            self.calls.lock().expect("Lock").push(payload.clone());
            self.outcome.clone()
        }

        fn health(&self) -> Result<HealthStatus, PredictionError> {
            Ok(HealthStatus {
                status: "ok".to_string(),
            })
        }

        fn endpoint(&self) -> String {
            "scripted".to_string()
        }
    }

    /// Store whose every operation fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        type Error = StorageError;

        fn get(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err(StorageError::LockPoisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Err(StorageError::LockPoisoned)
        }

        fn remove(&self, _key: &str) -> Result<(), Self::Error> {
            Err(StorageError::LockPoisoned)
        }
    }

    fn filled_session() -> IntakeSession<MemoryStore> {
        let store = MemoryStore::new();
        store
            .set(FORM_VALUES_KEY, &FormValues::sample().to_snapshot().expect("Serialise"))
            .expect("Should write");
        IntakeSession::load(store)
    }

    fn walk_to_last_step<S: KeyValueStore>(session: &mut IntakeSession<S>) {
        while !session.is_last_step() {
            session.advance().expect("Step should be complete");
        }
    }

    #[test]
    fn test_initial_state() {
        let session = IntakeSession::load(MemoryStore::new());
        assert_eq!(session.step(), 0);
        assert_eq!(session.values(), &FormValues::default());
        assert!(session.errors().is_empty());
        assert_eq!(session.message(), None);
        assert_eq!(session.phase(), Phase::Editing);
    }

    #[test]
    fn test_restores_stored_snapshot() {
        let session = filled_session();
        assert_eq!(session.values(), &FormValues::sample());
        assert_eq!(session.step(), 0);
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_defaults() {
        let store = MemoryStore::new();
        store.set(FORM_VALUES_KEY, "[1,2").expect("Should write");
        let session = IntakeSession::load(store);
        assert_eq!(session.values(), &FormValues::default());
    }

    #[test]
    fn test_broken_store_never_crashes() {
        let mut session = IntakeSession::load(BrokenStore);
        assert_eq!(session.values(), &FormValues::default());

        session
            .update_field(Field::Age, "40".into())
            .expect("Update should succeed in memory");
        assert_eq!(session.values().age, "40");
        session.reset().expect("Reset should succeed");
        assert_eq!(session.values(), &FormValues::default());
    }

    #[test]
    fn test_update_field_persists_and_clears_error() {
        let mut session = IntakeSession::load(MemoryStore::new());
        let _ = session.advance();
        assert!(session.errors().contains(Field::Age));

        session
            .update_field(Field::Age, "40".into())
            .expect("Should update");
        assert!(!session.errors().contains(Field::Age));
        assert!(session.errors().contains(Field::Sex));

        let stored = session
            .store()
            .get(FORM_VALUES_KEY)
            .expect("Should read")
            .expect("Snapshot should exist");
        assert_eq!(FormValues::from_snapshot(&stored).expect("Parse").age, "40");
    }

    #[test]
    fn test_update_field_clears_without_revalidating() {
        let mut session = IntakeSession::load(MemoryStore::new());
        let _ = session.advance();
        session
            .update_field(Field::Age, "".into())
            .expect("Should update");
        assert!(!session.errors().contains(Field::Age));
    }

    #[test]
    fn test_invalid_stress_level_rejected() {
        let mut session = IntakeSession::load(MemoryStore::new());
        let err = session
            .update_field(Field::StressLevel, FieldValue::Level(9))
            .expect_err("Out of range");
        assert_eq!(err.field, Field::StressLevel);
        assert_eq!(session.values().stress_level, 3);
        assert!(session.store().get(FORM_VALUES_KEY).expect("Read").is_none());
    }

    #[test]
    fn test_advance_with_missing_age() {
        let mut session = IntakeSession::load(MemoryStore::new());
        let mut values = FormValues::sample();
        values.age.clear();
        for field in STEPS[0].fields {
            session.update_field(*field, values.get(*field)).expect("Should update");
        }

        let err = session.advance().expect_err("Age is missing");
        let IntakeError::Incomplete(errors) = err else {
            panic!("expected Incomplete, got {err:?}");
        };
        assert_eq!(errors.get(Field::Age), Some("Required"));
        assert_eq!(errors.len(), 1);
        assert_eq!(session.step(), 0);
        assert_eq!(session.message(), Some(ADVISORY_MESSAGE));
    }

    #[test]
    fn test_advance_merges_errors() {
        let mut session = IntakeSession::load(MemoryStore::new());
        let _ = session.advance();
        let first = session.errors().len();
        session
            .update_field(Field::Sex, "Male".into())
            .expect("Should update");
        let _ = session.advance();
        assert_eq!(session.errors().len(), first - 1);
        assert!(session.errors().contains(Field::Age));
    }

    #[test]
    fn test_advance_success_clears_message() {
        let mut session = filled_session();
        session
            .update_field(Field::Age, "".into())
            .expect("Should update");
        let _ = session.advance();
        assert!(session.message().is_some());

        session
            .update_field(Field::Age, "52".into())
            .expect("Should update");
        assert_eq!(session.advance().expect("Complete"), 1);
        assert_eq!(session.message(), None);
    }

    #[test]
    fn test_advance_bounded_at_last_step() {
        let mut session = filled_session();
        walk_to_last_step(&mut session);
        assert_eq!(session.advance().expect("Complete"), LAST_STEP);
    }

    #[test]
    fn test_retreat() {
        let mut session = filled_session();
        assert_eq!(session.retreat().expect("Not busy"), 0);
        session.advance().expect("Complete");
        assert_eq!(session.retreat().expect("Not busy"), 0);
    }

    #[test]
    fn test_retreat_clears_message_without_validation() {
        let mut session = filled_session();
        session.advance().expect("Complete");
        session
            .update_field(Field::Bmi, "".into())
            .expect("Should update");
        let _ = session.advance();
        assert!(session.message().is_some());

        assert_eq!(session.retreat().expect("Not busy"), 0);
        assert_eq!(session.message(), None);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = filled_session();
        session.advance().expect("Complete");
        session
            .update_field(Field::Bmi, "".into())
            .expect("Should update");
        let _ = session.advance();

        session.reset().expect("Not busy");
        let after_one = (
            session.values().clone(),
            session.errors().clone(),
            session.step(),
            session.message().map(str::to_string),
        );
        session.reset().expect("Not busy");
        let after_two = (
            session.values().clone(),
            session.errors().clone(),
            session.step(),
            session.message().map(str::to_string),
        );

        assert_eq!(after_one, after_two);
        assert_eq!(after_two.0, FormValues::default());
        assert!(after_two.1.is_empty());
        assert_eq!(after_two.2, 0);
        assert_eq!(after_two.3, None);
        assert!(session.store().get(FORM_VALUES_KEY).expect("Read").is_none());
    }

    #[test]
    fn test_submit_canonical_response() {
        let mut session = filled_session();
        walk_to_last_step(&mut session);
        let service = ScriptedService::answering(json!({
            "overall": {
                "risk_score": 0.61,
                "risk_level": "High",
                "highest_risk_disease": "hibpe",
                "data_quality_score": 0.84
            }
        }));

        let result = session.submit(&service).expect("Should succeed");
        let summary = ResultSummary::from_result(&result);

        assert_eq!(summary.percent_score, 61);
        assert_eq!(result.overall.risk_level, "High");
        assert_eq!(service.call_count(), 1);
        assert_eq!(session.phase(), Phase::Editing);
        assert!(session
            .store()
            .get(LATEST_RESULT_KEY)
            .expect("Read")
            .is_some());
    }

    #[test]
    fn test_submit_legacy_response() {
        let mut session = filled_session();
        walk_to_last_step(&mut session);
        let service = ScriptedService::answering(json!({
            "risk_score": 0.4,
            "risk_level": "Moderate",
            "top_factors": [{"name": "bmi", "impact": 0.2}]
        }));

        let result = session.submit(&service).expect("Should succeed");
        assert_eq!(result.disease_risks.len(), 1);
        assert!(!result.disease_risks[0].is_high_risk);
        let factors = &result.disease_risks[0].explanation.top_risk_factors;
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].factor_name, "bmi");
    }

    #[test]
    fn test_submit_unreachable_uses_fallback_message() {
        let mut session = filled_session();
        walk_to_last_step(&mut session);
        let before = session.values().clone();
        let service = ScriptedService::failing(PredictionError::Unreachable(
            "http://localhost:8001".to_string(),
        ));

        let err = session.submit(&service).expect_err("Should fail");
        assert!(matches!(err, IntakeError::Prediction(_)));
        assert_eq!(session.api_error(), Some(FALLBACK_ERROR_MESSAGE));
        assert_eq!(session.values(), &before);
        assert_eq!(session.step(), LAST_STEP);
        assert_eq!(session.phase(), Phase::Editing);
    }

    #[test]
    fn test_submit_surfaces_service_message() {
        let mut session = filled_session();
        walk_to_last_step(&mut session);
        let service = ScriptedService::failing(PredictionError::Status {
            status: 422,
            message: Some("Sleep hours out of range".to_string()),
        });

        let _ = session.submit(&service);
        assert_eq!(session.api_error(), Some("Sleep hours out of range"));
    }

    #[test]
    fn test_submit_incomplete_skips_service() {
        let mut session = filled_session();
        walk_to_last_step(&mut session);
        session
            .update_field(Field::SmokingStatus, "".into())
            .expect("Should update");
        let service = ScriptedService::answering(json!({}));

        let err = session.submit(&service).expect_err("Incomplete");
        assert!(matches!(err, IntakeError::Incomplete(_)));
        assert_eq!(service.call_count(), 0);
        assert_eq!(session.message(), Some(ADVISORY_MESSAGE));
    }

    #[test]
    fn test_submit_before_last_step_skips_service() {
        let mut session = IntakeSession::load(MemoryStore::new());
        let sample = FormValues::sample();
        for field in STEPS[0].fields {
            session
                .update_field(*field, sample.get(*field))
                .expect("Should update");
        }
        let service = ScriptedService::answering(json!({"overall": {"risk_score": 0.3}}));

        let err = session.submit(&service).expect_err("Not on the last step");
        assert_eq!(err, IntakeError::NotOnLastStep(0));
        assert_eq!(service.call_count(), 0);
        assert!(!session.is_submitting());
        assert_eq!(session.step(), 0);
        assert!(session.errors().is_empty());
    }

    #[test]
    fn test_navigation_locked_while_submitting() {
        let mut session = filled_session();
        walk_to_last_step(&mut session);

        let payload = session.begin_submission().expect("Complete");
        assert_eq!(payload.age, 52.0);
        assert!(session.is_submitting());

        assert_eq!(session.advance(), Err(IntakeError::Busy));
        assert_eq!(session.retreat(), Err(IntakeError::Busy));
        assert_eq!(session.reset(), Err(IntakeError::Busy));
        assert_eq!(session.begin_submission().map(|_| ()), Err(IntakeError::Busy));
        assert_eq!(session.step(), LAST_STEP);

        session
            .finish_submission(Ok(json!({"risk_score": 0.1})))
            .expect("Should succeed");
        assert!(!session.is_submitting());
    }

    #[test]
    fn test_retry_after_failure() {
        let mut session = filled_session();
        walk_to_last_step(&mut session);

        let _ = session.submit(&ScriptedService::failing(PredictionError::Timeout(10)));
        assert!(session.api_error().is_some());

        let result = session
            .submit(&ScriptedService::answering(json!({"overall": {"risk_score": 0.2}})))
            .expect("Retry should succeed");
        assert_eq!(result.overall.risk_score, 0.2);
        assert_eq!(session.api_error(), None);
    }
}
