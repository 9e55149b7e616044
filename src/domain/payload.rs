//! Prediction request payload.
//!
//! Built once per submission from the raw form values and discarded after the
//! request completes.

use std::collections::BTreeMap;

use serde::Serialize;

use super::form::FormValues;

/// Typed request for the prediction service.
///
/// Numeric fields keep whatever the coercion produced, `NaN` included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionPayload {
    pub age: f64,
    pub sex: String,
    pub education_level: String,
    pub employment_status: String,
    pub marital_status: String,
    pub bmi: f64,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    pub resting_heart_rate: f64,
    pub chronic_conditions_count: f64,
    pub recent_weight_change: String,
    pub physical_activity_days_per_week: f64,
    pub sleep_hours_avg: f64,
    pub smoking_status: String,
    pub alcohol_frequency: String,
    pub stress_level: f64,
    pub depressive_symptoms_score: f64,
}

impl PredictionPayload {
    /// Coerce the raw form values into a payload.
    #[must_use]
    pub fn from_values(values: &FormValues) -> Self {
        Self {
            age: coerce_number(&values.age),
            sex: values.sex.clone(),
            education_level: values.education_level.clone(),
            employment_status: values.employment_status.clone(),
            marital_status: values.marital_status.clone(),
            bmi: coerce_number(&values.bmi),
            systolic_bp: coerce_number(&values.systolic_bp),
            diastolic_bp: coerce_number(&values.diastolic_bp),
            resting_heart_rate: coerce_number(&values.resting_heart_rate),
            chronic_conditions_count: coerce_number(&values.chronic_conditions_count),
            recent_weight_change: values.recent_weight_change.clone(),
            physical_activity_days_per_week: coerce_number(
                &values.physical_activity_days_per_week,
            ),
            sleep_hours_avg: coerce_number(&values.sleep_hours_avg),
            smoking_status: values.smoking_status.clone(),
            alcohol_frequency: values.alcohol_frequency.clone(),
            stress_level: f64::from(values.stress_level),
            depressive_symptoms_score: coerce_number(&values.depressive_symptoms_score),
        }
    }

    /// Wire form: every value stringified, keys in snake_case.
    #[must_use]
    pub fn to_wire(&self) -> BTreeMap<&'static str, String> {
        let numbers = [
            ("age", self.age),
            ("bmi", self.bmi),
            ("systolic_bp", self.systolic_bp),
            ("diastolic_bp", self.diastolic_bp),
            ("resting_heart_rate", self.resting_heart_rate),
            ("chronic_conditions_count", self.chronic_conditions_count),
            (
                "physical_activity_days_per_week",
                self.physical_activity_days_per_week,
            ),
            ("sleep_hours_avg", self.sleep_hours_avg),
            ("stress_level", self.stress_level),
            ("depressive_symptoms_score", self.depressive_symptoms_score),
        ];
        let texts = [
            ("sex", &self.sex),
            ("education_level", &self.education_level),
            ("employment_status", &self.employment_status),
            ("marital_status", &self.marital_status),
            ("recent_weight_change", &self.recent_weight_change),
            ("smoking_status", &self.smoking_status),
            ("alcohol_frequency", &self.alcohol_frequency),
        ];

        let mut wire = BTreeMap::new();
        for (key, value) in numbers {
            wire.insert(key, format_number(value));
        }
        for (key, value) in texts {
            wire.insert(key, value.clone());
        }
        wire
    }
}

/// Numeric cast with loose-typing semantics: surrounding whitespace is
/// ignored, an empty string is zero, anything unparseable is `NaN`.
#[must_use]
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Shortest decimal text for a number (`12`, `31.4`, `NaN`, `Infinity`).
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else {
        value.to_string()
    }
}
