//! Mock adapter: `PredictionService` with a fixed canonical sample.
//!
//! Enabled with `RISKSCREEN_MOCK_API` for demos and offline work. The payload
//! is ignored; every call returns the same five-disease assessment.

use serde_json::{json, Value};

use crate::domain::PredictionPayload;
use crate::ports::{HealthStatus, PredictionError, PredictionService};

fn factor(name: &str, user_value: Value, impact: f64, direction: &str) -> Value {
    json!({
        "factor_name": name,
        "user_value": user_value,
        "impact": impact,
        "direction": direction,
    })
}

fn disease(
    name: &str,
    probability: f64,
    level: &str,
    threshold: f64,
    trend: &str,
    risk_factors: Vec<Value>,
    protective_factors: Vec<Value>,
) -> Value {
    json!({
        "disease": name,
        "risk_probability": probability,
        "risk_level": level,
        "threshold_used": threshold,
        "is_high_risk": level.eq_ignore_ascii_case("high"),
        "trend_signal": trend,
        "explanation": {
            "top_risk_factors": risk_factors,
            "top_protective_factors": protective_factors,
        },
    })
}

/// The canned canonical result body.
#[must_use]
pub fn sample_result() -> Value {
    let diseases = vec![
        disease(
            "hibpe",
            0.74,
            "High",
            0.0055,
            "increasing",
            vec![
                factor("bmi_prev", json!(33.1), 0.18, "up"),
                factor("other_disease_count_prev", json!(2), 0.13, "up"),
                factor("sleep_hours_prev", json!(5.5), 0.08, "down"),
            ],
            vec![
                factor("walks_prev", json!(1), 0.05, "down"),
                factor("med_adherence_prev", json!(0.9), 0.04, "down"),
            ],
        ),
        disease(
            "diabe",
            0.58,
            "Moderate",
            0.004,
            "stable",
            vec![
                factor("a1c_prev", json!(6.7), 0.16, "up"),
                factor("waist_circ_prev", json!(104), 0.11, "up"),
                factor("sleep_hours_prev", json!(5.5), 0.07, "down"),
            ],
            vec![factor("steps_prev", json!(7500), 0.06, "down")],
        ),
        disease(
            "hearte",
            0.49,
            "Moderate",
            0.0045,
            "decreasing",
            vec![
                factor("bp_variability_prev", json!(15), 0.14, "up"),
                factor("stress_score_prev", json!(8), 0.12, "up"),
            ],
            vec![
                factor("meditation_sessions", json!(3), 0.05, "down"),
                factor("omega3_intake", json!(4), 0.04, "down"),
            ],
        ),
        disease(
            "stroke",
            0.37,
            "Low",
            0.0032,
            "stable",
            vec![
                factor("family_history_prev", json!(1), 0.09, "up"),
                factor("ldl_prev", json!(140), 0.07, "up"),
            ],
            vec![factor("statin_adherence", json!(0.95), 0.05, "down")],
        ),
        disease(
            "arthre",
            0.42,
            "Moderate",
            0.0038,
            "increasing",
            vec![
                factor("weight_gain_prev", json!(3.4), 0.1, "up"),
                factor("activity_days_prev", json!(1), 0.08, "down"),
            ],
            vec![factor("physical_therapy_sessions", json!(2), 0.05, "down")],
        ),
    ];

    json!({
        "overall": {
            "risk_score": 0.61,
            "risk_level": "High",
            "highest_risk_disease": "hibpe",
            "data_quality_score": 0.84,
        },
        "disease_risks": diseases,
        "data_quality": {
            "missing_fields": ["drinkn_prev"],
            "inconsistent_fields": ["sleep_hours_prev"],
            "confidence_note": "Good quality input with minor gaps",
        },
        "recommendations": [
            "Increase weekly physical activity",
            "Improve sleep hygiene routine",
            "Monitor blood pressure daily",
            "Schedule nutrition coaching",
        ],
        "disclaimer": "Risk screening only, not a clinical diagnosis.",
    })
}

/// Offline prediction service.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockPredictionClient;

impl MockPredictionClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PredictionService for MockPredictionClient {
    fn predict(&self, _payload: &PredictionPayload) -> Result<Value, PredictionError> {
        tracing::debug!("Returning mock prediction result");
        Ok(sample_result())
    }

    fn health(&self) -> Result<HealthStatus, PredictionError> {
        Ok(HealthStatus {
            status: "ok".to_string(),
        })
    }

    fn endpoint(&self) -> String {
        "mock".to_string()
    }
}
