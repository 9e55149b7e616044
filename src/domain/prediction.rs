//! Prediction result types and response normalisation.
//!
//! The prediction service has answered in two shapes over time: the current
//! nested multi-disease result and an older flat single-score result. Both
//! are decoded into [`PredictionResponse`] and converted to the canonical
//! [`PredictionResult`], which is the only shape the results view reads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named defaults used when converting legacy results.
pub mod defaults {
    /// Disease reported for legacy results, which carry no disease breakdown.
    pub const PLACEHOLDER_DISEASE: &str = "hypertension";
    pub const RISK_SCORE: f64 = 0.0;
    pub const RISK_LEVEL: &str = "Unknown";
    pub const DATA_QUALITY_SCORE: f64 = 0.8;
    pub const THRESHOLD: f64 = 0.005;
    pub const TREND_SIGNAL: &str = "stable";
    pub const FACTOR_IMPACT: f64 = 0.0;
    pub const FACTOR_DIRECTION: &str = "up";
    pub const CONVERTED_NOTE: &str = "Converted from legacy schema";
    pub const RECOMMENDATIONS: [&str; 3] = [
        "Increase weekly physical activity",
        "Improve sleep hygiene routine",
        "Monitor blood pressure daily",
    ];
    pub const DISCLAIMER: &str = "Risk screening only, not a clinical diagnosis.";

    /// Take the value if present, else the named default.
    pub fn coalesce<T>(value: Option<T>, default: impl Into<T>) -> T {
        value.unwrap_or_else(|| default.into())
    }

    /// The default recommendation list, owned.
    #[must_use]
    pub fn recommendations() -> Vec<String> {
        RECOMMENDATIONS.iter().map(|r| (*r).to_string()).collect()
    }
}

/// Aggregate risk block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallRisk {
    pub risk_score: f64,
    pub risk_level: String,
    pub highest_risk_disease: String,
    pub data_quality_score: f64,
}

/// One contributing factor in a disease explanation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFactor {
    pub factor_name: String,
    /// The user's value for the factor, numeric or textual.
    pub user_value: Value,
    pub impact: f64,
    pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Explanation {
    pub top_risk_factors: Vec<RiskFactor>,
    pub top_protective_factors: Vec<RiskFactor>,
}

/// Risk assessment for a single disease.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseRisk {
    pub disease: String,
    pub risk_probability: f64,
    pub risk_level: String,
    pub threshold_used: f64,
    pub is_high_risk: bool,
    pub trend_signal: String,
    pub explanation: Explanation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataQuality {
    pub missing_fields: Vec<String>,
    pub inconsistent_fields: Vec<String>,
    pub confidence_note: String,
}

/// Canonical prediction result.
///
/// `overall` is required; every other block defaults to empty when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub overall: OverallRisk,
    #[serde(default)]
    pub disease_risks: Vec<DiseaseRisk>,
    #[serde(default)]
    pub data_quality: DataQuality,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub disclaimer: String,
}

impl PredictionResult {
    /// Serialise for the latest-result store.
    ///
    /// # Errors
    /// Returns error if serialisation fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Factor entry of the legacy shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyFactor {
    pub name: String,
    #[serde(default)]
    pub impact: Option<f64>,
}

/// Legacy flat result. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyPredictionResult {
    pub risk_score: Option<f64>,
    pub risk_level: Option<String>,
    pub top_factors: Option<Vec<LegacyFactor>>,
    pub trend_signal: Option<String>,
}

impl LegacyPredictionResult {
    /// Decode field by field. A missing or mistyped field is treated as
    /// absent; a non-object value yields an empty result.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let top_factors = obj.get("top_factors").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|item| LegacyFactor::deserialize(item).ok())
                .collect()
        });

        Self {
            risk_score: lenient_field(obj, "risk_score"),
            risk_level: lenient_field(obj, "risk_level"),
            top_factors,
            trend_signal: lenient_field(obj, "trend_signal"),
        }
    }

    /// Synthesize the canonical shape.
    #[must_use]
    pub fn into_canonical(self) -> PredictionResult {
        use defaults::coalesce;

        let risk_score = coalesce(self.risk_score, defaults::RISK_SCORE);
        let risk_level: String = coalesce(self.risk_level, defaults::RISK_LEVEL);
        let is_high_risk = risk_level.to_lowercase().contains("high");

        let top_risk_factors = self
            .top_factors
            .unwrap_or_default()
            .into_iter()
            .map(|factor| RiskFactor {
                user_value: Value::String(display_name(&factor.name)),
                impact: coalesce(factor.impact, defaults::FACTOR_IMPACT),
                direction: defaults::FACTOR_DIRECTION.to_string(),
                factor_name: factor.name,
            })
            .collect();

        PredictionResult {
            overall: OverallRisk {
                risk_score,
                risk_level: risk_level.clone(),
                highest_risk_disease: defaults::PLACEHOLDER_DISEASE.to_string(),
                data_quality_score: defaults::DATA_QUALITY_SCORE,
            },
            disease_risks: vec![DiseaseRisk {
                disease: defaults::PLACEHOLDER_DISEASE.to_string(),
                risk_probability: risk_score,
                risk_level,
                threshold_used: defaults::THRESHOLD,
                is_high_risk,
                trend_signal: coalesce(self.trend_signal, defaults::TREND_SIGNAL),
                explanation: Explanation {
                    top_risk_factors,
                    top_protective_factors: Vec::new(),
                },
            }],
            data_quality: DataQuality {
                missing_fields: Vec::new(),
                inconsistent_fields: Vec::new(),
                confidence_note: defaults::CONVERTED_NOTE.to_string(),
            },
            recommendations: defaults::recommendations(),
            disclaimer: defaults::DISCLAIMER.to_string(),
        }
    }
}

fn lenient_field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    obj.get(key).and_then(|v| T::deserialize(v).ok())
}

/// A prediction response of either known shape.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionResponse {
    Canonical(PredictionResult),
    Legacy(LegacyPredictionResult),
}

impl PredictionResponse {
    /// Decode a response body.
    ///
    /// Objects carrying an `overall` object are decoded as canonical; anything
    /// else, including a canonical decode failure, goes through the lenient
    /// legacy decoder. Never fails.
    #[must_use]
    pub fn parse(value: &Value) -> Self {
        if value.get("overall").is_some_and(Value::is_object) {
            match PredictionResult::deserialize(value) {
                Ok(result) => return Self::Canonical(result),
                Err(e) => {
                    tracing::warn!("Canonical result did not decode, treating as legacy: {}", e);
                }
            }
        }
        Self::Legacy(LegacyPredictionResult::from_value(value))
    }

    #[must_use]
    pub fn into_canonical(self) -> PredictionResult {
        match self {
            Self::Canonical(result) => result,
            Self::Legacy(legacy) => legacy.into_canonical(),
        }
    }
}

/// Normalise a response body of unknown shape to the canonical result.
#[must_use]
pub fn normalize(value: &Value) -> PredictionResult {
    PredictionResponse::parse(value).into_canonical()
}

/// Title-case an identifier for display: `bmi_prev` becomes `Bmi Prev`.
#[must_use]
pub fn display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_is_word = false;
    for c in name.chars() {
        let c = if c == '_' { ' ' } else { c };
        let is_word = c.is_alphanumeric();
        if is_word && !prev_is_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}
