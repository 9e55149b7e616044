//! Results view model.
//!
//! Derives everything the results screen shows from a canonical
//! [`PredictionResult`]: the gauge, disease cards, factor breakdown,
//! recommendations and the what-if simulator.

use serde_json::Value;

use super::prediction::{defaults, display_name, PredictionResult, RiskFactor};

/// Maximum number of disease cards shown.
pub const MAX_DISEASE_CARDS: usize = 5;

/// Gauge zone for an aggregate risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    /// Below 0.3
    Low,
    /// 0.3 up to 0.6
    Moderate,
    /// 0.6 and above
    High,
}

impl RiskBand {
    /// Band for a score, clamped to `0.0..=1.0` first.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        let score = clamp_unit(score);
        if score < 0.3 {
            Self::Low
        } else if score < 0.6 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - keep up current habits",
            Self::Moderate => "Moderate risk - follow-up recommended",
            Self::High => "High risk - consult a clinician soon",
        }
    }

    /// Gauge colour (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (102, 187, 106),     // #66BB6A
            Self::Moderate => (255, 167, 38), // #FFA726
            Self::High => (239, 83, 80),      // #EF5350
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// One disease card.
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseCard {
    pub name: String,
    pub probability_percent: i64,
    pub level: String,
    pub trend: String,
    pub trend_increasing: bool,
    pub is_high_risk: bool,
    /// Trend expressed on the 0-100 comparison axis.
    pub trend_axis: u8,
}

/// One row of the factor breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorLine {
    pub name: String,
    pub user_value: String,
    pub impact_percent: i64,
    pub direction: String,
}

impl FactorLine {
    fn from_factor(factor: &RiskFactor) -> Self {
        Self {
            name: display_name(&factor.factor_name),
            user_value: value_text(&factor.user_value),
            impact_percent: percent(factor.impact),
            direction: factor.direction.clone(),
        }
    }
}

/// Everything the results screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    /// Top-line score, whole percent.
    pub percent_score: i64,
    pub risk_level: String,
    pub band: RiskBand,
    /// Gauge fill, clamped to `0.0..=1.0`.
    pub gauge_ratio: f64,
    pub highest_risk_disease: String,
    /// Trend of the primary disease, if it reports one.
    pub trend_signal: Option<String>,
    pub trend_increasing: bool,
    pub data_quality_percent: i64,
    pub disease_cards: Vec<DiseaseCard>,
    pub risk_factors: Vec<FactorLine>,
    pub protective_factors: Vec<FactorLine>,
    pub explanation: String,
    pub recommendations: Vec<String>,
    pub confidence_note: String,
    pub missing_fields: Vec<String>,
    pub inconsistent_fields: Vec<String>,
    pub disclaimer: String,
}

impl ResultSummary {
    /// Build the view model. The first disease entry is the primary one.
    #[must_use]
    pub fn from_result(result: &PredictionResult) -> Self {
        let overall = &result.overall;
        let primary = result.disease_risks.first();

        let trend_signal = primary
            .map(|d| d.trend_signal.clone())
            .filter(|t| !t.is_empty());
        let trend_increasing = trend_signal
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains("increase"));

        let risk_factors: Vec<FactorLine> = primary
            .map(|d| d.explanation.top_risk_factors.iter().map(FactorLine::from_factor).collect())
            .unwrap_or_default();
        let protective_factors = primary
            .map(|d| {
                d.explanation
                    .top_protective_factors
                    .iter()
                    .map(FactorLine::from_factor)
                    .collect()
            })
            .unwrap_or_default();

        let disease_cards = result
            .disease_risks
            .iter()
            .take(MAX_DISEASE_CARDS)
            .map(|d| {
                let trend = non_empty_or(&d.trend_signal, defaults::TREND_SIGNAL);
                DiseaseCard {
                    name: if d.disease.is_empty() {
                        "N/A".to_string()
                    } else {
                        display_name(&d.disease)
                    },
                    probability_percent: percent(d.risk_probability),
                    level: non_empty_or(&d.risk_level, "N/A"),
                    trend_increasing: trend.to_lowercase().contains("increase"),
                    trend_axis: trend_axis(&trend),
                    trend,
                    is_high_risk: d.is_high_risk,
                }
            })
            .collect();

        let recommendations = if result.recommendations.is_empty() {
            defaults::recommendations()
        } else {
            result.recommendations.clone()
        };

        Self {
            percent_score: percent(overall.risk_score),
            risk_level: non_empty_or(&overall.risk_level, defaults::RISK_LEVEL),
            band: RiskBand::from_score(overall.risk_score),
            gauge_ratio: clamp_unit(overall.risk_score),
            highest_risk_disease: if overall.highest_risk_disease.is_empty() {
                "N/A".to_string()
            } else {
                display_name(&overall.highest_risk_disease)
            },
            trend_signal,
            trend_increasing,
            data_quality_percent: percent(overall.data_quality_score),
            disease_cards,
            explanation: explanation_text(&risk_factors),
            risk_factors,
            protective_factors,
            recommendations,
            confidence_note: non_empty_or(&result.data_quality.confidence_note, "No note provided."),
            missing_fields: result.data_quality.missing_fields.clone(),
            inconsistent_fields: result.data_quality.inconsistent_fields.clone(),
            disclaimer: non_empty_or(&result.disclaimer, defaults::DISCLAIMER),
        }
    }
}

/// Sentence naming the leading risk drivers.
fn explanation_text(factors: &[FactorLine]) -> String {
    match factors {
        [] => "No drivers reported for this disease.".to_string(),
        [a] => format!("Your risk is primarily rising due to {}.", a.name),
        [a, b] => format!("Your risk is primarily rising due to {} and {}.", a.name, b.name),
        [a, b, c, ..] => format!(
            "Your risk is primarily rising due to {}, {} and {}.",
            a.name, b.name, c.name
        ),
    }
}

fn trend_axis(trend: &str) -> u8 {
    let trend = trend.to_lowercase();
    if trend.contains("increase") {
        90
    } else if trend.contains("decre") {
        40
    } else {
        65
    }
}

/// Lifestyle adjustments explored on the results screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhatIf {
    pub sleep_hours: f64,
    pub activity_days: f64,
    pub stress_level: f64,
}

impl WhatIf {
    pub const SLEEP_RANGE: (f64, f64) = (4.0, 10.0);
    pub const ACTIVITY_RANGE: (f64, f64) = (0.0, 7.0);
    pub const STRESS_RANGE: (f64, f64) = (1.0, 10.0);
}

impl Default for WhatIf {
    /// The baseline: no adjustment.
    fn default() -> Self {
        Self {
            sleep_hours: 7.0,
            activity_days: 4.0,
            stress_level: 5.0,
        }
    }
}

/// Adjusted score for the what-if inputs, clamped to `0.0..=1.0`.
///
/// Each delta is subtracted from the base score: less sleep, fewer active
/// days and more stress than the baseline lower it.
#[must_use]
pub fn what_if_score(base_score: f64, inputs: &WhatIf) -> f64 {
    let baseline = WhatIf::default();
    let sleep_delta = (baseline.sleep_hours - inputs.sleep_hours) * 0.02;
    let activity_delta = (baseline.activity_days - inputs.activity_days) * 0.025;
    let stress_delta = (inputs.stress_level - baseline.stress_level) * 0.03;
    clamp_unit(base_score - sleep_delta - activity_delta - stress_delta)
}

/// Difference between the what-if score and the base score, whole percent.
#[must_use]
pub fn what_if_delta_percent(base_score: f64, what_if: f64) -> i64 {
    percent(what_if - base_score)
}

/// Ratio to whole percent, rounding halves upward.
#[must_use]
pub fn percent(ratio: f64) -> i64 {
    (ratio * 100.0 + 0.5).floor() as i64
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "n/a".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::normalize;
    use serde_json::json;

    fn canonical(score: f64, level: &str) -> PredictionResult {
        normalize(&json!({
            "overall": {
                "risk_score": score,
                "risk_level": level,
                "highest_risk_disease": "hibpe",
                "data_quality_score": 0.84
            },
            "disease_risks": [
                {
                    "disease": "hibpe",
                    "risk_probability": 0.74,
                    "risk_level": "High",
                    "is_high_risk": true,
                    "trend_signal": "increasing",
                    "explanation": {
                        "top_risk_factors": [
                            {"factor_name": "bmi_prev", "user_value": 33.1, "impact": 0.18, "direction": "up"},
                            {"factor_name": "other_disease_count_prev", "user_value": 2, "impact": 0.13, "direction": "up"},
                            {"factor_name": "sleep_hours_prev", "user_value": 5.5, "impact": 0.08, "direction": "down"}
                        ],
                        "top_protective_factors": [
                            {"factor_name": "walks_prev", "user_value": 1, "impact": 0.05, "direction": "down"}
                        ]
                    }
                },
                {"disease": "diabe", "risk_probability": 0.58, "risk_level": "Moderate", "trend_signal": "decreasing"},
                {"disease": "stroke", "risk_probability": 0.37, "risk_level": ""}
            ],
            "recommendations": []
        }))
    }

    #[test]
    fn test_top_line_percentage() {
        let summary = ResultSummary::from_result(&canonical(0.61, "High"));
        assert_eq!(summary.percent_score, 61);
        assert_eq!(summary.risk_level, "High");
        assert_eq!(summary.band, RiskBand::High);
        assert_eq!(summary.data_quality_percent, 84);
        assert_eq!(summary.highest_risk_disease, "Hibpe");
    }

    #[test]
    fn test_primary_disease_drives_trend_and_factors() {
        let summary = ResultSummary::from_result(&canonical(0.61, "High"));
        assert_eq!(summary.trend_signal.as_deref(), Some("increasing"));
        assert!(summary.trend_increasing);
        assert_eq!(summary.risk_factors.len(), 3);
        assert_eq!(summary.risk_factors[0].name, "Bmi Prev");
        assert_eq!(summary.risk_factors[0].user_value, "33.1");
        assert_eq!(summary.risk_factors[0].impact_percent, 18);
        assert_eq!(summary.protective_factors.len(), 1);
        assert_eq!(
            summary.explanation,
            "Your risk is primarily rising due to Bmi Prev, Other Disease Count Prev and Sleep Hours Prev."
        );
    }

    #[test]
    fn test_disease_cards() {
        let summary = ResultSummary::from_result(&canonical(0.61, "High"));
        let cards = &summary.disease_cards;
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].probability_percent, 74);
        assert_eq!(cards[0].trend_axis, 90);
        assert_eq!(cards[1].name, "Diabe");
        assert_eq!(cards[1].trend_axis, 40);
        assert!(!cards[1].trend_increasing);
        assert_eq!(cards[2].level, "N/A");
        assert_eq!(cards[2].trend, "stable");
        assert_eq!(cards[2].trend_axis, 65);
    }

    #[test]
    fn test_fallbacks_for_empty_fields() {
        let summary = ResultSummary::from_result(&canonical(0.2, ""));
        assert_eq!(summary.risk_level, "Unknown");
        assert_eq!(summary.band, RiskBand::Low);
        assert_eq!(summary.recommendations, defaults::recommendations());
        assert_eq!(summary.confidence_note, "No note provided.");
        assert_eq!(summary.disclaimer, defaults::DISCLAIMER);
    }

    #[test]
    fn test_legacy_result_summary() {
        let result = normalize(&json!({"risk_score": 0.4, "risk_level": "Moderate", "top_factors": [{"name": "bmi", "impact": 0.2}]}));
        let summary = ResultSummary::from_result(&result);
        assert_eq!(summary.percent_score, 40);
        assert_eq!(summary.band, RiskBand::Moderate);
        assert_eq!(summary.trend_signal.as_deref(), Some("stable"));
        assert!(!summary.trend_increasing);
        assert_eq!(summary.explanation, "Your risk is primarily rising due to Bmi.");
    }

    #[test]
    fn test_no_diseases() {
        let result = normalize(&json!({"overall": {"risk_score": 0.5}}));
        let summary = ResultSummary::from_result(&result);
        assert!(summary.disease_cards.is_empty());
        assert!(summary.trend_signal.is_none());
        assert_eq!(summary.explanation, "No drivers reported for this disease.");
    }

    #[test]
    fn test_band_thresholds_and_clamping() {
        assert_eq!(RiskBand::from_score(0.29), RiskBand::Low);
        assert_eq!(RiskBand::from_score(0.3), RiskBand::Moderate);
        assert_eq!(RiskBand::from_score(0.6), RiskBand::High);
        assert_eq!(RiskBand::from_score(-2.0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(7.0), RiskBand::High);
        assert_eq!(RiskBand::from_score(f64::NAN), RiskBand::Low);
    }

    #[test]
    fn test_what_if() {
        let base = 0.61;
        assert!((what_if_score(base, &WhatIf::default()) - base).abs() < 1e-9);

        let rested = WhatIf {
            sleep_hours: 8.0,
            activity_days: 6.0,
            stress_level: 3.0,
        };
        let score = what_if_score(base, &rested);
        assert!((score - (0.61 + 0.02 + 0.05 + 0.06)).abs() < 1e-9);
        assert_eq!(what_if_delta_percent(base, score), 13);

        let strained = WhatIf {
            sleep_hours: 4.0,
            activity_days: 0.0,
            stress_level: 10.0,
        };
        let score = what_if_score(base, &strained);
        assert!((score - (0.61 - 0.06 - 0.1 - 0.15)).abs() < 1e-9);
        assert_eq!(what_if_score(0.2, &strained), 0.0);
    }

    #[test]
    fn test_what_if_clamps_at_one() {
        let maxed = WhatIf {
            sleep_hours: 10.0,
            activity_days: 7.0,
            stress_level: 1.0,
        };
        assert_eq!(what_if_score(0.9, &maxed), 1.0);
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(0.61), 61);
        assert_eq!(percent(0.005), 1);
        assert_eq!(percent(0.0), 0);
    }
}
