//! Intake form model.
//!
//! Defines the closed set of intake fields, their semantic kinds and UI hints,
//! the raw values the user edits, and the grouping of fields into the three
//! ordered intake steps.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Default stress level (mid-scale "Baseline" mark of the 1-5 slider).
pub const DEFAULT_STRESS_LEVEL: u8 = 3;

/// Inclusive bounds of the stress slider.
pub const STRESS_LEVEL_RANGE: (u8, u8) = (1, 5);

const SEX_OPTIONS: &[&str] = &["Female", "Male", "Intersex / Other", "Prefer not to say"];
const EDUCATION_OPTIONS: &[&str] = &[
    "High school / GED",
    "Associate degree",
    "Bachelor's",
    "Master's",
    "Doctorate",
];
const EMPLOYMENT_OPTIONS: &[&str] = &[
    "Employed",
    "Self-employed",
    "Unemployed",
    "Retired",
    "Student",
    "Caregiver",
];
const MARITAL_OPTIONS: &[&str] = &["Single", "Married", "Partnered", "Divorced", "Widowed"];
const WEIGHT_CHANGE_OPTIONS: &[&str] = &[
    "Stable (<2kg)",
    "Gained 2-5kg",
    "Gained >5kg",
    "Lost 2-5kg",
    "Lost >5kg",
];
const SMOKING_OPTIONS: &[&str] = &["Never", "Former", "Occasional", "Daily"];
const ALCOHOL_OPTIONS: &[&str] = &["None", "Monthly", "Weekly", "Daily"];

/// Intake fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Age,
    Sex,
    EducationLevel,
    EmploymentStatus,
    MaritalStatus,
    Bmi,
    SystolicBp,
    DiastolicBp,
    RestingHeartRate,
    ChronicConditionsCount,
    RecentWeightChange,
    PhysicalActivityDaysPerWeek,
    SleepHoursAvg,
    SmokingStatus,
    AlcoholFrequency,
    StressLevel,
    DepressiveSymptomsScore,
}

/// Semantic kind of a field.
///
/// Numeric bounds are display hints for the input widgets. They are not
/// enforced by step validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Whole number entered as text.
    Integer { min: f64, max: Option<f64> },
    /// Decimal number entered as text.
    Decimal { min: f64, max: Option<f64>, step: f64 },
    /// Bounded integer picked on a slider.
    Scale { min: u8, max: u8 },
    /// One of a fixed list of labels.
    Choice(&'static [&'static str]),
}

impl FieldKind {
    /// Whether the payload formatter coerces this field to a number.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Choice(_))
    }

    /// Options for choice fields, empty otherwise.
    #[must_use]
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            Self::Choice(options) => options,
            _ => &[],
        }
    }
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Field; 17] = [
        Field::Age,
        Field::Sex,
        Field::EducationLevel,
        Field::EmploymentStatus,
        Field::MaritalStatus,
        Field::Bmi,
        Field::SystolicBp,
        Field::DiastolicBp,
        Field::RestingHeartRate,
        Field::ChronicConditionsCount,
        Field::RecentWeightChange,
        Field::PhysicalActivityDaysPerWeek,
        Field::SleepHoursAvg,
        Field::SmokingStatus,
        Field::AlcoholFrequency,
        Field::StressLevel,
        Field::DepressiveSymptomsScore,
    ];

    /// Wire name (snake_case), shared by the stored snapshot and the request.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Sex => "sex",
            Self::EducationLevel => "education_level",
            Self::EmploymentStatus => "employment_status",
            Self::MaritalStatus => "marital_status",
            Self::Bmi => "bmi",
            Self::SystolicBp => "systolic_bp",
            Self::DiastolicBp => "diastolic_bp",
            Self::RestingHeartRate => "resting_heart_rate",
            Self::ChronicConditionsCount => "chronic_conditions_count",
            Self::RecentWeightChange => "recent_weight_change",
            Self::PhysicalActivityDaysPerWeek => "physical_activity_days_per_week",
            Self::SleepHoursAvg => "sleep_hours_avg",
            Self::SmokingStatus => "smoking_status",
            Self::AlcoholFrequency => "alcohol_frequency",
            Self::StressLevel => "stress_level",
            Self::DepressiveSymptomsScore => "depressive_symptoms_score",
        }
    }

    /// Look a field up by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Sex => "Sex",
            Self::EducationLevel => "Education Level",
            Self::EmploymentStatus => "Employment Status",
            Self::MaritalStatus => "Marital Status",
            Self::Bmi => "BMI",
            Self::SystolicBp => "Systolic BP",
            Self::DiastolicBp => "Diastolic BP",
            Self::RestingHeartRate => "Resting Heart Rate",
            Self::ChronicConditionsCount => "Chronic Conditions",
            Self::RecentWeightChange => "Recent Weight Change",
            Self::PhysicalActivityDaysPerWeek => "Active Days / Week",
            Self::SleepHoursAvg => "Average Sleep",
            Self::SmokingStatus => "Smoking Status",
            Self::AlcoholFrequency => "Alcohol Frequency",
            Self::StressLevel => "Stress Level",
            Self::DepressiveSymptomsScore => "Depressive Symptoms",
        }
    }

    /// Helper text shown under an empty input.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Age => "years",
            Self::Sex => "as recorded clinically",
            Self::EducationLevel => "highest completed",
            Self::EmploymentStatus => "current status",
            Self::MaritalStatus => "current status",
            Self::Bmi => "kg/m²",
            Self::SystolicBp => "mmHg (50-260)",
            Self::DiastolicBp => "mmHg (30-180)",
            Self::RestingHeartRate => "beats per minute",
            Self::ChronicConditionsCount => "diagnosed conditions (0-20)",
            Self::RecentWeightChange => "last 6 months",
            Self::PhysicalActivityDaysPerWeek => "days with 30+ min activity (0-7)",
            Self::SleepHoursAvg => "hours per night (0-14)",
            Self::SmokingStatus => "current tobacco exposure",
            Self::AlcoholFrequency => "typical cadence",
            Self::StressLevel => "1 calm, 3 baseline, 5 acute",
            Self::DepressiveSymptomsScore => "PHQ-9 score (0-27)",
        }
    }

    /// Semantic kind, including the UI range hints.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Age => FieldKind::Integer { min: 0.0, max: None },
            Self::Sex => FieldKind::Choice(SEX_OPTIONS),
            Self::EducationLevel => FieldKind::Choice(EDUCATION_OPTIONS),
            Self::EmploymentStatus => FieldKind::Choice(EMPLOYMENT_OPTIONS),
            Self::MaritalStatus => FieldKind::Choice(MARITAL_OPTIONS),
            Self::Bmi => FieldKind::Decimal {
                min: 0.0,
                max: None,
                step: 0.1,
            },
            Self::SystolicBp => FieldKind::Integer {
                min: 50.0,
                max: Some(260.0),
            },
            Self::DiastolicBp | Self::RestingHeartRate => FieldKind::Integer {
                min: 30.0,
                max: Some(180.0),
            },
            Self::ChronicConditionsCount => FieldKind::Integer {
                min: 0.0,
                max: Some(20.0),
            },
            Self::RecentWeightChange => FieldKind::Choice(WEIGHT_CHANGE_OPTIONS),
            Self::PhysicalActivityDaysPerWeek => FieldKind::Integer {
                min: 0.0,
                max: Some(7.0),
            },
            Self::SleepHoursAvg => FieldKind::Decimal {
                min: 0.0,
                max: Some(14.0),
                step: 0.5,
            },
            Self::SmokingStatus => FieldKind::Choice(SMOKING_OPTIONS),
            Self::AlcoholFrequency => FieldKind::Choice(ALCOHOL_OPTIONS),
            Self::StressLevel => FieldKind::Scale {
                min: STRESS_LEVEL_RANGE.0,
                max: STRESS_LEVEL_RANGE.1,
            },
            Self::DepressiveSymptomsScore => FieldKind::Integer {
                min: 0.0,
                max: Some(27.0),
            },
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single field value as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Raw text (numeric fields included).
    Text(String),
    /// Slider level.
    Level(u8),
}

impl FieldValue {
    /// Whether the value counts as "not filled in".
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        Self::Level(value)
    }
}

/// Rejected assignment to the stress slider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be a level between {min} and {max}, got {value:?}")]
pub struct FieldValueError {
    pub field: Field,
    pub value: String,
    pub min: u8,
    pub max: u8,
}

/// Raw intake values. Every field is always present.
///
/// Deserialising a partial snapshot fills the missing keys with defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormValues {
    pub age: String,
    pub sex: String,
    pub education_level: String,
    pub employment_status: String,
    pub marital_status: String,
    pub bmi: String,
    pub systolic_bp: String,
    pub diastolic_bp: String,
    pub resting_heart_rate: String,
    pub chronic_conditions_count: String,
    pub recent_weight_change: String,
    pub physical_activity_days_per_week: String,
    pub sleep_hours_avg: String,
    pub smoking_status: String,
    pub alcohol_frequency: String,
    pub stress_level: u8,
    pub depressive_symptoms_score: String,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            age: String::new(),
            sex: String::new(),
            education_level: String::new(),
            employment_status: String::new(),
            marital_status: String::new(),
            bmi: String::new(),
            systolic_bp: String::new(),
            diastolic_bp: String::new(),
            resting_heart_rate: String::new(),
            chronic_conditions_count: String::new(),
            recent_weight_change: String::new(),
            physical_activity_days_per_week: String::new(),
            sleep_hours_avg: String::new(),
            smoking_status: String::new(),
            alcohol_frequency: String::new(),
            stress_level: DEFAULT_STRESS_LEVEL,
            depressive_symptoms_score: String::new(),
        }
    }
}

impl FormValues {
    /// Parse a stored JSON snapshot, merging it over the defaults.
    ///
    /// An out-of-range stress level in the snapshot is reset to the default.
    ///
    /// # Errors
    /// Returns error if the snapshot is not a JSON object of the expected shape.
    pub fn from_snapshot(raw: &str) -> Result<Self, serde_json::Error> {
        let mut values: Self = serde_json::from_str(raw)?;
        if !level_in_range(values.stress_level) {
            values.stress_level = DEFAULT_STRESS_LEVEL;
        }
        Ok(values)
    }

    /// Serialise to the stored JSON snapshot.
    ///
    /// # Errors
    /// Returns error if serialisation fails.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Current value of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> FieldValue {
        match self.text(field) {
            Some(text) => FieldValue::Text(text.to_string()),
            None => FieldValue::Level(self.stress_level),
        }
    }

    /// Text of a text-backed field; `None` for the stress slider.
    #[must_use]
    pub fn text(&self, field: Field) -> Option<&str> {
        let text = match field {
            Field::Age => &self.age,
            Field::Sex => &self.sex,
            Field::EducationLevel => &self.education_level,
            Field::EmploymentStatus => &self.employment_status,
            Field::MaritalStatus => &self.marital_status,
            Field::Bmi => &self.bmi,
            Field::SystolicBp => &self.systolic_bp,
            Field::DiastolicBp => &self.diastolic_bp,
            Field::RestingHeartRate => &self.resting_heart_rate,
            Field::ChronicConditionsCount => &self.chronic_conditions_count,
            Field::RecentWeightChange => &self.recent_weight_change,
            Field::PhysicalActivityDaysPerWeek => &self.physical_activity_days_per_week,
            Field::SleepHoursAvg => &self.sleep_hours_avg,
            Field::SmokingStatus => &self.smoking_status,
            Field::AlcoholFrequency => &self.alcohol_frequency,
            Field::StressLevel => return None,
            Field::DepressiveSymptomsScore => &self.depressive_symptoms_score,
        };
        Some(text.as_str())
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        let text = match field {
            Field::Age => &mut self.age,
            Field::Sex => &mut self.sex,
            Field::EducationLevel => &mut self.education_level,
            Field::EmploymentStatus => &mut self.employment_status,
            Field::MaritalStatus => &mut self.marital_status,
            Field::Bmi => &mut self.bmi,
            Field::SystolicBp => &mut self.systolic_bp,
            Field::DiastolicBp => &mut self.diastolic_bp,
            Field::RestingHeartRate => &mut self.resting_heart_rate,
            Field::ChronicConditionsCount => &mut self.chronic_conditions_count,
            Field::RecentWeightChange => &mut self.recent_weight_change,
            Field::PhysicalActivityDaysPerWeek => &mut self.physical_activity_days_per_week,
            Field::SleepHoursAvg => &mut self.sleep_hours_avg,
            Field::SmokingStatus => &mut self.smoking_status,
            Field::AlcoholFrequency => &mut self.alcohol_frequency,
            Field::StressLevel => return None,
            Field::DepressiveSymptomsScore => &mut self.depressive_symptoms_score,
        };
        Some(text)
    }

    /// Assign a field.
    ///
    /// Levels assigned to text fields are stored as their decimal text. Text
    /// assigned to the stress slider must parse as a level in range.
    ///
    /// # Errors
    /// Returns error if the stress slider receives an unparseable or
    /// out-of-range value.
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), FieldValueError> {
        if let Some(text) = self.text_mut(field) {
            *text = match value {
                FieldValue::Text(s) => s,
                FieldValue::Level(n) => n.to_string(),
            };
            return Ok(());
        }

        let raw = match &value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Level(n) => n.to_string(),
        };
        let level = match value {
            FieldValue::Level(n) => Some(n),
            FieldValue::Text(s) => s.trim().parse::<u8>().ok(),
        };

        match level {
            Some(n) if level_in_range(n) => {
                self.stress_level = n;
                Ok(())
            }
            _ => Err(FieldValueError {
                field,
                value: raw,
                min: STRESS_LEVEL_RANGE.0,
                max: STRESS_LEVEL_RANGE.1,
            }),
        }
    }

    /// Overwrite every text buffer in place and restore the defaults.
    pub fn wipe(&mut self) {
        for field in Field::ALL {
            if let Some(text) = self.text_mut(field) {
                text.zeroize();
            }
        }
        self.stress_level = DEFAULT_STRESS_LEVEL;
    }

    /// A complete, plausible intake used for demos.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            age: "52".to_string(),
            sex: "Female".to_string(),
            education_level: "Bachelor's".to_string(),
            employment_status: "Employed".to_string(),
            marital_status: "Married".to_string(),
            bmi: "31.4".to_string(),
            systolic_bp: "142".to_string(),
            diastolic_bp: "91".to_string(),
            resting_heart_rate: "78".to_string(),
            chronic_conditions_count: "2".to_string(),
            recent_weight_change: "Gained 2-5kg".to_string(),
            physical_activity_days_per_week: "1".to_string(),
            sleep_hours_avg: "5.5".to_string(),
            smoking_status: "Former".to_string(),
            alcohol_frequency: "Weekly".to_string(),
            stress_level: 4,
            depressive_symptoms_score: "8".to_string(),
        }
    }
}

fn level_in_range(level: u8) -> bool {
    (STRESS_LEVEL_RANGE.0..=STRESS_LEVEL_RANGE.1).contains(&level)
}

/// Rendering unit responsible for a step's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepView {
    Demographics,
    Vitals,
    Lifestyle,
}

/// One intake step: a label, the fields it owns and the view that renders them.
#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    pub label: &'static str,
    pub fields: &'static [Field],
    pub view: StepView,
}

/// The intake steps, in order. Each field belongs to exactly one step.
pub const STEPS: [StepDefinition; 3] = [
    StepDefinition {
        label: "Demographics",
        fields: &[
            Field::Age,
            Field::Sex,
            Field::EducationLevel,
            Field::EmploymentStatus,
            Field::MaritalStatus,
        ],
        view: StepView::Demographics,
    },
    StepDefinition {
        label: "Vitals & Physical",
        fields: &[
            Field::Bmi,
            Field::SystolicBp,
            Field::DiastolicBp,
            Field::RestingHeartRate,
            Field::ChronicConditionsCount,
            Field::RecentWeightChange,
        ],
        view: StepView::Vitals,
    },
    StepDefinition {
        label: "Lifestyle & Mental Health",
        fields: &[
            Field::PhysicalActivityDaysPerWeek,
            Field::SleepHoursAvg,
            Field::SmokingStatus,
            Field::AlcoholFrequency,
            Field::StressLevel,
            Field::DepressiveSymptomsScore,
        ],
        view: StepView::Lifestyle,
    },
];

/// Index of the final step.
pub const LAST_STEP: usize = STEPS.len() - 1;

/// Index of the step that owns `field`.
#[must_use]
pub fn step_of(field: Field) -> usize {
    STEPS
        .iter()
        .position(|step| step.fields.contains(&field))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_steps_partition_all_fields() {
        let mut seen = HashSet::new();
        for step in &STEPS {
            for field in step.fields {
                assert!(seen.insert(*field), "{field} appears in two steps");
            }
        }
        assert_eq!(seen.len(), Field::ALL.len());
        for field in Field::ALL {
            assert!(seen.contains(&field), "{field} is in no step");
        }
    }

    #[test]
    fn test_field_names_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
            let json = serde_json::to_string(&field).expect("Should serialize");
            assert_eq!(json, format!("\"{}\"", field.name()));
        }
        assert_eq!(Field::from_name("weight"), None);
    }

    #[test]
    fn test_defaults_are_blank_except_stress() {
        let values = FormValues::default();
        for field in Field::ALL {
            let value = values.get(field);
            if field == Field::StressLevel {
                assert_eq!(value, FieldValue::Level(DEFAULT_STRESS_LEVEL));
                assert!(!value.is_blank());
            } else {
                assert!(value.is_blank(), "{field} should default to blank");
            }
        }
    }

    #[test]
    fn test_partial_snapshot_merges_over_defaults() {
        let values = FormValues::from_snapshot(r#"{"age":"40","bmi":"22.5"}"#)
            .expect("Should parse partial snapshot");
        assert_eq!(values.age, "40");
        assert_eq!(values.bmi, "22.5");
        assert_eq!(values.sex, "");
        assert_eq!(values.stress_level, DEFAULT_STRESS_LEVEL);
    }

    #[test]
    fn test_snapshot_with_bad_stress_level_falls_back() {
        let values = FormValues::from_snapshot(r#"{"stress_level":9}"#).expect("Should parse");
        assert_eq!(values.stress_level, DEFAULT_STRESS_LEVEL);
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        assert!(FormValues::from_snapshot("{not json").is_err());
        assert!(FormValues::from_snapshot("[1,2,3]").is_err());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let values = FormValues::sample();
        let raw = values.to_snapshot().expect("Should serialize");
        assert_eq!(FormValues::from_snapshot(&raw).expect("Should parse"), values);
    }

    #[test]
    fn test_set_text_and_level() {
        let mut values = FormValues::default();
        values.set(Field::Age, "61".into()).expect("Should set age");
        assert_eq!(values.get(Field::Age), FieldValue::Text("61".to_string()));

        values.set(Field::ChronicConditionsCount, 2u8.into()).expect("Should set");
        assert_eq!(values.chronic_conditions_count, "2");

        values.set(Field::StressLevel, 5u8.into()).expect("Should set stress");
        assert_eq!(values.stress_level, 5);

        values.set(Field::StressLevel, " 2 ".into()).expect("Should parse stress text");
        assert_eq!(values.stress_level, 2);
    }

    #[test]
    fn test_stress_level_rejects_out_of_range() {
        let mut values = FormValues::default();
        let err = values
            .set(Field::StressLevel, 0u8.into())
            .expect_err("0 is below the scale");
        assert_eq!(err.field, Field::StressLevel);
        assert!(values.set(Field::StressLevel, "high".into()).is_err());
        assert_eq!(values.stress_level, DEFAULT_STRESS_LEVEL);
    }

    #[test]
    fn test_wipe_restores_defaults() {
        let mut values = FormValues::sample();
        values.wipe();
        assert_eq!(values, FormValues::default());
    }

    #[test]
    fn test_kinds() {
        assert!(Field::Bmi.kind().is_numeric());
        assert!(Field::StressLevel.kind().is_numeric());
        assert!(!Field::SmokingStatus.kind().is_numeric());
        assert_eq!(Field::SmokingStatus.kind().options().len(), 4);
        assert!(Field::Age.kind().options().is_empty());
        assert_eq!(step_of(Field::StressLevel), LAST_STEP);
        assert_eq!(step_of(Field::Age), 0);
    }
}
