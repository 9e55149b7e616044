//! Domain layer: Core intake and result types.
//!
//! Pure types and functions with no I/O. Everything here is deterministic and
//! tested in isolation.

pub mod form;
pub mod payload;
pub mod prediction;
pub mod summary;
pub mod validation;

pub use form::{Field, FieldKind, FieldValue, FormValues, StepDefinition, StepView, LAST_STEP, STEPS};
pub use payload::PredictionPayload;
pub use prediction::{normalize, PredictionResponse, PredictionResult};
pub use summary::{ResultSummary, RiskBand, WhatIf};
pub use validation::{validate_fields, FormErrors};
