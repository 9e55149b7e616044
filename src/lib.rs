//! # RiskScreen
//!
//! Terminal intake for a chronic-disease risk prediction service.
//!
//! This crate provides:
//! - A three-step health questionnaire that survives restarts
//! - A client for the prediction service with mock mode for offline use
//! - Normalisation of canonical and legacy prediction responses
//! - A results view with a what-if simulator
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Form, payload, prediction and results types
//! - `ports`: Trait definitions for storage and the prediction service
//! - `adapters`: Concrete implementations (SQLite, HTTP, in-memory, mock)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{FormValues, PredictionResult, ResultSummary};

/// Result type for RiskScreen operations
pub type Result<T> = std::result::Result<T, RiskscreenError>;

/// Main error type for RiskScreen
#[derive(Debug, thiserror::Error)]
pub enum RiskscreenError {
    #[error("Prediction service client failed: {0}")]
    Prediction(#[from] ports::PredictionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
