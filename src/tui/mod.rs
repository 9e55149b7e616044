//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides the screening interface:
//! - Intro screen
//! - Multi-step intake form
//! - Results with a what-if simulator

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen, SharedStore};
pub use styles::ScreeningTheme;
pub use worker::{SubmissionHandle, SubmissionProgress, SubmissionWorker};
