//! RiskScreen: Health risk screening terminal
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use riskscreen::adapters::sanitize::SanitizingMakeWriter;
use riskscreen::config::{Config, LogMode};
use riskscreen::tui::App;

fn main() -> Result<()> {
    let config = Config::from_env()?;
    let _guard = init_logging(&config)?;

    tracing::info!(
        api = %config.api_base_url,
        mock = config.mock_api,
        "Starting RiskScreen..."
    );

    let mut app = App::new(&config)?;
    app.run()?;

    tracing::info!("RiskScreen shutdown complete.");
    Ok(())
}

/// Install the global subscriber.
///
/// IMPORTANT: writing logs to the terminal will corrupt the TUI (alternate screen).
/// Auto mode logs to a file on an interactive TTY and to stdout otherwise.
fn init_logging(config: &Config) -> riskscreen::Result<WorkerGuard> {
    let use_file = match config.log_mode {
        LogMode::File => true,
        LogMode::Stdout => false,
        LogMode::Auto => std::io::stdout().is_terminal(),
    };

    let (writer, guard) = if use_file {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    Ok(guard)
}
