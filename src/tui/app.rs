//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration
//! - Background submission via worker thread

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::{
    HttpPredictionClient, MemoryStore, MockPredictionClient, SqliteStore, StorageError,
};
use crate::application::{resolve, HealthAdvisory, IntakeError, IntakeSession, IntroGate};
use crate::config::Config;
use crate::domain::{Field, FieldValue, FormValues, PredictionResult, ResultSummary};
use crate::ports::{KeyValueStore, PredictionService};

use super::ui::{
    intake::{backspaced, cycled, render_intake, typed, IntakeCursor},
    render_disclaimer,
    results::{render_results, WhatIfPanel},
    splash::render_splash,
};
use super::worker::{SubmissionHandle, SubmissionProgress, SubmissionWorker};

/// Store shared by the session and the result/intro helpers.
pub type SharedStore = Arc<dyn KeyValueStore<Error = StorageError>>;

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    Intake,
    Results,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    store: SharedStore,

    client: Arc<dyn PredictionService>,

    /// Startup health probe outcome
    health: HealthAdvisory,

    intro: IntroGate,

    /// Intake form state
    session: IntakeSession<SharedStore>,

    cursor: IntakeCursor,

    /// Result on screen, if any
    summary: Option<ResultSummary>,

    what_if: WhatIfPanel,

    /// Pending submission worker (if running)
    pending_worker: Option<SubmissionHandle>,

    /// Frame counter for the submitting animation
    tick: usize,
}

impl App {
    /// Create a new application instance from configuration.
    ///
    /// Falls back to an in-memory store if the database cannot be opened.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> crate::Result<Self> {
        let store: SharedStore = match SqliteStore::new(&config.db_path) {
            Ok(sqlite) => Arc::new(sqlite),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %config.db_path.display(),
                    "Failed to open database, answers will not survive a restart"
                );
                Arc::new(MemoryStore::new())
            }
        };

        let (client, health) = if config.mock_api {
            tracing::info!("Using mock prediction service");
            let client: Arc<dyn PredictionService> = Arc::new(MockPredictionClient::new());
            (client, HealthAdvisory::Skipped)
        } else {
            let http = HttpPredictionClient::new(&config.api_base_url, config.request_timeout_secs)?;
            let health = HealthAdvisory::check(&http);
            let client: Arc<dyn PredictionService> = Arc::new(http);
            (client, health)
        };

        Ok(Self::with_dependencies(store, client, health))
    }

    /// Create application with injected dependencies (Composition Root pattern).
    #[must_use]
    pub fn with_dependencies(
        store: SharedStore,
        client: Arc<dyn PredictionService>,
        health: HealthAdvisory,
    ) -> Self {
        let intro = IntroGate::load(&store);
        let session = IntakeSession::load(store.clone());
        let screen = if intro.is_acknowledged() {
            Screen::Intake
        } else {
            Screen::Splash
        };

        Self {
            screen,
            should_quit: false,
            store,
            client,
            health,
            intro,
            session,
            cursor: IntakeCursor::default(),
            summary: None,
            what_if: WhatIfPanel::default(),
            pending_worker: None,
            tick: 0,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn session(&self) -> &IntakeSession<SharedStore> {
        &self.session
    }

    #[must_use]
    pub fn summary(&self) -> Option<&ResultSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            // Poll pending worker for progress updates
            self.poll_worker();
            if self.pending_worker.is_some() {
                self.tick = self.tick.wrapping_add(1);
            }

            terminal.draw(|f| self.draw(f))?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let content_area = chunks[0];
        let disclaimer_area = chunks[1];
        let health_warning = self.health.message();

        match (self.screen, &self.summary) {
            (Screen::Splash, _) => render_splash(f, content_area, health_warning.as_deref()),
            (Screen::Results, Some(summary)) => {
                render_results(f, content_area, summary, &self.what_if);
            }
            (Screen::Intake | Screen::Results, _) => render_intake(
                f,
                content_area,
                &self.session,
                &self.cursor,
                health_warning.as_deref(),
                self.tick,
            ),
        }

        let disclaimer = match self.screen {
            Screen::Results => self.summary.as_ref().map(|s| s.disclaimer.as_str()),
            _ => None,
        };
        render_disclaimer(f, disclaimer_area, disclaimer);
    }

    /// Poll the background worker for progress updates.
    pub fn poll_worker(&mut self) {
        // Process all available progress messages.
        while let Some(progress) = self.pending_worker.as_ref().and_then(SubmissionHandle::try_recv)
        {
            match progress {
                SubmissionProgress::Sending => {
                    tracing::debug!("Prediction request sent");
                }
                SubmissionProgress::Finished(outcome) => {
                    self.pending_worker = None;
                    self.tick = 0;
                    if let Ok(result) = self.session.finish_submission(outcome) {
                        self.show_result(&result);
                    }
                    break;
                }
            }
        }
    }

    fn show_result(&mut self, result: &PredictionResult) {
        self.summary = Some(ResultSummary::from_result(result));
        self.what_if = WhatIfPanel::default();
        self.screen = Screen::Results;
    }

    /// Dispatch one key press.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Splash => self.handle_splash_key(key),
            Screen::Intake => self.handle_intake_key(key, modifiers),
            Screen::Results => self.handle_results_key(key),
        }
    }

    fn handle_splash_key(&mut self, key: KeyCode) {
        if key == KeyCode::Enter {
            self.intro.acknowledge(&self.store);
            self.screen = Screen::Intake;
        }
    }

    fn handle_intake_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if self.session.is_submitting() {
            return;
        }

        let fields = self.session.current_step().fields;
        let field_count = fields.len();

        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('r') => {
                    if self.session.reset().is_ok() {
                        self.cursor.reset();
                    }
                }
                KeyCode::Char('s') => self.load_sample(),
                KeyCode::Char('o') => self.open_latest(),
                _ => {}
            }
            return;
        }

        let Some(&field) = fields.get(self.cursor.selected) else {
            self.cursor.reset();
            return;
        };
        let current = self.session.values().get(field);

        match key {
            KeyCode::Up | KeyCode::BackTab => self.cursor.prev(field_count),
            KeyCode::Down | KeyCode::Tab => self.cursor.next(field_count),
            KeyCode::Left => self.edit(field, cycled(field.kind(), &current, false)),
            KeyCode::Right => self.edit(field, cycled(field.kind(), &current, true)),
            KeyCode::Char(c) => self.edit(field, typed(field.kind(), &current, c)),
            KeyCode::Backspace => self.edit(field, backspaced(field.kind(), &current)),
            KeyCode::Delete => {
                if matches!(current, FieldValue::Text(_)) {
                    self.edit(field, Some(FieldValue::Text(String::new())));
                }
            }
            KeyCode::Enter => self.enter(),
            KeyCode::Esc => {
                if self.session.retreat().is_ok() {
                    self.cursor.reset();
                }
            }
            _ => {}
        }
    }

    fn edit(&mut self, field: Field, value: Option<FieldValue>) {
        let Some(value) = value else {
            return;
        };
        if let Err(e) = self.session.update_field(field, value) {
            tracing::warn!(error = %e, "Rejected field value");
        }
    }

    fn enter(&mut self) {
        if self.session.is_last_step() {
            match self.session.begin_submission() {
                Ok(payload) => {
                    self.pending_worker = Some(SubmissionWorker::spawn(self.client.clone(), payload));
                }
                Err(IntakeError::Incomplete(errors)) => {
                    tracing::debug!(missing = errors.len(), "Submission blocked");
                }
                Err(e) => tracing::warn!(error = %e, "Submission not started"),
            }
            return;
        }

        match self.session.advance() {
            Ok(_) => self.cursor.reset(),
            Err(IntakeError::Incomplete(errors)) => {
                tracing::debug!(missing = errors.len(), "Step incomplete");
            }
            Err(e) => tracing::warn!(error = %e, "Could not advance"),
        }
    }

    fn load_sample(&mut self) {
        let sample = FormValues::sample();
        for field in Field::ALL {
            self.edit(field, Some(sample.get(field)));
        }
        tracing::info!("Loaded sample answers");
    }

    fn open_latest(&mut self) {
        match resolve(None, &self.store) {
            Some(result) => self.show_result(&result),
            None => tracing::info!("No stored result to show"),
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.what_if.select_prev(),
            KeyCode::Down | KeyCode::Tab => self.what_if.select_next(),
            KeyCode::Left => self.what_if.adjust(false),
            KeyCode::Right => self.what_if.adjust(true),
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.screen = Screen::Intake;
            }
            _ => {}
        }
    }
}
