//! Multi-step intake form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

use super::{key_hints, render_footer, render_header};
use crate::application::IntakeSession;
use crate::domain::form::STRESS_LEVEL_RANGE;
use crate::domain::{Field, FieldKind, FieldValue, FormValues, StepView, STEPS};
use crate::ports::KeyValueStore;
use crate::tui::styles::ScreeningTheme;

/// Which field of the active step has focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IntakeCursor {
    pub selected: usize,
}

impl IntakeCursor {
    pub fn next(&mut self, field_count: usize) {
        if field_count > 0 {
            self.selected = (self.selected + 1) % field_count;
        }
    }

    pub fn prev(&mut self, field_count: usize) {
        if field_count == 0 {
            return;
        }
        if self.selected == 0 {
            self.selected = field_count - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn reset(&mut self) {
        self.selected = 0;
    }
}

/// New value after typing `c` into a numeric field. Other kinds ignore typing.
#[must_use]
pub fn typed(kind: FieldKind, current: &FieldValue, c: char) -> Option<FieldValue> {
    let accepts = match kind {
        FieldKind::Integer { .. } => c.is_ascii_digit() || c == '-',
        FieldKind::Decimal { .. } => c.is_ascii_digit() || c == '.' || c == '-',
        FieldKind::Scale { .. } | FieldKind::Choice(_) => false,
    };
    match current {
        FieldValue::Text(text) if accepts => Some(FieldValue::Text(format!("{text}{c}"))),
        _ => None,
    }
}

/// New value after Backspace. Only text fields shrink.
#[must_use]
pub fn backspaced(kind: FieldKind, current: &FieldValue) -> Option<FieldValue> {
    match (kind, current) {
        (FieldKind::Integer { .. } | FieldKind::Decimal { .. }, FieldValue::Text(text))
            if !text.is_empty() =>
        {
            let mut text = text.clone();
            text.pop();
            Some(FieldValue::Text(text))
        }
        _ => None,
    }
}

/// New value after Left/Right: cycles choices, steps the slider.
#[must_use]
pub fn cycled(kind: FieldKind, current: &FieldValue, forward: bool) -> Option<FieldValue> {
    match (kind, current) {
        (FieldKind::Choice(options), FieldValue::Text(text)) if !options.is_empty() => {
            let next = match options.iter().position(|o| o == text) {
                None if forward => 0,
                None => options.len() - 1,
                Some(i) if forward => (i + 1) % options.len(),
                Some(0) => options.len() - 1,
                Some(i) => i - 1,
            };
            Some(FieldValue::Text(options[next].to_string()))
        }
        (FieldKind::Scale { min, max }, FieldValue::Level(level)) => {
            let next = if forward {
                level.saturating_add(1).min(max)
            } else {
                level.saturating_sub(1).max(min)
            };
            (next != *level).then_some(FieldValue::Level(next))
        }
        _ => None,
    }
}

/// Render the intake form for the session's active step.
pub fn render_intake<S: KeyValueStore>(
    f: &mut Frame,
    area: Rect,
    session: &IntakeSession<S>,
    cursor: &IntakeCursor,
    health_warning: Option<&str>,
    spinner_tick: usize,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(4), // Messages
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let step = session.current_step();
    render_header(
        f,
        chunks[0],
        "Health Risk Intake",
        &format!("Step {} of {}: {}", session.step() + 1, STEPS.len(), step.label),
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(chunks[1]);

    render_step_list(f, body[0], session.step());
    render_fields(f, body[1], session, cursor);
    render_messages(f, chunks[2], session, health_warning);
    render_intake_footer(f, chunks[3], session);

    if session.is_submitting() {
        render_submitting(f, chunks[1], spinner_tick);
    }
}

fn render_step_list(f: &mut Frame, area: Rect, current: usize) {
    let lines: Vec<Line> = STEPS
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let (marker, style) = if i < current {
                ("✓", ScreeningTheme::success())
            } else if i == current {
                ("▶", ScreeningTheme::focused())
            } else {
                (" ", ScreeningTheme::text_muted())
            };
            Line::from(vec![
                Span::styled(format!(" {marker} "), style),
                Span::styled(step.label, style),
            ])
        })
        .collect();

    let list = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" Steps ", ScreeningTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(ScreeningTheme::border()),
    );
    f.render_widget(list, area);
}

/// Panel title for a step's view.
#[must_use]
pub fn view_title(view: StepView) -> &'static str {
    match view {
        StepView::Demographics => " About you ",
        StepView::Vitals => " Vitals & measurements ",
        StepView::Lifestyle => " Habits & wellbeing ",
    }
}

/// Guidance line under the panel title, reflecting the current answers.
#[must_use]
pub fn view_caption(view: StepView, values: &FormValues) -> String {
    match view {
        StepView::Demographics => "Basic background used to calibrate the models.".to_string(),
        StepView::Vitals => {
            match (values.text(Field::SystolicBp), values.text(Field::DiastolicBp)) {
                (Some(sys), Some(dia)) if !sys.is_empty() && !dia.is_empty() => {
                    format!("Blood pressure {sys}/{dia} mmHg. Use your most recent reading.")
                }
                _ => "Use your most recent measurements.".to_string(),
            }
        }
        StepView::Lifestyle => format!(
            "Think about the past month. Stress is {} of {}.",
            values.stress_level, STRESS_LEVEL_RANGE.1
        ),
    }
}

fn render_fields<S: KeyValueStore>(
    f: &mut Frame,
    area: Rect,
    session: &IntakeSession<S>,
    cursor: &IntakeCursor,
) {
    let step = session.current_step();
    let fields = step.fields;

    let panel = Block::default()
        .title(Span::styled(view_title(step.view), ScreeningTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ScreeningTheme::border());
    let inner = panel.inner(area);
    f.render_widget(panel, area);

    let constraints: Vec<Constraint> = std::iter::once(Constraint::Length(1))
        .chain(fields.iter().map(|_| Constraint::Length(3)))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .horizontal_margin(1)
        .split(inner);

    f.render_widget(
        Paragraph::new(Span::styled(
            view_caption(step.view, session.values()),
            ScreeningTheme::text_muted(),
        )),
        rows[0],
    );
    let chunks = &rows[1..];

    for (i, field) in fields.iter().enumerate() {
        let is_selected = i == cursor.selected;
        let error = session.errors().get(*field);

        let border_style = match (is_selected, error.is_some()) {
            (_, true) => ScreeningTheme::border_error(),
            (true, false) => ScreeningTheme::border_focused(),
            (false, false) => ScreeningTheme::border(),
        };
        let title_style = if is_selected {
            ScreeningTheme::focused()
        } else {
            ScreeningTheme::text_secondary()
        };

        let mut title = vec![Span::styled(format!(" {} ", field.label()), title_style)];
        if let Some(message) = error {
            title.push(Span::styled(format!("· {message} "), ScreeningTheme::danger()));
        }

        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        spans.extend(value_spans(*field, &session.values().get(*field), is_selected));

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn value_spans(field: Field, value: &FieldValue, is_selected: bool) -> Vec<Span<'static>> {
    match (field.kind(), value) {
        (FieldKind::Scale { min, max }, FieldValue::Level(level)) => {
            let dots: String = (min..=max)
                .map(|n| if n <= *level { '●' } else { '○' })
                .collect();
            vec![
                Span::styled(format!("◀ {level} ▶  "), ScreeningTheme::text()),
                Span::styled(dots, ScreeningTheme::focused()),
                Span::styled(format!("  {}", field.hint()), ScreeningTheme::text_muted()),
            ]
        }
        (FieldKind::Choice(options), FieldValue::Text(text)) => {
            let shown = if text.is_empty() {
                Span::styled(
                    format!("{} ({} options)", field.hint(), options.len()),
                    ScreeningTheme::text_muted(),
                )
            } else {
                Span::styled(text.clone(), ScreeningTheme::text())
            };
            if is_selected {
                vec![
                    Span::styled("◀ ", ScreeningTheme::cursor()),
                    shown,
                    Span::styled(" ▶", ScreeningTheme::cursor()),
                ]
            } else {
                vec![shown]
            }
        }
        (_, FieldValue::Text(text)) => {
            let mut spans = if text.is_empty() {
                vec![Span::styled(field.hint(), ScreeningTheme::text_muted())]
            } else {
                vec![Span::styled(text.clone(), ScreeningTheme::text())]
            };
            if is_selected {
                spans.push(Span::styled("▌", ScreeningTheme::cursor()));
            }
            spans
        }
        (_, FieldValue::Level(level)) => vec![Span::styled(level.to_string(), ScreeningTheme::text())],
    }
}

fn render_messages<S: KeyValueStore>(
    f: &mut Frame,
    area: Rect,
    session: &IntakeSession<S>,
    health_warning: Option<&str>,
) {
    let mut lines = Vec::new();
    if let Some(message) = session.message() {
        lines.push(Line::from(vec![
            Span::styled("! ", ScreeningTheme::warning()),
            Span::styled(message.to_string(), ScreeningTheme::warning()),
        ]));
    }
    if let Some(error) = session.api_error() {
        lines.push(Line::from(vec![
            Span::styled("✗ ", ScreeningTheme::danger()),
            Span::styled(error.to_string(), ScreeningTheme::danger()),
        ]));
    }
    if let Some(warning) = health_warning {
        lines.push(Line::from(Span::styled(
            warning.to_string(),
            ScreeningTheme::text_muted(),
        )));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn render_intake_footer<S: KeyValueStore>(f: &mut Frame, area: Rect, session: &IntakeSession<S>) {
    let content = if session.is_submitting() {
        key_hints(&[("Ctrl+Q", "Quit")])
    } else {
        let enter = if session.is_last_step() { "Submit" } else { "Next" };
        key_hints(&[
            ("↑↓", "Field"),
            ("←→", "Choose"),
            ("Enter", enter),
            ("Esc", "Back"),
            ("Ctrl+S", "Sample"),
            ("Ctrl+R", "Reset"),
            ("Ctrl+O", "Last result"),
            ("Ctrl+Q", "Quit"),
        ])
    };
    render_footer(f, area, content);
}

fn render_submitting(f: &mut Frame, area: Rect, tick: usize) {
    let width = area.width.min(50);
    let height = 5;
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height: height.min(area.height),
    };

    // Indeterminate: sweep the bar while the request is in flight.
    let ratio = (tick % 20) as f64 / 20.0;
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Submitting ", ScreeningTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(ScreeningTheme::border_focused()),
        )
        .gauge_style(ScreeningTheme::info())
        .ratio(ratio)
        .label(Span::styled(
            "Contacting the prediction service...",
            ScreeningTheme::text(),
        ));

    f.render_widget(Clear, popup);
    f.render_widget(gauge, popup);
}
