//! Intro screen shown until the user acknowledges it.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{key_hints, render_footer, render_header};
use crate::domain::STEPS;
use crate::tui::styles::ScreeningTheme;

/// Render the intro screen.
pub fn render_splash(f: &mut Frame, area: Rect, health_warning: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], "Health Risk Screening", "Welcome");

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Estimate your risk for common chronic conditions",
            ScreeningTheme::subtitle(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Answer {} short sections. Your answers are saved on this device as you type.",
                STEPS.len()
            ),
            ScreeningTheme::text(),
        )),
        Line::from(""),
    ];
    for (i, step) in STEPS.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}. ", i + 1), ScreeningTheme::key_hint()),
            Span::styled(step.label, ScreeningTheme::text_secondary()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "This is a screening aid, not a diagnosis.",
        ScreeningTheme::text_muted(),
    )));
    if let Some(warning) = health_warning {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("! ", ScreeningTheme::warning()),
            Span::styled(warning.to_string(), ScreeningTheme::warning()),
        ]));
    }

    let content = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(ScreeningTheme::border_focused()),
        );
    f.render_widget(content, chunks[1]);

    render_footer(
        f,
        chunks[2],
        key_hints(&[("Enter", "Start"), ("Ctrl+Q", "Quit")]),
    );
}
