//! UI module: View components for the TUI.

pub mod intake;
pub mod results;
pub mod splash;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::prediction::defaults;
use crate::tui::styles::{ScreeningTheme, LOGO_SMALL};

/// Bottom strip shown on every screen. Uses the result's own disclaimer when
/// one is on screen.
pub fn render_disclaimer(f: &mut Frame, area: Rect, disclaimer: Option<&str>) {
    let text = vec![Line::from(vec![Span::styled(
        format!(
            "DISCLAIMER: {}",
            disclaimer.unwrap_or(defaults::DISCLAIMER)
        ),
        ScreeningTheme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(ScreeningTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// Screen header: product name, screen title and a secondary note.
pub(crate) fn render_header(f: &mut Frame, area: Rect, title: &str, note: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {LOGO_SMALL} "), ScreeningTheme::header()),
        Span::raw(" "),
        Span::styled(title.to_string(), ScreeningTheme::title()),
        Span::styled(format!(" │ {note}"), ScreeningTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ScreeningTheme::border()),
    );

    f.render_widget(header, area);
}

/// `[key] description` pairs on one line.
pub(crate) fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let spans: Vec<Span<'static>> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!("[{key}] "), ScreeningTheme::key_hint()),
                Span::styled(format!("{desc} "), ScreeningTheme::key_desc()),
            ]
        })
        .collect();
    Line::from(spans)
}

/// Footer with a top border.
pub(crate) fn render_footer(f: &mut Frame, area: Rect, content: Line<'static>) {
    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ScreeningTheme::border()),
    );

    f.render_widget(footer, area);
}
