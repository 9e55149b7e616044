//! Results screen: gauge, disease cards, factor breakdown and the what-if
//! simulator.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use super::{key_hints, render_footer, render_header};
use crate::domain::summary::{what_if_delta_percent, what_if_score, DiseaseCard, FactorLine};
use crate::domain::{ResultSummary, WhatIf};
use crate::tui::styles::ScreeningTheme;

/// Adjustable what-if input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Knob {
    Sleep,
    Activity,
    Stress,
}

impl Knob {
    pub const ALL: [Knob; 3] = [Knob::Sleep, Knob::Activity, Knob::Stress];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sleep => "Sleep (hours)",
            Self::Activity => "Active days / week",
            Self::Stress => "Stress (1-10)",
        }
    }

    fn range(&self) -> (f64, f64) {
        match self {
            Self::Sleep => WhatIf::SLEEP_RANGE,
            Self::Activity => WhatIf::ACTIVITY_RANGE,
            Self::Stress => WhatIf::STRESS_RANGE,
        }
    }

    fn step(&self) -> f64 {
        match self {
            Self::Sleep => 0.5,
            Self::Activity | Self::Stress => 1.0,
        }
    }
}

/// What-if simulator state: the inputs and which knob has focus.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WhatIfPanel {
    pub inputs: WhatIf,
    selected: usize,
}

impl WhatIfPanel {
    #[must_use]
    pub fn selected(&self) -> Knob {
        Knob::ALL[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Knob::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + Knob::ALL.len() - 1) % Knob::ALL.len();
    }

    /// Move the focused knob one step, staying inside its range.
    pub fn adjust(&mut self, increase: bool) {
        let knob = self.selected();
        let (min, max) = knob.range();
        let delta = if increase { knob.step() } else { -knob.step() };
        let value = self.value_mut(knob);
        *value = (*value + delta).clamp(min, max);
    }

    #[must_use]
    pub fn value(&self, knob: Knob) -> f64 {
        match knob {
            Knob::Sleep => self.inputs.sleep_hours,
            Knob::Activity => self.inputs.activity_days,
            Knob::Stress => self.inputs.stress_level,
        }
    }

    fn value_mut(&mut self, knob: Knob) -> &mut f64 {
        match knob {
            Knob::Sleep => &mut self.inputs.sleep_hours,
            Knob::Activity => &mut self.inputs.activity_days,
            Knob::Stress => &mut self.inputs.stress_level,
        }
    }

    /// Adjusted score and its delta from `base`, in whole percent.
    #[must_use]
    pub fn outcome(&self, base: f64) -> (f64, i64) {
        let score = what_if_score(base, &self.inputs);
        (score, what_if_delta_percent(base, score))
    }
}

/// Render the results screen.
pub fn render_results(f: &mut Frame, area: Rect, summary: &ResultSummary, what_if: &WhatIfPanel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(6), // Gauge + overview
            Constraint::Min(0),    // Details
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], "Screening Results", summary.band.description());
    render_overview(f, chunks[1], summary);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(6),
            Constraint::Length(7),
        ])
        .split(columns[1]);

    render_disease_cards(f, left[0], &summary.disease_cards);
    render_factors(f, left[1], summary);
    render_recommendations(f, right[0], &summary.recommendations);
    render_data_quality(f, right[1], summary);
    render_what_if(f, right[2], summary.gauge_ratio, what_if);

    render_footer(
        f,
        chunks[3],
        key_hints(&[
            ("↑↓", "Knob"),
            ("←→", "Adjust"),
            ("Esc", "Back to form"),
            ("Ctrl+Q", "Quit"),
        ]),
    );
}

fn render_overview(f: &mut Frame, area: Rect, summary: &ResultSummary) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(area);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Overall Risk ", ScreeningTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(ScreeningTheme::border()),
        )
        .gauge_style(ScreeningTheme::risk_band(summary.band))
        .ratio(summary.gauge_ratio)
        .label(format!(
            "{}% {}",
            summary.percent_score.clamp(0, 100),
            summary.band
        ));
    f.render_widget(gauge, chunks[0]);

    let mut spans = vec![
        Span::styled("Risk level: ", ScreeningTheme::text_secondary()),
        Span::styled(
            summary.risk_level.clone(),
            ScreeningTheme::risk_level(&summary.risk_level),
        ),
        Span::styled("  │  Highest risk: ", ScreeningTheme::text_secondary()),
        Span::styled(summary.highest_risk_disease.clone(), ScreeningTheme::title()),
    ];
    if let Some(trend) = &summary.trend_signal {
        spans.push(Span::styled("  │  Trend: ", ScreeningTheme::text_secondary()));
        spans.push(Span::styled(
            trend.clone(),
            ScreeningTheme::trend(summary.trend_increasing),
        ));
    }
    spans.push(Span::styled("  │  Data quality: ", ScreeningTheme::text_secondary()));
    spans.push(Span::styled(
        format!("{}%", summary.data_quality_percent),
        ScreeningTheme::text(),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
}

fn render_disease_cards(f: &mut Frame, area: Rect, cards: &[DiseaseCard]) {
    let lines: Vec<Line> = if cards.is_empty() {
        vec![Line::from(Span::styled(
            "No disease breakdown reported.",
            ScreeningTheme::text_muted(),
        ))]
    } else {
        cards
            .iter()
            .map(|card| {
                let marker = if card.is_high_risk { "▲ " } else { "  " };
                Line::from(vec![
                    Span::styled(marker, ScreeningTheme::danger()),
                    Span::styled(format!("{:<22}", card.name), ScreeningTheme::text()),
                    Span::styled(
                        format!("{:>4}% ", card.probability_percent),
                        ScreeningTheme::risk_level(&card.level),
                    ),
                    Span::styled(format!("{:<9}", card.level), ScreeningTheme::risk_level(&card.level)),
                    Span::styled(card.trend.clone(), ScreeningTheme::trend(card.trend_increasing)),
                ])
            })
            .collect()
    };

    let block = Block::default()
        .title(Span::styled(" Conditions ", ScreeningTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ScreeningTheme::border());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn factor_line(factor: &FactorLine, protective: bool) -> Line<'static> {
    let (sign, style) = if protective {
        ("−", ScreeningTheme::success())
    } else {
        ("+", ScreeningTheme::danger())
    };
    Line::from(vec![
        Span::styled(format!(" {sign} "), style),
        Span::styled(factor.name.clone(), ScreeningTheme::text()),
        Span::styled(format!(" ({})", factor.user_value), ScreeningTheme::text_muted()),
        Span::styled(format!("  {}%", factor.impact_percent), style),
    ])
}

fn render_factors(f: &mut Frame, area: Rect, summary: &ResultSummary) {
    let mut lines = vec![
        Line::from(Span::styled(summary.explanation.clone(), ScreeningTheme::text())),
        Line::from(""),
        Line::from(Span::styled("Risk factors", ScreeningTheme::danger())),
    ];
    lines.extend(summary.risk_factors.iter().map(|fl| factor_line(fl, false)));
    if summary.risk_factors.is_empty() {
        lines.push(Line::from(Span::styled("   none reported", ScreeningTheme::text_muted())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Protective factors", ScreeningTheme::success())));
    lines.extend(summary.protective_factors.iter().map(|fl| factor_line(fl, true)));
    if summary.protective_factors.is_empty() {
        lines.push(Line::from(Span::styled("   none reported", ScreeningTheme::text_muted())));
    }

    let block = Block::default()
        .title(Span::styled(" What drives your score ", ScreeningTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ScreeningTheme::border());
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_recommendations(f: &mut Frame, area: Rect, recommendations: &[String]) {
    let lines: Vec<Line> = recommendations
        .iter()
        .map(|r| {
            Line::from(vec![
                Span::styled(" • ", ScreeningTheme::info()),
                Span::styled(r.clone(), ScreeningTheme::text()),
            ])
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(" Recommendations ", ScreeningTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ScreeningTheme::border());
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_data_quality(f: &mut Frame, area: Rect, summary: &ResultSummary) {
    let list = |fields: &[String]| {
        if fields.is_empty() {
            "none".to_string()
        } else {
            fields.join(", ")
        }
    };
    let lines = vec![
        Line::from(Span::styled(summary.confidence_note.clone(), ScreeningTheme::text())),
        Line::from(vec![
            Span::styled("Missing: ", ScreeningTheme::text_secondary()),
            Span::styled(list(&summary.missing_fields), ScreeningTheme::text_muted()),
        ]),
        Line::from(vec![
            Span::styled("Inconsistent: ", ScreeningTheme::text_secondary()),
            Span::styled(list(&summary.inconsistent_fields), ScreeningTheme::text_muted()),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(" Data Quality ", ScreeningTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ScreeningTheme::border());
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_what_if(f: &mut Frame, area: Rect, base: f64, panel: &WhatIfPanel) {
    let mut lines: Vec<Line> = Knob::ALL
        .iter()
        .map(|knob| {
            let focused = *knob == panel.selected();
            let style = if focused {
                ScreeningTheme::focused()
            } else {
                ScreeningTheme::text_secondary()
            };
            Line::from(vec![
                Span::styled(if focused { " ▶ " } else { "   " }, ScreeningTheme::cursor()),
                Span::styled(format!("{:<20}", knob.label()), style),
                Span::styled(format!("◀ {:>4} ▶", panel.value(*knob)), style),
            ])
        })
        .collect();

    let (score, delta) = panel.outcome(base);
    let delta_style = match delta.signum() {
        1 => ScreeningTheme::danger(),
        -1 => ScreeningTheme::success(),
        _ => ScreeningTheme::text_muted(),
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Simulated risk: ", ScreeningTheme::text_secondary()),
        Span::styled(
            format!("{}%", crate::domain::summary::percent(score)),
            ScreeningTheme::title(),
        ),
        Span::styled(format!("  ({delta:+}%)"), delta_style),
    ]));

    let block = Block::default()
        .title(Span::styled(" What if... ", ScreeningTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ScreeningTheme::border_focused());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_panel_has_no_delta() {
        let panel = WhatIfPanel::default();
        assert_eq!(panel.selected(), Knob::Sleep);
        let (score, delta) = panel.outcome(0.42);
        assert!((score - 0.42).abs() < 1e-9);
        assert_eq!(delta, 0);
    }

    #[test]
    fn test_knob_selection_wraps() {
        let mut panel = WhatIfPanel::default();
        panel.select_prev();
        assert_eq!(panel.selected(), Knob::Stress);
        panel.select_next();
        assert_eq!(panel.selected(), Knob::Sleep);
    }

    #[test]
    fn test_adjust_stays_in_range() {
        let mut panel = WhatIfPanel::default();
        for _ in 0..20 {
            panel.adjust(true);
        }
        assert!((panel.value(Knob::Sleep) - WhatIf::SLEEP_RANGE.1).abs() < 1e-9);

        panel.select_next();
        for _ in 0..20 {
            panel.adjust(false);
        }
        assert!((panel.value(Knob::Activity) - WhatIf::ACTIVITY_RANGE.0).abs() < 1e-9);
    }

    #[test]
    fn test_more_stress_lowers_simulated_score() {
        let mut panel = WhatIfPanel::default();
        panel.select_prev();
        panel.adjust(true);
        panel.adjust(true);
        let (score, delta) = panel.outcome(0.5);
        assert!((score - 0.44).abs() < 1e-9);
        assert_eq!(delta, -6);
    }
}
