//! Screening color palette and styles.
//!
//! Calm teal/slate palette with semantic colors for the risk bands.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::RiskBand;

/// Screening theme color palette.
pub struct ScreeningTheme;

impl ScreeningTheme {
    // === Primary Colors ===

    /// Deep teal
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136); // #0D9488

    /// Lighter teal for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF

    /// Darker teal for header bars
    pub const PRIMARY_DARK: Color = Color::Rgb(15, 118, 110); // #0F766E

    /// Light slate for borders
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic Colors ===

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    // === Text Colors ===

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    /// Advisory messages (incomplete step, service health)
    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    /// Field errors and service failures
    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Border for a field that currently fails validation
    #[must_use]
    pub fn border_error() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn header() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Style for a gauge band, using the band's own color.
    #[must_use]
    pub fn risk_band(band: RiskBand) -> Style {
        let (r, g, b) = band.color();
        Style::default().fg(Color::Rgb(r, g, b))
    }

    /// Style for a free-text risk level ("High", "moderate", ...).
    #[must_use]
    pub fn risk_level(level: &str) -> Style {
        let level = level.to_lowercase();
        if level.contains("high") {
            Self::danger()
        } else if level.contains("moderate") || level.contains("medium") {
            Self::warning()
        } else if level.contains("low") {
            Self::success()
        } else {
            Self::text_secondary()
        }
    }

    /// Rising trends in the danger color, everything else muted.
    #[must_use]
    pub fn trend(increasing: bool) -> Style {
        if increasing {
            Self::danger()
        } else {
            Self::text_secondary()
        }
    }
}

/// Inline product name
pub const LOGO_SMALL: &str = "RiskScreen";
