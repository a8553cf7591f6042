//! Themes and color utilities.

use crate::notifications::NotificationLevel;
use ratatui::style::Color;
use registrar_core::ViewStatus;

#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub bg_secondary: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl Theme {
    pub fn synthbrute() -> Self {
        Self {
            bg: Color::Rgb(10, 10, 10),
            bg_secondary: Color::Rgb(26, 26, 26),
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: Color::Rgb(0, 255, 255),
            primary_dim: Color::Rgb(0, 136, 136),
            secondary: Color::Rgb(255, 0, 255),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            text_muted: Color::Rgb(68, 68, 68),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }

    /// Terminal defaults only, for terminals without true color.
    pub fn plain() -> Self {
        Self {
            bg: Color::Reset,
            bg_secondary: Color::Reset,
            bg_highlight: Color::DarkGray,
            primary: Color::Cyan,
            primary_dim: Color::Blue,
            secondary: Color::Magenta,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            text: Color::Reset,
            text_dim: Color::Gray,
            text_muted: Color::DarkGray,
            border: Color::Gray,
            border_focus: Color::Cyan,
        }
    }

    /// Theme by configured name. Config validation guarantees the name.
    pub fn named(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "plain" => Self::plain(),
            _ => Self::synthbrute(),
        }
    }
}

pub fn notification_color(level: NotificationLevel, theme: &Theme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

pub fn view_status_color(status: &ViewStatus, theme: &Theme) -> Color {
    match status {
        ViewStatus::Loading => theme.primary_dim,
        ViewStatus::Ready => theme.text,
        ViewStatus::Empty => theme.text_dim,
        ViewStatus::Error(_) => theme.error,
    }
}

/// Row color: deleted records are dimmed.
pub fn row_color(deleted: bool, theme: &Theme) -> Color {
    if deleted {
        theme.text_muted
    } else {
        theme.text
    }
}
