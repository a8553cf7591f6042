//! View rendering dispatch.

pub mod form;
pub mod help;
pub mod table;

use crate::nav::View;
use crate::notifications::NotificationLevel;
use crate::state::App;
use crate::theme::notification_color;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);
    table::render(f, app, layout[1]);
    render_footer(f, app, layout[2]);

    if app.page.form.is_open() {
        form::render(f, app, f.size());
    } else if app.help_visible {
        help::render(f, app, f.size());
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let titles: Vec<String> = View::all()
        .iter()
        .enumerate()
        .map(|(idx, view)| format!("{} {}", idx + 1, view.title()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.active_view().index())
        .block(Block::default().borders(Borders::ALL).title(Span::styled(
            "REGISTRAR",
            Style::default().fg(app.theme.primary),
        )))
        .style(Style::default().fg(app.theme.text_dim))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = "j/k move • h/l column • s sort • [ ] page • / search • D deleted • n new • Enter edit • ? help • q quit";
    let (text, style) = if let Some(note) = app.notifications.latest() {
        let label = match note.level {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "SUCCESS",
        };
        (
            format!("{}: {}", label, note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        )
    } else {
        (help.to_string(), Style::default().fg(app.theme.text_dim))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

/// Rectangle of `width_percent` by `height` rows centered in `area`.
pub fn centered_rect(width_percent: u16, height: u16, area: Rect) -> Rect {
    let width = area.width.saturating_mul(width_percent.min(100)) / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 20, area);
        assert_eq!(rect, Rect::new(20, 10, 60, 20));
    }

    #[test]
    fn test_centered_rect_clamps_height() {
        let area = Rect::new(0, 0, 80, 10);
        let rect = centered_rect(50, 30, area);
        assert_eq!(rect.height, 10);
        assert_eq!(rect.y, 0);
    }
}
