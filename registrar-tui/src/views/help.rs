//! Keybinding help overlay.

use super::centered_rect;
use crate::state::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const BINDINGS: &[(&str, &str)] = &[
    ("1-3, Tab", "switch table"),
    ("j/k, Up/Down", "move selection"),
    ("h/l", "choose column"),
    ("s", "sort by column (again to reverse)"),
    ("[ ], PgUp/PgDn", "previous / next page"),
    ("Home/End, F1-F9", "first, last or numbered page"),
    ("/", "search"),
    ("D", "show or hide deleted records"),
    ("n", "new record"),
    ("Enter, e", "edit selected record"),
    ("Ctrl-r", "reload"),
    ("Tab / Shift-Tab", "next / previous field (form)"),
    ("Enter, Ctrl-s", "save (form)"),
    ("Ctrl-d", "delete or restore (form)"),
    ("Esc", "close"),
    ("q, Ctrl-c", "quit"),
];

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let height = BINDINGS.len() as u16 + 2;
    let popup = centered_rect(60, height, area);
    let lines: Vec<Line> = BINDINGS
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:>18}  "), Style::default().fg(app.theme.primary)),
                Span::styled(*what, Style::default().fg(app.theme.text)),
            ])
        })
        .collect();
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title("Keys")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        ),
        popup,
    );
}
