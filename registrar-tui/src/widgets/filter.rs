//! Filter bar widget: search box plus the deleted-records toggle.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct FilterBar<'a> {
    pub title: &'a str,
    pub query: &'a str,
    pub editing: bool,
    pub show_deleted: bool,
    pub active_style: Style,
    pub inactive_style: Style,
}

impl<'a> FilterBar<'a> {
    pub fn checkbox(&self) -> &'static str {
        if self.show_deleted {
            "[x] Show deleted"
        } else {
            "[ ] Show deleted"
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let search_style = if self.editing {
            self.active_style.add_modifier(Modifier::BOLD)
        } else {
            self.inactive_style
        };
        let cursor = if self.editing { "_" } else { "" };
        let toggle_style = if self.show_deleted {
            self.active_style
        } else {
            self.inactive_style
        };
        let spans = vec![
            Span::styled(format!(" Search: {}{} ", self.query, cursor), search_style),
            Span::raw("  "),
            Span::styled(self.checkbox(), toggle_style),
        ];

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().title(self.title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}
