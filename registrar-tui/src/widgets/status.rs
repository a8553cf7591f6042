//! Status indicator widget.

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use registrar_core::ViewStatus;

pub struct StatusIndicator {
    pub title: String,
    pub status: String,
    pub style: Style,
}

impl StatusIndicator {
    /// Placeholder shown instead of table rows, if any.
    pub fn for_view(title: &str, status: &ViewStatus, style: Style) -> Option<Self> {
        let text = match status {
            ViewStatus::Loading => "Loading...".to_string(),
            ViewStatus::Empty => "No data".to_string(),
            ViewStatus::Error(reason) => format!("Error: {reason}"),
            ViewStatus::Ready => return None,
        };
        Some(Self {
            title: title.to_string(),
            status: text,
            style,
        })
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(self.status.clone())
            .style(self.style)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(self.title.as_str())
                    .borders(Borders::ALL),
            );
        f.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_has_no_placeholder() {
        assert!(StatusIndicator::for_view("T", &ViewStatus::Ready, Style::default()).is_none());
    }

    #[test]
    fn test_error_placeholder_carries_reason() {
        let indicator = StatusIndicator::for_view(
            "T",
            &ViewStatus::Error("Request timed out after 5000ms".to_string()),
            Style::default(),
        )
        .unwrap();
        assert_eq!(indicator.status, "Error: Request timed out after 5000ms");
    }
}
