//! Pagination bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct PaginationBar<'a> {
    /// Page numbers to draw; empty when everything fits on one page.
    pub buttons: &'a [usize],
    pub current: usize,
    pub total_rows: usize,
    pub active_style: Style,
    pub inactive_style: Style,
}

impl<'a> PaginationBar<'a> {
    pub fn spans(&self) -> Vec<Span<'static>> {
        let mut spans: Vec<Span<'static>> = self
            .buttons
            .iter()
            .map(|page| {
                if *page == self.current {
                    Span::styled(format!("[{page}]"), self.active_style)
                } else {
                    Span::styled(format!(" {page} "), self.inactive_style)
                }
            })
            .collect();
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("{} rows", self.total_rows),
            self.inactive_style,
        ));
        spans
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        f.render_widget(Paragraph::new(Line::from(self.spans())), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_page_is_bracketed() {
        let bar = PaginationBar {
            buttons: &[1, 2, 3],
            current: 2,
            total_rows: 25,
            active_style: Style::default(),
            inactive_style: Style::default(),
        };
        let text: String = bar.spans().iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, " 1 [2] 3   25 rows");
    }

    #[test]
    fn test_single_page_shows_only_row_count() {
        let bar = PaginationBar {
            buttons: &[],
            current: 1,
            total_rows: 4,
            active_style: Style::default(),
            inactive_style: Style::default(),
        };
        assert_eq!(bar.spans().len(), 1);
    }
}
