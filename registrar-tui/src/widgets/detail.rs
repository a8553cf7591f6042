//! Detail panel widget for showing field/value pairs.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use registrar_core::{form::display_timestamp, record::value_text, schema::is_timestamp_field};
use registrar_core::{FieldCatalog, Record};

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub fields: Vec<(String, String)>,
    pub style: Style,
}

impl<'a> DetailPanel<'a> {
    /// Every field of `record` that the catalog shows in edit mode.
    pub fn for_record(
        title: &'a str,
        record: &Record,
        catalog: &FieldCatalog,
        style: Style,
    ) -> Self {
        let fields = record
            .fields()
            .filter(|(name, _)| catalog.descriptor(name).visible.edit)
            .map(|(name, value)| {
                let text = value_text(value);
                let text = if is_timestamp_field(name) {
                    display_timestamp(&text)
                } else {
                    text
                };
                (catalog.descriptor(name).title_or(name).to_string(), text)
            })
            .collect();
        Self {
            title,
            fields,
            style,
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let lines: Vec<Line> = self
            .fields
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{}: ", label), self.style),
                    Span::raw(value.clone()),
                ])
            })
            .collect();

        let text = Text::from(lines);
        let widget = Paragraph::new(text)
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });

        f.render_widget(widget, area);
    }
}
