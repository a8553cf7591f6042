//! Record table for the active page.

use crate::state::{App, Page};
use crate::theme::{row_color, view_status_color};
use crate::widgets::{DetailPanel, FilterBar, PaginationBar, StatusIndicator};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};
use registrar_core::record::value_text;
use registrar_core::schema::{Align, ColumnWidth};
use registrar_core::{ColumnDescriptor, Record, SortState, ViewStatus};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let page = app.active_page();
    let view = &page.collection.view;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let query = if app.search.active {
        app.search.text.as_str()
    } else {
        view.query()
    };
    let filter = FilterBar {
        title: "Filter",
        query,
        editing: app.search.active,
        show_deleted: view.show_deleted(),
        active_style: Style::default().fg(app.theme.primary),
        inactive_style: Style::default().fg(app.theme.text_dim),
    };
    filter.render(f, rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);

    let title = page.collection.profile.title.as_str();
    match StatusIndicator::for_view(
        title,
        view.status(),
        Style::default().fg(view_status_color(view.status(), &app.theme)),
    ) {
        // A failed refresh still has rows worth showing below the error.
        Some(indicator) if view.records().is_empty() || view.filtered_len() == 0 => {
            indicator.render(f, body[0]);
        }
        _ => render_rows(f, app, page, body[0]),
    }

    if let Some(record) = view.selected_record() {
        DetailPanel::for_record(
            "Details",
            record,
            &app.fields,
            Style::default().fg(app.theme.secondary),
        )
        .render(f, body[1]);
    }

    let buttons = view.page_buttons();
    PaginationBar {
        buttons: &buttons,
        current: view.page(),
        total_rows: view.filtered_len(),
        active_style: Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
        inactive_style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, rows[2]);
}

fn render_rows(f: &mut Frame<'_>, app: &App, page: &Page, area: Rect) {
    let view = &page.collection.view;
    let columns: Vec<(&str, &ColumnDescriptor)> =
        page.collection.profile.columns.visible().collect();

    let header = Row::new(columns.iter().enumerate().map(|(idx, (field, column))| {
        let mut style = Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD);
        if idx == page.column_cursor {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(aligned(
            header_label(field, column, view.sort()),
            column.align,
        ))
        .style(style)
    }));

    let visible = view.visible_rows();
    let table_rows: Vec<Row> = visible
        .iter()
        .map(|record| {
            Row::new(
                columns.iter().map(|(field, column)| {
                    Cell::from(aligned(cell_text(record, field), column.align))
                }),
            )
            .style(Style::default().fg(row_color(record.is_deleted(), &app.theme)))
        })
        .collect();

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|(_, column)| match column.width {
            ColumnWidth::Fixed(width) => Constraint::Length(width),
            ColumnWidth::Auto => Constraint::Min(10),
        })
        .collect();

    let mut state = TableState::default();
    if let Some(selected) = view.selected() {
        let index = visible
            .iter()
            .position(|record| record.id().as_ref() == Some(selected));
        state.select(index);
    }

    let mut title = page.collection.profile.title.clone();
    if let ViewStatus::Error(reason) = view.status() {
        title = format!("{title} (refresh failed: {reason})");
    }

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().bg(app.theme.bg_highlight));
    f.render_stateful_widget(table, area, &mut state);
}

/// Column title with the sort arrow when the table is sorted by it.
pub fn header_label(field: &str, column: &ColumnDescriptor, sort: Option<&SortState>) -> String {
    match sort {
        Some(sort) if sort.field == field => format!("{} {}", column.title, sort.direction.arrow()),
        _ => column.title.clone(),
    }
}

fn cell_text(record: &Record, field: &str) -> String {
    record.get(field).map(value_text).unwrap_or_default()
}

fn aligned(text: String, align: Align) -> Line<'static> {
    let alignment = match align {
        Align::Left => Alignment::Left,
        Align::Center => Alignment::Center,
        Align::Right => Alignment::Right,
    };
    Line::from(text).alignment(alignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_core::SortDirection;

    #[test]
    fn test_header_label_marks_sorted_column() {
        let column = ColumnDescriptor::new("Code");
        let sort = SortState {
            field: "code".to_string(),
            direction: SortDirection::Descending,
        };
        assert_eq!(
            header_label("code", &column, Some(&sort)),
            format!("Code {}", SortDirection::Descending.arrow())
        );
        assert_eq!(header_label("represent", &column, Some(&sort)), "Code");
        assert_eq!(header_label("code", &column, None), "Code");
    }

    #[test]
    fn test_missing_cell_is_blank() {
        let record = Record::new().with("code", "A-1");
        assert_eq!(cell_text(&record, "represent"), "");
        assert_eq!(cell_text(&record, "code"), "A-1");
    }
}
