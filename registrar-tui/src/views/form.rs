//! Modal record form.

use super::centered_rect;
use crate::state::App;
use crate::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use registrar_core::{FormController, FormField, FormPhase};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let form = &app.page.form;
    let lines = form_lines(form, &app.theme);
    let height = (lines.len() as u16).saturating_add(2);
    let popup = centered_rect(70, height, area);

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(form.title())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border_focus)),
            ),
        popup,
    );
}

/// Body of the modal, one entry per drawn line.
pub fn form_lines(form: &FormController, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match form.phase() {
        FormPhase::Loading => lines.push(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(theme.text_dim),
        ))),
        FormPhase::Failed(reason) => lines.push(Line::from(Span::styled(
            reason.clone(),
            Style::default().fg(theme.error),
        ))),
        FormPhase::Ready => {
            for (idx, field) in form.fields().iter().enumerate() {
                lines.extend(field_lines(field, idx == form.focus(), theme));
            }
        }
    }

    lines.push(Line::from(""));
    if let Some(notice) = form.notice() {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(theme.error),
        )));
    }

    if let Some(confirmation) = form.confirmation() {
        lines.push(Line::from(Span::styled(
            format!("{} [y/n]", confirmation.prompt()),
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(action_line(form, theme));
    }
    lines
}

fn field_lines(field: &FormField, focused: bool, theme: &Theme) -> Vec<Line<'static>> {
    let label_style = if focused {
        Style::default()
            .fg(theme.primary)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_dim)
    };
    let value = if field.value.is_empty() {
        Span::styled(field.placeholder(), Style::default().fg(theme.text_muted))
    } else if field.enabled {
        Span::styled(field.value.clone(), Style::default().fg(theme.text))
    } else {
        Span::styled(field.value.clone(), Style::default().fg(theme.text_dim))
    };
    let marker = if field.descriptor.required { "*" } else { "" };
    let mut first = vec![
        Span::styled(format!("{}{}: ", field.title(), marker), label_style),
        value,
    ];
    if field.pending.is_some() {
        first.push(Span::styled(" checking...", Style::default().fg(theme.info)));
    }

    let mut lines = vec![Line::from(first)];
    if let Some(error) = field.error() {
        lines.push(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(theme.error),
        )));
    }
    lines
}

fn action_line(form: &FormController, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    if form.submit_available() {
        match form.submit_state() {
            Ok(()) => spans.push(Span::styled(
                format!("[Enter] {}", form.submit_label()),
                Style::default().fg(theme.success),
            )),
            Err(reason) => spans.push(Span::styled(
                format!("[{}: {}]", form.submit_label(), reason),
                Style::default().fg(theme.text_muted),
            )),
        }
        spans.push(Span::raw("  "));
    }
    if form.delete_available() {
        spans.push(Span::styled(
            format!("[Ctrl-d] {}", form.delete_label()),
            Style::default().fg(theme.warning),
        ));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled("[Esc] Close", Style::default().fg(theme.text_dim)));
    Line::from(spans)
}
