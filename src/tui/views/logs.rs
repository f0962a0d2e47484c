//! Log list view
//!
//! Header with capture and refresh status, the three filter inputs, the
//! filtered entry list and a footer with key help or the active prompt.

use std::time::Duration;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, Paragraph};

use crate::app::{FilterField, FilterInputs};
use crate::store::LogEntry;

use super::entry::render_entry;

/// Everything the log view needs, read-only
pub struct LogViewContext<'a> {
    /// Filtered entries, newest first
    pub entries: &'a [LogEntry],
    /// Entries in the store before filtering
    pub total: usize,
    pub filters: &'a FilterInputs,
    /// Filter input currently being edited
    pub editing: Option<FilterField>,
    /// Refresh text being typed, when the interval prompt is open
    pub refresh_prompt: Option<&'a str>,
    /// Auto-refresh interval and time to next tick, when enabled
    pub refresh: Option<(Duration, Duration)>,
    pub payload_url: Option<&'a str>,
    pub loading: bool,
    pub scroll: usize,
}

const HEADER_HEIGHT: u16 = 4;
const FILTER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;

/// Render the log viewer
pub fn render_log_viewer(frame: &mut Frame, area: Rect, ctx: &LogViewContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(FILTER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);

    render_header(frame, chunks[0], ctx);
    render_filters(frame, chunks[1], ctx);
    render_list(frame, chunks[2], ctx);
    render_footer(frame, chunks[3], ctx);
}

fn render_header(frame: &mut Frame, area: Rect, ctx: &LogViewContext) {
    let mut status = vec![Span::styled(
        format!("{} of {} entries", ctx.entries.len(), ctx.total),
        Style::default().fg(Color::Gray),
    )];
    status.push(Span::raw(" | "));
    status.push(match ctx.refresh {
        Some((interval, remaining)) => Span::styled(
            format!(
                "auto-refresh {}ms (next in {}s)",
                interval.as_millis(),
                remaining.as_secs()
            ),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled("auto-refresh off", Style::default().fg(Color::DarkGray)),
    });
    if ctx.loading {
        status.push(Span::raw(" | "));
        status.push(Span::styled(
            "Loading visitor info...",
            Style::default().fg(Color::Yellow),
        ));
    }

    let payload = match ctx.payload_url {
        Some(url) => Line::from(vec![
            Span::raw("Payload URL: "),
            Span::styled(url.to_string(), Style::default().fg(Color::Cyan)),
        ]),
        None => Line::styled("Capture endpoint disabled", Style::default().fg(Color::DarkGray)),
    };

    let header = Paragraph::new(vec![Line::from(status), payload]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(" Security Logs ", Style::default().bold())),
    );
    frame.render_widget(header, area);
}

fn render_filters(frame: &mut Frame, area: Rect, ctx: &LogViewContext) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    let fields = [
        (FilterField::Ip, 'i'),
        (FilterField::Method, 'm'),
        (FilterField::Status, 's'),
    ];
    for ((field, key), chunk) in fields.into_iter().zip(chunks.iter()) {
        let editing = ctx.editing == Some(field);
        let mut text = ctx.filters.get(field).to_string();
        if editing {
            text.push('█');
        }
        let border = if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let input = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {} [{}] ", field.label(), key)),
        );
        frame.render_widget(input, *chunk);
    }
}

fn render_list(frame: &mut Frame, area: Rect, ctx: &LogViewContext) {
    if ctx.entries.is_empty() {
        let message = if ctx.total == 0 {
            "No log entries yet."
        } else {
            "No entries match the current filters."
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Logs "));
        frame.render_widget(empty, area);
        return;
    }

    let scroll = ctx.scroll.min(ctx.entries.len().saturating_sub(1));
    let items: Vec<_> = ctx.entries.iter().skip(scroll).map(render_entry).collect();
    let title = format!(" Logs [{}-{} of {}] ", scroll + 1, ctx.entries.len(), ctx.entries.len());

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn render_footer(frame: &mut Frame, area: Rect, ctx: &LogViewContext) {
    let (text, style) = if let Some(input) = ctx.refresh_prompt {
        (
            format!("Refresh interval (ms): {}█ | Enter: apply | Esc: cancel", input),
            Style::default().fg(Color::Yellow),
        )
    } else if let Some(field) = ctx.editing {
        (
            format!("Editing {} filter | Enter/Esc: done | Backspace: delete", field.label()),
            Style::default().fg(Color::Yellow),
        )
    } else {
        (
            "i/m/s: filter | x: reset filters | c: clear | d: download | a: auto-refresh | r: interval | p: payload URL | ↑↓ g G: scroll | q: quit".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };

    let footer = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, area);
}
