//! Rendering of a single log entry
//!
//! Pure functions from [`LogEntry`] to styled lines; no terminal access.

use chrono::Local;
use ratatui::prelude::*;
use ratatui::widgets::ListItem;

use crate::store::LogEntry;

const NOT_AVAILABLE: &str = "N/A";

/// Lines describing one entry
///
/// Timestamp and IP first, then method and status, then the user agent and
/// headers when present.
pub fn entry_lines(entry: &LogEntry) -> Vec<Line<'static>> {
    let time = entry
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let method = entry.method.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let status = entry
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(time, Style::default().bold()),
            Span::raw("  "),
            Span::styled(entry.ip.clone(), Style::default().fg(Color::Blue)),
        ]),
        Line::from(vec![
            Span::styled(format!("Method: {}", method), Style::default().fg(Color::Gray)),
            Span::raw("  "),
            Span::styled(
                format!("Status: {}", status),
                Style::default().fg(status_color(entry.status)),
            ),
        ]),
    ];

    if let Some(ua) = &entry.user_agent {
        lines.push(Line::styled(
            format!("UA: {}", ua),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(headers) = &entry.headers {
        let json = serde_json::to_string(headers).unwrap_or_default();
        lines.push(Line::styled(
            format!("Headers: {}", json),
            Style::default().fg(Color::DarkGray),
        ));
    }

    lines
}

/// List item for one entry, followed by a blank separator line
pub fn render_entry(entry: &LogEntry) -> ListItem<'static> {
    let mut lines = entry_lines(entry);
    lines.push(Line::raw(""));
    ListItem::new(lines)
}

fn status_color(status: Option<u16>) -> Color {
    match status {
        Some(200..=299) => Color::Green,
        Some(300..=399) => Color::Cyan,
        Some(400..=499) => Color::Yellow,
        Some(500..=599) => Color::Red,
        _ => Color::Gray,
    }
}
