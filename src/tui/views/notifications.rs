//! Notification rendering for TUI
//!
//! Renders notifications in the top-right corner of the screen.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::notifications::Notification;

/// Width of notification popups
const NOTIFICATION_WIDTH: u16 = 45;
/// Height of each notification
const NOTIFICATION_HEIGHT: u16 = 4;
/// Margin from screen edge
const NOTIFICATION_MARGIN: u16 = 2;

/// Render notifications stacked from the top-right corner
pub fn render_notifications(frame: &mut Frame, area: Rect, notifications: &[&Notification]) {
    for (i, notification) in notifications.iter().enumerate() {
        let y_offset = NOTIFICATION_MARGIN + (i as u16 * (NOTIFICATION_HEIGHT + 1));
        if y_offset + NOTIFICATION_HEIGHT > area.height {
            break;
        }

        let width = NOTIFICATION_WIDTH.min(area.width);
        let notif_area = Rect {
            x: area.x + area.width.saturating_sub(width + NOTIFICATION_MARGIN),
            y: area.y + y_offset,
            width,
            height: NOTIFICATION_HEIGHT,
        };

        let color = if notification.notification_type.is_error() {
            Color::Red
        } else {
            Color::Cyan
        };

        frame.render_widget(Clear, notif_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Span::styled(
                format!(" {} ", notification.notification_type.title()),
                Style::default().fg(color).bold(),
            ));

        let paragraph = Paragraph::new(notification.notification_type.message().to_string())
            .style(Style::default().fg(Color::White))
            .block(block)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, notif_area);
    }
}
