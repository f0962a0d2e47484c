//! Application state
//!
//! Everything the views read and the input handlers change, apart from the
//! log store and scheduler, which the [`App`](super::App) owns directly.

use std::time::Duration;

use crate::store::FilterCriteria;
use crate::tui::NotificationManager;

use super::input_mode::InputMode;

/// Which filter input is being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Ip,
    Method,
    Status,
}

impl FilterField {
    pub fn label(&self) -> &'static str {
        match self {
            FilterField::Ip => "IP",
            FilterField::Method => "Method",
            FilterField::Status => "Status",
        }
    }
}

/// Raw text of the three filter inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInputs {
    pub ip: String,
    pub method: String,
    pub status: String,
}

impl FilterInputs {
    /// Criteria for the current inputs
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_inputs(&self.ip, &self.method, &self.status)
    }

    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Ip => &self.ip,
            FilterField::Method => &self.method,
            FilterField::Status => &self.status,
        }
    }

    pub fn get_mut(&mut self, field: FilterField) -> &mut String {
        match field {
            FilterField::Ip => &mut self.ip,
            FilterField::Method => &mut self.method,
            FilterField::Status => &mut self.status,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ip.is_empty() && self.method.is_empty() && self.status.is_empty()
    }

    pub fn clear(&mut self) {
        self.ip.clear();
        self.method.clear();
        self.status.clear();
    }
}

/// Main application state
#[derive(Debug)]
pub struct AppState {
    /// How keys are interpreted
    pub input_mode: InputMode,
    /// Current filter inputs
    pub filters: FilterInputs,
    /// Text typed while editing the refresh interval
    pub refresh_input: String,
    /// Interval used whenever auto-refresh is (re)enabled
    pub refresh_interval: Duration,
    /// Index of the first visible entry in the filtered list
    pub scroll: usize,
    /// Transient messages
    pub notifications: NotificationManager,
    /// How long notifications stay up
    pub notification_duration: Duration,
    /// Visitor lookup in flight
    pub loading: bool,
    /// URL of the capture endpoint, if it is running
    pub payload_url: Option<String>,
    /// Capture requests dropped because the channel was full
    pub dropped_events_count: u64,
    /// Redraw on the next loop iteration
    pub needs_render: bool,
    /// Leave the event loop
    pub should_quit: bool,
}

impl AppState {
    pub fn new(refresh_interval: Duration, notification_duration: Duration) -> Self {
        Self {
            input_mode: InputMode::default(),
            filters: FilterInputs::default(),
            refresh_input: String::new(),
            refresh_interval,
            scroll: 0,
            notifications: NotificationManager::default(),
            notification_duration,
            loading: false,
            payload_url: None,
            dropped_events_count: 0,
            needs_render: true,
            should_quit: false,
        }
    }

    /// Show an auto-expiring informational message
    pub fn notify(&mut self, message: impl Into<String>) {
        let duration = self.notification_duration;
        self.notifications
            .push(crate::tui::NotificationType::info(message), Some(duration));
        self.needs_render = true;
    }

    /// Show an auto-expiring error message
    pub fn notify_error(&mut self, message: impl Into<String>) {
        let duration = self.notification_duration;
        self.notifications
            .push(crate::tui::NotificationType::error(message), Some(duration));
        self.needs_render = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LogEntry, NewEntry};
    use chrono::Utc;

    #[test]
    fn test_filter_inputs_criteria() {
        let inputs = FilterInputs {
            ip: "10.0".to_string(),
            method: String::new(),
            status: String::new(),
        };
        let criteria = inputs.criteria();
        let hit = LogEntry::from_new(NewEntry::new("10.0.0.5"), Utc::now());
        let miss = LogEntry::from_new(NewEntry::new("192.168.1.1"), Utc::now());
        assert!(criteria.matches(&hit));
        assert!(!criteria.matches(&miss));
    }

    #[test]
    fn test_filter_inputs_get_mut_and_clear() {
        let mut inputs = FilterInputs::default();
        inputs.get_mut(FilterField::Status).push_str("404");
        inputs.get_mut(FilterField::Method).push_str("get");
        assert_eq!(inputs.get(FilterField::Status), "404");
        assert!(!inputs.is_empty());

        inputs.clear();
        assert!(inputs.is_empty());
    }

    #[test]
    fn test_notify_marks_render() {
        let mut state = AppState::new(Duration::from_secs(5), Duration::from_secs(3));
        state.needs_render = false;
        state.notify("Logs refreshed");
        assert!(state.needs_render);
        assert_eq!(state.notifications.len(), 1);
    }
}
