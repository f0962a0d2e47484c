//! Text input mode handlers
//!
//! Typing into the filter inputs and the refresh interval prompt.

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, FilterField, InputMode};

/// Handle key while editing a filter input
///
/// The filter is re-applied on every render, so each keystroke takes effect
/// immediately.
pub fn handle_filter_key(app: &mut App, key: KeyEvent, field: FilterField) -> Result<()> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => {
            app.state.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.state.filters.get_mut(field).pop();
            app.state.scroll = 0;
        }
        KeyCode::Char(c) => {
            app.state.filters.get_mut(field).push(c);
            app.state.scroll = 0;
        }
        _ => {}
    }
    Ok(())
}

/// Handle key while typing a refresh interval in milliseconds
pub fn handle_refresh_interval_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            app.state.input_mode = InputMode::Normal;
            app.state.refresh_input.clear();
        }
        KeyCode::Enter => {
            app.state.input_mode = InputMode::Normal;
            let input = std::mem::take(&mut app.state.refresh_input);
            app.apply_refresh_interval(&input, Instant::now());
        }
        KeyCode::Backspace => {
            app.state.refresh_input.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            app.state.refresh_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{Backend, LogStore, MemoryBackend, NewEntry, StoreLimits};
    use crossterm::event::KeyModifiers;
    use std::time::Duration;

    fn test_app() -> App {
        let backend: Box<dyn Backend> = Box::new(MemoryBackend::new());
        let config = Config::default();
        let store = LogStore::new(backend, StoreLimits::from_config(&config));
        App::new(config, store)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_filters_entries() {
        let mut app = test_app();
        app.record(NewEntry::new("10.0.0.5").with_status(404));
        app.record(NewEntry::new("192.168.1.1").with_status(200));
        app.state.input_mode = InputMode::EditingFilter(FilterField::Status);

        for c in "404".chars() {
            handle_filter_key(&mut app, key(KeyCode::Char(c)), FilterField::Status).unwrap();
        }
        let entries = app.filtered_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ip, "10.0.0.5");

        handle_filter_key(&mut app, key(KeyCode::Backspace), FilterField::Status).unwrap();
        assert_eq!(app.state.filters.status, "40");
        assert!(app.filtered_entries().is_empty());

        handle_filter_key(&mut app, key(KeyCode::Enter), FilterField::Status).unwrap();
        assert_eq!(app.state.input_mode, InputMode::Normal);
        assert_eq!(app.state.filters.status, "40");
    }

    #[test]
    fn test_refresh_interval_entry() {
        let mut app = test_app();
        app.state.input_mode = InputMode::EditingRefreshInterval;

        for c in "25x00".chars() {
            handle_refresh_interval_key(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(app.state.refresh_input, "2500");

        handle_refresh_interval_key(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.state.input_mode, InputMode::Normal);
        assert_eq!(app.state.refresh_interval, Duration::from_millis(2500));
        assert!(app.state.refresh_input.is_empty());
    }

    #[test]
    fn test_refresh_interval_cancel_keeps_previous() {
        let mut app = test_app();
        app.state.input_mode = InputMode::EditingRefreshInterval;
        app.state.refresh_input = "9".to_string();

        handle_refresh_interval_key(&mut app, key(KeyCode::Esc)).unwrap();

        assert_eq!(app.state.input_mode, InputMode::Normal);
        assert_eq!(app.state.refresh_interval, Duration::from_millis(5000));
    }

    #[test]
    fn test_empty_refresh_interval_is_rejected() {
        let mut app = test_app();
        app.state.input_mode = InputMode::EditingRefreshInterval;

        handle_refresh_interval_key(&mut app, key(KeyCode::Enter)).unwrap();

        assert_eq!(app.state.refresh_interval, Duration::from_millis(5000));
        assert!(app.state.notifications.visible()[0]
            .notification_type
            .is_error());
    }
}
