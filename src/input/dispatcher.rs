//! Main input dispatch logic
//!
//! Routes keyboard events to appropriate handlers based on current mode.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, InputMode};

/// Handle a key event by routing to the appropriate mode handler
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    // Only process key press events (not release/repeat)
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    // Raw mode swallows SIGINT, so Ctrl+C has to quit from here
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.state.should_quit = true;
        return Ok(());
    }

    match app.state.input_mode {
        InputMode::Normal => super::normal::handle_normal_key(app, key),
        InputMode::EditingFilter(field) => super::text_input::handle_filter_key(app, key, field),
        InputMode::EditingRefreshInterval => {
            super::text_input::handle_refresh_interval_key(app, key)
        }
    }
}

/// Insert pasted text into the active text input
///
/// Pastes outside a text-entry mode are ignored so a stray clipboard can't
/// trigger commands.
pub fn handle_paste(app: &mut App, text: &str) {
    // Filters are single-line
    let text: String = text.chars().filter(|c| !c.is_control()).collect();

    match app.state.input_mode {
        InputMode::Normal => {}
        InputMode::EditingFilter(field) => {
            app.state.filters.get_mut(field).push_str(&text);
            app.state.scroll = 0;
        }
        InputMode::EditingRefreshInterval => {
            app.state
                .refresh_input
                .extend(text.chars().filter(|c| c.is_ascii_digit()));
        }
    }
}
