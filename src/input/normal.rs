//! Normal mode input handler
//!
//! Single-key commands and scrolling in the log list.

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, FilterField, InputMode};

/// Entries moved per PageUp/PageDown
const PAGE_SIZE: usize = 20;

/// Handle key in normal mode
pub fn handle_normal_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.state.should_quit = true,

        KeyCode::Char('i') => app.state.input_mode = InputMode::EditingFilter(FilterField::Ip),
        KeyCode::Char('m') => {
            app.state.input_mode = InputMode::EditingFilter(FilterField::Method)
        }
        KeyCode::Char('s') => {
            app.state.input_mode = InputMode::EditingFilter(FilterField::Status)
        }
        KeyCode::Char('x') => {
            app.state.filters.clear();
            app.state.scroll = 0;
        }

        KeyCode::Char('c') => app.clear_logs(),
        KeyCode::Char('d') => app.download_logs(),
        KeyCode::Char('a') => app.toggle_auto_refresh(Instant::now()),
        KeyCode::Char('r') => {
            app.state.refresh_input = app.state.refresh_interval.as_millis().to_string();
            app.state.input_mode = InputMode::EditingRefreshInterval;
        }
        KeyCode::Char('p') => app.show_payload_url(),

        KeyCode::Down | KeyCode::Char('j') => scroll_by(app, 1),
        KeyCode::Up | KeyCode::Char('k') => {
            app.state.scroll = app.state.scroll.saturating_sub(1);
        }
        KeyCode::PageDown => scroll_by(app, PAGE_SIZE),
        KeyCode::PageUp => {
            app.state.scroll = app.state.scroll.saturating_sub(PAGE_SIZE);
        }
        KeyCode::Char('g') | KeyCode::Home => app.state.scroll = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.state.scroll = app.filtered_entries().len().saturating_sub(1);
        }
        _ => {}
    }
    Ok(())
}

/// Scroll down, stopping at the last filtered entry
fn scroll_by(app: &mut App, amount: usize) {
    let last = app.filtered_entries().len().saturating_sub(1);
    app.state.scroll = (app.state.scroll + amount).min(last);
}
