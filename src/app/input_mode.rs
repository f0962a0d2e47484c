//! Input mode enum
//!
//! Defines how keyboard input is handled based on the current mode.

use super::state::FilterField;

/// Input mode determines how keyboard input is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - keys are handled as commands
    #[default]
    Normal,
    /// Typing into one of the filter inputs
    EditingFilter(FilterField),
    /// Typing a new refresh interval in milliseconds
    EditingRefreshInterval,
}

impl InputMode {
    /// The filter input being edited, if any
    pub fn editing_filter(&self) -> Option<FilterField> {
        match self {
            InputMode::EditingFilter(field) => Some(*field),
            _ => None,
        }
    }
}
