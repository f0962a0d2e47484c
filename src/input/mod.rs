//! Input handling module
//!
//! Routes keyboard and paste events based on the current input mode.

pub mod dispatcher;
pub mod normal;
pub mod text_input;

pub use dispatcher::{handle_key_event, handle_paste};
