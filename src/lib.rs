//! seclog - terminal viewer for a bounded, persisted security event log
//!
//! This library provides the core functionality for the seclog application.

pub mod app;
pub mod capture;
pub mod config;
pub mod input;
pub mod logging;
pub mod scheduler;
pub mod store;
pub mod tui;
pub mod visitor;
