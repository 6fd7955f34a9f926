//! Budget client library
//!
//! Validates a budget, submits it to the team-builder API and renders the
//! response, either in an interactive terminal UI or as one-shot CLI output.

pub mod api;
pub mod budget_tui;
pub mod cli;
pub mod config;
pub mod errors;
pub mod format;
pub mod models;
