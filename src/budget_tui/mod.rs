//! Budget Terminal User Interface (TUI)
//!
//! A single page: a budget form, a banner for the latest outcome, and the
//! team-builder response with its product table.

pub mod app;
pub mod components;
pub mod events;
pub mod state;
pub mod ui;

pub use app::{App, PageSections};
pub use events::AppEvent;
pub use state::SubmissionState;
