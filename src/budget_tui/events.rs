//! Event handling for the budget TUI

use crate::errors::SubmitError;
use crate::models::{ApiResponse, Budget};

/// Application events raised by components and background tasks
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Quit the application
    Quit,
    /// The form validated a budget and wants it submitted
    BudgetSubmitted(Budget),
    /// A team-builder request task finished, successfully or not
    SubmissionFinished {
        budget: Budget,
        outcome: Result<ApiResponse, SubmitError>,
    },
    /// Clear the submitted budget and any results
    Reset,
}
