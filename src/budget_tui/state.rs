//! Submission lifecycle state

use crate::models::{ApiResponse, Budget};

/// Where the page is in its submit/response cycle.
///
/// Every state can move to `Loading` on submit and to `Idle` on reset.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading {
        budget: Budget,
    },
    Success {
        budget: Budget,
        response: ApiResponse,
    },
    Failure {
        message: String,
    },
}

impl SubmissionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SubmissionState::Loading { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SubmissionState::Idle)
    }

    /// The budget that produced the currently displayed response
    pub fn submitted_budget(&self) -> Option<Budget> {
        match self {
            SubmissionState::Success { budget, .. } => Some(*budget),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            SubmissionState::Success { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            SubmissionState::Failure { message } => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "Idle",
            SubmissionState::Loading { .. } => "Loading",
            SubmissionState::Success { .. } => "Success",
            SubmissionState::Failure { .. } => "Failure",
        }
    }
}
