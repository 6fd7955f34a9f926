//! Error types for budget validation and submission

use thiserror::Error;

/// Rejection of form input. Never leaves the form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please enter a budget amount")]
    Empty,

    #[error("Please enter a valid number")]
    NotANumber(String),

    #[error("Budget must be a positive number")]
    Negative(f64),
}

/// Failure of one submission cycle.
///
/// The `Display` output is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// Non-2xx status with a usable `detail` or `message` in the body
    #[error("Error: {detail}")]
    Server { status: u16, detail: String },

    #[error("Error: Server responded with status {status}")]
    ServerNoBody { status: u16 },

    /// Request went out but no response came back (connect failure, timeout)
    #[error("Error: No response from server. Please make sure the backend is running at {base_url}.")]
    Network { base_url: String },

    #[error("Error: {0}")]
    RequestConstruction(String),
}

impl SubmitError {
    /// HTTP status of the response, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmitError::Server { status, .. } | SubmitError::ServerNoBody { status } => {
                Some(*status)
            }
            SubmitError::Network { .. } | SubmitError::RequestConstruction(_) => None,
        }
    }
}
