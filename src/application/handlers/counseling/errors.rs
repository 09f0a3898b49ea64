//! Errors surfaced from a counseling turn.
//!
//! Router and per-expert failures are recovered inside the turn and never
//! appear here.

use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::ports::{AIError, SessionStoreError};

/// Errors that can fail a counseling turn.
#[derive(Debug, Error)]
pub enum CounselingError {
    /// Missing or invalid configuration for the completion capability.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The lead agent's reply could not be produced.
    #[error("Reply generation failed: {0}")]
    Composer(#[from] AIError),

    /// A session facet could not be read or written.
    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),

    /// Empty message or malformed session id.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ValidationError> for CounselingError {
    fn from(err: ValidationError) -> Self {
        CounselingError::InvalidInput(err.to_string())
    }
}

impl CounselingError {
    /// Message suitable for showing to the person in the session.
    pub fn user_message(&self) -> String {
        match self {
            CounselingError::Configuration(_) => {
                "The counseling service is not configured correctly. Please contact support."
                    .to_string()
            }
            CounselingError::Composer(AIError::RateLimited { retry_after_secs }) => format!(
                "Dr. Helen is helping many people right now. Please try again in about {} seconds.",
                retry_after_secs
            ),
            CounselingError::Composer(_) => {
                "Sorry, Dr. Helen could not put together a reply just now. Please send your message again."
                    .to_string()
            }
            CounselingError::Store(_) => {
                "Your conversation could not be saved. Please try again in a moment.".to_string()
            }
            CounselingError::InvalidInput(reason) => format!("Please check your input: {}", reason),
        }
    }

    /// True if sending the same message again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CounselingError::Composer(err) => err.is_retryable(),
            CounselingError::Store(_) => true,
            CounselingError::Configuration(_) | CounselingError::InvalidInput(_) => false,
        }
    }
}
