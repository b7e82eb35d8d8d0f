//! Client error types.

use calrename_core::{RuleError, TimeWindowError};
use calrename_providers::ProviderError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The rename pattern does not compile.
    #[error(transparent)]
    InvalidRule(#[from] RuleError),

    /// Provider error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// No calendar with the requested display name.
    #[error("calendar '{0}' not found")]
    CalendarNotFound(String),

    /// Some updates failed while continuing past errors.
    #[error("{failed} of {attempted} event updates failed")]
    UpdatesFailed { failed: usize, attempted: usize },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TimeWindowError> for ClientError {
    fn from(err: TimeWindowError) -> Self {
        Self::Config(err.to_string())
    }
}
