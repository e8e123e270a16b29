//! Error types for the courier framework.

use thiserror::Error;

use courier_core::ApiError;

/// Errors that can occur during context extraction.
///
/// A handler whose parameter cannot be extracted is skipped for that update.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The update carries a different kind than the extractor expects.
    #[error("update kind mismatch: expected '{expected}', got '{got}'")]
    KindMismatch {
        /// Expected wire key.
        expected: &'static str,
        /// Actual wire key.
        got: &'static str,
    },

    /// The update carries no command token.
    #[error("update carries no command")]
    NoCommand,

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors raised while setting up or serving a dispatcher.
#[derive(Debug, Clone, Error)]
pub enum FrameworkError {
    /// Publishing the command list to the service failed.
    #[error("failed to publish command '{command}': {source}")]
    CommandPublish {
        /// Command being registered.
        command: String,
        /// Underlying API failure.
        source: ApiError,
    },

    /// A setup call against the API failed.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// The webhook server could not be started or failed while serving.
    #[error("webhook server error: {0}")]
    Server(String),
}

/// Result type for framework setup operations.
pub type FrameworkResult<T> = Result<T, FrameworkError>;
