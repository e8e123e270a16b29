//! Runtime error types.

use thiserror::Error;

use courier_core::TransportError;
use courier_framework::FrameworkError;

pub use crate::config::{ConfigError, ConfigResult};

/// Errors that can occur while starting or running a bot.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Webhook registration or serving failed.
    #[error("{0}")]
    Framework(#[from] FrameworkError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
