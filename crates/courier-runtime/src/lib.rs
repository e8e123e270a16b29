//! Courier Runtime - configuration, logging and lifecycle for courier bots.
//!
//! - [`config`]: figment-based loading of [`CourierConfig`] from files and
//!   `COURIER_*` environment variables, plus validation
//! - [`logging`]: `tracing-subscriber` setup driven by the `logging` section
//! - [`CourierRuntime`]: builds the bot, runs long polling or the webhook
//!   server, and stops on Ctrl+C

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, CourierConfig, UpdateMode};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{CourierRuntime, RuntimeBuilder};

// Re-export tracing for use by applications
pub use tracing;
pub use tracing_subscriber;

/// Logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
