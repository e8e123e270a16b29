//! Configuration for courier runtimes.
//!
//! Settings are layered with figment: built-in defaults, then a config file,
//! then `COURIER_*` environment variables.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BotConfig, CourierConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, PollConfig,
    SpanEventConfig, UpdateMode, UpdatesConfig, WebhookConfig,
};
pub use validation::validate_config;
