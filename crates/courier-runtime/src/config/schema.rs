//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use courier_core::ClientConfig;
use courier_core::config::{DEFAULT_API_URL, DEFAULT_FILE_URL, DEFAULT_TIMEOUT_SECS};
use courier_framework::PollOptions;
use courier_framework::webhook::{DEFAULT_LISTEN, WebhookOptions};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Connection to the bot API.
    #[serde(default)]
    pub bot: BotConfig,

    /// How updates are received.
    #[serde(default)]
    pub updates: UpdatesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Bot
// =============================================================================

/// Connection settings; converted into a [`ClientConfig`].
#[derive(Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot token. Required.
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_file_url")]
    pub file_url: String,

    /// Request timeout in seconds. Must exceed the long polling timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: default_api_url(),
            file_url: default_file_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BotConfig {
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig::new(self.token.clone())
            .with_api_url(self.api_url.clone())
            .with_file_url(self.file_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("file_url", &self.file_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_file_url() -> String {
    DEFAULT_FILE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// =============================================================================
// Updates
// =============================================================================

/// Update delivery mode. Chosen once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Long polling with `getUpdates`.
    #[default]
    Poll,
    /// Pushes to a local HTTP server registered with `setWebhook`.
    Webhook,
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poll => f.write_str("poll"),
            Self::Webhook => f.write_str("webhook"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatesConfig {
    #[serde(default)]
    pub mode: UpdateMode,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Long polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Pause before each poll in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Long polling timeout in seconds; 0 means short polling.
    #[serde(default)]
    pub timeout_secs: u32,

    /// Maximum updates per batch, 1-100.
    #[serde(default)]
    pub limit: Option<u32>,

    #[serde(default)]
    pub allowed_updates: Vec<String>,

    #[serde(default)]
    pub drop_pending_updates: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_secs: 0,
            limit: None,
            allowed_updates: Vec::new(),
            drop_pending_updates: false,
        }
    }
}

impl PollConfig {
    pub fn to_poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_millis(self.interval_ms),
            timeout_secs: self.timeout_secs,
            limit: self.limit,
            allowed_updates: self.allowed_updates.clone(),
            drop_pending_updates: self.drop_pending_updates,
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

/// Webhook settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Public HTTPS URL registered with the service.
    #[serde(default)]
    pub url: String,

    /// Local address to listen on.
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_path")]
    pub path: String,

    /// Shared secret checked on every push.
    #[serde(default)]
    pub secret_token: Option<String>,

    #[serde(default)]
    pub max_connections: Option<u32>,

    #[serde(default)]
    pub ip_address: Option<String>,

    #[serde(default)]
    pub drop_pending_updates: bool,

    #[serde(default)]
    pub allowed_updates: Vec<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            listen: default_listen(),
            path: default_path(),
            secret_token: None,
            max_connections: None,
            ip_address: None,
            drop_pending_updates: false,
            allowed_updates: Vec::new(),
        }
    }
}

impl WebhookConfig {
    pub fn to_webhook_options(&self) -> WebhookOptions {
        let mut options = WebhookOptions::new(self.url.clone())
            .listen(self.listen.clone())
            .path(self.path.clone());
        options.secret_token.clone_from(&self.secret_token);
        options.max_connections = self.max_connections;
        options.ip_address.clone_from(&self.ip_address);
        options.drop_pending_updates = self.drop_pending_updates;
        options.allowed_updates.clone_from(&self.allowed_updates);
        options
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("url", &self.url)
            .field("listen", &self.listen)
            .field("path", &self.path)
            .field("secret_token", &self.secret_token.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .field("ip_address", &self.ip_address)
            .field("drop_pending_updates", &self.drop_pending_updates)
            .field("allowed_updates", &self.allowed_updates)
            .finish()
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_path() -> String {
    "/".to_string()
}

// =============================================================================
// Logging
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file for `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-target levels, e.g. `courier_transport = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_poll_mode_with_public_hosts() {
        let config = CourierConfig::default();
        assert_eq!(config.updates.mode, UpdateMode::Poll);
        assert_eq!(config.bot.api_url, DEFAULT_API_URL);
        assert_eq!(config.updates.webhook.listen, "0.0.0.0:5000");
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn converts_to_framework_options() {
        let mut config = CourierConfig::default();
        config.bot.token = "1:t".into();
        config.bot.timeout_secs = 90;
        config.updates.poll.interval_ms = 250;
        config.updates.webhook.url = "https://example.com/hook".into();
        config.updates.webhook.secret_token = Some("abc".into());

        let client = config.bot.to_client_config();
        assert_eq!(client.timeout, Duration::from_secs(90));
        assert_eq!(
            config.updates.poll.to_poll_options().interval,
            Duration::from_millis(250)
        );
        let webhook = config.updates.webhook.to_webhook_options();
        assert_eq!(webhook.secret_token.as_deref(), Some("abc"));
        assert_eq!(webhook.listen, "0.0.0.0:5000");
    }

    #[test]
    fn debug_hides_secrets() {
        let mut config = CourierConfig::default();
        config.bot.token = "123:secret".into();
        config.updates.webhook.secret_token = Some("hidden".into());

        let debug = format!("{config:?}");
        assert!(!debug.contains("123:secret"));
        assert!(!debug.contains("hidden"));
    }
}
