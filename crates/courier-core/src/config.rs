//! Client configuration passed to the bot constructor.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default API host.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default file download host.
pub const DEFAULT_FILE_URL: &str = "https://api.telegram.org/file";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Everything a bot needs to talk to the service.
///
/// ```rust
/// use courier_core::ClientConfig;
///
/// let config = ClientConfig::new("123:abc").with_api_url("http://localhost:8081");
/// assert_eq!(config.method_url("getMe"), "http://localhost:8081/bot123:abc/getMe");
/// assert!(!format!("{config:?}").contains("123:abc"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Bot token.
    pub token: String,
    /// API host, without a trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// File download host, without a trailing slash.
    #[serde(default = "default_file_url")]
    pub file_url: String,
    /// Request timeout.
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_file_url() -> String {
    DEFAULT_FILE_URL.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

impl ClientConfig {
    /// Creates a configuration with default hosts and timeout.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: default_api_url(),
            file_url: default_file_url(),
            timeout: default_timeout(),
        }
    }

    /// Overrides the API host.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the file download host.
    pub fn with_file_url(mut self, url: impl Into<String>) -> Self {
        self.file_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of an API method.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    /// URL of a stored file.
    pub fn file_download_url(&self, file_path: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.file_url,
            self.token,
            file_path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("file_url", &self.file_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
