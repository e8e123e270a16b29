use serde::{Deserialize, Serialize};

use super::ApiMethod;
use crate::input_file::InputFile;
use crate::params::is_false;
use crate::types::WebhookInfo;
use crate::update::Update;
use crate::Params;

/// `getUpdates`: long polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct GetUpdates {
    /// First update to return: one more than the highest id already handled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Maximum number of updates, 1-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Long polling timeout in seconds; 0 means short polling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Kinds to receive; empty keeps the previous setting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_updates: Vec<String>,
}

impl ApiMethod for GetUpdates {
    const NAME: &'static str = "getUpdates";
    type Output = Vec<Update>;
}

/// `setWebhook`: push delivery to an HTTPS URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct SetWebhook {
    pub url: String,
    /// Public key certificate for self-signed setups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<InputFile>,
    /// Fixed IP address used instead of DNS resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Maximum simultaneous HTTPS connections, 1-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_updates: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub drop_pending_updates: bool,
    /// Sent back in the `X-Telegram-Bot-Api-Secret-Token` header of every push.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<String>,
}

impl SetWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl ApiMethod for SetWebhook {
    const NAME: &'static str = "setWebhook";
    type Output = bool;
}

/// `deleteWebhook`: switch back to long polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct DeleteWebhook {
    #[serde(default, skip_serializing_if = "is_false")]
    pub drop_pending_updates: bool,
}

impl ApiMethod for DeleteWebhook {
    const NAME: &'static str = "deleteWebhook";
    type Output = bool;
}

/// `getWebhookInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct GetWebhookInfo {}

impl ApiMethod for GetWebhookInfo {
    const NAME: &'static str = "getWebhookInfo";
    type Output = WebhookInfo;
}
