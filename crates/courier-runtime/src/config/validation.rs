//! Configuration validation.

use std::net::SocketAddr;

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotConfig, CourierConfig, PollConfig, UpdateMode, WebhookConfig};

/// Longest secret token the service accepts.
const MAX_SECRET_LEN: usize = 256;

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_bot_config(&config.bot)?;
    match config.updates.mode {
        UpdateMode::Poll => validate_poll_config(&config.updates.poll, &config.bot),
        UpdateMode::Webhook => validate_webhook_config(&config.updates.webhook),
    }
}

fn validate_bot_config(bot: &BotConfig) -> ConfigResult<()> {
    if bot.token.trim().is_empty() {
        return Err(ConfigError::missing_field("bot.token"));
    }
    validate_url(&bot.api_url)?;
    validate_url(&bot.file_url)?;
    if bot.timeout_secs == 0 {
        return Err(ConfigError::validation("bot.timeout_secs must be greater than 0"));
    }
    Ok(())
}

fn validate_poll_config(poll: &PollConfig, bot: &BotConfig) -> ConfigResult<()> {
    if let Some(limit) = poll.limit {
        validate_range("updates.poll.limit", limit)?;
    }
    if u64::from(poll.timeout_secs) >= bot.timeout_secs {
        return Err(ConfigError::validation(format!(
            "updates.poll.timeout_secs ({}) must be shorter than bot.timeout_secs ({})",
            poll.timeout_secs, bot.timeout_secs
        )));
    }
    Ok(())
}

fn validate_webhook_config(webhook: &WebhookConfig) -> ConfigResult<()> {
    if webhook.url.is_empty() {
        return Err(ConfigError::missing_field("updates.webhook.url"));
    }
    validate_url(&webhook.url)?;

    if webhook.listen.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::validation(format!(
            "updates.webhook.listen must be an address like 0.0.0.0:5000, got '{}'",
            webhook.listen
        )));
    }
    if !webhook.path.starts_with('/') {
        return Err(ConfigError::validation("updates.webhook.path must start with '/'"));
    }
    if let Some(secret) = &webhook.secret_token {
        validate_secret_token(secret)?;
    }
    if let Some(max) = webhook.max_connections {
        validate_range("updates.webhook.max_connections", max)?;
    }
    Ok(())
}

/// Secret tokens are 1-256 characters of `A-Z`, `a-z`, `0-9`, `_` and `-`.
fn validate_secret_token(secret: &str) -> ConfigResult<()> {
    if secret.is_empty() || secret.len() > MAX_SECRET_LEN {
        return Err(ConfigError::validation(format!(
            "updates.webhook.secret_token must be 1-{MAX_SECRET_LEN} characters"
        )));
    }
    if !secret
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigError::validation(
            "updates.webhook.secret_token may only contain A-Z, a-z, 0-9, '_' and '-'",
        ));
    }
    Ok(())
}

fn validate_range(field: &str, value: u32) -> ConfigResult<()> {
    if !(1..=100).contains(&value) {
        return Err(ConfigError::validation(format!(
            "{field} must be between 1 and 100, got {value}"
        )));
    }
    Ok(())
}

fn validate_url(url: &str) -> ConfigResult<()> {
    const SCHEMES: [&str; 2] = ["http://", "https://"];
    if !SCHEMES.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {SCHEMES:?}"),
        ));
    }
    Ok(())
}
