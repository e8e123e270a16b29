//! Process lifecycle: configuration, logging, update source selection and
//! shutdown.
//!
//! ```rust,no_run
//! use courier_runtime::CourierRuntime;
//!
//! # async fn run() -> courier_runtime::RuntimeResult<()> {
//! let runtime = CourierRuntime::builder().config_file("courier.toml").build()?;
//!
//! let mut dispatcher = runtime.dispatcher();
//! dispatcher.command_local("ping", || async { "pong".to_string() });
//!
//! runtime.run(dispatcher).await
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use courier_framework::{Bot, Dispatcher, Poller};

use crate::config::{ConfigLoader, CourierConfig, UpdateMode, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// Runs one bot in the configured update mode until shutdown.
pub struct CourierRuntime {
    config: CourierConfig,
    bot: Bot,
}

impl CourierRuntime {
    /// Creates a runtime from configuration.
    ///
    /// Validates the configuration, initializes logging and builds the bot.
    pub fn from_config(config: &CourierConfig) -> RuntimeResult<Self> {
        validate_config(config)?;
        logging::init_from_config(&config.logging);

        let bot = Bot::new(config.bot.to_client_config())?;

        info!(
            mode = %config.updates.mode,
            api_url = %config.bot.api_url,
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config: config.clone(),
            bot,
        })
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// A fresh dispatcher bound to this runtime's bot.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.bot.clone())
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(&self, dispatcher: Dispatcher) -> RuntimeResult<()> {
        let shutdown = CancellationToken::new();
        let signal_task = tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                wait_for_shutdown().await;
                shutdown.cancel();
            }
        });

        info!("Courier is running. Press Ctrl+C to stop.");
        let result = self.run_until(dispatcher, shutdown).await;
        signal_task.abort();
        result
    }

    /// Runs until `shutdown` is cancelled.
    ///
    /// Poll mode never fails once started; webhook mode fails when the
    /// webhook cannot be registered or the server cannot bind.
    pub async fn run_until(
        &self,
        dispatcher: Dispatcher,
        shutdown: CancellationToken,
    ) -> RuntimeResult<()> {
        let dispatcher = Arc::new(dispatcher);
        let updates = &self.config.updates;

        match updates.mode {
            UpdateMode::Poll => {
                let poller = Poller::new(dispatcher, updates.poll.to_poll_options());
                poller.run_until(shutdown).await;
            }
            UpdateMode::Webhook => {
                dispatcher
                    .serve_webhook(updates.webhook.to_webhook_options(), shutdown)
                    .await?;
            }
        }

        info!("Runtime stopped");
        Ok(())
    }
}

/// Waits for Ctrl+C, or SIGTERM on unix.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => error!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads configuration and builds a [`CourierRuntime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges settings that files and the environment can still override.
    pub fn merge(mut self, config: CourierConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    pub fn build(self) -> RuntimeResult<CourierRuntime> {
        let config = self.config_loader.load()?;
        CourierRuntime::from_config(&config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use courier_framework::Command;

    use super::*;
    use crate::error::RuntimeError;

    fn poll_config(server: &MockServer) -> CourierConfig {
        let mut config = CourierConfig::default();
        config.bot.token = "1:t".into();
        config.bot.api_url = server.uri();
        config.updates.poll.interval_ms = 10;
        config
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = CourierRuntime::from_config(&CourierConfig::default());
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }

    #[tokio::test]
    async fn poll_mode_routes_commands_until_cancelled() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/deleteWebhook"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .mount(&server)
            .await;
        Mock::given(path("/bot1:t/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [{
                    "update_id": 100,
                    "message": {
                        "message_id": 1,
                        "date": 0,
                        "chat": {"id": 1, "type": "private"},
                        "text": "/count"
                    }
                }]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(path("/bot1:t/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": []})))
            .mount(&server)
            .await;

        let runtime = CourierRuntime::from_config(&poll_config(&server)).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = runtime.dispatcher();
        let counter = calls.clone();
        dispatcher.command_local("count", move |_cmd: Command| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let shutdown = CancellationToken::new();
        let stopper = shutdown.clone();
        let watched = calls.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                if watched.load(Ordering::SeqCst) > 0 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            stopper.cancel();
        });

        runtime.run_until(dispatcher, shutdown).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn webhook_registration_failure_is_returned() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/setWebhook"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: bad webhook"
            })))
            .mount(&server)
            .await;

        let mut config = poll_config(&server);
        config.updates.mode = UpdateMode::Webhook;
        config.updates.webhook.url = "https://example.com/hook".into();
        config.updates.webhook.listen = "127.0.0.1:0".into();

        let runtime = CourierRuntime::from_config(&config).unwrap();
        let dispatcher = runtime.dispatcher();
        let result = runtime.run_until(dispatcher, CancellationToken::new()).await;

        assert!(matches!(result, Err(RuntimeError::Framework(_))));
    }
}
