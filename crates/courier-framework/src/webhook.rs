//! Push delivery: registers the webhook and serves it.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use courier_core::api::SetWebhook;
use courier_transport::webhook::{self, UpdateHandler, WebhookRoute};

use crate::dispatcher::Dispatcher;
use crate::error::{FrameworkError, FrameworkResult};

/// Default local address of the webhook server.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:5000";

/// Webhook registration and serving settings.
#[derive(Clone)]
pub struct WebhookOptions {
    /// Public HTTPS URL registered with the service.
    pub url: String,
    /// Local address to listen on.
    pub listen: String,
    /// Local path the updates are posted to.
    pub path: String,
    /// Shared secret expected in every push; `None` disables the check.
    pub secret_token: Option<String>,
    pub max_connections: Option<u32>,
    pub ip_address: Option<String>,
    pub drop_pending_updates: bool,
    pub allowed_updates: Vec<String>,
}

impl WebhookOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            listen: DEFAULT_LISTEN.to_string(),
            path: "/".to_string(),
            secret_token: None,
            max_connections: None,
            ip_address: None,
            drop_pending_updates: false,
            allowed_updates: Vec::new(),
        }
    }

    pub fn secret_token(mut self, secret: impl Into<String>) -> Self {
        self.secret_token = Some(secret.into());
        self
    }

    pub fn listen(mut self, addr: impl Into<String>) -> Self {
        self.listen = addr.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    fn registration(&self) -> SetWebhook {
        SetWebhook {
            url: self.url.clone(),
            certificate: None,
            ip_address: self.ip_address.clone(),
            max_connections: self.max_connections,
            allowed_updates: self.allowed_updates.clone(),
            drop_pending_updates: self.drop_pending_updates,
            secret_token: self.secret_token.clone(),
        }
    }

    fn route(&self) -> WebhookRoute {
        WebhookRoute {
            path: self.path.clone(),
            secret_token: self.secret_token.clone(),
        }
    }
}

impl std::fmt::Debug for WebhookOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookOptions")
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

impl Dispatcher {
    /// Registers the webhook and serves pushed updates on `options.listen`
    /// until `shutdown` is cancelled.
    pub async fn serve_webhook(
        self: Arc<Self>,
        options: WebhookOptions,
        shutdown: CancellationToken,
    ) -> FrameworkResult<()> {
        let listener = webhook::bind(&options.listen)
            .await
            .map_err(|e| FrameworkError::Server(e.to_string()))?;
        self.serve_webhook_on(listener, options, shutdown).await
    }

    /// Like [`serve_webhook`](Self::serve_webhook) on an already bound listener.
    pub async fn serve_webhook_on(
        self: Arc<Self>,
        listener: TcpListener,
        options: WebhookOptions,
        shutdown: CancellationToken,
    ) -> FrameworkResult<()> {
        self.bot().set_webhook(&options.registration()).await?;
        info!(url = %options.url, path = %options.path, "Webhook registered");

        let handler: Arc<dyn UpdateHandler> = self;
        let router = webhook::webhook_router(&options.route(), handler);
        webhook::serve(listener, router, shutdown)
            .await
            .map_err(|e| FrameworkError::Server(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use wiremock::matchers::{body_json, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use courier_core::ClientConfig;
    use courier_core::types::Message;
    use courier_transport::SECRET_TOKEN_HEADER;

    use super::*;
    use crate::bot::Bot;

    #[test]
    fn registration_carries_options() {
        let mut options = WebhookOptions::new("https://example.com/hook").secret_token("s3cret");
        options.max_connections = Some(40);
        options.allowed_updates = vec!["message".into()];

        let request = options.registration();
        assert_eq!(request.url, "https://example.com/hook");
        assert_eq!(request.secret_token.as_deref(), Some("s3cret"));
        assert_eq!(request.max_connections, Some(40));
        assert_eq!(request.allowed_updates, vec!["message".to_string()]);
        assert!(!format!("{options:?}").contains("s3cret"));
    }

    #[tokio::test]
    async fn serves_authenticated_pushes() {
        let api = MockServer::start().await;
        Mock::given(path("/bot1:t/setWebhook"))
            .and(body_json(json!({
                "url": "https://example.com/hook",
                "secret_token": "s3cret"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .expect(1)
            .mount(&api)
            .await;

        let calls = Arc::new(AtomicUsize::new(0));
        let bot = Bot::new(ClientConfig::new("1:t").with_api_url(api.uri())).unwrap();
        let mut dispatcher = Dispatcher::new(bot);
        let counter = calls.clone();
        dispatcher.on_message(move |_message: Message| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        let dispatcher = Arc::new(dispatcher);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let options = WebhookOptions::new("https://example.com/hook")
            .secret_token("s3cret")
            .path("/hook");
        let server = tokio::spawn(dispatcher.serve_webhook_on(listener, options, shutdown.clone()));

        let client = reqwest::Client::new();
        let url = format!("http://{addr}/hook");
        let update = json!({
            "update_id": 1,
            "message": {"message_id": 1, "date": 0, "chat": {"id": 1, "type": "private"}, "text": "hi"}
        });

        let mut status = None;
        for _ in 0..100 {
            match client
                .post(&url)
                .header(SECRET_TOKEN_HEADER, "wrong")
                .json(&update)
                .send()
                .await
            {
                Ok(response) => {
                    status = Some(response.status().as_u16());
                    break;
                }
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        }
        assert_eq!(status, Some(401));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let response = client
            .post(&url)
            .header(SECRET_TOKEN_HEADER, "s3cret")
            .json(&update)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        shutdown.cancel();
        server.await.unwrap().unwrap();
    }
}
