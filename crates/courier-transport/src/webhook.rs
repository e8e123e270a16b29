//! Webhook HTTP server.
//!
//! The service pushes each update as a JSON `POST`. Every request is answered
//! before the next one on the same connection, so the status reflects only
//! whether the update was accepted:
//!
//! | Situation | Status |
//! |-----------|--------|
//! | secret header missing or wrong | `401 Unauthorized`, update dropped |
//! | body is not an update | `400 Bad Request` |
//! | update handled (whatever the handler did) | `200 OK` |

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

use courier_core::{TransportError, TransportResult, Update};

/// Header carrying the secret token registered with `setWebhook`.
pub const SECRET_TOKEN_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Receives decoded updates.
#[async_trait]
pub trait UpdateHandler: Send + Sync + 'static {
    /// Handles one update. Handler failures never reach the HTTP response.
    async fn handle_update(&self, update: Update);
}

/// Route configuration of the webhook endpoint.
#[derive(Clone, Default)]
pub struct WebhookRoute {
    /// Path the service posts to.
    pub path: String,
    /// Expected secret token; `None` accepts every request.
    pub secret_token: Option<String>,
}

impl std::fmt::Debug for WebhookRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookRoute")
            .field("path", &self.path)
            .field("secret_token", &self.secret_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

struct WebhookState {
    secret_token: Option<String>,
    handler: Arc<dyn UpdateHandler>,
}

/// Builds the router for the webhook endpoint.
pub fn webhook_router(route: &WebhookRoute, handler: Arc<dyn UpdateHandler>) -> Router {
    let path = if route.path.starts_with('/') {
        route.path.clone()
    } else {
        format!("/{}", route.path)
    };

    let state = Arc::new(WebhookState {
        secret_token: route.secret_token.clone(),
        handler,
    });

    Router::new()
        .route(&path, post(receive_update))
        .with_state(state)
}

/// Binds the listening socket.
pub async fn bind(addr: &str) -> TransportResult<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| TransportError::Io(format!("failed to bind {addr}: {e}")))
}

/// Serves `router` on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> TransportResult<()> {
    let addr: SocketAddr = listener.local_addr()?;
    info!(addr = %addr, "Webhook server listening");

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await;

    match result {
        Ok(()) => {
            info!(addr = %addr, "Webhook server stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Webhook server error");
            Err(e.into())
        }
    }
}

/// POST handler for pushed updates.
async fn receive_update(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(expected) = &state.secret_token {
        let provided = headers.get(SECRET_TOKEN_HEADER).map(|v| v.as_bytes());
        if !provided.is_some_and(|p| constant_time_eq(p, expected.as_bytes())) {
            warn!(
                header_present = provided.is_some(),
                "Rejected webhook request with invalid secret token"
            );
            return StatusCode::UNAUTHORIZED;
        }
    }

    let update = match Update::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, len = body.len(), "Rejected malformed webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    trace!(update_id = update.update_id, kind = update.kind.name(), "Received webhook update");
    state.handler.handle_update(update).await;

    StatusCode::OK
}

/// Compares two byte strings without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
