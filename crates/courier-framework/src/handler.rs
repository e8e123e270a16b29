//! Handler system.
//!
//! Handlers are async functions whose parameters implement [`FromContext`]
//! and whose return type implements [`HandleResponse`], in the style of
//! axum handlers.
//!
//! ```rust,ignore
//! // Nothing to send back
//! async fn log_message(message: Message) {
//!     tracing::info!(chat = message.chat.id, "message");
//! }
//!
//! // A `String` is sent as a reply to the update's chat
//! async fn echo(command: Command) -> String {
//!     command.args
//! }
//!
//! // Errors are logged
//! async fn greet(bot: Bot, message: Message) -> ApiResult<()> {
//!     bot.send_message(&SendMessage::new(message.chat.id, "hello")).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{error, warn};

use courier_core::api::SendMessage;

use crate::context::CourierContext;
use crate::extractor::FromContext;

// ============================================================================
// HandleResponse - Handle handler return values
// ============================================================================

/// A trait for types that can handle handler return values.
#[async_trait]
pub trait HandleResponse: Send {
    /// Acts on the returned value.
    async fn into_response(self, ctx: Arc<CourierContext>);
}

#[async_trait]
impl HandleResponse for () {
    async fn into_response(self, _ctx: Arc<CourierContext>) {}
}

/// Sends the text to the chat the update came from.
#[async_trait]
impl HandleResponse for String {
    async fn into_response(self, ctx: Arc<CourierContext>) {
        if self.is_empty() {
            return;
        }
        let update = ctx.update();
        let Some(chat_id) = update.chat_id() else {
            warn!(
                update_id = update.update_id,
                kind = update.kind.name(),
                "Handler reply dropped: update has no chat"
            );
            return;
        };
        if let Err(e) = ctx.bot().send_message(&SendMessage::new(chat_id, self)).await {
            error!(chat_id, error = %e, "Failed to send handler reply");
        }
    }
}

/// On `Some`, the inner value's response is handled.
#[async_trait]
impl<T: HandleResponse> HandleResponse for Option<T> {
    async fn into_response(self, ctx: Arc<CourierContext>) {
        if let Some(t) = self {
            t.into_response(ctx).await;
        }
    }
}

/// On `Ok`, the inner value's response is handled. On `Err`, the error is logged.
#[async_trait]
impl<T: HandleResponse, E: std::fmt::Display + Send> HandleResponse for Result<T, E> {
    async fn into_response(self, ctx: Arc<CourierContext>) {
        match self {
            Ok(t) => t.into_response(ctx).await,
            Err(e) => {
                error!(update_id = ctx.update().update_id, error = %e, "Handler error");
            }
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for update handlers.
///
/// Implemented for async functions that take 0-16 parameters implementing
/// [`FromContext`] and return a type implementing [`HandleResponse`].
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Call the handler with the given context.
    async fn call(self, ctx: Arc<CourierContext>);
}

// ============================================================================
// BoxedHandler - Type-erased handler stored in collections
// ============================================================================

/// A type-erased handler that can be stored in collections.
pub type BoxedHandler = Arc<dyn Fn(Arc<CourierContext>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Convert a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T> + Send + Sync + 'static,
    T: 'static,
{
    Arc::new(move |ctx| f.clone().call(ctx))
}

// ============================================================================
// Handler implementations for functions
// ============================================================================

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: HandleResponse + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            async fn call(self, ctx: Arc<CourierContext>) {
                $(
                    let $ty = match $ty::from_context(&ctx) {
                        Ok(value) => value,
                        Err(e) => {
                            tracing::trace!(error = %e, "Handler skipped");
                            return;
                        }
                    };
                )*

                let res = (self)($($ty,)*).await;
                res.into_response(ctx).await;
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14);
impl_handler!(
    T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15
);
impl_handler!(
    T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15, T16
);

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use wiremock::matchers::{body_json, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use courier_core::types::Message;
    use courier_core::{ClientConfig, Update};

    use super::*;
    use crate::bot::Bot;
    use crate::command::Command;

    fn context(bot: Bot, text: &str) -> Arc<CourierContext> {
        let update: Update = serde_json::from_value(json!({
            "update_id": 1,
            "message": {
                "message_id": 4,
                "date": 0,
                "chat": {"id": 9, "type": "private"},
                "text": text
            }
        }))
        .unwrap();
        Arc::new(CourierContext::new(bot, Arc::new(update)))
    }

    fn offline_bot() -> Bot {
        Bot::new(ClientConfig::new("1:t").with_api_url("http://127.0.0.1:9")).unwrap()
    }

    #[tokio::test]
    async fn handler_receives_extracted_parameters() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        async fn handler(message: Message, command: Command) {
            assert_eq!(message.chat.id, 9);
            assert_eq!(command.name, "ping");
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        into_handler(handler)(context(offline_bot(), "/ping")).await;
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_extraction_skips_handler() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        async fn handler(_command: Command) {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        into_handler(handler)(context(offline_bot(), "no command")).await;
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn string_response_replies_in_chat() {
        let server = MockServer::start().await;
        Mock::given(path("/bot1:t/sendMessage"))
            .and(body_json(json!({"chat_id": 9, "text": "pong"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 5, "date": 0, "chat": {"id": 9, "type": "private"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let bot = Bot::new(ClientConfig::new("1:t").with_api_url(server.uri())).unwrap();

        async fn handler() -> String {
            "pong".to_string()
        }

        into_handler(handler)(context(bot, "/ping")).await;
    }

    #[tokio::test]
    async fn error_response_is_logged_not_propagated() {
        async fn handler() -> Result<String, String> {
            Err("boom".to_string())
        }

        into_handler(handler)(context(offline_bot(), "/ping")).await;
    }
}
