//! Extractors: handler parameters pulled from a [`CourierContext`].
//!
//! Any type implementing [`FromContext`] can be a handler parameter. When
//! extraction fails the handler is skipped for that update.
//!
//! ```rust,ignore
//! async fn on_callback(bot: Bot, query: CallbackQuery) -> ApiResult<bool> {
//!     bot.answer_callback_query(&AnswerCallbackQuery::new(query.id)).await
//! }
//! ```

use std::sync::Arc;

use courier_core::types::{
    CallbackQuery, ChatJoinRequest, ChatMemberUpdated, ChosenInlineResult, InlineQuery, Message,
    Poll, PollAnswer, PreCheckoutQuery, ShippingQuery,
};
use courier_core::{Update, UpdateKind};

use crate::bot::Bot;
use crate::command::Command;
use crate::context::CourierContext;
use crate::error::{ExtractError, ExtractResult};

/// A trait for types that can be extracted from a [`CourierContext`].
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &CourierContext) -> ExtractResult<Self>;
}

/// Optional parameters never cause the handler to be skipped.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &CourierContext) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

impl FromContext for Bot {
    fn from_context(ctx: &CourierContext) -> ExtractResult<Self> {
        Ok(ctx.bot().clone())
    }
}

impl FromContext for Arc<Update> {
    fn from_context(ctx: &CourierContext) -> ExtractResult<Self> {
        Ok(ctx.update().clone())
    }
}

impl FromContext for Command {
    fn from_context(ctx: &CourierContext) -> ExtractResult<Self> {
        ctx.command().cloned().ok_or(ExtractError::NoCommand)
    }
}

/// The message of the update: new, edited, channel post, or the message a
/// callback button was attached to.
impl FromContext for Message {
    fn from_context(ctx: &CourierContext) -> ExtractResult<Self> {
        ctx.update()
            .any_message()
            .cloned()
            .ok_or_else(|| ExtractError::KindMismatch {
                expected: "message",
                got: ctx.update().kind.name(),
            })
    }
}

/// Chat member changes, whether about the bot itself or another member.
impl FromContext for ChatMemberUpdated {
    fn from_context(ctx: &CourierContext) -> ExtractResult<Self> {
        match &ctx.update().kind {
            UpdateKind::MyChatMember(change) | UpdateKind::ChatMember(change) => {
                Ok(change.clone())
            }
            other => Err(ExtractError::KindMismatch {
                expected: "chat_member",
                got: other.name(),
            }),
        }
    }
}

macro_rules! kind_extractor {
    ($($ty:ident => $variant:ident, $name:literal;)*) => {
        $(
            impl FromContext for $ty {
                fn from_context(ctx: &CourierContext) -> ExtractResult<Self> {
                    match &ctx.update().kind {
                        UpdateKind::$variant(payload) => Ok(payload.clone()),
                        other => Err(ExtractError::KindMismatch {
                            expected: $name,
                            got: other.name(),
                        }),
                    }
                }
            }
        )*
    };
}

kind_extractor! {
    InlineQuery => InlineQuery, "inline_query";
    ChosenInlineResult => ChosenInlineResult, "chosen_inline_result";
    CallbackQuery => CallbackQuery, "callback_query";
    ShippingQuery => ShippingQuery, "shipping_query";
    PreCheckoutQuery => PreCheckoutQuery, "pre_checkout_query";
    Poll => Poll, "poll";
    PollAnswer => PollAnswer, "poll_answer";
    ChatJoinRequest => ChatJoinRequest, "chat_join_request";
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use courier_core::ClientConfig;

    use super::*;

    fn context(update: serde_json::Value) -> CourierContext {
        let bot = Bot::new(ClientConfig::new("1:t")).unwrap();
        let update: Update = serde_json::from_value(update).unwrap();
        CourierContext::new(bot, Arc::new(update))
    }

    fn message_update(text: &str) -> serde_json::Value {
        json!({
            "update_id": 1,
            "message": {
                "message_id": 4,
                "date": 0,
                "chat": {"id": 9, "type": "private"},
                "text": text
            }
        })
    }

    #[test]
    fn extracts_message_and_command() {
        let ctx = context(message_update("/echo hi"));

        let message = Message::from_context(&ctx).unwrap();
        assert_eq!(message.message_id, 4);

        let command = Command::from_context(&ctx).unwrap();
        assert_eq!(command.name, "echo");
        assert_eq!(command.args, "hi");
    }

    #[test]
    fn plain_text_has_no_command() {
        let ctx = context(message_update("hi"));
        assert!(matches!(Command::from_context(&ctx), Err(ExtractError::NoCommand)));
        assert_eq!(Option::<Command>::from_context(&ctx).unwrap(), None);
    }

    #[test]
    fn kind_mismatch_reports_both_kinds() {
        let ctx = context(message_update("hi"));
        match CallbackQuery::from_context(&ctx) {
            Err(ExtractError::KindMismatch { expected, got }) => {
                assert_eq!(expected, "callback_query");
                assert_eq!(got, "message");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn callback_query_and_its_message() {
        let ctx = context(json!({
            "update_id": 2,
            "callback_query": {
                "id": "cb1",
                "from": {"id": 3, "is_bot": false, "first_name": "Ann"},
                "chat_instance": "ci",
                "data": "press",
                "message": {
                    "message_id": 8,
                    "date": 0,
                    "chat": {"id": 9, "type": "private"}
                }
            }
        }));

        let query = CallbackQuery::from_context(&ctx).unwrap();
        assert_eq!(query.id, "cb1");
        assert_eq!(Message::from_context(&ctx).unwrap().message_id, 8);
        assert!(ctx.command().is_none());
    }
}
