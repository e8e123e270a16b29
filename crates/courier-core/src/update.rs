//! Inbound updates.
//!
//! On the wire an update is an object with an `update_id` and exactly one
//! payload key. Here it is an [`Update`] carrying a tagged [`UpdateKind`],
//! so routing can match exhaustively.
//!
//! When a payload carries several known keys, the first one in this order
//! wins: `message`, `edited_message`, `channel_post`, `edited_channel_post`,
//! `inline_query`, `chosen_inline_result`, `callback_query`,
//! `shipping_query`, `pre_checkout_query`, `poll`, `poll_answer`,
//! `my_chat_member`, `chat_member`, `chat_join_request`. An object with none
//! of them becomes [`UpdateKind::Unknown`].

use serde::de::{self, DeserializeOwned};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::types::{
    CallbackQuery, ChatJoinRequest, ChatMemberUpdated, ChosenInlineResult, InlineQuery, Message,
    Poll, PollAnswer, PreCheckoutQuery, ShippingQuery,
};

/// Names accepted by the `allowed_updates` filter.
pub mod allowed {
    pub const MESSAGE: &str = "message";
    pub const EDITED_MESSAGE: &str = "edited_message";
    pub const CHANNEL_POST: &str = "channel_post";
    pub const EDITED_CHANNEL_POST: &str = "edited_channel_post";
    pub const INLINE_QUERY: &str = "inline_query";
    pub const CHOSEN_INLINE_RESULT: &str = "chosen_inline_result";
    pub const CALLBACK_QUERY: &str = "callback_query";
    pub const SHIPPING_QUERY: &str = "shipping_query";
    pub const PRE_CHECKOUT_QUERY: &str = "pre_checkout_query";
    pub const POLL: &str = "poll";
    pub const POLL_ANSWER: &str = "poll_answer";
    pub const MY_CHAT_MEMBER: &str = "my_chat_member";
    pub const CHAT_MEMBER: &str = "chat_member";
    pub const CHAT_JOIN_REQUEST: &str = "chat_join_request";

    /// Every known kind, in routing precedence order.
    pub const ALL: [&str; 14] = [
        MESSAGE,
        EDITED_MESSAGE,
        CHANNEL_POST,
        EDITED_CHANNEL_POST,
        INLINE_QUERY,
        CHOSEN_INLINE_RESULT,
        CALLBACK_QUERY,
        SHIPPING_QUERY,
        PRE_CHECKOUT_QUERY,
        POLL,
        POLL_ANSWER,
        MY_CHAT_MEMBER,
        CHAT_MEMBER,
        CHAT_JOIN_REQUEST,
    ];
}

/// One inbound event.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Sequence number assigned by the service.
    pub update_id: i64,
    /// The populated payload.
    pub kind: UpdateKind,
}

/// The payload of an [`Update`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKind {
    Message(Message),
    EditedMessage(Message),
    ChannelPost(Message),
    EditedChannelPost(Message),
    InlineQuery(InlineQuery),
    ChosenInlineResult(ChosenInlineResult),
    CallbackQuery(CallbackQuery),
    ShippingQuery(ShippingQuery),
    PreCheckoutQuery(PreCheckoutQuery),
    Poll(Poll),
    PollAnswer(PollAnswer),
    MyChatMember(ChatMemberUpdated),
    ChatMember(ChatMemberUpdated),
    ChatJoinRequest(ChatJoinRequest),
    /// A payload this library does not know, with the `update_id` removed.
    Unknown(Value),
}

impl UpdateKind {
    /// Wire key of the payload, or `"unknown"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Message(_) => allowed::MESSAGE,
            Self::EditedMessage(_) => allowed::EDITED_MESSAGE,
            Self::ChannelPost(_) => allowed::CHANNEL_POST,
            Self::EditedChannelPost(_) => allowed::EDITED_CHANNEL_POST,
            Self::InlineQuery(_) => allowed::INLINE_QUERY,
            Self::ChosenInlineResult(_) => allowed::CHOSEN_INLINE_RESULT,
            Self::CallbackQuery(_) => allowed::CALLBACK_QUERY,
            Self::ShippingQuery(_) => allowed::SHIPPING_QUERY,
            Self::PreCheckoutQuery(_) => allowed::PRE_CHECKOUT_QUERY,
            Self::Poll(_) => allowed::POLL,
            Self::PollAnswer(_) => allowed::POLL_ANSWER,
            Self::MyChatMember(_) => allowed::MY_CHAT_MEMBER,
            Self::ChatMember(_) => allowed::CHAT_MEMBER,
            Self::ChatJoinRequest(_) => allowed::CHAT_JOIN_REQUEST,
            Self::Unknown(_) => "unknown",
        }
    }

    /// Returns `true` for payloads this library does not know.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl Update {
    /// Decodes an update from a JSON body.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The message of kinds that carry commands: new messages and channel posts.
    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(message) | UpdateKind::ChannelPost(message) => Some(message),
            _ => None,
        }
    }

    /// Any message carried by the update, including edits and the message
    /// of a callback query.
    pub fn any_message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(message)
            | UpdateKind::EditedMessage(message)
            | UpdateKind::ChannelPost(message)
            | UpdateKind::EditedChannelPost(message) => Some(message),
            UpdateKind::CallbackQuery(query) => query.message.as_deref(),
            _ => None,
        }
    }

    /// Chat the update happened in, when there is one.
    pub fn chat_id(&self) -> Option<i64> {
        match &self.kind {
            UpdateKind::MyChatMember(change) | UpdateKind::ChatMember(change) => {
                Some(change.chat.id)
            }
            UpdateKind::ChatJoinRequest(request) => Some(request.chat.id),
            _ => self.any_message().map(Message::chat_id),
        }
    }
}

// =============================================================================
// Serde
// =============================================================================

fn take<T: DeserializeOwned, E: de::Error>(
    map: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<T>, E> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|err| E::custom(format!("invalid `{key}`: {err}"))),
    }
}

impl<'de> Deserialize<'de> for Update {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        let update_id = match map.remove("update_id") {
            Some(value) => value
                .as_i64()
                .ok_or_else(|| <D::Error as de::Error>::custom("`update_id` must be an integer"))?,
            None => return Err(de::Error::missing_field("update_id")),
        };

        macro_rules! first_of {
            ($($key:path => $variant:ident),* $(,)?) => {
                $(
                    if let Some(payload) = take::<_, D::Error>(&mut map, $key)? {
                        return Ok(Update { update_id, kind: UpdateKind::$variant(payload) });
                    }
                )*
            };
        }

        first_of! {
            allowed::MESSAGE => Message,
            allowed::EDITED_MESSAGE => EditedMessage,
            allowed::CHANNEL_POST => ChannelPost,
            allowed::EDITED_CHANNEL_POST => EditedChannelPost,
            allowed::INLINE_QUERY => InlineQuery,
            allowed::CHOSEN_INLINE_RESULT => ChosenInlineResult,
            allowed::CALLBACK_QUERY => CallbackQuery,
            allowed::SHIPPING_QUERY => ShippingQuery,
            allowed::PRE_CHECKOUT_QUERY => PreCheckoutQuery,
            allowed::POLL => Poll,
            allowed::POLL_ANSWER => PollAnswer,
            allowed::MY_CHAT_MEMBER => MyChatMember,
            allowed::CHAT_MEMBER => ChatMember,
            allowed::CHAT_JOIN_REQUEST => ChatJoinRequest,
        }

        Ok(Update {
            update_id,
            kind: UpdateKind::Unknown(Value::Object(map)),
        })
    }
}

impl Serialize for Update {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let UpdateKind::Unknown(value) = &self.kind {
            let fields = value.as_object();
            let mut map = serializer.serialize_map(Some(1 + fields.map_or(0, Map::len)))?;
            map.serialize_entry("update_id", &self.update_id)?;
            for (key, value) in fields.into_iter().flatten() {
                map.serialize_entry(key, value)?;
            }
            return map.end();
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("update_id", &self.update_id)?;
        let key = self.kind.name();
        match &self.kind {
            UpdateKind::Message(m)
            | UpdateKind::EditedMessage(m)
            | UpdateKind::ChannelPost(m)
            | UpdateKind::EditedChannelPost(m) => map.serialize_entry(key, m)?,
            UpdateKind::InlineQuery(q) => map.serialize_entry(key, q)?,
            UpdateKind::ChosenInlineResult(r) => map.serialize_entry(key, r)?,
            UpdateKind::CallbackQuery(q) => map.serialize_entry(key, q)?,
            UpdateKind::ShippingQuery(q) => map.serialize_entry(key, q)?,
            UpdateKind::PreCheckoutQuery(q) => map.serialize_entry(key, q)?,
            UpdateKind::Poll(p) => map.serialize_entry(key, p)?,
            UpdateKind::PollAnswer(a) => map.serialize_entry(key, a)?,
            UpdateKind::MyChatMember(c) | UpdateKind::ChatMember(c) => {
                map.serialize_entry(key, c)?
            }
            UpdateKind::ChatJoinRequest(r) => map.serialize_entry(key, r)?,
            UpdateKind::Unknown(_) => {}
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message_json(text: &str) -> Value {
        json!({
            "message_id": 1,
            "date": 1700000000,
            "chat": {"id": 99, "type": "group", "title": "g"},
            "text": text
        })
    }

    #[test]
    fn decodes_message_update() {
        let raw = json!({"update_id": 10, "message": message_json("hi")});
        let update: Update = serde_json::from_value(raw).unwrap();

        assert_eq!(update.update_id, 10);
        assert_eq!(update.kind.name(), "message");
        assert_eq!(update.message().and_then(|m| m.text.as_deref()), Some("hi"));
        assert_eq!(update.chat_id(), Some(99));
    }

    #[test]
    fn first_known_key_wins() {
        let raw = json!({
            "update_id": 3,
            "channel_post": message_json("post"),
            "edited_message": message_json("edit")
        });
        let update: Update = serde_json::from_value(raw).unwrap();
        assert!(matches!(update.kind, UpdateKind::EditedMessage(_)));
        assert!(update.message().is_none());
        assert!(update.any_message().is_some());
    }

    #[test]
    fn unknown_payload_is_kept() {
        let raw = json!({"update_id": 4, "business_message": {"x": 1}});
        let update: Update = serde_json::from_value(raw.clone()).unwrap();

        assert!(update.kind.is_unknown());
        assert_eq!(serde_json::to_value(&update).unwrap(), raw);
    }

    #[test]
    fn reencoding_preserves_shape() {
        let raw = json!({"update_id": 8, "channel_post": message_json("/news today")});
        let update: Update = serde_json::from_value(raw).unwrap();
        let again: Update = serde_json::from_value(serde_json::to_value(&update).unwrap()).unwrap();
        assert_eq!(again, update);
        assert!(matches!(again.kind, UpdateKind::ChannelPost(_)));
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        assert!(Update::from_slice(br#"{"message": {}}"#).is_err());
        assert!(Update::from_slice(br#"{"update_id": 1, "message": {"chat": 5}}"#).is_err());
        assert!(Update::from_slice(b"not json").is_err());
    }
}
