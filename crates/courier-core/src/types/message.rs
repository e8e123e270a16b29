//! Messages.

use serde::{Deserialize, Serialize};

use super::{Audio, Chat, Contact, Dice, Document, InlineKeyboardMarkup, Location, PhotoSize, Poll, User, Video, Voice};

/// A message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier inside the chat.
    pub message_id: i64,
    /// Forum topic the message belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    /// Sender; empty for messages sent to channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    /// Sender when sent on behalf of a chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_chat: Option<Chat>,
    /// Unix time the message was sent.
    pub date: i64,
    /// Conversation the message belongs to.
    pub chat: Chat,
    /// Original sender of a forwarded message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_from: Option<User>,
    /// Original chat of a message forwarded from a channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_from_chat: Option<Chat>,
    /// Unix time the original message was sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_date: Option<i64>,
    /// The message this one replies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
    /// Unix time of the last edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_date: Option<i64>,
    /// UTF-8 text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Special entities in the text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,
    /// Caption of a media message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Special entities in the caption.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption_entities: Vec<MessageEntity>,
    /// Available sizes of an attached photo.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo: Vec<PhotoSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Audio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<Voice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<Poll>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dice: Option<Dice>,
    /// Members added to the group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_chat_members: Vec<User>,
    /// Member removed from the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_chat_member: Option<User>,
    /// Inline keyboard attached to the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl Message {
    /// The text, or the caption for media messages.
    pub fn text_or_caption(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    /// Identifier of the chat the message belongs to.
    pub fn chat_id(&self) -> i64 {
        self.chat.id
    }
}

/// A special entity in a text: hashtag, command, URL, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    /// Entity kind, such as `bot_command`, `url` or `bold`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Offset in UTF-16 code units.
    pub offset: u32,
    /// Length in UTF-16 code units.
    pub length: u32,
    /// `text_link` only: URL opened on tap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `text_mention` only: the mentioned user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// `pre` only: programming language of the block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Formatting of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseMode {
    /// MarkdownV2 style.
    MarkdownV2,
    /// HTML style.
    #[serde(rename = "HTML")]
    Html,
    /// Legacy Markdown style.
    Markdown,
}

crate::serde_form_value!(ParseMode);

/// Link preview generation options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPreviewOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_small_media: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_large_media: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_above_text: Option<bool>,
}

/// Identifier of a sent message, returned by copy-style methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageId {
    pub message_id: i64,
}

crate::json_form_value!(LinkPreviewOptions, MessageEntity);

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = r#"{
        "message_id": 11,
        "from": {"id": 7, "is_bot": false, "first_name": "Ada", "username": "ada"},
        "date": 1700000000,
        "chat": {"id": 7, "type": "private", "first_name": "Ada"},
        "text": "/start hello",
        "entities": [{"type": "bot_command", "offset": 0, "length": 6}]
    }"#;

    #[test]
    fn decodes_text_message() {
        let message: Message = serde_json::from_str(RAW).unwrap();
        assert_eq!(message.message_id, 11);
        assert_eq!(message.chat_id(), 7);
        assert!(message.chat.is_private());
        assert_eq!(message.text_or_caption(), Some("/start hello"));
        assert_eq!(message.entities[0].kind, "bot_command");
        assert_eq!(message.from.as_ref().and_then(User::mention).as_deref(), Some("@ada"));
    }

    #[test]
    fn reencoding_preserves_populated_fields() {
        let message: Message = serde_json::from_str(RAW).unwrap();
        let json = serde_json::to_value(&message).unwrap();
        let again: Message = serde_json::from_value(json.clone()).unwrap();

        assert_eq!(again, message);
        assert!(json.get("caption").is_none());
        assert!(json.get("photo").is_none());
        assert_eq!(json["chat"]["type"], "private");
    }

    #[test]
    fn parse_mode_wire_names() {
        assert_eq!(serde_json::to_string(&ParseMode::Html).unwrap(), r#""HTML""#);

        let mut form = crate::FormFields::new();
        crate::FormValue::write_to(&ParseMode::Html, "parse_mode", &mut form).unwrap();
        assert_eq!(form.get("parse_mode"), Some(&crate::FieldValue::Text("HTML".into())));
    }
}
