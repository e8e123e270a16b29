//! Media groups.
//!
//! A media group travels as one `media` field holding a JSON array. Uploaded
//! files cannot live inside JSON, so the multipart encoding replaces each
//! upload with `attach://<part>` and adds the file as its own part.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ApiMethod;
use crate::error::{EncodingError, EncodingResult};
use crate::input_file::{ATTACH_PREFIX, InputFile};
use crate::params::{FormFields, FormValue, Params, is_false, write_json};
use crate::types::{ChatId, Message, MessageEntity, ParseMode};

/// Kind of a media group item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMediaKind {
    Photo,
    Video,
    Animation,
    Audio,
    Document,
}

/// One item of a media group.
///
/// Only a subset of the fields applies to each kind; the service ignores the
/// rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMedia {
    #[serde(rename = "type")]
    pub kind: InputMediaKind,
    pub media: InputFile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption_entities: Vec<MessageEntity>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_spoiler: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<InputFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub supports_streaming: bool,
    /// Audio only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    /// Audio only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document only.
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_content_type_detection: bool,
}

impl InputMedia {
    pub fn new(kind: InputMediaKind, media: impl Into<InputFile>) -> Self {
        Self {
            kind,
            media: media.into(),
            caption: None,
            parse_mode: None,
            caption_entities: Vec::new(),
            has_spoiler: false,
            thumbnail: None,
            width: None,
            height: None,
            duration: None,
            supports_streaming: false,
            performer: None,
            title: None,
            disable_content_type_detection: false,
        }
    }

    pub fn photo(media: impl Into<InputFile>) -> Self {
        Self::new(InputMediaKind::Photo, media)
    }

    pub fn video(media: impl Into<InputFile>) -> Self {
        Self::new(InputMediaKind::Video, media)
    }

    pub fn animation(media: impl Into<InputFile>) -> Self {
        Self::new(InputMediaKind::Animation, media)
    }

    pub fn audio(media: impl Into<InputFile>) -> Self {
        Self::new(InputMediaKind::Audio, media)
    }

    pub fn document(media: impl Into<InputFile>) -> Self {
        Self::new(InputMediaKind::Document, media)
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn thumbnail(mut self, thumbnail: impl Into<InputFile>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// `sendMediaGroup`: sends 2-10 items as an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMediaGroup {
    pub chat_id: ChatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    pub media: Vec<InputMedia>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_notification: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub protect_content: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_sending_without_reply: bool,
}

impl SendMediaGroup {
    pub fn new(chat_id: impl Into<ChatId>, media: Vec<InputMedia>) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_thread_id: None,
            media,
            disable_notification: false,
            protect_content: false,
            reply_to_message_id: None,
            allow_sending_without_reply: false,
        }
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }
}

impl ApiMethod for SendMediaGroup {
    const NAME: &'static str = "sendMediaGroup";
    type Output = Vec<Message>;
}

/// Written by hand: uploads inside `media` become parts of their own.
impl Params for SendMediaGroup {
    fn write_fields(&self, form: &mut FormFields) -> EncodingResult<()> {
        self.chat_id.write_to("chat_id", form)?;
        self.message_thread_id.write_to("message_thread_id", form)?;
        write_media(&self.media, form)?;
        if self.disable_notification {
            self.disable_notification.write_to("disable_notification", form)?;
        }
        if self.protect_content {
            self.protect_content.write_to("protect_content", form)?;
        }
        self.reply_to_message_id.write_to("reply_to_message_id", form)?;
        if self.allow_sending_without_reply {
            self.allow_sending_without_reply
                .write_to("allow_sending_without_reply", form)?;
        }
        Ok(())
    }
}

/// Writes the `media` array, followed by one part per upload. Parts are named
/// `file<N>` for an item's media and `thumb<N>` for its thumbnail.
fn write_media(media: &[InputMedia], form: &mut FormFields) -> EncodingResult<()> {
    let mut items = Vec::with_capacity(media.len());
    let mut uploads = Vec::new();

    for (idx, item) in media.iter().enumerate() {
        let mut value =
            serde_json::to_value(item).map_err(|err| EncodingError::json("media", &err))?;
        let Some(object) = value.as_object_mut() else {
            return Err(EncodingError::Body("media item must encode as an object".to_string()));
        };
        attach(object, "media", &item.media, format!("file{idx}"), &mut uploads);
        if let Some(thumbnail) = &item.thumbnail {
            attach(object, "thumbnail", thumbnail, format!("thumb{idx}"), &mut uploads);
        }
        items.push(value);
    }

    write_json(&items, "media", form)?;
    for (part, file) in uploads {
        form.push_file(&part, file);
    }
    Ok(())
}

fn attach(
    object: &mut Map<String, Value>,
    key: &str,
    file: &InputFile,
    part: String,
    uploads: &mut Vec<(String, InputFile)>,
) {
    if file.is_upload() {
        object.insert(key.to_string(), Value::String(format!("{ATTACH_PREFIX}{part}")));
        uploads.push((part, file.clone()));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::FieldValue;

    fn media_json(form: &FormFields) -> Value {
        match form.get("media") {
            Some(FieldValue::Text(text)) => serde_json::from_str(text).unwrap(),
            other => panic!("expected media text, got {other:?}"),
        }
    }

    #[test]
    fn remote_items_encode_the_same_in_both_bodies() {
        let request = SendMediaGroup::new(
            7i64,
            vec![
                InputMedia::photo("AgACAgIAAxk").caption("first"),
                InputMedia::video("https://example.com/clip.mp4"),
            ],
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "chat_id": 7,
                "media": [
                    {"type": "photo", "media": "AgACAgIAAxk", "caption": "first"},
                    {"type": "video", "media": "https://example.com/clip.mp4"}
                ]
            })
        );

        let form = request.form_fields().unwrap();
        let names: Vec<_> = form.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["chat_id", "media"]);
        assert_eq!(media_json(&form), json["media"]);
        assert!(!form.has_uploads());
    }

    #[test]
    fn uploads_become_attached_parts() {
        let request = SendMediaGroup::new(
            7i64,
            vec![
                InputMedia::photo(InputFile::memory("a.png", vec![1u8])),
                InputMedia::document("BQAC").thumbnail(InputFile::memory("t.jpg", vec![2u8])),
            ],
        )
        .reply_to(3);

        let form = request.form_fields().unwrap();
        let names: Vec<_> = form.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["chat_id", "media", "file0", "thumb1", "reply_to_message_id"]);
        assert_eq!(
            media_json(&form),
            json!([
                {"type": "photo", "media": "attach://file0"},
                {"type": "document", "media": "BQAC", "thumbnail": "attach://thumb1"}
            ])
        );
        assert_eq!(
            form.get("file0"),
            Some(&FieldValue::File(InputFile::memory("a.png", vec![1u8])))
        );
        assert!(form.get("thumb1").is_some_and(FieldValue::is_upload));
    }

    #[test]
    fn unset_flags_are_omitted() {
        let mut request = SendMediaGroup::new("@album", vec![InputMedia::audio("CQAC")]);
        let form = request.form_fields().unwrap();
        assert!(!form.contains("disable_notification"));

        request.disable_notification = true;
        let form = request.form_fields().unwrap();
        assert_eq!(
            form.get("disable_notification"),
            Some(&FieldValue::Text("true".into()))
        );
    }
}
