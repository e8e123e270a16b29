use serde::{Deserialize, Serialize};

use super::ApiMethod;
use crate::input_file::InputFile;
use crate::params::is_false;
use crate::types::{
    ChatId, File, LinkPreviewOptions, Message, MessageEntity, ParseMode, PollType, ReplyMarkup,
};
use crate::Params;

// =============================================================================
// Shared Options
// =============================================================================

/// Parameters shared by every send method.
///
/// Flattened into the request, so its fields sit next to the method's own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct SendOptions {
    /// Forum topic to send to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    /// Deliver silently.
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_notification: bool,
    /// Forbid forwarding and saving.
    #[serde(default, skip_serializing_if = "is_false")]
    pub protect_content: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_sending_without_reply: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

macro_rules! send_options_builders {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $ty {
                /// Replies to a message in the same chat.
                pub fn reply_to(mut self, message_id: i64) -> Self {
                    self.options.reply_to_message_id = Some(message_id);
                    self
                }

                /// Attaches a keyboard or reply interface.
                pub fn reply_markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
                    self.options.reply_markup = Some(markup.into());
                    self
                }

                /// Sends without a notification sound.
                pub fn silent(mut self) -> Self {
                    self.options.disable_notification = true;
                    self
                }

                /// Sends into a forum topic.
                pub fn thread(mut self, thread_id: i64) -> Self {
                    self.options.message_thread_id = Some(thread_id);
                    self
                }
            }
        )*
    };
}

// =============================================================================
// Send Methods
// =============================================================================

/// `sendMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct SendMessage {
    pub chat_id: ChatId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_preview_options: Option<LinkPreviewOptions>,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendMessage {
    pub fn new(chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: None,
            entities: Vec::new(),
            link_preview_options: None,
            options: SendOptions::default(),
        }
    }

    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }
}

impl ApiMethod for SendMessage {
    const NAME: &'static str = "sendMessage";
    type Output = Message;
}

/// `sendPhoto`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct SendPhoto {
    pub chat_id: ChatId,
    pub photo: InputFile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_spoiler: bool,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendPhoto {
    pub fn new(chat_id: impl Into<ChatId>, photo: impl Into<InputFile>) -> Self {
        Self {
            chat_id: chat_id.into(),
            photo: photo.into(),
            caption: None,
            parse_mode: None,
            has_spoiler: false,
            options: SendOptions::default(),
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

impl ApiMethod for SendPhoto {
    const NAME: &'static str = "sendPhoto";
    type Output = Message;
}

/// `sendDocument`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct SendDocument {
    pub chat_id: ChatId,
    pub document: InputFile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<InputFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_content_type_detection: bool,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendDocument {
    pub fn new(chat_id: impl Into<ChatId>, document: impl Into<InputFile>) -> Self {
        Self {
            chat_id: chat_id.into(),
            document: document.into(),
            thumbnail: None,
            caption: None,
            parse_mode: None,
            disable_content_type_detection: false,
            options: SendOptions::default(),
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

impl ApiMethod for SendDocument {
    const NAME: &'static str = "sendDocument";
    type Output = Message;
}

// =============================================================================
// Location, Contact, Poll, Dice
// =============================================================================

/// `sendLocation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Params)]
pub struct SendLocation {
    pub chat_id: ChatId,
    pub latitude: f64,
    pub longitude: f64,
    /// Uncertainty radius in meters, 0-1500.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_accuracy: Option<f64>,
    /// Seconds the location stays live, 60-86400.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_period: Option<u32>,
    /// Degrees, 1-360. Live locations only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity_alert_radius: Option<u32>,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendLocation {
    pub fn new(chat_id: impl Into<ChatId>, latitude: f64, longitude: f64) -> Self {
        Self {
            chat_id: chat_id.into(),
            latitude,
            longitude,
            horizontal_accuracy: None,
            live_period: None,
            heading: None,
            proximity_alert_radius: None,
            options: SendOptions::default(),
        }
    }

    /// Keeps the location updatable for `seconds`.
    pub fn live_for(mut self, seconds: u32) -> Self {
        self.live_period = Some(seconds);
        self
    }
}

impl ApiMethod for SendLocation {
    const NAME: &'static str = "sendLocation";
    type Output = Message;
}

/// `sendContact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct SendContact {
    pub chat_id: ChatId,
    pub phone_number: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Extra data as a vCard, up to 2048 bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcard: Option<String>,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendContact {
    pub fn new(
        chat_id: impl Into<ChatId>,
        phone_number: impl Into<String>,
        first_name: impl Into<String>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            phone_number: phone_number.into(),
            first_name: first_name.into(),
            last_name: None,
            vcard: None,
            options: SendOptions::default(),
        }
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }
}

impl ApiMethod for SendContact {
    const NAME: &'static str = "sendContact";
    type Output = Message;
}

/// `sendPoll`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct SendPoll {
    pub chat_id: ChatId,
    pub question: String,
    /// Answer options, 2-10 strings.
    #[serde(rename = "options")]
    pub answers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_anonymous: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PollType>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allows_multiple_answers: bool,
    /// Required for quizzes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_parse_mode: Option<ParseMode>,
    /// Seconds the poll stays open, 5-600.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_period: Option<u32>,
    /// Unix time the poll closes at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_date: Option<i64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_closed: bool,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendPoll {
    pub fn new<I, S>(chat_id: impl Into<ChatId>, question: impl Into<String>, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chat_id: chat_id.into(),
            question: question.into(),
            answers: answers.into_iter().map(Into::into).collect(),
            is_anonymous: None,
            kind: None,
            allows_multiple_answers: false,
            correct_option_id: None,
            explanation: None,
            explanation_parse_mode: None,
            open_period: None,
            close_date: None,
            is_closed: false,
            options: SendOptions::default(),
        }
    }

    /// Turns the poll into a quiz with one correct answer.
    pub fn quiz(mut self, correct_option_id: u32) -> Self {
        self.kind = Some(PollType::Quiz);
        self.correct_option_id = Some(correct_option_id);
        self
    }

    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

impl ApiMethod for SendPoll {
    const NAME: &'static str = "sendPoll";
    type Output = Message;
}

/// `sendDice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct SendDice {
    pub chat_id: ChatId,
    /// One of the supported dice emoji. The service defaults to a die.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(flatten)]
    pub options: SendOptions,
}

impl SendDice {
    pub fn new(chat_id: impl Into<ChatId>) -> Self {
        Self {
            chat_id: chat_id.into(),
            emoji: None,
            options: SendOptions::default(),
        }
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }
}

impl ApiMethod for SendDice {
    const NAME: &'static str = "sendDice";
    type Output = Message;
}

send_options_builders!(
    SendMessage,
    SendPhoto,
    SendDocument,
    SendLocation,
    SendContact,
    SendPoll,
    SendDice,
);

// =============================================================================
// Chat Actions
// =============================================================================

/// Status shown to the other party while the bot prepares a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    RecordVideo,
    UploadVideo,
    RecordVoice,
    UploadVoice,
    UploadDocument,
    ChooseSticker,
    FindLocation,
    RecordVideoNote,
    UploadVideoNote,
}

crate::serde_form_value!(ChatAction);

/// `sendChatAction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct SendChatAction {
    pub chat_id: ChatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    pub action: ChatAction,
}

impl ApiMethod for SendChatAction {
    const NAME: &'static str = "sendChatAction";
    type Output = bool;
}

// =============================================================================
// Other Methods
// =============================================================================

/// `forwardMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct ForwardMessage {
    pub chat_id: ChatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    pub from_chat_id: ChatId,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_notification: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub protect_content: bool,
    pub message_id: i64,
}

impl ForwardMessage {
    pub fn new(chat_id: impl Into<ChatId>, from_chat_id: impl Into<ChatId>, message_id: i64) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_thread_id: None,
            from_chat_id: from_chat_id.into(),
            disable_notification: false,
            protect_content: false,
            message_id,
        }
    }
}

impl ApiMethod for ForwardMessage {
    const NAME: &'static str = "forwardMessage";
    type Output = Message;
}

/// `answerCallbackQuery`: stops the client's progress indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct AnswerCallbackQuery {
    pub callback_query_id: String,
    /// Notification text, 0-200 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Show an alert instead of a notification.
    #[serde(default, skip_serializing_if = "is_false")]
    pub show_alert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Seconds the answer may be cached by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_time: Option<u32>,
}

impl AnswerCallbackQuery {
    pub fn new(callback_query_id: impl Into<String>) -> Self {
        Self {
            callback_query_id: callback_query_id.into(),
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl ApiMethod for AnswerCallbackQuery {
    const NAME: &'static str = "answerCallbackQuery";
    type Output = bool;
}

/// `getFile`: prepares a file for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct GetFile {
    pub file_id: String,
}

impl ApiMethod for GetFile {
    const NAME: &'static str = "getFile";
    type Output = File;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InlineKeyboardButton, InlineKeyboardMarkup};
    use crate::FieldValue;

    /// Asserts the form carries the same fields as the JSON body. Strings
    /// match verbatim, anything else is JSON text of the same value.
    fn assert_form_matches_json<P: Params + Serialize>(request: &P) {
        let json = serde_json::to_value(request).unwrap();
        let object = json.as_object().unwrap();
        let form = request.form_fields().unwrap();

        let mut names: Vec<_> = form.iter().map(|(name, _)| name).collect();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        names.sort_unstable();
        keys.sort_unstable();
        assert_eq!(names, keys);

        for (name, value) in form.iter() {
            let expected = &object[name];
            match (value, expected) {
                (FieldValue::Text(text), serde_json::Value::String(s)) => {
                    assert_eq!(text, s, "field {name}")
                }
                (FieldValue::Text(text), other) => assert_eq!(
                    &serde_json::from_str::<serde_json::Value>(text).unwrap(),
                    other,
                    "field {name}"
                ),
                (FieldValue::File(_), _) => panic!("unexpected upload in {name}"),
            }
        }
    }

    #[test]
    fn location_encodes_the_same_in_both_bodies() {
        let mut request = SendLocation::new(5i64, 51.5, -0.125).live_for(600).silent();
        request.horizontal_accuracy = Some(12.5);
        request.heading = Some(90);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "chat_id": 5,
                "latitude": 51.5,
                "longitude": -0.125,
                "horizontal_accuracy": 12.5,
                "live_period": 600,
                "heading": 90,
                "disable_notification": true
            })
        );
        assert_form_matches_json(&request);
        let form = request.form_fields().unwrap();
        assert_eq!(form.get("longitude"), Some(&FieldValue::Text("-0.125".into())));
    }

    #[test]
    fn contact_encodes_the_same_in_both_bodies() {
        let request = SendContact::new("@desk", "+15550100", "Ada")
            .last_name("Lovelace")
            .reply_to(4);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "chat_id": "@desk",
                "phone_number": "+15550100",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "reply_to_message_id": 4
            })
        );
        assert_form_matches_json(&request);
    }

    #[test]
    fn poll_encodes_the_same_in_both_bodies() {
        let request = SendPoll::new(5i64, "2 + 2?", ["3", "4", "5"])
            .quiz(1)
            .explanation("basic arithmetic");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "chat_id": 5,
                "question": "2 + 2?",
                "options": ["3", "4", "5"],
                "type": "quiz",
                "correct_option_id": 1,
                "explanation": "basic arithmetic"
            })
        );
        assert_form_matches_json(&request);
        let form = request.form_fields().unwrap();
        assert_eq!(form.get("type"), Some(&FieldValue::Text("quiz".into())));
        assert_eq!(form.get("options"), Some(&FieldValue::Text(r#"["3","4","5"]"#.into())));
    }

    #[test]
    fn dice_encodes_the_same_in_both_bodies() {
        let plain = SendDice::new(5i64);
        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            serde_json::json!({"chat_id": 5})
        );
        assert_form_matches_json(&plain);

        let darts = SendDice::new(5i64).emoji("\u{1f3af}").thread(2);
        assert_form_matches_json(&darts);
        let form = darts.form_fields().unwrap();
        assert_eq!(form.get("emoji"), Some(&FieldValue::Text("\u{1f3af}".into())));
    }

    #[test]
    fn shared_options_are_flattened_in_json() {
        let request = SendMessage::new(5i64, "hi").reply_to(9).silent();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "chat_id": 5,
                "text": "hi",
                "disable_notification": true,
                "reply_to_message_id": 9
            })
        );
    }

    #[test]
    fn shared_options_are_flattened_in_form() {
        let markup = InlineKeyboardMarkup::default()
            .row(vec![InlineKeyboardButton::callback("Go", "go")]);
        let request = SendPhoto::new("@channel", InputFile::memory("a.png", vec![1u8]))
            .caption("look")
            .reply_markup(markup);
        let form = request.form_fields().unwrap();

        let names: Vec<_> = form.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["chat_id", "photo", "caption", "reply_markup"]);
        assert_eq!(form.get("chat_id"), Some(&FieldValue::Text("@channel".into())));
        assert_eq!(
            form.get("reply_markup"),
            Some(&FieldValue::Text(
                r#"{"inline_keyboard":[[{"text":"Go","callback_data":"go"}]]}"#.into()
            ))
        );
        assert!(form.has_uploads());
    }

    #[test]
    fn decode_then_encode_keeps_fields() {
        let raw = serde_json::json!({
            "chat_id": -100,
            "text": "*bold*",
            "parse_mode": "MarkdownV2",
            "protect_content": true
        });
        let request: SendMessage = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(request.parse_mode, Some(ParseMode::MarkdownV2));
        assert!(request.options.protect_content);
        assert_eq!(serde_json::to_value(&request).unwrap(), raw);
    }

    #[test]
    fn chat_action_is_snake_case_text() {
        let request = SendChatAction {
            chat_id: ChatId::Id(1),
            message_thread_id: None,
            action: ChatAction::UploadDocument,
        };
        let form = request.form_fields().unwrap();
        assert_eq!(form.get("action"), Some(&FieldValue::Text("upload_document".into())));
    }

    #[test]
    fn chat_action_form_text_matches_json() {
        let actions = [
            ChatAction::Typing,
            ChatAction::UploadPhoto,
            ChatAction::RecordVideo,
            ChatAction::UploadVideo,
            ChatAction::RecordVoice,
            ChatAction::UploadVoice,
            ChatAction::UploadDocument,
            ChatAction::ChooseSticker,
            ChatAction::FindLocation,
            ChatAction::RecordVideoNote,
            ChatAction::UploadVideoNote,
        ];
        for action in actions {
            let request = SendChatAction {
                chat_id: ChatId::Id(1),
                message_thread_id: None,
                action,
            };
            let json = serde_json::to_value(&request).unwrap();
            let form = request.form_fields().unwrap();
            assert_eq!(
                form.get("action"),
                Some(&FieldValue::Text(json["action"].as_str().unwrap().to_string()))
            );
        }
    }
}
