//! Request types for the API methods the library wraps.
//!
//! Each type names its method and result through [`ApiMethod`]. Methods
//! without a wrapper can still be called with any [`Params`] value.

mod commands;
mod media;
mod messages;
mod updates;

use serde::de::DeserializeOwned;

use crate::params::Params;

pub use commands::{DeleteMyCommands, GetMe, GetMyCommands, SetMyCommands};
pub use media::{InputMedia, InputMediaKind, SendMediaGroup};
pub use messages::{
    AnswerCallbackQuery, ChatAction, ForwardMessage, GetFile, SendChatAction, SendContact,
    SendDice, SendDocument, SendLocation, SendMessage, SendOptions, SendPhoto, SendPoll,
};
pub use updates::{DeleteWebhook, GetUpdates, GetWebhookInfo, SetWebhook};

/// A request bound to an API method.
pub trait ApiMethod: Params {
    /// Method name as it appears in the URL.
    const NAME: &'static str;

    /// Decoded `result` of a successful response.
    type Output: DeserializeOwned;
}
