//! Entities exchanged with the service.
//!
//! These are plain data-transfer types. Optional wire fields are `Option`s or
//! empty collections, and are omitted again when re-encoded.

mod chat;
mod command;
mod file;
mod markup;
mod member;
mod message;
mod poll;
mod query;
mod user;
mod webhook;

pub use chat::{Chat, ChatId, ChatKind};
pub use command::{BotCommand, BotCommandScope};
pub use file::{Audio, Contact, Dice, Document, File, Location, PhotoSize, Video, Voice};
pub use markup::{
    ForceReply, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton,
    KeyboardButtonPollType, LoginUrl, ReplyKeyboardMarkup, ReplyKeyboardRemove, ReplyMarkup,
    WebAppInfo,
};
pub use member::{ChatInviteLink, ChatJoinRequest, ChatMember, ChatMemberUpdated};
pub use message::{LinkPreviewOptions, Message, MessageEntity, MessageId, ParseMode};
pub use poll::{Poll, PollAnswer, PollOption, PollType};
pub use query::{
    CallbackQuery, ChosenInlineResult, InlineQuery, OrderInfo, PreCheckoutQuery, ShippingAddress,
    ShippingQuery,
};
pub use user::User;
pub use webhook::WebhookInfo;
