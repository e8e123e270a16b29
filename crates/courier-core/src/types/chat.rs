//! Chats and chat identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EncodingResult;
use crate::params::{FormFields, FormValue, is_false};

/// Kind of a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// One-to-one chat with a user.
    Private,
    /// Basic group.
    Group,
    /// Supergroup.
    Supergroup,
    /// Channel.
    Channel,
    /// Chat kinds added after this library was written.
    #[serde(other)]
    Unknown,
}

/// A chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique identifier.
    pub id: i64,
    /// Kind of chat.
    #[serde(rename = "type")]
    pub kind: ChatKind,
    /// Title, for groups, supergroups and channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Username, for private chats, supergroups and channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// First name of the other party in a private chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name of the other party in a private chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// The supergroup has topics enabled.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_forum: bool,
}

impl Chat {
    /// Returns `true` for private chats.
    pub fn is_private(&self) -> bool {
        self.kind == ChatKind::Private
    }
}

/// Target chat of a request: a numeric id or a channel username.
///
/// ```rust
/// use courier_core::types::ChatId;
///
/// assert_eq!(ChatId::from(-100123i64).to_string(), "-100123");
/// assert_eq!(ChatId::from("@news").to_string(), "@news");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    /// Numeric chat identifier.
    Id(i64),
    /// `@channelusername`.
    Username(String),
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(name) => f.write_str(name),
        }
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ChatId {
    fn from(name: &str) -> Self {
        Self::Username(name.to_string())
    }
}

impl From<String> for ChatId {
    fn from(name: String) -> Self {
        Self::Username(name)
    }
}

impl From<&Chat> for ChatId {
    fn from(chat: &Chat) -> Self {
        Self::Id(chat.id)
    }
}

impl FormValue for ChatId {
    fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()> {
        form.push_text(name, self.to_string());
        Ok(())
    }
}
