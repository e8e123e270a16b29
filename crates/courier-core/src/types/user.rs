//! Users.

use serde::{Deserialize, Serialize};

use crate::params::is_false;

/// A user or bot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Whether this user is a bot.
    #[serde(default)]
    pub is_bot: bool,
    /// First name.
    pub first_name: String,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Username, without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// IETF language tag of the user's client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    /// Bots only: the bot can be invited to groups.
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_join_groups: bool,
    /// Bots only: privacy mode is disabled.
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_read_all_group_messages: bool,
    /// Bots only: the bot supports inline queries.
    #[serde(default, skip_serializing_if = "is_false")]
    pub supports_inline_queries: bool,
}

impl User {
    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    /// `@username` if the user has one.
    pub fn mention(&self) -> Option<String> {
        self.username.as_ref().map(|name| format!("@{name}"))
    }
}
