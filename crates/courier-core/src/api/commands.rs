use serde::{Deserialize, Serialize};

use super::ApiMethod;
use crate::types::{BotCommand, BotCommandScope, User};
use crate::Params;

/// `getMe`: the bot's own user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct GetMe {}

impl ApiMethod for GetMe {
    const NAME: &'static str = "getMe";
    type Output = User;
}

/// `setMyCommands`: replaces the command list for a scope and language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct SetMyCommands {
    pub commands: Vec<BotCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<BotCommandScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

impl SetMyCommands {
    pub fn new(commands: Vec<BotCommand>) -> Self {
        Self {
            commands,
            ..Self::default()
        }
    }
}

impl ApiMethod for SetMyCommands {
    const NAME: &'static str = "setMyCommands";
    type Output = bool;
}

/// `getMyCommands`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct GetMyCommands {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<BotCommandScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

impl ApiMethod for GetMyCommands {
    const NAME: &'static str = "getMyCommands";
    type Output = Vec<BotCommand>;
}

/// `deleteMyCommands`: falls back to the next broader scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Params)]
pub struct DeleteMyCommands {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<BotCommandScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

impl ApiMethod for DeleteMyCommands {
    const NAME: &'static str = "deleteMyCommands";
    type Output = bool;
}
