//! Per-update context handed to handlers.

use std::sync::Arc;

use courier_core::Update;

use crate::bot::Bot;
use crate::command::Command;

/// Everything a handler can extract for one update.
///
/// One context is created per routed update and shared by the per-kind
/// callback and the command handler.
#[derive(Debug, Clone)]
pub struct CourierContext {
    bot: Bot,
    update: Arc<Update>,
    command: Option<Command>,
}

impl CourierContext {
    /// Creates a context, parsing the command of command-bearing kinds.
    pub fn new(bot: Bot, update: Arc<Update>) -> Self {
        let command = update
            .message()
            .and_then(|m| m.text.as_deref())
            .and_then(Command::parse);
        Self {
            bot,
            update,
            command,
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn update(&self) -> &Arc<Update> {
        &self.update
    }

    /// The command carried by a new message or channel post, if any.
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }
}
