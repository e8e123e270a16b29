//! Routing of updates to per-kind callbacks and command handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{Instrument, debug, debug_span, warn};

use courier_core::api::{GetMyCommands, SetMyCommands};
use courier_core::types::{BotCommand, BotCommandScope};
use courier_core::update::allowed;
use courier_core::Update;

use crate::bot::Bot;
use crate::context::CourierContext;
use crate::error::{FrameworkError, FrameworkResult};
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::router::CommandRouter;

/// Routes each update to the callback registered for its kind and, for new
/// messages and channel posts carrying a command, to the command handler.
///
/// Handlers are registered during setup through `&mut self`. Serving takes
/// the dispatcher behind an `Arc`, so the registry is read-only while
/// updates are being handled.
pub struct Dispatcher {
    bot: Bot,
    commands: CommandRouter,
    callbacks: HashMap<&'static str, BoxedHandler>,
    command_scope: Option<BotCommandScope>,
    language_code: Option<String>,
}

macro_rules! on_kind {
    ($($(#[$doc:meta])* $method:ident => $kind:expr;)*) => {
        $(
            $(#[$doc])*
            pub fn $method<F, T>(&mut self, handler: F) -> &mut Self
            where
                F: Handler<T> + Send + Sync + 'static,
                T: 'static,
            {
                self.set_callback($kind, into_handler(handler))
            }
        )*
    };
}

impl Dispatcher {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            commands: CommandRouter::new(),
            callbacks: HashMap::new(),
            command_scope: None,
            language_code: None,
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn commands(&self) -> &CommandRouter {
        &self.commands
    }

    /// Publishes commands for `scope` and `language_code` instead of the
    /// default list.
    pub fn command_scope(
        &mut self,
        scope: BotCommandScope,
        language_code: Option<String>,
    ) -> &mut Self {
        self.command_scope = Some(scope);
        self.language_code = language_code;
        self
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Registers a command handler and publishes the command to the service.
    ///
    /// The current remote list is fetched, `name` is added to it (or its
    /// description updated) and the list is written back. The handler is
    /// only registered when both calls succeed.
    pub async fn command<F, T>(
        &mut self,
        name: &str,
        description: &str,
        handler: F,
    ) -> FrameworkResult<&mut Self>
    where
        F: Handler<T> + Send + Sync + 'static,
        T: 'static,
    {
        let publish_error = |source| FrameworkError::CommandPublish {
            command: name.to_string(),
            source,
        };

        let mut remote = self
            .bot
            .get_my_commands(&GetMyCommands {
                scope: self.command_scope.clone(),
                language_code: self.language_code.clone(),
            })
            .await
            .map_err(publish_error)?;

        match remote.iter_mut().find(|c| c.command == name) {
            Some(existing) => existing.description = description.to_string(),
            None => remote.push(BotCommand::new(name, description)),
        }

        self.bot
            .set_my_commands(&SetMyCommands {
                commands: remote,
                scope: self.command_scope.clone(),
                language_code: self.language_code.clone(),
            })
            .await
            .map_err(publish_error)?;

        Ok(self.command_local(name, handler))
    }

    /// Registers a command handler without publishing it.
    pub fn command_local<F, T>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Handler<T> + Send + Sync + 'static,
        T: 'static,
    {
        self.commands.add(name, into_handler(handler));
        self
    }

    // =========================================================================
    // Per-kind callbacks
    // =========================================================================

    fn set_callback(&mut self, kind: &'static str, handler: BoxedHandler) -> &mut Self {
        if self.callbacks.insert(kind, handler).is_some() {
            debug!(kind, "Replaced update callback");
        }
        self
    }

    on_kind! {
        on_message => allowed::MESSAGE;
        on_edited_message => allowed::EDITED_MESSAGE;
        on_channel_post => allowed::CHANNEL_POST;
        on_edited_channel_post => allowed::EDITED_CHANNEL_POST;
        on_inline_query => allowed::INLINE_QUERY;
        on_chosen_inline_result => allowed::CHOSEN_INLINE_RESULT;
        on_callback_query => allowed::CALLBACK_QUERY;
        on_shipping_query => allowed::SHIPPING_QUERY;
        on_pre_checkout_query => allowed::PRE_CHECKOUT_QUERY;
        on_poll => allowed::POLL;
        on_poll_answer => allowed::POLL_ANSWER;
        /// Changes of the bot's own membership.
        on_my_chat_member => allowed::MY_CHAT_MEMBER;
        on_chat_member => allowed::CHAT_MEMBER;
        on_chat_join_request => allowed::CHAT_JOIN_REQUEST;
    }

    /// Kinds with a registered callback, for the `allowed_updates` filter.
    pub fn registered_kinds(&self) -> Vec<String> {
        allowed::ALL
            .iter()
            .filter(|kind| self.callbacks.contains_key(*kind))
            .map(|kind| kind.to_string())
            .collect()
    }

    // =========================================================================
    // Routing
    // =========================================================================

    /// Routes one update. Returns after every handler it ran has finished.
    pub async fn handle_update(&self, update: Update) {
        let update_id = update.update_id;
        let kind = update.kind.name();

        if update.kind.is_unknown() {
            warn!(update_id, "Dropping update of unknown kind");
            return;
        }

        let span = debug_span!("update", update_id, kind);
        async {
            let ctx = Arc::new(CourierContext::new(self.bot.clone(), Arc::new(update)));

            if let Some(callback) = self.callbacks.get(kind) {
                callback(ctx.clone()).await;
            }

            let command = ctx.command().map(|c| c.name.clone());
            if let Some(name) = command {
                self.commands.dispatch(&name, ctx).await;
            }
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.callbacks.keys().collect();
        kinds.sort();
        f.debug_struct("Dispatcher")
            .field("bot", &self.bot)
            .field("commands", &self.commands)
            .field("callbacks", &kinds)
            .finish()
    }
}

#[cfg(feature = "webhook")]
#[async_trait::async_trait]
impl courier_transport::UpdateHandler for Dispatcher {
    async fn handle_update(&self, update: Update) {
        Dispatcher::handle_update(self, update).await
    }
}
