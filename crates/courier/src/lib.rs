//! # Courier
//!
//! A typed, async client and update dispatcher for the Telegram Bot API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────┐     ┌───────────────────────────────┐
//! │ Update source│────▶│ Dispatcher │────▶│ kind callback (message, ...)  │──▶ Bot
//! │ poll/webhook │     │            │────▶│ command handler ("/start")    │──▶ Bot
//! └──────────────┘     └────────────┘     └───────────────────────────────┘
//! ```
//!
//! - **Runtime**: loads configuration, sets up logging and runs one update source
//! - **Update sources**: long polling with a monotonic cursor, or a webhook server
//! - **Dispatcher**: one callback per update kind plus a command router
//! - **Handlers**: async functions taking extractors (Axum-style)
//! - **Bot**: typed API methods over the HTTP transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier::prelude::*;
//!
//! async fn echo(cmd: Command) -> String {
//!     cmd.args
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = CourierRuntime::builder().config_file("courier.toml").build()?;
//!
//!     let mut dispatcher = runtime.dispatcher();
//!     dispatcher.command("echo", "Repeat the arguments", echo).await?;
//!
//!     runtime.run(dispatcher).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `webhook`: webhook update source (default)
//! - `toml-config` / `yaml-config`: configuration file formats
//! - `json-log`: JSON log output

pub use courier_core as core;
pub use courier_framework as framework;
pub use courier_runtime as runtime;
pub use courier_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use courier_runtime::{CourierConfig, CourierRuntime, UpdateMode};

    // Dispatch
    pub use courier_framework::{Bot, CourierContext, Dispatcher, FromContext, HandleResponse};

    // Extractable values
    pub use courier_core::types::{CallbackQuery, ChatId, InlineQuery, Message};
    pub use courier_core::{Update, UpdateKind};
    pub use courier_framework::Command;

    // Requests
    pub use courier_core::api::{
        AnswerCallbackQuery, InputMedia, SendContact, SendDice, SendDocument, SendLocation,
        SendMediaGroup, SendMessage, SendPhoto, SendPoll,
    };
    pub use courier_core::{ApiError, ApiResult, InputFile};
}
