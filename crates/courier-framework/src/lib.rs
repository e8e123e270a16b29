//! # Courier Framework
//!
//! Everything between the HTTP transport and application code:
//!
//! - [`Bot`]: the typed outbound API
//! - Axum-style [`Handler`]s with [`FromContext`] extractors
//! - [`CommandRouter`] and the [`Dispatcher`] routing step
//! - Update sources: the long-polling [`Poller`] and, with the `webhook`
//!   feature, [`Dispatcher::serve_webhook`]
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use courier_core::ClientConfig;
//! use courier_framework::{Bot, Command, Dispatcher, PollOptions, Poller};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let bot = Bot::new(ClientConfig::new("123:abc"))?;
//! let mut dispatcher = Dispatcher::new(bot);
//! dispatcher
//!     .command("echo", "Repeat the arguments", |cmd: Command| async move { cmd.args })
//!     .await?;
//!
//! let poller = Poller::new(Arc::new(dispatcher), PollOptions::default());
//! poller.run_until(CancellationToken::new()).await;
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod command;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod poller;
pub mod router;

#[cfg(feature = "webhook")]
pub mod webhook;

pub use bot::Bot;
pub use command::Command;
pub use context::CourierContext;
pub use dispatcher::Dispatcher;
pub use error::{ExtractError, ExtractResult, FrameworkError, FrameworkResult};
pub use extractor::FromContext;
pub use handler::{BoxedHandler, HandleResponse, Handler, into_handler};
pub use poller::{PollCursor, PollOptions, Poller};
pub use router::CommandRouter;

#[cfg(feature = "webhook")]
pub use webhook::WebhookOptions;
