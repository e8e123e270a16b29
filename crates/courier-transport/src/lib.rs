//! # Courier Transport
//!
//! HTTP plumbing for the courier bot library.
//!
//! ## Features
//!
//! - `http-client` (default): request bodies ([`body`]) and API calls ([`client`]) over `reqwest`
//! - `http-server` (default): the webhook endpoint ([`webhook`]) over `axum`
//! - `full`: everything
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  courier-framework   │  (Bot, Dispatcher, Poller)
//! ├──────────────────────┤
//! │  courier-transport   │  <- This crate
//! │  BodyBuilder ──▶ HttpTransport ──▶ API
//! │  webhook_router ◀── pushed updates
//! ├──────────────────────┤
//! │  courier-core        │  (Params, Update, errors)
//! └──────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier_core::ClientConfig;
//! use courier_transport::{BodyBuilder, HttpTransport};
//! use reqwest::Method;
//!
//! let transport = HttpTransport::new(ClientConfig::new(token))?;
//! let body = BodyBuilder::auto(&request, Vec::new()).await?;
//! let result = transport.send(Method::POST, "sendMessage", Some(body), None).await?;
//! ```

#[cfg(feature = "http-client")]
pub mod body;

#[cfg(feature = "http-client")]
pub mod client;

#[cfg(feature = "http-server")]
pub mod webhook;

#[cfg(feature = "http-client")]
pub use body::{Attachment, Body, BodyBuilder, BodyMode, Payload, ResolvedPart};

#[cfg(feature = "http-client")]
pub use client::{HttpTransport, RequestMutator};

#[cfg(feature = "http-client")]
pub use reqwest::Method;

#[cfg(feature = "http-server")]
pub use webhook::{SECRET_TOKEN_HEADER, UpdateHandler, WebhookRoute, webhook_router};
