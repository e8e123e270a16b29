//! # Courier Core
//!
//! Protocol types and request encoding for the courier bot library.
//!
//! ## Contents
//!
//! - **Errors**: [`ApiError`] and its parts ([`EncodingError`], [`TransportError`],
//!   [`RemoteError`]), plus [`DecodeError`] for inbound payloads
//! - **Envelopes**: [`ApiResponse`], the `{ok, result, description, error_code}`
//!   wrapper every method answers with
//! - **Encoding**: [`Params`] / [`FormValue`] turn request types into ordered
//!   [`FormFields`] for multipart bodies; `Serialize` covers JSON bodies
//! - **Files**: [`InputFile`] references (remote id, URL, local path, memory)
//! - **Updates**: [`Update`] with a tagged [`UpdateKind`]
//! - **Entities** in [`types`] and request types in [`api`]
//! - **Configuration**: [`ClientConfig`]
//!
//! ## Defining a request
//!
//! ```rust
//! use courier_core::{ApiMethod, InputFile, Params};
//! use courier_core::types::{ChatId, Message};
//! use serde::Serialize;
//!
//! #[derive(Serialize, Params)]
//! struct SendVoice {
//!     chat_id: ChatId,
//!     voice: InputFile,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     caption: Option<String>,
//! }
//!
//! impl ApiMethod for SendVoice {
//!     const NAME: &'static str = "sendVoice";
//!     type Output = Message;
//! }
//!
//! let request = SendVoice {
//!     chat_id: ChatId::Id(1),
//!     voice: InputFile::parse("file:///tmp/hello.ogg"),
//!     caption: None,
//! };
//! assert!(request.form_fields().unwrap().has_uploads());
//! ```

extern crate self as courier_core;

pub mod api;
pub mod config;
pub mod error;
pub mod input_file;
pub mod params;
pub mod response;
pub mod types;
pub mod update;

pub use api::ApiMethod;
pub use config::ClientConfig;
pub use error::{
    ApiError, ApiResult, DecodeError, EncodingError, EncodingResult, RemoteError,
    TransportError, TransportResult,
};
pub use input_file::InputFile;
pub use params::{FieldValue, FormFields, FormValue, Params};
pub use response::{ApiResponse, ResponseParameters};
pub use update::{Update, UpdateKind};

/// Derives [`Params`] from a struct's serde attributes.
pub use courier_macros::Params;
