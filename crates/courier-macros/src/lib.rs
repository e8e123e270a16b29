//! Procedural macros for courier.
//!
//! This crate provides:
//!
//! - `#[derive(Params)]` - Generates the form-field encoding of a request type
//!
//! # Params Derive Macro
//!
//! Request types are serialized two ways: as a JSON body, or as a flat list of
//! `multipart/form-data` parts. The derive reads the same `#[serde(...)]`
//! attributes that drive the JSON encoding, so both bodies always agree on
//! field names, omission and composition:
//!
//! ```rust,ignore
//! use courier_core::{InputFile, Params};
//! use serde::Serialize;
//!
//! #[derive(Serialize, Params)]
//! pub struct SendPhoto {
//!     pub chat_id: ChatId,
//!     pub photo: InputFile,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     pub caption: Option<String>,
//!     #[serde(flatten)]
//!     pub options: SendOptions,
//! }
//! ```

mod params;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `courier_core::Params` for a struct with named fields.
///
/// Field handling:
///
/// | Attribute | Effect on the generated form fields |
/// |-----------|-------------------------------------|
/// | `#[serde(rename = "x")]` | Field is written as `x` instead of its identifier |
/// | `#[serde(skip_serializing_if = "path")]` | Field is omitted when `path(&value)` is true |
/// | `#[serde(flatten)]` | The field's own `Params` fields are merged in place |
/// | `#[serde(skip)]` / `#[serde(skip_serializing)]` | Field is never written |
/// | `#[serde(rename_all = "rule")]` on the struct | Rule applies to every field without `rename` |
///
/// Every other field is written through its `FormValue` implementation.
/// `serialize_with`, `with` and shape-changing container attributes
/// (`transparent`, `into`, `tag`, `remote`) are rejected at compile time.
///
/// Container attribute `#[params(crate = "path")]` changes the path used to
/// reach `courier_core` (default `::courier_core`).
#[proc_macro_derive(Params, attributes(params))]
pub fn derive_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match params::derive_params(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
