#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros used across the gateway workspace.
//!
//! * [`macro@sgate_error`] wires an error enum into `thiserror` and generates the
//!   `.context(..)` plumbing used by every crate.
//! * [`macro@api_model`] and [`macro@api_handler`] keep HTTP models and handlers in step
//!   with the `OpenAPI` document.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Turns an enum into a workspace error type.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Name>Ext<T>` trait with `.context(..)` for `Result<T, Name>` and for
///   `Result<T, Source>` of every variant that wraps a `source` error.
/// * `From<Source>` for each wrapped source type (first variant wins on duplicates).
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A module-level `format_context` helper for `#[error(..)]` strings. Declare at most
///   one `#[sgate_error]` enum per module.
///
/// # Requirements
///
/// Every variant has named fields. Variants wrapping a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[sgate_derive::sgate_error]
/// pub enum StoreError {
///     #[error("Store request failed{}: {source}", format_context(.context))]
///     Request { source: reqwest::Error, context: Option<Cow<'static, str>> },
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(client: &reqwest::Client) -> Result<(), StoreError> {
///     fetch(client).context("loading filter options")?;
///     Err("unreachable state".into())
/// }
/// ```
#[proc_macro_attribute]
pub fn sgate_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Declares a JSON model exchanged over HTTP.
///
/// Adds `Debug`, `serde::{Serialize, Deserialize}` and `utoipa::ToSchema` unless already
/// derived, plus `#[serde(rename_all = "camelCase")]`.
///
/// # Arguments
/// * `rename_all = ".."` overrides the casing.
/// * `deny_unknown_fields = true` rejects unexpected keys.
///
/// The using crate must depend on `serde` and `utoipa`.
///
/// ```rust,ignore
/// #[sgate_derive::api_model(deny_unknown_fields = true)]
/// pub struct SearchRequest {
///     pub query: String,
///     pub content_types: Option<Vec<String>>,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::api::expand_model(args.into(), &input).into()
}

/// Documents an axum handler with `utoipa::path`.
///
/// Accepts the regular `utoipa::path` arguments (`get`, `post`, `path = ".."`,
/// `responses(..)`, `tag = ..`).
///
/// ```rust,ignore
/// #[sgate_derive::api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = SYSTEM_TAG,
/// )]
/// pub async fn health() -> Json<HealthResponse> { .. }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_handler(args.into(), &input).into()
}
