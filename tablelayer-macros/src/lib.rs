//! Procedural macros for the tablelayer project.
//!
//! Provides `#[derive(Record)]`, which implements `tablelayer::record::Record` for structs
//! with named fields.

#[allow(unused_extern_crates)]
extern crate self as tablelayer_macros;

use proc_macro::TokenStream;

mod record;

/// Derives `tablelayer::record::Record`.
///
/// Every named field becomes a property readable through `Record::get`. Field values are
/// cloned and converted with `Bson::from`, so each field type must implement
/// `Into<Bson>`. `Option` fields yield `None` when empty and `Vec` fields yield arrays.
///
/// # Attributes
///
/// - `#[record(table = "name")]` on the struct sets `Record::table_name` (defaults to the
///   snake_case type name)
/// - `#[record(rename = "name")]` on a field exposes it under another property name
/// - `#[record(skip)]` on a field hides it
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, Deserialize, Record)]
/// #[record(table = "countries")]
/// pub struct Country {
///     pub code: String,
///     #[record(rename = "label")]
///     pub name: String,
///     pub capital: Option<String>,
///     #[record(skip)]
///     pub notes: String,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
