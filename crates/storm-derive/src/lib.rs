//! Derive macros for storm
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;

/// Derive the `Record` schema descriptor for a struct.
///
/// # Example
///
/// ```ignore
/// use storm::Record;
///
/// #[derive(Debug, Default, Record)]
/// #[storm(table = "app_users")]
/// struct User {
///     #[storm(pk)]
///     id: i64,
///     #[storm(column = "name_user")]
///     name: String,
///     #[storm(skip)]
///     cached: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[storm(table = "name")]` - Override the table name (default: lower-cased type name + `s`)
/// - `#[storm(pk)]` - Mark the primary-key field
/// - `#[storm(column = "name")]` - Map field to a different column name
/// - `#[storm(tag = "pk,column:name")]` - Raw directive string, same grammar as `storm::tag`
/// - `#[storm(skip)]` - Leave the field out of the mapping
#[proc_macro_derive(Record, attributes(storm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
