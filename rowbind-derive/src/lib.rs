//! Procedural macros for rowbind
//!
//! This crate provides the `Record` and `RecordEnum` derives re-exported by
//! `rowbind`.

mod attributes;
mod macros;
mod utils;

use proc_macro::TokenStream;

/// Derive macro for `Record` - describes a struct to the schema mapper
///
/// This macro generates:
/// - `Record` impl whose descriptor lists every field with its host kind,
///   one accessor per field and a constructor taking all fields
/// - one `Accessor` associated const per field, named in upper snake case
///   (`last_login` becomes `LAST_LOGIN`), for the predicate DSL
///
/// Attributes:
/// - `#[rowbind(name = "...")]` on the struct overrides the record name
///   used to find the table
/// - `#[rowbind(ordinal)]` on an enum field stores its declared position
///   instead of its variant name
///
/// # Example
/// ```ignore
/// #[derive(Debug, Clone, Record)]
/// pub struct Person {
///     pub id: i32,
///     pub name: String,
///     pub last_login: Option<NaiveDateTime>,
/// }
///
/// let harry = orm.from::<Person>()?.filter(Person::NAME).like("Harry").find()?;
/// ```
#[proc_macro_derive(Record, attributes(rowbind))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    macros::derive_record(input)
}

/// Derive macro for `RecordEnum` - lets a fieldless enum be a record member
///
/// Generates `RecordEnum` (a static variant table plus ordinal lookups) and
/// the matching `ValueType` impl.
#[proc_macro_derive(RecordEnum)]
pub fn derive_record_enum(input: TokenStream) -> TokenStream {
    macros::derive_record_enum(input)
}
