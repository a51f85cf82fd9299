//! Canonical SQL types and the converters bridging them to host values.

pub mod converter;
pub mod db_type;
pub mod row_record;

pub use converter::{converter_for, ConvertFn, Converter, ConverterRegistry};
pub use db_type::DbType;
pub use row_record::{record_to_row, row_to_record};
