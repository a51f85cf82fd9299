//! Macro implementations

pub mod record;
pub mod record_enum;

pub use record::derive_record;
pub use record_enum::derive_record_enum;
