//! Host value representation.
//!
//! - [`Value`]: dynamically typed scalar passed between accessors,
//!   converters and executors
//! - [`ValueType`]: maps Rust member types onto `Value`
//! - [`HostKind`]: the shape of a member, used to pick converters

pub mod kind;
pub mod types;

pub use kind::{EnumDescriptor, EnumEncoding, EnumKind, HostKind};
pub use types::{enum_from_value, enum_into_value, EnumValue, RecordEnum, Value, ValueError, ValueType};
