//! `Value` and the `ValueType` trait.
//!
//! `Value` is the dynamically typed currency that flows between record
//! accessors, converters and executors. `ValueType` maps a Rust member type
//! to its [`HostKind`] and converts in both directions.
//!
//! ```rust
//! use rowbind::{Value, ValueType};
//!
//! let value = ValueType::into_value(42i32);
//! assert_eq!(value, Value::Int(42));
//!
//! let back: Option<i32> = ValueType::from_value(Value::Null).unwrap();
//! assert_eq!(back, None);
//! ```

use super::kind::{EnumDescriptor, HostKind};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;

/// An enum member as a host value: declared position plus variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    pub ordinal: u32,
    pub name: &'static str,
}

/// Dynamically typed scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Char(char),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Enum(EnumValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer payload widened to `i64`, if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::SmallInt(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    /// True for a numeric zero of any width.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Float(v) => *v == 0.0,
            Value::Double(v) => *v == 0.0,
            Value::Decimal(v) => v.is_zero(),
            other => other.as_i64() == Some(0),
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::SmallInt(_) => "SmallInt",
            Value::Int(_) => "Int",
            Value::BigInt(_) => "BigInt",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::Decimal(_) => "Decimal",
            Value::Char(_) => "Char",
            Value::Text(_) => "Text",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::DateTime(_) => "DateTime",
            Value::Enum(_) => "Enum",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::SmallInt(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::Time(v) => write!(f, "{}", v.format("%H:%M:%S%.f")),
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Enum(v) => f.write_str(v.name),
        }
    }
}

/// Error type for value extraction failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The value is null but the target type is not optional
    #[error("value is null")]
    NullValue,
    /// The value variant doesn't match the expected type
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    /// The variant matched but the payload could not be converted
    #[error("conversion error: {0}")]
    Conversion(String),
}

impl From<ValueError> for crate::RowbindError {
    fn from(err: ValueError) -> Self {
        crate::RowbindError::Type(err.to_string())
    }
}

/// Maps a Rust member type onto [`Value`].
pub trait ValueType: Sized {
    /// The host kind of the non-null payload.
    fn host_kind() -> HostKind;

    /// Whether `Value::Null` is a legal value of this type.
    fn nullable() -> bool {
        false
    }

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self, ValueError>;
}

macro_rules! impl_value_type {
    ($type:ty, $variant:ident, $kind:ident) => {
        impl ValueType for $type {
            fn host_kind() -> HostKind {
                HostKind::$kind
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    Value::Null => Err(ValueError::NullValue),
                    other => Err(ValueError::TypeMismatch {
                        expected: stringify!($variant).to_string(),
                        actual: other.variant_name().to_string(),
                    }),
                }
            }
        }
    };
}

impl_value_type!(bool, Bool, Bool);
impl_value_type!(i16, SmallInt, SmallInt);
impl_value_type!(i32, Int, Int);
impl_value_type!(i64, BigInt, BigInt);
impl_value_type!(f32, Float, Float);
impl_value_type!(f64, Double, Double);
impl_value_type!(Decimal, Decimal, Decimal);
impl_value_type!(char, Char, Char);
impl_value_type!(String, Text, Text);
impl_value_type!(NaiveDate, Date, Date);
impl_value_type!(NaiveTime, Time, Time);
impl_value_type!(NaiveDateTime, DateTime, DateTime);

impl<T: ValueType> ValueType for Option<T> {
    fn host_kind() -> HostKind {
        T::host_kind()
    }

    fn nullable() -> bool {
        true
    }

    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// A fieldless enum usable as a record member.
///
/// Implemented by `#[derive(RecordEnum)]`, which also provides the
/// `ValueType` impl through [`enum_into_value`] and [`enum_from_value`].
pub trait RecordEnum: Sized + 'static {
    const DESCRIPTOR: &'static EnumDescriptor;

    fn ordinal(&self) -> u32;

    fn from_ordinal(ordinal: u32) -> Option<Self>;
}

pub fn enum_into_value<E: RecordEnum>(value: &E) -> Value {
    let ordinal = value.ordinal();
    match E::DESCRIPTOR.name_of(ordinal) {
        Some(name) => Value::Enum(EnumValue { ordinal, name }),
        None => Value::Null,
    }
}

pub fn enum_from_value<E: RecordEnum>(value: Value) -> Result<E, ValueError> {
    let descriptor = E::DESCRIPTOR;
    match value {
        Value::Enum(v) => E::from_ordinal(v.ordinal).ok_or_else(|| {
            ValueError::Conversion(format!("{} has no variant at position {}", descriptor.name, v.ordinal))
        }),
        Value::Null => Err(ValueError::NullValue),
        other => Err(ValueError::TypeMismatch {
            expected: format!("Enum({})", descriptor.name),
            actual: other.variant_name().to_string(),
        }),
    }
}
