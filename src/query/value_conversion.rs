//! Value conversion between rowbind [`Value`]s and SeaQuery values.
//!
//! Statements are assembled with SeaQuery, which collects every bound value
//! into its own `Values` in placeholder order. Executors take rowbind
//! values, so parameters cross this boundary twice: into SeaQuery while the
//! statement is built, and back out once it is rendered.

use crate::error::{Result, RowbindError};
use crate::value::Value;
use sea_query::Value as SeaValue;

/// Convert a wire-form value for binding into a SeaQuery expression.
///
/// Enum members bind by variant name. `NULL` binds as an untyped text null.
pub fn to_sea_value(value: &Value) -> SeaValue {
    match value {
        Value::Null => SeaValue::String(None),
        Value::Bool(v) => SeaValue::Bool(Some(*v)),
        Value::SmallInt(v) => SeaValue::SmallInt(Some(*v)),
        Value::Int(v) => SeaValue::Int(Some(*v)),
        Value::BigInt(v) => SeaValue::BigInt(Some(*v)),
        Value::Float(v) => SeaValue::Float(Some(*v)),
        Value::Double(v) => SeaValue::Double(Some(*v)),
        Value::Decimal(v) => SeaValue::Decimal(Some(*v)),
        Value::Char(v) => SeaValue::Char(Some(*v)),
        Value::Text(v) => SeaValue::String(Some(v.clone())),
        Value::Date(v) => SeaValue::ChronoDate(Some(*v)),
        Value::Time(v) => SeaValue::ChronoTime(Some(*v)),
        Value::DateTime(v) => SeaValue::ChronoDateTime(Some(*v)),
        Value::Enum(v) => SeaValue::String(Some(v.name.to_string())),
    }
}

/// Convert a SeaQuery value collected during rendering back into a
/// rowbind [`Value`].
///
/// # Errors
///
/// Returns `RowbindError::Type` for SeaQuery value kinds rowbind never
/// produces (JSON, UUID, arrays, ...).
pub fn from_sea_value(value: SeaValue) -> Result<Value> {
    let converted = match value {
        SeaValue::Bool(v) => v.map(Value::Bool),
        SeaValue::TinyInt(v) => v.map(|v| Value::SmallInt(i16::from(v))),
        SeaValue::SmallInt(v) => v.map(Value::SmallInt),
        SeaValue::Int(v) => v.map(Value::Int),
        SeaValue::BigInt(v) => v.map(Value::BigInt),
        SeaValue::Float(v) => v.map(Value::Float),
        SeaValue::Double(v) => v.map(Value::Double),
        SeaValue::Decimal(v) => v.map(Value::Decimal),
        SeaValue::Char(v) => v.map(Value::Char),
        SeaValue::String(v) => v.map(Value::Text),
        SeaValue::ChronoDate(v) => v.map(Value::Date),
        SeaValue::ChronoTime(v) => v.map(Value::Time),
        SeaValue::ChronoDateTime(v) => v.map(Value::DateTime),
        other => {
            return Err(RowbindError::type_error(format!(
                "statement parameter {other:?} has no rowbind representation"
            )))
        }
    };
    Ok(converted.unwrap_or(Value::Null))
}

/// Convert every value SeaQuery collected for a statement, in order.
pub fn from_sea_values(values: &sea_query::Values) -> Result<Vec<Value>> {
    values.iter().cloned().map(from_sea_value).collect()
}
