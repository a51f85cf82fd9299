//! Moving single values between records and statement parameters / rows.

use super::converter::Converter;
use super::db_type::DbType;
use crate::error::{Result, RowbindError};
use crate::executor::ResultRow;
use crate::value::Value;

/// Convert a member value to wire form and append it as the next positional
/// parameter.
///
/// The converted value must have the shape `db_type` binds with. Integer
/// columns take 32-bit values, and 64-bit values only when the declared
/// width admits them.
pub fn record_to_row(
    params: &mut Vec<Value>,
    column: &str,
    value: Value,
    db_type: DbType,
    size: u32,
    converter: &Converter,
) -> Result<()> {
    let converted = converter.convert(value)?;
    let bound = bind_shape(column, converted, db_type, size)?;
    params.push(bound);
    Ok(())
}

fn bind_shape(column: &str, value: Value, db_type: DbType, size: u32) -> Result<Value> {
    let bound = match (db_type, value) {
        (_, Value::Null) => Value::Null,
        (t, Value::Bool(v)) if t.is_boolean_like() => Value::Bool(v),
        (DbType::SmallInt | DbType::Integer, Value::SmallInt(v)) => Value::Int(i32::from(v)),
        (DbType::SmallInt | DbType::Integer, Value::Int(v)) => Value::Int(v),
        (DbType::SmallInt | DbType::Integer, Value::BigInt(v)) if size >= DbType::LONG_WIDTH => {
            Value::BigInt(v)
        }
        (DbType::BigInt, Value::SmallInt(v)) => Value::BigInt(i64::from(v)),
        (DbType::BigInt, Value::Int(v)) => Value::BigInt(i64::from(v)),
        (DbType::BigInt, Value::BigInt(v)) => Value::BigInt(v),
        (DbType::Float | DbType::Real, Value::Float(v)) => Value::Float(v),
        (DbType::Double, Value::Float(v)) => Value::Double(f64::from(v)),
        (DbType::Double, Value::Double(v)) => Value::Double(v),
        (DbType::Decimal, Value::Decimal(v)) => Value::Decimal(v),
        (t, Value::Text(v)) if t.is_text() => Value::Text(v),
        (DbType::Date, Value::Date(v)) => Value::Date(v),
        (DbType::Time, Value::Time(v)) => Value::Time(v),
        (DbType::Timestamp, Value::DateTime(v)) => Value::DateTime(v),
        (t, other) => {
            return Err(RowbindError::type_error(format!(
                "{} value cannot bind to column `{column}` of type {t}",
                other.variant_name()
            )))
        }
    };
    Ok(bound)
}

/// Read `column` from `row`, convert it to the member's kind and append it
/// to the constructor slots.
pub fn row_to_record(
    row: &dyn ResultRow,
    column: &str,
    db_type: DbType,
    converter: &Converter,
    slots: &mut Vec<Value>,
) -> Result<()> {
    let raw = row.get(column, db_type)?;
    let value = converter.convert(raw).map_err(|err| match err {
        RowbindError::Type(message) => {
            RowbindError::type_error(format!("column `{column}`: {message}"))
        }
        other => other,
    })?;
    slots.push(value);
    Ok(())
}
