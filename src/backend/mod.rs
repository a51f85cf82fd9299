//! Database backends: PostgreSQL through `may_postgres`, SQLite through
//! `rusqlite`.
//!
//! Each backend decodes a cell into whatever [`Value`] its driver yields
//! and hands it to [`read_as`], which reshapes it to the host kind of the
//! column's [`DbType`].

pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::error::{Result, RowbindError};
use crate::types::DbType;
use crate::value::{HostKind, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::str::FromStr;

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Reshape a decoded cell to the host kind `db_type` reads as.
pub(crate) fn read_as(column: &str, db_type: DbType, raw: Value) -> Result<Value> {
    let shaped = match (db_type.host_kind(), raw) {
        (_, Value::Null) => Value::Null,
        (HostKind::Bool, Value::Bool(v)) => Value::Bool(v),
        (HostKind::Bool, raw) if raw.as_i64().is_some() => Value::Bool(raw.as_i64() != Some(0)),
        (HostKind::Int, raw) if raw.as_i64().is_some() => {
            let v = raw.as_i64().unwrap_or_default();
            i32::try_from(v)
                .map(Value::Int)
                .map_err(|_| RowbindError::type_error(format!("column `{column}`: {v} overflows {db_type}")))?
        }
        (HostKind::BigInt, raw) if raw.as_i64().is_some() => Value::BigInt(raw.as_i64().unwrap_or_default()),
        (HostKind::Float, Value::Float(v)) => Value::Float(v),
        (HostKind::Float, Value::Double(v)) => Value::Float(v as f32),
        (HostKind::Double, Value::Double(v)) => Value::Double(v),
        (HostKind::Double, Value::Float(v)) => Value::Double(f64::from(v)),
        (HostKind::Float | HostKind::Double, raw) if raw.as_i64().is_some() => {
            let v = raw.as_i64().unwrap_or_default() as f64;
            if db_type.host_kind() == HostKind::Float {
                Value::Float(v as f32)
            } else {
                Value::Double(v)
            }
        }
        (HostKind::Float, Value::Decimal(v)) => Value::Float(v.to_f32().unwrap_or_default()),
        (HostKind::Double, Value::Decimal(v)) => Value::Double(v.to_f64().unwrap_or_default()),
        (HostKind::Decimal, Value::Decimal(v)) => Value::Decimal(v),
        (HostKind::Decimal, Value::Double(v)) => Value::Decimal(
            Decimal::from_f64(v)
                .ok_or_else(|| RowbindError::type_error(format!("column `{column}`: {v} is not a decimal")))?,
        ),
        (HostKind::Decimal, Value::Text(v)) => Value::Decimal(
            Decimal::from_str(&v)
                .map_err(|e| RowbindError::type_error(format!("column `{column}`: {e}")))?,
        ),
        (HostKind::Decimal, raw) if raw.as_i64().is_some() => {
            Value::Decimal(Decimal::from(raw.as_i64().unwrap_or_default()))
        }
        (HostKind::Text, Value::Text(v)) => Value::Text(v),
        (HostKind::Text, Value::Char(v)) => Value::Text(v.to_string()),
        (HostKind::Date, Value::Date(v)) => Value::Date(v),
        (HostKind::Date, Value::Text(v)) => Value::Date(
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|e| RowbindError::type_error(format!("column `{column}`: `{v}`: {e}")))?,
        ),
        (HostKind::Time, Value::Time(v)) => Value::Time(v),
        (HostKind::Time, Value::Text(v)) => Value::Time(
            NaiveTime::parse_from_str(&v, "%H:%M:%S%.f")
                .map_err(|e| RowbindError::type_error(format!("column `{column}`: `{v}`: {e}")))?,
        ),
        (HostKind::DateTime, Value::DateTime(v)) => Value::DateTime(v),
        (HostKind::DateTime, Value::Text(v)) => Value::DateTime(parse_date_time(column, &v)?),
        (kind, raw) => {
            return Err(RowbindError::type_error(format!(
                "column `{column}` of type {db_type} holds a {} value, expected {kind:?}",
                raw.variant_name()
            )))
        }
    };
    Ok(shaped)
}

fn parse_date_time(column: &str, text: &str) -> Result<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| RowbindError::type_error(format!("column `{column}`: `{text}` is not a timestamp")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_read_as_flags() {
        assert_eq!(read_as("active", DbType::Boolean, Value::BigInt(1)).unwrap(), Value::Bool(true));
        assert_eq!(read_as("active", DbType::TinyInt, Value::Int(0)).unwrap(), Value::Bool(false));
    }

    #[test]
    fn integers_narrow_to_the_column_width() {
        assert_eq!(read_as("id", DbType::Integer, Value::BigInt(7)).unwrap(), Value::Int(7));
        assert!(read_as("id", DbType::Integer, Value::BigInt(i64::MAX)).unwrap_err().is_type());
        assert_eq!(read_as("id", DbType::BigInt, Value::SmallInt(7)).unwrap(), Value::BigInt(7));
    }

    #[test]
    fn text_parses_into_temporal_kinds() {
        assert_eq!(
            read_as("d", DbType::Date, Value::Text("2024-02-29".into())).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(
            read_as("t", DbType::Time, Value::Text("13:05:00".into())).unwrap(),
            Value::Time(NaiveTime::from_hms_opt(13, 5, 0).unwrap())
        );
        let ts = read_as("ts", DbType::Timestamp, Value::Text("2024-02-29 13:05:00.250".into())).unwrap();
        assert!(matches!(ts, Value::DateTime(_)));
        assert!(read_as("ts", DbType::Timestamp, Value::Text("yesterday".into())).unwrap_err().is_type());
    }

    #[test]
    fn nulls_pass_and_mismatches_fail() {
        assert_eq!(read_as("x", DbType::Date, Value::Null).unwrap(), Value::Null);
        assert!(read_as("x", DbType::Date, Value::Bool(true)).unwrap_err().is_type());
    }
}
