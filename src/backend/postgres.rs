//! PostgreSQL backend over `may_postgres`.
//!
//! Parameters travel as [`PgParam`], which encodes a [`Value`] for whatever
//! parameter type the server inferred. Schema metadata comes from
//! `information_schema` and `pg_index`, restricted to the current schema.

use super::read_as;
use crate::connection::PooledClient;
use crate::error::{Result, RowbindError};
use crate::executor::{instrumented, Dialect, Executor, ResultRow};
use crate::introspect::{yes_no_to_bool, ColumnDescriptor, IndexColumn, SchemaIntrospector};
use crate::types::DbType;
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use may_postgres::{Client, Row};
use postgres_types::{to_sql_checked, IsNull, ToSql, Type};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::error::Error;

type BoxError = Box<dyn Error + Sync + Send>;

const TABLES_SQL: &str = "SELECT table_name::text FROM information_schema.tables \
     WHERE table_schema = current_schema() ORDER BY table_name";

const PRIMARY_KEY_SQL: &str = "SELECT a.attname::text FROM pg_index ix \
     CROSS JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord) \
     JOIN pg_attribute a ON a.attrelid = ix.indrelid AND a.attnum = k.attnum \
     WHERE ix.indrelid = to_regclass($1) AND ix.indisprimary ORDER BY k.ord";

const INDEX_SQL: &str = "SELECT ic.relname::text, ix.indisunique, k.ord::int4, a.attname::text FROM pg_index ix \
     JOIN pg_class ic ON ic.oid = ix.indexrelid \
     CROSS JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord) \
     JOIN pg_attribute a ON a.attrelid = ix.indrelid AND a.attnum = k.attnum \
     WHERE ix.indrelid = to_regclass($1) ORDER BY ic.relname, k.ord";

// Integer widths are reported in bits; expose them in digits like the other types.
const COLUMNS_SQL: &str = "SELECT column_name::text, data_type::text, \
     (CASE data_type WHEN 'smallint' THEN 5 WHEN 'integer' THEN 10 WHEN 'bigint' THEN 19 \
      ELSE COALESCE(character_maximum_length, numeric_precision, 0) END)::int4, \
     is_nullable::text, \
     (COALESCE(column_default, '') LIKE 'nextval(%' OR is_identity = 'YES') \
     FROM information_schema.columns \
     WHERE table_schema = current_schema() AND table_name = $1 ORDER BY ordinal_position";

/// A [`Value`] encoded for the parameter type PostgreSQL inferred.
#[derive(Debug)]
pub struct PgParam<'a>(pub &'a Value);

impl ToSql for PgParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        match self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => {
                if *ty == Type::BOOL {
                    v.to_sql(ty, out)
                } else {
                    integer_to_sql(i64::from(*v), ty, out)
                }
            }
            Value::SmallInt(_) | Value::Int(_) | Value::BigInt(_) => {
                integer_to_sql(self.0.as_i64().unwrap_or_default(), ty, out)
            }
            Value::Float(v) => float_to_sql(f64::from(*v), ty, out),
            Value::Double(v) => float_to_sql(*v, ty, out),
            Value::Decimal(v) => {
                if *ty == Type::NUMERIC {
                    v.to_sql(ty, out)
                } else if is_text_type(ty) {
                    v.to_string().to_sql(ty, out)
                } else {
                    float_to_sql(v.to_string().parse::<f64>()?, ty, out)
                }
            }
            Value::Char(v) => v.to_string().to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Time(v) => v.to_sql(ty, out),
            Value::DateTime(v) => {
                if *ty == Type::TIMESTAMPTZ {
                    DateTime::<Utc>::from_naive_utc_and_offset(*v, Utc).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Enum(v) => v.name.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn integer_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    if *ty == Type::INT2 {
        i16::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::BOOL {
        (v != 0).to_sql(ty, out)
    } else if *ty == Type::FLOAT4 {
        (v as f32).to_sql(ty, out)
    } else if *ty == Type::FLOAT8 {
        (v as f64).to_sql(ty, out)
    } else if *ty == Type::NUMERIC {
        Decimal::from(v).to_sql(ty, out)
    } else if is_text_type(ty) {
        v.to_string().to_sql(ty, out)
    } else {
        v.to_sql(ty, out)
    }
}

fn float_to_sql(v: f64, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    if *ty == Type::FLOAT4 {
        (v as f32).to_sql(ty, out)
    } else if *ty == Type::NUMERIC {
        Decimal::from_f64(v)
            .ok_or_else(|| format!("{v} is not representable as NUMERIC"))?
            .to_sql(ty, out)
    } else if is_text_type(ty) {
        v.to_string().to_sql(ty, out)
    } else {
        v.to_sql(ty, out)
    }
}

fn is_text_type(ty: &Type) -> bool {
    *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
}

fn to_params(values: &[Value]) -> Vec<PgParam<'_>> {
    values.iter().map(PgParam).collect()
}

fn as_refs<'p>(params: &'p [PgParam<'_>]) -> Vec<&'p dyn ToSql> {
    params.iter().map(|p| p as &dyn ToSql).collect()
}

/// Decode cell `index` into the [`Value`] its server type maps to.
fn decode(row: &Row, index: usize) -> Result<Value> {
    let ty = row.columns()[index].type_().clone();
    let value = if ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(index)?.map(Value::Bool)
    } else if ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)?.map(Value::SmallInt)
    } else if ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(index)?.map(Value::Int)
    } else if ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(index)?.map(Value::BigInt)
    } else if ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(index)?.map(Value::Float)
    } else if ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(index)?.map(Value::Double)
    } else if ty == Type::NUMERIC {
        row.try_get::<_, Option<Decimal>>(index)?.map(Value::Decimal)
    } else if ty == Type::DATE {
        row.try_get::<_, Option<NaiveDate>>(index)?.map(Value::Date)
    } else if ty == Type::TIME {
        row.try_get::<_, Option<NaiveTime>>(index)?.map(Value::Time)
    } else if ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(index)?.map(Value::DateTime)
    } else if ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(index)?
            .map(|v| Value::DateTime(v.naive_utc()))
    } else if is_text_type(&ty) {
        row.try_get::<_, Option<String>>(index)?.map(Value::Text)
    } else {
        return Err(RowbindError::type_error(format!(
            "column `{}` has unsupported PostgreSQL type {ty}",
            row.columns()[index].name()
        )));
    };
    Ok(value.unwrap_or(Value::Null))
}

struct PgRow<'r>(&'r Row);

impl ResultRow for PgRow<'_> {
    fn get(&self, column: &str, db_type: DbType) -> Result<Value> {
        let index = self
            .0
            .columns()
            .iter()
            .position(|c| c.name() == column)
            .ok_or_else(|| RowbindError::mapping(format!("result set has no column `{column}`")))?;
        read_as(column, db_type, decode(self.0, index)?)
    }
}

fn execute(client: &Client, sql: &str, params: &[Value]) -> Result<u64> {
    instrumented(sql, || {
        let params = to_params(params);
        Ok(client.execute(sql, &as_refs(&params))?)
    })
}

fn query(client: &Client, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    instrumented(sql, || {
        let params = to_params(params);
        Ok(client.query(sql, &as_refs(&params))?)
    })
}

fn catalog(client: &Client, sql: &str, table: Option<&str>) -> Result<Vec<Row>> {
    instrumented(sql, || {
        let rows = match table {
            Some(table) => client.query(sql, &[&table as &dyn ToSql])?,
            None => client.query(sql, &[])?,
        };
        Ok(rows)
    })
}

impl Executor for PooledClient<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        execute(self, sql, params)
    }

    fn query(&self, sql: &str, params: &[Value], visit: &mut dyn FnMut(&dyn ResultRow) -> Result<()>) -> Result<()> {
        for row in query(self, sql, params)? {
            visit(&PgRow(&row))?;
        }
        Ok(())
    }
}

impl SchemaIntrospector for PooledClient<'_> {
    fn table_names(&self) -> Result<Vec<String>> {
        catalog(self, TABLES_SQL, None)?
            .iter()
            .map(|row| Ok(row.try_get::<_, String>(0)?))
            .collect()
    }

    fn primary_key_columns(&self, table: &str) -> Result<Vec<String>> {
        catalog(self, PRIMARY_KEY_SQL, Some(table))?
            .iter()
            .map(|row| Ok(row.try_get::<_, String>(0)?))
            .collect()
    }

    fn index_columns(&self, table: &str) -> Result<Vec<IndexColumn>> {
        catalog(self, INDEX_SQL, Some(table))?
            .iter()
            .map(|row| {
                Ok(IndexColumn {
                    index_name: row.try_get(0)?,
                    unique: row.try_get(1)?,
                    ordinal: u32::try_from(row.try_get::<_, i32>(2)?).unwrap_or_default(),
                    column: row.try_get(3)?,
                })
            })
            .collect()
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        catalog(self, COLUMNS_SQL, Some(table))?
            .iter()
            .map(|row| {
                let nullable: String = row.try_get(3)?;
                Ok(ColumnDescriptor {
                    name: row.try_get(0)?,
                    type_code: None,
                    type_name: row.try_get(1)?,
                    size: u32::try_from(row.try_get::<_, i32>(2)?).unwrap_or_default(),
                    nullable: yes_no_to_bool(&nullable)?,
                    autoincrement: row.try_get(4)?,
                })
            })
            .collect()
    }
}
