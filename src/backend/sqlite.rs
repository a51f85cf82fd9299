//! SQLite backend over `rusqlite`.
//!
//! A single connection behind a mutex; `acquire` locks it for the duration
//! of one operation. Dates and times are stored as ISO-8601 text, flags as
//! integers. Schema metadata comes from `sqlite_master` and the
//! `table_info` / `index_list` / `index_info` pragmas.
//!
//! A column declared `INTEGER` is reported as `BIGINT`: SQLite integers,
//! rowids included, are 64-bit.
//!
//! Decimals are bound as text, but a `DECIMAL`/`NUMERIC` column has numeric
//! affinity and SQLite keeps such values as `REAL`. Only the first 15
//! significant digits of a decimal survive a round trip through SQLite.

use super::read_as;
use crate::connection::{Connection, ConnectionProvider};
use crate::error::{Result, RowbindError};
use crate::executor::{instrumented, Dialect, Executor, ResultRow};
use crate::introspect::{ColumnDescriptor, IndexColumn, SchemaIntrospector};
use crate::types::DbType;
use crate::value::Value;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection as SqliteConnection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' ORDER BY name";

/// Hands out the one SQLite connection it owns.
pub struct SqliteProvider {
    conn: Mutex<SqliteConnection>,
}

impl SqliteProvider {
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(SqliteConnection::open_in_memory()?))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_connection(SqliteConnection::open(path)?))
    }

    pub fn from_connection(conn: SqliteConnection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    /// Run a batch of `;`-separated statements, e.g. a schema script.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.lock()?;
        instrumented(sql, || Ok(conn.execute_batch(sql)?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, SqliteConnection>> {
        self.conn
            .lock()
            .map_err(|_| RowbindError::Connection("sqlite connection mutex poisoned".to_string()))
    }
}

impl ConnectionProvider for SqliteProvider {
    fn acquire(&self) -> Result<Box<dyn Connection + '_>> {
        Ok(Box::new(SqliteSession { conn: self.lock()? }))
    }
}

impl std::fmt::Debug for SqliteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

/// The locked connection for one operation.
pub struct SqliteSession<'a> {
    conn: MutexGuard<'a, SqliteConnection>,
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
        Value::SmallInt(_) | Value::Int(_) | Value::BigInt(_) => SqlValue::Integer(value.as_i64().unwrap_or_default()),
        Value::Float(v) => SqlValue::Real(f64::from(*v)),
        Value::Double(v) => SqlValue::Real(*v),
        Value::Decimal(v) => SqlValue::Text(v.to_string()),
        Value::Char(v) => SqlValue::Text(v.to_string()),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Date(v) => SqlValue::Text(v.format("%Y-%m-%d").to_string()),
        Value::Time(v) => SqlValue::Text(v.format("%H:%M:%S%.f").to_string()),
        Value::DateTime(v) => SqlValue::Text(v.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        Value::Enum(v) => SqlValue::Text(v.name.to_string()),
    }
}

fn from_value_ref(column: &str, value: ValueRef<'_>) -> Result<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(v) => Ok(Value::BigInt(v)),
        ValueRef::Real(v) => Ok(Value::Double(v)),
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map(Value::Text)
            .map_err(|e| RowbindError::type_error(format!("column `{column}`: {e}"))),
        ValueRef::Blob(_) => Err(RowbindError::type_error(format!(
            "column `{column}` holds a blob, which no record member can receive"
        ))),
    }
}

struct SqliteRow<'r, 's>(&'r Row<'s>);

impl ResultRow for SqliteRow<'_, '_> {
    fn get(&self, column: &str, db_type: DbType) -> Result<Value> {
        let raw = from_value_ref(column, self.0.get_ref(column)?)?;
        read_as(column, db_type, raw)
    }
}

/// Size declared in a type name such as `VARCHAR(50)`; 0 when absent.
fn declared_size(type_name: &str) -> u32 {
    type_name
        .split_once('(')
        .and_then(|(_, rest)| rest.split([',', ')']).next())
        .and_then(|digits| digits.trim().parse().ok())
        .unwrap_or(0)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `(name, declared type, not null, pk position)` per column.
type TableInfo = (String, String, bool, u32);

impl SqliteSession<'_> {
    fn table_info(&self, table: &str) -> Result<Vec<TableInfo>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        instrumented(&sql, || {
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>("name")?,
                    row.get::<_, String>("type")?,
                    row.get::<_, i64>("notnull")? != 0,
                    row.get::<_, u32>("pk")?,
                ))
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}

impl Executor for SqliteSession<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        instrumented(sql, || {
            let mut stmt = self.conn.prepare(sql)?;
            let changed = stmt.execute(params_from_iter(params.iter().map(to_sql_value)))?;
            Ok(changed as u64)
        })
    }

    fn query(&self, sql: &str, params: &[Value], visit: &mut dyn FnMut(&dyn ResultRow) -> Result<()>) -> Result<()> {
        let mut stmt = instrumented(sql, || Ok(self.conn.prepare(sql)?))?;
        let mut rows = stmt.query(params_from_iter(params.iter().map(to_sql_value)))?;
        while let Some(row) = rows.next()? {
            visit(&SqliteRow(row))?;
        }
        Ok(())
    }
}

impl SchemaIntrospector for SqliteSession<'_> {
    fn table_names(&self) -> Result<Vec<String>> {
        instrumented(TABLES_SQL, || {
            let mut stmt = self.conn.prepare(TABLES_SQL)?;
            let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
            Ok(names.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    fn primary_key_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut keys: Vec<(u32, String)> = self
            .table_info(table)?
            .into_iter()
            .filter(|(_, _, _, pk)| *pk > 0)
            .map(|(name, _, _, pk)| (pk, name))
            .collect();
        keys.sort();
        Ok(keys.into_iter().map(|(_, name)| name).collect())
    }

    fn index_columns(&self, table: &str) -> Result<Vec<IndexColumn>> {
        let list_sql = format!("PRAGMA index_list({})", quote_ident(table));
        let indexes: Vec<(String, bool)> = instrumented(&list_sql, || {
            let mut stmt = self.conn.prepare(&list_sql)?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>("name")?, row.get::<_, i64>("unique")? != 0))
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?;

        let mut columns = Vec::new();
        for (index_name, unique) in indexes {
            let info_sql = format!("PRAGMA index_info({})", quote_ident(&index_name));
            let parts: Vec<(u32, String)> = instrumented(&info_sql, || {
                let mut stmt = self.conn.prepare(&info_sql)?;
                let rows = stmt.query_map([], |row| {
                    Ok((row.get::<_, u32>("seqno")?, row.get::<_, String>("name")?))
                })?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })?;
            columns.extend(parts.into_iter().map(|(seqno, column)| IndexColumn {
                index_name: index_name.clone(),
                unique,
                ordinal: seqno + 1,
                column,
            }));
        }
        Ok(columns)
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let info = self.table_info(table)?;
        let key_count = info.iter().filter(|(_, _, _, pk)| *pk > 0).count();
        Ok(info
            .into_iter()
            .map(|(name, type_name, not_null, pk)| {
                // Only a lone INTEGER PRIMARY KEY aliases the rowid.
                let integer = type_name.eq_ignore_ascii_case("integer");
                let autoincrement = pk > 0 && key_count == 1 && integer;
                ColumnDescriptor {
                    size: declared_size(&type_name),
                    nullable: !not_null && pk == 0,
                    autoincrement,
                    type_code: integer.then(|| DbType::BigInt.sql_code()),
                    type_name,
                    name,
                }
            })
            .collect())
    }
}
