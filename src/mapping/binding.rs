//! Table bindings: the cached, immutable result of mapping a record type.

use crate::error::Result;
use crate::executor::ResultRow;
use crate::query::sql;
use crate::record::AccessorFn;
use crate::types::{record_to_row, row_to_record, Converter, DbType};
use crate::value::{HostKind, Value};
use std::fmt;

/// Index role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyRole {
    #[default]
    None,
    /// Primary key.
    Primary,
    /// First column of a unique index.
    Unique,
    /// First column of a non-unique index.
    Multiple,
}

impl KeyRole {
    pub fn is_key(self) -> bool {
        self != KeyRole::None
    }

    pub fn code(self) -> &'static str {
        match self {
            KeyRole::None => "",
            KeyRole::Primary => "PRI",
            KeyRole::Unique => "UNI",
            KeyRole::Multiple => "MUL",
        }
    }
}

/// How one column maps to one record member.
pub struct ColumnBinding<R> {
    pub column: String,
    pub member: &'static str,
    pub member_kind: HostKind,
    pub db_type: DbType,
    pub size: u32,
    pub nullable: bool,
    pub primary_key: bool,
    pub autoincrement: bool,
    pub key: KeyRole,
    pub accessor: AccessorFn<R>,
    /// Member value to column value.
    pub serializer: Converter,
    /// Column value to member value.
    pub deserializer: Converter,
}

impl<R> ColumnBinding<R> {
    /// Current member value, unconverted.
    pub fn read(&self, record: &R) -> Value {
        (self.accessor.get)(record)
    }

    pub fn is_autoincrement_key(&self) -> bool {
        self.key == KeyRole::Primary && self.autoincrement
    }

    /// Append this column's value from `record` to `params`.
    pub fn bind(&self, params: &mut Vec<Value>, record: &R) -> Result<()> {
        self.bind_value(params, self.read(record))
    }

    /// Append a member-shaped value to `params`.
    pub fn bind_value(&self, params: &mut Vec<Value>, value: Value) -> Result<()> {
        record_to_row(params, &self.column, value, self.db_type, self.size, &self.serializer)
    }

    pub fn extract(&self, row: &dyn ResultRow, slots: &mut Vec<Value>) -> Result<()> {
        row_to_record(row, &self.column, self.db_type, &self.deserializer, slots)
    }
}

impl<R> fmt::Debug for ColumnBinding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnBinding")
            .field("column", &self.column)
            .field("member", &self.member)
            .field("db_type", &self.db_type)
            .field("size", &self.size)
            .field("nullable", &self.nullable)
            .field("primary_key", &self.primary_key)
            .field("autoincrement", &self.autoincrement)
            .field("key", &self.key.code())
            .field("serializer", &self.serializer)
            .field("deserializer", &self.deserializer)
            .finish()
    }
}

/// Everything needed to move one record type to and from its table.
///
/// Columns are ordered as the constructor's parameters.
pub struct TableBinding<R> {
    table: String,
    record_name: &'static str,
    columns: Vec<ColumnBinding<R>>,
    constructor: fn(Vec<Value>) -> Result<R>,
    column_list: String,
    select_all: String,
    has_autoincrement_key: bool,
}

impl<R> TableBinding<R> {
    pub fn new(
        table: impl Into<String>,
        record_name: &'static str,
        columns: Vec<ColumnBinding<R>>,
        constructor: fn(Vec<Value>) -> Result<R>,
    ) -> Self {
        let table = table.into();
        let column_list = columns
            .iter()
            .map(|c| c.column.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let names: Vec<&str> = columns.iter().map(|c| c.column.as_str()).collect();
        let select_all = sql::select_all(&table, &names);
        let has_autoincrement_key = columns.iter().any(ColumnBinding::is_autoincrement_key);
        Self {
            table,
            record_name,
            columns,
            constructor,
            column_list,
            select_all,
            has_autoincrement_key,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn record_name(&self) -> &'static str {
        self.record_name
    }

    pub fn columns(&self) -> &[ColumnBinding<R>] {
        &self.columns
    }

    /// `a, b, c` in constructor order.
    pub fn column_list(&self) -> &str {
        &self.column_list
    }

    /// Column names in constructor order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column.as_str()).collect()
    }

    /// Pre-rendered `SELECT` of every column, identifiers quoted.
    pub fn select_all(&self) -> &str {
        &self.select_all
    }

    pub fn has_autoincrement_key(&self) -> bool {
        self.has_autoincrement_key
    }

    pub fn autoincrement_key(&self) -> Option<&ColumnBinding<R>> {
        self.columns.iter().find(|c| c.is_autoincrement_key())
    }

    /// Integer primary key used to report generated keys.
    pub fn generated_key(&self) -> Option<&ColumnBinding<R>> {
        self.autoincrement_key().or_else(|| {
            self.columns
                .iter()
                .find(|c| c.key == KeyRole::Primary && c.db_type.is_integer())
        })
    }

    pub fn key_columns(&self) -> impl Iterator<Item = &ColumnBinding<R>> {
        self.columns.iter().filter(|c| c.key.is_key())
    }

    pub fn column_named(&self, column: &str) -> Option<&ColumnBinding<R>> {
        self.columns.iter().find(|c| c.column.eq_ignore_ascii_case(column))
    }

    pub fn column_for_member(&self, member: &str) -> Option<&ColumnBinding<R>> {
        self.columns.iter().find(|c| c.member.eq_ignore_ascii_case(member))
    }

    /// The literal `id` column.
    pub fn id_column(&self) -> Option<&ColumnBinding<R>> {
        self.column_named("id")
    }

    /// Build a record from one result row.
    pub fn materialize(&self, row: &dyn ResultRow) -> Result<R> {
        let mut slots = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            column.extract(row, &mut slots)?;
        }
        (self.constructor)(slots)
    }
}

impl<R> fmt::Debug for TableBinding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableBinding")
            .field("table", &self.table)
            .field("record", &self.record_name)
            .field("columns", &self.columns)
            .field("has_autoincrement_key", &self.has_autoincrement_key)
            .finish()
    }
}
