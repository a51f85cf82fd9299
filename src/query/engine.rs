//! Query engine: parameterized CRUD and filtering over a [`TableBinding`].
//!
//! Each operation assembles its SQL, executes it once on the given
//! executor and materializes any rows through the binding. Backend failures
//! leave as [`RowbindError::QueryExecution`] naming the table and operation.

use super::filter::FilterTerm;
use super::sql::{self, Statement};
use crate::error::{Result, RowbindError};
use crate::executor::Executor;
use crate::mapping::{ColumnBinding, TableBinding};
use crate::types::DbType;
use crate::value::Value;

pub struct QueryEngine<'a, R> {
    binding: &'a TableBinding<R>,
    executor: &'a dyn Executor,
}

impl<'a, R> QueryEngine<'a, R> {
    pub fn new(binding: &'a TableBinding<R>, executor: &'a dyn Executor) -> Self {
        Self { binding, executor }
    }

    pub fn binding(&self) -> &'a TableBinding<R> {
        self.binding
    }

    /// Insert every column except autoincrement keys.
    ///
    /// Returns the generated key when the binding has an integer primary
    /// key, `0` otherwise.
    pub fn insert(&self, record: &R) -> Result<i64> {
        let columns: Vec<&ColumnBinding<R>> = self
            .binding
            .columns()
            .iter()
            .filter(|c| !c.is_autoincrement_key())
            .collect();
        self.insert_columns(record, &columns, "insert")
    }

    /// Insert every column, autoincrement keys included.
    pub fn force_insert(&self, record: &R) -> Result<i64> {
        let columns: Vec<&ColumnBinding<R>> = self.binding.columns().iter().collect();
        self.insert_columns(record, &columns, "force insert")
    }

    fn insert_columns(&self, record: &R, columns: &[&ColumnBinding<R>], operation: &str) -> Result<i64> {
        let names: Vec<&str> = columns.iter().map(|c| c.column.as_str()).collect();
        let mut row = Vec::with_capacity(columns.len());
        for column in columns {
            column.bind(&mut row, record)?;
        }

        let key = self.binding.generated_key();
        let statement = sql::insert(
            self.executor.dialect(),
            self.binding.table(),
            &names,
            &[row],
            key.map(|k| k.column.as_str()),
        )?;

        let Some(key) = key else {
            self.executor
                .execute(&statement.sql, &statement.params)
                .map_err(|e| e.in_table(self.binding.table(), operation))?;
            return Ok(0);
        };
        let mut generated = None;
        self.executor
            .query(&statement.sql, &statement.params, &mut |returned| {
                generated = returned.get(&key.column, key.db_type)?.as_i64();
                Ok(())
            })
            .map_err(|e| e.in_table(self.binding.table(), operation))?;
        Ok(generated.unwrap_or(0))
    }

    /// Insert all records with one multi-row INSERT.
    ///
    /// Autoincrement keys are left to the database when no record sets
    /// them. An empty slice issues no statement.
    pub fn bulk_insert(&self, records: &[R]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }
        let columns: Vec<&ColumnBinding<R>> = self
            .binding
            .columns()
            .iter()
            .filter(|c| {
                !(c.is_autoincrement_key()
                    && records.iter().all(|r| {
                        let v = c.read(r);
                        v.is_null() || v.is_zero()
                    }))
            })
            .collect();
        let names: Vec<&str> = columns.iter().map(|c| c.column.as_str()).collect();
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                column.bind(&mut row, record)?;
            }
            rows.push(row);
        }
        let statement = sql::insert(self.executor.dialect(), self.binding.table(), &names, &rows, None)?;

        self.executor
            .execute(&statement.sql, &statement.params)
            .map_err(|e| e.in_table(self.binding.table(), "bulk insert"))
    }

    /// Set every column, matching the row on all key columns.
    pub fn update(&self, record: &R) -> Result<u64> {
        let keys: Vec<&ColumnBinding<R>> = self.binding.key_columns().collect();
        if keys.is_empty() {
            return Err(RowbindError::mapping(format!(
                "table `{}` has no key columns; refusing to update without a WHERE clause",
                self.binding.table()
            )));
        }
        let set = bound_pairs(self.binding.columns().iter(), record)?;
        let matching = bound_pairs(keys.into_iter(), record)?;
        let statement = sql::update(self.executor.dialect(), self.binding.table(), &set, &matching)?;

        self.executor
            .execute(&statement.sql, &statement.params)
            .map_err(|e| e.in_table(self.binding.table(), "update"))
    }

    /// Insert when the autoincrement key is unset, update otherwise.
    ///
    /// Returns the generated key after an insert and the existing key after
    /// an update. Bindings without an autoincrement key always force-insert.
    ///
    /// The update matches on every key column, non-unique indexes included,
    /// so changing such a column in memory matches no row. That case is
    /// logged as a warning and the existing key is still returned.
    pub fn save(&self, record: &R) -> Result<i64> {
        let Some(key) = self.binding.autoincrement_key() else {
            return self.force_insert(record);
        };
        let current = key.read(record);
        if current.is_null() || current.is_zero() {
            return self.insert(record);
        }
        let changed = self.update(record)?;
        if changed == 0 {
            log::warn!(
                "event=save status=no_rows table={} key={} hint=\"key columns changed or row deleted\"",
                self.binding.table(),
                current
            );
        }
        Ok(current.as_i64().unwrap_or(0))
    }

    /// Delete the row whose `id` column equals `id`.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let column = self.id_column("delete")?;
        let statement = sql::delete_by(
            self.executor.dialect(),
            self.binding.table(),
            &column.column,
            &key_value(column, id)?,
        )?;
        let removed = self
            .executor
            .execute(&statement.sql, &statement.params)
            .map_err(|e| e.in_table(self.binding.table(), "delete"))?;
        Ok(removed == 1)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<R>> {
        let column = self.id_column("find by id")?;
        let statement = self.select_by(column, id)?;
        let mut found = self.fetch(&statement.sql, &statement.params, "find by id")?;
        if found.is_empty() {
            Ok(None)
        } else {
            Ok(Some(found.swap_remove(0)))
        }
    }

    pub fn find_all(&self) -> Result<Vec<R>> {
        self.fetch(self.binding.select_all(), &[], "find all")
    }

    /// Rows of this table referencing `parent` through `<parent>_id` or
    /// `id_<parent>`.
    ///
    /// Without such a column, or without a keyed `id` on the parent, the
    /// result is empty and no statement runs.
    pub fn find_by_foreign_id<P>(&self, parent: &TableBinding<P>, parent_value: &P) -> Result<Vec<R>> {
        let candidates = [
            format!("{}_id", parent.table()),
            format!("id_{}", parent.table()),
        ];
        let Some(foreign) = candidates.iter().find_map(|name| self.binding.column_named(name)) else {
            return Ok(Vec::new());
        };
        let Some(parent_id) = parent.id_column().filter(|c| c.key.is_key()) else {
            return Ok(Vec::new());
        };

        let mut wire = Vec::with_capacity(1);
        parent_id.bind(&mut wire, parent_value)?;
        let Some(id) = wire.pop().and_then(|v| v.as_i64()) else {
            return Ok(Vec::new());
        };

        let statement = self.select_by(foreign, id)?;
        self.fetch(&statement.sql, &statement.params, "find by foreign id")
    }

    /// Rows matching the terms in order; no terms means every row.
    pub fn find_filtering(&self, terms: &[FilterTerm]) -> Result<Vec<R>> {
        let statement = sql::select_filtering(
            self.executor.dialect(),
            self.binding.table(),
            &self.binding.column_names(),
            terms,
        )?;
        self.fetch(&statement.sql, &statement.params, "find filtering")
    }

    fn select_by(&self, column: &ColumnBinding<R>, id: i64) -> Result<Statement> {
        sql::select_by(
            self.executor.dialect(),
            self.binding.table(),
            &self.binding.column_names(),
            &column.column,
            &key_value(column, id)?,
        )
    }

    fn id_column(&self, operation: &str) -> Result<&'a ColumnBinding<R>> {
        self.binding.id_column().ok_or_else(|| {
            RowbindError::mapping(format!(
                "{operation} needs an `id` column, table `{}` has none",
                self.binding.table()
            ))
        })
    }

    fn fetch(&self, statement: &str, params: &[Value], operation: &str) -> Result<Vec<R>> {
        let mut records = Vec::new();
        self.executor
            .query(statement, params, &mut |row| {
                records.push(self.binding.materialize(row)?);
                Ok(())
            })
            .map_err(|e| e.in_table(self.binding.table(), operation))?;
        Ok(records)
    }
}

/// `(column, wire value)` for each binding, read from `record`.
fn bound_pairs<'c, R: 'c>(
    columns: impl Iterator<Item = &'c ColumnBinding<R>>,
    record: &R,
) -> Result<Vec<(&'c str, Value)>> {
    let mut pairs = Vec::new();
    let mut wire = Vec::with_capacity(1);
    for column in columns {
        column.bind(&mut wire, record)?;
        let value = wire.pop().unwrap_or(Value::Null);
        pairs.push((column.column.as_str(), value));
    }
    Ok(pairs)
}

/// An integer key shaped for `column`.
fn key_value<R>(column: &ColumnBinding<R>, id: i64) -> Result<Value> {
    match column.db_type {
        DbType::BigInt => Ok(Value::BigInt(id)),
        DbType::SmallInt | DbType::Integer => i32::try_from(id).map(Value::Int).map_err(|_| {
            RowbindError::type_error(format!("key {id} does not fit column `{}`", column.column))
        }),
        other => Err(RowbindError::type_error(format!(
            "column `{}` of type {other} cannot be addressed by an integer key",
            column.column
        ))),
    }
}
