//! Statement execution seam.
//!
//! [`Executor`] abstracts a live database connection for the query engine:
//! the SQL dialect statements are rendered in, plain execution and row
//! visiting. Rows are read through [`ResultRow`], keyed by column name and
//! the column's [`DbType`].
//!
//! Backends wrap their driver calls in [`instrumented`] so every statement
//! is timed, counted and (with the `tracing` feature) run inside a span.

use crate::error::Result;
use crate::types::DbType;
use crate::value::Value;
use std::time::Instant;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;
#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

/// SQL dialect a connection speaks.
///
/// Picks the `sea-query` builder statements are rendered with, which fixes
/// identifier quoting and placeholder style (`$1` or `?`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

/// One row of a result set.
pub trait ResultRow {
    /// Read `column` using the extraction implied by `db_type`.
    ///
    /// SQL `NULL` is returned as [`Value::Null`].
    fn get(&self, column: &str, db_type: DbType) -> Result<Value>;
}

/// Trait for executing statements against one connection.
///
/// # Examples
///
/// ```no_run
/// # use rowbind::{Executor, Value, DbType};
/// # fn example(executor: &dyn Executor) -> rowbind::Result<()> {
/// let removed = executor.execute("DELETE FROM person WHERE id = $1", &[Value::BigInt(42)])?;
///
/// let mut names = Vec::new();
/// executor.query("SELECT name FROM person", &[], &mut |row| {
///     names.push(row.get("name", DbType::Varchar)?);
///     Ok(())
/// })?;
/// # Ok(())
/// # }
/// ```
pub trait Executor {
    fn dialect(&self) -> Dialect;

    /// Execute a statement and return the number of rows affected.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Run a query, handing every row to `visit` in result order.
    ///
    /// Also used for `INSERT ... RETURNING`.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
        visit: &mut dyn FnMut(&dyn ResultRow) -> Result<()>,
    ) -> Result<()>;
}

/// Run one driver call with the statement span, duration and error metrics
/// around it.
pub(crate) fn instrumented<T>(sql: &str, run: impl FnOnce() -> Result<T>) -> Result<T> {
    #[cfg(feature = "tracing")]
    let _span = tracing_helpers::statement_span(sql).entered();

    let start = Instant::now();
    let result = run();
    let elapsed = start.elapsed();

    #[cfg(feature = "metrics")]
    {
        METRICS.record_statement(elapsed);
        if result.is_err() {
            METRICS.record_statement_error();
        }
    }

    match &result {
        Ok(_) => log::trace!("event=statement status=ok elapsed_ms={} sql={}", elapsed.as_millis(), sql),
        Err(err) => log::debug!("event=statement status=error sql={} error={}", sql, err),
    }
    result
}
