//! Statement rendering.
//!
//! Every statement is assembled with SeaQuery and rendered with the builder
//! for the executor's [`Dialect`], so identifiers are always quoted and
//! placeholders follow the backend's style. Parameters come back in
//! placeholder order as rowbind values.

use super::filter::{ComparisonOperator, FilterTerm, JoinOperator};
use super::value_conversion::{from_sea_values, to_sea_value};
use crate::error::{Result, RowbindError};
use crate::executor::Dialect;
use crate::value::Value;
use sea_query::{
    Condition, DynIden, Expr, ExprTrait, PostgresQueryBuilder, Query, SelectStatement, SqliteQueryBuilder,
};

/// Rendered SQL plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

macro_rules! render {
    ($dialect:expr, $statement:expr) => {{
        let (sql, values) = match $dialect {
            Dialect::Postgres => $statement.build(PostgresQueryBuilder),
            Dialect::Sqlite => $statement.build(SqliteQueryBuilder),
        };
        Ok(Statement {
            sql: clean_sql(&sql),
            params: from_sea_values(&values)?,
        })
    }};
}

fn iden(name: &str) -> DynIden {
    DynIden::from(name.to_string())
}

fn bound(value: &Value) -> Expr {
    Expr::val(to_sea_value(value))
}

/// Collapse runs of whitespace and drop a join keyword directly after
/// `WHERE`.
pub fn clean_sql(sql: &str) -> String {
    let words: Vec<&str> = sql.split_whitespace().collect();
    let mut cleaned: Vec<&str> = Vec::with_capacity(words.len());
    for word in words {
        let after_where = cleaned
            .last()
            .is_some_and(|prev| prev.eq_ignore_ascii_case("WHERE"));
        if after_where && (word.eq_ignore_ascii_case("AND") || word.eq_ignore_ascii_case("OR")) {
            continue;
        }
        cleaned.push(word);
    }
    cleaned.join(" ")
}

fn select(table: &str, columns: &[&str]) -> SelectStatement {
    let mut select = Query::select();
    select.columns(columns.iter().map(|c| iden(c))).from(iden(table));
    select
}

/// `SELECT "a", "b" FROM "t"` with standard double-quoted identifiers.
///
/// Holds no parameters, so the text is valid for every supported dialect.
pub fn select_all(table: &str, columns: &[&str]) -> String {
    let (sql, _) = select(table, columns).build(PostgresQueryBuilder);
    sql
}

/// One INSERT with a value tuple per row, optionally returning `returning`.
pub fn insert(
    dialect: Dialect,
    table: &str,
    columns: &[&str],
    rows: &[Vec<Value>],
    returning: Option<&str>,
) -> Result<Statement> {
    let mut insert = Query::insert();
    insert.into_table(iden(table)).columns(columns.iter().map(|c| iden(c)));
    for row in rows {
        insert
            .values(row.iter().map(bound))
            .map_err(|e| RowbindError::mapping(format!("insert into `{table}`: {e}")))?;
    }
    if let Some(key) = returning {
        insert.returning_col(iden(key));
    }
    render!(dialect, insert)
}

/// `UPDATE t SET ... WHERE k1 = ? AND k2 = ?`.
pub fn update(dialect: Dialect, table: &str, set: &[(&str, Value)], keys: &[(&str, Value)]) -> Result<Statement> {
    let mut update = Query::update();
    update.table(iden(table));
    for (column, value) in set {
        update.value(iden(column), bound(value));
    }
    for (column, value) in keys {
        update.and_where(Expr::col(iden(column)).eq(bound(value)));
    }
    render!(dialect, update)
}

pub fn delete_by(dialect: Dialect, table: &str, column: &str, value: &Value) -> Result<Statement> {
    let mut delete = Query::delete();
    delete
        .from_table(iden(table))
        .and_where(Expr::col(iden(column)).eq(bound(value)));
    render!(dialect, delete)
}

pub fn select_by(dialect: Dialect, table: &str, columns: &[&str], column: &str, value: &Value) -> Result<Statement> {
    let mut select = select(table, columns);
    select.and_where(Expr::col(iden(column)).eq(bound(value)));
    render!(dialect, select)
}

/// SELECT filtered by `terms` in order; no WHERE for an empty list.
pub fn select_filtering(dialect: Dialect, table: &str, columns: &[&str], terms: &[FilterTerm]) -> Result<Statement> {
    let mut select = select(table, columns);
    if !terms.is_empty() {
        select.cond_where(condition(terms));
    }
    render!(dialect, select)
}

/// Terms read left to right with the usual precedence: AND binds tighter
/// than OR, so each OR starts a new AND group.
///
/// A missing join after the first term reads as AND.
fn condition(terms: &[FilterTerm]) -> Condition {
    let mut any = Condition::any();
    let mut group = Condition::all();
    for (i, term) in terms.iter().enumerate() {
        if i > 0 && term.join == JoinOperator::Or {
            any = any.add(std::mem::replace(&mut group, Condition::all()));
        }
        group = group.add(comparison(term));
    }
    any.add(group)
}

fn comparison(term: &FilterTerm) -> Expr {
    let column = Expr::col(iden(&term.column));
    match term.operator {
        ComparisonOperator::Equals => column.eq(bound(&term.value)),
        ComparisonOperator::NotEquals => column.ne(bound(&term.value)),
        ComparisonOperator::GreaterThan => column.gt(bound(&term.value)),
        ComparisonOperator::LessThan => column.lt(bound(&term.value)),
        ComparisonOperator::Like => column.like(term.value.to_string()),
    }
}
