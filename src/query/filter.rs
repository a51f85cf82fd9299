//! Filter terms for WHERE clauses.

use crate::types::DbType;
use crate::value::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    Like,
    GreaterThan,
    LessThan,
}

impl ComparisonOperator {
    pub fn sql(self) -> &'static str {
        match self {
            ComparisonOperator::Equals => "=",
            ComparisonOperator::NotEquals => "<>",
            ComparisonOperator::Like => "LIKE",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
        }
    }
}

/// How a term joins the term before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinOperator {
    #[default]
    None,
    And,
    Or,
}

impl JoinOperator {
    pub fn sql(self) -> &'static str {
        match self {
            JoinOperator::None => "",
            JoinOperator::And => "AND",
            JoinOperator::Or => "OR",
        }
    }
}

/// One `column op ?` condition with the value already in wire form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTerm {
    pub column: String,
    pub db_type: DbType,
    pub operator: ComparisonOperator,
    pub value: Value,
    pub join: JoinOperator,
}

impl FilterTerm {
    pub fn new(
        column: impl Into<String>,
        db_type: DbType,
        operator: ComparisonOperator,
        value: Value,
        join: JoinOperator,
    ) -> Self {
        Self {
            column: column.into(),
            db_type,
            operator,
            value,
            join,
        }
    }

    /// A LIKE term matching `value` anywhere in the column.
    pub fn contains(column: impl Into<String>, db_type: DbType, value: &str, join: JoinOperator) -> Self {
        Self::new(
            column,
            db_type,
            ComparisonOperator::Like,
            Value::Text(format!("%{value}%")),
            join,
        )
    }
}

impl fmt::Display for FilterTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.join.sql(),
            self.column,
            self.operator.sql(),
            self.value
        )
    }
}
