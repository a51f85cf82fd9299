//! Fluent, string-free filtering.
//!
//! ```no_run
//! # use rowbind::{Record, Rowbind, ConnectionProvider};
//! # #[derive(Debug, Clone, Record)]
//! # pub struct Person { pub id: i32, pub name: String, pub email: String }
//! # fn example<P: ConnectionProvider>(orm: &Rowbind<P>) -> rowbind::Result<()> {
//! let people = orm
//!     .from::<Person>()?
//!     .filter(Person::NAME)
//!     .like("Harry")
//!     .or(Person::EMAIL)
//!     .equal_to("john@example.com".to_string())
//!     .find()?;
//! # Ok(())
//! # }
//! ```
//!
//! An accessor that cannot be resolved, or a value that cannot be bound,
//! is remembered and returned by [`Select::find`].

use super::resolver::AccessorResolver;
use crate::connection::ConnectionProvider;
use crate::error::{Result, RowbindError};
use crate::mapping::{ColumnBinding, TableBinding};
use crate::query::{ComparisonOperator, FilterTerm, JoinOperator, QueryEngine};
use crate::record::{Accessor, Record};
use crate::value::{Value, ValueType};
use std::marker::PhantomData;
use std::sync::Arc;

pub struct Select<'a, R> {
    provider: &'a dyn ConnectionProvider,
    resolver: &'a AccessorResolver,
    binding: Arc<TableBinding<R>>,
    terms: Vec<FilterTerm>,
    error: Option<RowbindError>,
}

impl<'a, R: Record> Select<'a, R> {
    pub(crate) fn new(
        provider: &'a dyn ConnectionProvider,
        resolver: &'a AccessorResolver,
        binding: Arc<TableBinding<R>>,
    ) -> Self {
        Self {
            provider,
            resolver,
            binding,
            terms: Vec::new(),
            error: None,
        }
    }

    /// Start the WHERE clause. After earlier terms this behaves as
    /// [`Select::and`].
    pub fn filter<U>(self, accessor: Accessor<R, U>) -> Comparison<'a, R, U> {
        self.comparison(accessor, JoinOperator::None)
    }

    pub fn and<U>(self, accessor: Accessor<R, U>) -> Comparison<'a, R, U> {
        self.comparison(accessor, JoinOperator::And)
    }

    pub fn or<U>(self, accessor: Accessor<R, U>) -> Comparison<'a, R, U> {
        self.comparison(accessor, JoinOperator::Or)
    }

    fn comparison<U>(mut self, accessor: Accessor<R, U>, join: JoinOperator) -> Comparison<'a, R, U> {
        let join = match join {
            JoinOperator::None if !self.terms.is_empty() => JoinOperator::And,
            join => join,
        };
        let column = if self.error.is_some() {
            None
        } else {
            match self.resolver.resolve(&accessor, &self.binding) {
                Ok(column) => Some(column),
                Err(err) => {
                    self.error = Some(err);
                    None
                }
            }
        };
        Comparison {
            select: self,
            column,
            join,
            _member: PhantomData,
        }
    }

    /// Terms accumulated so far, in append order.
    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    /// Run the query with the accumulated terms.
    pub fn find(self) -> Result<Vec<R>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let connection = self.provider.acquire()?;
        QueryEngine::new(&self.binding, connection.as_executor()).find_filtering(&self.terms)
    }
}

/// A pending comparison on one resolved column.
pub struct Comparison<'a, R, U> {
    select: Select<'a, R>,
    column: Option<String>,
    join: JoinOperator,
    _member: PhantomData<fn() -> U>,
}

impl<'a, R: Record, U: ValueType> Comparison<'a, R, U> {
    pub fn equal_to(self, value: U) -> Select<'a, R> {
        self.push(ComparisonOperator::Equals, value.into_value())
    }

    pub fn not_equal_to(self, value: U) -> Select<'a, R> {
        self.push(ComparisonOperator::NotEquals, value.into_value())
    }

    pub fn greater_than(self, value: U) -> Select<'a, R> {
        self.push(ComparisonOperator::GreaterThan, value.into_value())
    }

    pub fn less_than(self, value: U) -> Select<'a, R> {
        self.push(ComparisonOperator::LessThan, value.into_value())
    }
}

impl<'a, R: Record, U> Comparison<'a, R, U> {
    /// Substring match: the value is wrapped as `%value%`.
    pub fn like(self, value: &str) -> Select<'a, R> {
        self.finish(|column, join| Ok(FilterTerm::contains(column.column.as_str(), column.db_type, value, join)))
    }

    fn push(self, operator: ComparisonOperator, value: Value) -> Select<'a, R> {
        self.finish(|column, join| {
            let mut wire = Vec::with_capacity(1);
            column.bind_value(&mut wire, value)?;
            Ok(FilterTerm::new(
                column.column.as_str(),
                column.db_type,
                operator,
                wire.pop().unwrap_or(Value::Null),
                join,
            ))
        })
    }

    /// Append the term built for the resolved column, or record why it
    /// could not be built.
    fn finish(self, build: impl FnOnce(&ColumnBinding<R>, JoinOperator) -> Result<FilterTerm>) -> Select<'a, R> {
        let Comparison {
            mut select,
            column,
            join,
            ..
        } = self;
        let Some(column) = column else {
            return select;
        };

        let term = match select.binding.column_named(&column) {
            Some(binding) => build(binding, join),
            None => Err(RowbindError::resolution(format!(
                "column `{column}` vanished from the binding of `{}`",
                select.binding.table()
            ))),
        };
        match term {
            Ok(term) => select.terms.push(term),
            Err(err) => select.error = Some(err),
        }
        select
    }
}
