//! Filter terms derived from example records.
//!
//! Every set member of the example contributes one OR-joined term: text
//! columns match by substring, `*id*` integer columns only when positive,
//! everything else by equality. Unset members (null, empty text, zero ids)
//! contribute nothing.

use super::filter::{ComparisonOperator, FilterTerm, JoinOperator};
use crate::error::Result;
use crate::mapping::TableBinding;
use crate::value::Value;

/// Append the terms for one example to `terms`.
pub fn example_terms<R>(binding: &TableBinding<R>, example: &R, terms: &mut Vec<FilterTerm>) -> Result<()> {
    for column in binding.columns() {
        let mut wire = Vec::with_capacity(1);
        column.bind(&mut wire, example)?;
        let Some(value) = wire.pop() else {
            continue;
        };
        if value.is_null() {
            continue;
        }

        if column.db_type.is_text() {
            if let Value::Text(text) = &value {
                if !text.is_empty() {
                    terms.push(FilterTerm::contains(
                        column.column.as_str(),
                        column.db_type,
                        text,
                        JoinOperator::Or,
                    ));
                }
            }
            continue;
        }

        let unset_id = column.db_type.is_integer()
            && column.column.to_lowercase().contains("id")
            && value.as_i64().is_some_and(|v| v < 1);
        if unset_id {
            continue;
        }

        terms.push(FilterTerm::new(
            column.column.as_str(),
            column.db_type,
            ComparisonOperator::Equals,
            value,
            JoinOperator::Or,
        ));
    }
    Ok(())
}

/// Terms for a list of examples, in list then column order.
pub fn examples_terms<R>(binding: &TableBinding<R>, examples: &[R]) -> Result<Vec<FilterTerm>> {
    let mut terms = Vec::new();
    for example in examples {
        example_terms(binding, example, &mut terms)?;
    }
    Ok(terms)
}
