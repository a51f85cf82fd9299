//! SQL generation and execution.

pub mod engine;
pub mod example;
pub mod filter;
pub mod sql;
pub mod value_conversion;

pub use engine::QueryEngine;
pub use filter::{ComparisonOperator, FilterTerm, JoinOperator};
