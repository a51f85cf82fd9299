//! Typed predicate DSL.

pub mod resolver;
pub mod select;

pub use resolver::AccessorResolver;
pub use select::{Comparison, Select};
