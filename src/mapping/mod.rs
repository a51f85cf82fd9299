//! Schema-to-record binding.

pub mod binding;
pub mod fuzzy;
pub mod mapper;
pub mod registry;

pub use binding::{ColumnBinding, KeyRole, TableBinding};
pub use mapper::SchemaMapper;
pub use registry::BindingRegistry;
