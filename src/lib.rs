//! # Rowbind
//!
//! Binds plain Rust record types to relational tables without per-field
//! annotations. The table, the column-to-field pairing and the type
//! conversions are discovered at runtime from the database's own schema
//! metadata and cached per record type.
//!
//! - [`Rowbind`]: the facade; CRUD, filter-by-example and the predicate DSL
//! - [`Record`]: derive it on a struct to expose fields and a constructor
//! - [`PgPool`] / [`SqliteProvider`]: connection providers
//!
//! ```no_run
//! use rowbind::{Record, Rowbind, SqliteProvider};
//!
//! #[derive(Debug, Clone, Record)]
//! pub struct Tag {
//!     pub id: i32,
//!     pub label: String,
//! }
//!
//! # fn main() -> rowbind::Result<()> {
//! let provider = SqliteProvider::open_in_memory()?;
//! provider.execute_batch("CREATE TABLE tag (id INTEGER PRIMARY KEY, label VARCHAR(40))")?;
//! let orm = Rowbind::new(provider);
//!
//! let id = orm.save(&Tag { id: 0, label: "rust".into() })?;
//! let rusty = orm.from::<Tag>()?.filter(Tag::LABEL).like("ru").find()?;
//! # Ok(())
//! # }
//! ```

extern crate self as rowbind;

pub mod backend;
pub mod config;
pub mod connection;
pub mod dsl;
pub mod error;
pub mod executor;
pub mod introspect;
pub mod mapping;
#[cfg(any(feature = "metrics", feature = "tracing"))]
pub mod metrics;
pub mod orm;
pub mod query;
pub mod record;
pub mod types;
pub mod value;

// Derive macros share names with the traits they implement.
pub use rowbind_derive::{Record, RecordEnum};

#[cfg(feature = "sqlite")]
pub use backend::sqlite::SqliteProvider;
pub use config::{AlignmentPolicy, DatabaseConfig, MappingConfig, RowbindConfig};
pub use connection::{Connection, ConnectionProvider, PgPool, PooledClient};
pub use dsl::{Comparison, Select};
pub use error::{Result, RowbindError};
pub use executor::{Dialect, Executor, ResultRow};
pub use introspect::{ColumnDescriptor, IndexColumn, SchemaIntrospector};
pub use mapping::{ColumnBinding, KeyRole, TableBinding};
pub use orm::Rowbind;
pub use query::{ComparisonOperator, FilterTerm, JoinOperator};
pub use record::{Accessor, AccessorFn, Constructor, ConstructorArgs, FieldDescriptor, Record, RecordDescriptor};
pub use types::{Converter, DbType};
pub use value::{EnumDescriptor, EnumEncoding, HostKind, RecordEnum, Value, ValueType};
