//! The `Rowbind` facade.
//!
//! One instance per connection provider. It owns the binding registry, the
//! converter registry and the accessor resolver, so nothing is shared
//! between instances. Every operation checks out one connection, builds
//! the record's binding on first use and runs a single statement.
//!
//! ```no_run
//! use rowbind::{Record, Rowbind, RowbindConfig, PgPool};
//! use chrono::NaiveDateTime;
//!
//! #[derive(Debug, Clone, Record)]
//! pub struct Person {
//!     pub id: i32,
//!     pub name: String,
//!     pub email: String,
//!     pub last_login: Option<NaiveDateTime>,
//!     pub company_id: i32,
//! }
//!
//! # fn main() -> rowbind::Result<()> {
//! let config = RowbindConfig::load()?;
//! let orm = Rowbind::with_config(PgPool::new(&config.database)?, config);
//!
//! let id = orm.save(&Person {
//!     id: 0,
//!     name: "Harry".into(),
//!     email: "harry@example.com".into(),
//!     last_login: None,
//!     company_id: 1,
//! })?;
//! let harry: Option<Person> = orm.find(id)?;
//! # Ok(())
//! # }
//! ```

use crate::config::{MappingConfig, RowbindConfig};
use crate::connection::{Connection, ConnectionProvider};
use crate::dsl::{AccessorResolver, Select};
use crate::error::Result;
use crate::mapping::{BindingRegistry, SchemaMapper, TableBinding};
use crate::query::example::{example_terms, examples_terms};
use crate::query::QueryEngine;
use crate::record::Record;
use crate::types::ConverterRegistry;
use crate::value::{HostKind, Value};
use std::sync::Arc;

pub struct Rowbind<P: ConnectionProvider> {
    provider: P,
    mapping: MappingConfig,
    converters: ConverterRegistry,
    bindings: BindingRegistry,
    resolver: AccessorResolver,
}

impl<P: ConnectionProvider> Rowbind<P> {
    pub fn new(provider: P) -> Self {
        Self::with_mapping(provider, MappingConfig::default())
    }

    pub fn with_config(provider: P, config: RowbindConfig) -> Self {
        Self::with_mapping(provider, config.mapping)
    }

    pub fn with_mapping(provider: P, mapping: MappingConfig) -> Self {
        Self {
            provider,
            mapping,
            converters: ConverterRegistry::new(),
            bindings: BindingRegistry::new(),
            resolver: AccessorResolver::new(),
        }
    }

    /// Register a converter for a pair the built-in rules do not cover.
    ///
    /// Only affects bindings built afterwards.
    pub fn register_converter<F>(&mut self, input: HostKind, output: HostKind, label: &str, convert: F) -> &mut Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.converters.register(input, output, label, convert);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn mapping_config(&self) -> &MappingConfig {
        &self.mapping
    }

    /// The cached binding for `R`, built now if needed.
    pub fn binding<R: Record>(&self) -> Result<Arc<TableBinding<R>>> {
        let connection = self.provider.acquire()?;
        self.binding_on::<R>(&*connection)
    }

    fn binding_on<R: Record>(&self, connection: &dyn Connection) -> Result<Arc<TableBinding<R>>> {
        self.bindings.get_or_build::<R, _>(|| {
            SchemaMapper::new(&self.mapping, &self.converters).build::<R>(connection.as_introspector())
        })
    }

    fn run<R, T>(&self, operation: impl FnOnce(&QueryEngine<'_, R>) -> Result<T>) -> Result<T>
    where
        R: Record,
    {
        let connection = self.provider.acquire()?;
        let binding = self.binding_on::<R>(&*connection)?;
        let engine = QueryEngine::new(&binding, connection.as_executor());
        operation(&engine)
    }

    /// Insert when the autoincrement key is unset, update otherwise.
    pub fn save<R: Record>(&self, record: &R) -> Result<i64> {
        self.run::<R, _>(|engine| engine.save(record))
    }

    pub fn insert<R: Record>(&self, record: &R) -> Result<i64> {
        self.run::<R, _>(|engine| engine.insert(record))
    }

    pub fn force_insert<R: Record>(&self, record: &R) -> Result<i64> {
        self.run::<R, _>(|engine| engine.force_insert(record))
    }

    /// Bulk insert with a single statement; returns the rows inserted.
    pub fn insert_all<R: Record>(&self, records: &[R]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }
        self.run::<R, _>(|engine| engine.bulk_insert(records))
    }

    pub fn update<R: Record>(&self, record: &R) -> Result<u64> {
        self.run::<R, _>(|engine| engine.update(record))
    }

    pub fn find<R: Record>(&self, id: i64) -> Result<Option<R>> {
        self.run::<R, _>(|engine| engine.find_by_id(id))
    }

    pub fn find_all<R: Record>(&self) -> Result<Vec<R>> {
        self.run::<R, _>(|engine| engine.find_all())
    }

    /// Rows resembling `example`; see [`crate::query::example`].
    pub fn find_by_example<R: Record>(&self, example: &R) -> Result<Vec<R>> {
        self.run::<R, _>(|engine| {
            let mut terms = Vec::new();
            example_terms(engine.binding(), example, &mut terms)?;
            engine.find_filtering(&terms)
        })
    }

    /// Rows resembling any of `examples`.
    pub fn find_matching<R: Record>(&self, examples: &[R]) -> Result<Vec<R>> {
        self.run::<R, _>(|engine| {
            let terms = examples_terms(engine.binding(), examples)?;
            engine.find_filtering(&terms)
        })
    }

    /// Rows of `R` whose foreign key references `parent`.
    pub fn find_related<R: Record, Q: Record>(&self, parent: &Q) -> Result<Vec<R>> {
        let connection = self.provider.acquire()?;
        let parent_binding = self.binding_on::<Q>(&*connection)?;
        let binding = self.binding_on::<R>(&*connection)?;
        QueryEngine::new(&binding, connection.as_executor()).find_by_foreign_id(&parent_binding, parent)
    }

    pub fn delete<R: Record>(&self, id: i64) -> Result<bool> {
        self.run::<R, _>(|engine| engine.delete(id))
    }

    /// Entry point of the predicate DSL.
    pub fn from<R: Record>(&self) -> Result<Select<'_, R>> {
        let binding = self.binding::<R>()?;
        Ok(Select::new(&self.provider, &self.resolver, binding))
    }
}

impl<P: ConnectionProvider + std::fmt::Debug> std::fmt::Debug for Rowbind<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rowbind")
            .field("provider", &self.provider)
            .field("mapping", &self.mapping)
            .field("converters", &self.converters)
            .field("bindings", &self.bindings)
            .finish()
    }
}
