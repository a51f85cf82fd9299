//! Schema mapper: builds a [`TableBinding`] for a record type from live
//! catalog metadata.
//!
//! Steps, in order:
//!
//! 1. pick the visible table whose name is closest to the record name;
//! 2. describe its columns and classify key roles (PRI, then the first
//!    column of each unique index as UNI, of each other index as MUL);
//! 3. align every column to the closest member, dropping (lenient) or
//!    rejecting (strict) columns that reuse an already bound member or are
//!    farther than the configured distance;
//! 4. choose converters for both directions;
//! 5. pick the constructor taking exactly the bound column count and order
//!    the columns by its parameters.

use super::binding::{ColumnBinding, KeyRole, TableBinding};
use super::fuzzy::find_closest;
use crate::config::{AlignmentPolicy, MappingConfig};
use crate::error::{Result, RowbindError};
use crate::introspect::{ColumnDescriptor, SchemaIntrospector};
use crate::record::{Constructor, Record, RecordDescriptor};
use crate::types::{converter_for, ConverterRegistry};
use std::collections::{HashMap, HashSet};

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;
#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

/// A catalog column with its resolved key metadata.
#[derive(Debug, Clone)]
struct DescribedColumn {
    descriptor: ColumnDescriptor,
    primary_key: bool,
    key: KeyRole,
}

pub struct SchemaMapper<'a> {
    config: &'a MappingConfig,
    converters: &'a ConverterRegistry,
}

impl<'a> SchemaMapper<'a> {
    pub fn new(config: &'a MappingConfig, converters: &'a ConverterRegistry) -> Self {
        Self { config, converters }
    }

    pub fn build<R: Record>(&self, catalog: &dyn SchemaIntrospector) -> Result<TableBinding<R>> {
        let descriptor = R::descriptor();
        let record = descriptor.name();

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::mapping_span(record).entered();

        let binding = self
            .build_from(&descriptor, catalog)
            .map_err(|err| match err {
                RowbindError::Driver(source) => {
                    RowbindError::mapping_caused_by(format!("error mapping record {record}"), source)
                }
                other => other,
            })?;

        #[cfg(feature = "metrics")]
        METRICS.record_binding_built();

        log::debug!("Record:{} mapped to table:{}", record, binding.table());
        for column in binding.columns() {
            log::debug!(
                "  Field:{} mapped to column:{} type:{} nullable:{} key:{} autoIncrement:{}",
                column.member,
                column.column,
                column.db_type,
                column.nullable,
                column.key.code(),
                column.autoincrement
            );
        }
        Ok(binding)
    }

    fn build_from<R>(
        &self,
        descriptor: &RecordDescriptor<R>,
        catalog: &dyn SchemaIntrospector,
    ) -> Result<TableBinding<R>> {
        let table = resolve_table(catalog, descriptor.name())?;
        let described = self.describe(catalog, &table)?;
        let aligned = self.align(descriptor, &table, described)?;
        let constructor = find_constructor(descriptor, aligned.len())?;
        let ordered = order_for_constructor(descriptor.name(), constructor, aligned)?;
        Ok(TableBinding::new(table, descriptor.name(), ordered, constructor.build))
    }

    fn describe(&self, catalog: &dyn SchemaIntrospector, table: &str) -> Result<Vec<DescribedColumn>> {
        let primary: HashSet<String> = catalog
            .primary_key_columns(table)?
            .into_iter()
            .map(|c| c.to_lowercase())
            .collect();

        let mut roles: HashMap<String, KeyRole> = HashMap::new();
        if self.config.classify_indexes {
            for entry in catalog.index_columns(table)? {
                if entry.ordinal != 1 {
                    continue;
                }
                let role = if entry.unique { KeyRole::Unique } else { KeyRole::Multiple };
                let slot = roles.entry(entry.column.to_lowercase()).or_insert(role);
                if role == KeyRole::Unique {
                    *slot = KeyRole::Unique;
                }
            }
        }

        let columns = catalog.columns(table)?;
        Ok(columns
            .into_iter()
            .map(|descriptor| {
                let lowered = descriptor.name.to_lowercase();
                let primary_key = primary.contains(&lowered);
                let key = if primary_key {
                    KeyRole::Primary
                } else {
                    roles.get(&lowered).copied().unwrap_or_default()
                };
                DescribedColumn {
                    descriptor,
                    primary_key,
                    key,
                }
            })
            .collect())
    }

    fn align<R>(
        &self,
        descriptor: &RecordDescriptor<R>,
        table: &str,
        described: Vec<DescribedColumn>,
    ) -> Result<Vec<ColumnBinding<R>>> {
        let members = descriptor.member_names();
        let mut used: HashSet<&'static str> = HashSet::new();
        let mut bindings = Vec::with_capacity(members.len());

        for column in described {
            let name = column.descriptor.name.as_str();
            let Some((member, distance)) = find_closest(name, members.iter().copied()) else {
                self.skip(table, name, "has no member to match")?;
                continue;
            };
            if self.config.max_match_distance.is_some_and(|max| distance > max) {
                self.skip(
                    table,
                    name,
                    &format!("is unmatched: closest member \"{member}\" is at distance {distance}"),
                )?;
                continue;
            }
            if used.contains(member) {
                self.skip(table, name, &format!("mapped to \"{member}\", which is already used"))?;
                continue;
            }
            log::debug!("Column named \"{}\" mapped to \"{}\".", name, member);

            let accessor = *descriptor.accessor_named(member).ok_or_else(|| {
                RowbindError::mapping(format!(
                    "{}: no accessor found for member `{member}`",
                    descriptor.name()
                ))
            })?;
            let field = descriptor.field_named(member).ok_or_else(|| {
                RowbindError::mapping(format!(
                    "{}: member `{member}` is not declared",
                    descriptor.name()
                ))
            })?;

            let db_type = column.descriptor.db_type()?;
            let canonical = db_type.host_kind();
            let in_context = |err: RowbindError| match err {
                RowbindError::Type(message) => RowbindError::type_error(format!(
                    "{table}.{name} ({db_type}) <-> {}.{member}: {message}",
                    descriptor.name()
                )),
                other => other,
            };
            let serializer = converter_for(field.kind, canonical, self.converters).map_err(in_context)?;
            let deserializer = converter_for(canonical, field.kind, self.converters).map_err(in_context)?;

            used.insert(member);
            bindings.push(ColumnBinding {
                column: column.descriptor.name.clone(),
                member,
                member_kind: field.kind,
                db_type,
                size: column.descriptor.size,
                nullable: column.descriptor.nullable,
                primary_key: column.primary_key,
                autoincrement: column.descriptor.autoincrement,
                key: column.key,
                accessor,
                serializer,
                deserializer,
            });
        }
        Ok(bindings)
    }

    fn skip(&self, table: &str, column: &str, reason: &str) -> Result<()> {
        match self.config.alignment {
            AlignmentPolicy::Lenient => {
                log::debug!("Column named \"{}.{}\" {}. Ignoring.", table, column, reason);
                Ok(())
            }
            AlignmentPolicy::Strict => Err(RowbindError::mapping(format!(
                "column `{table}.{column}` {reason}"
            ))),
        }
    }
}

fn resolve_table(catalog: &dyn SchemaIntrospector, record: &str) -> Result<String> {
    let tables = catalog.table_names()?;
    find_closest(record, tables.iter().map(String::as_str))
        .map(|(table, _)| table.to_string())
        .ok_or_else(|| RowbindError::mapping(format!("no table is visible to map record {record}")))
}

fn find_constructor<R>(descriptor: &RecordDescriptor<R>, arity: usize) -> Result<&Constructor<R>> {
    descriptor
        .constructors()
        .iter()
        .find(|c| c.params.len() == arity)
        .ok_or_else(|| {
            RowbindError::mapping(format!(
                "couldn't find a constructor of {} taking {arity} parameters",
                descriptor.name()
            ))
        })
}

fn order_for_constructor<R>(
    record: &str,
    constructor: &Constructor<R>,
    aligned: Vec<ColumnBinding<R>>,
) -> Result<Vec<ColumnBinding<R>>> {
    let mut pool: Vec<Option<ColumnBinding<R>>> = aligned.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(pool.len());
    for param in &constructor.params {
        let taken = pool
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|c| c.member == *param))
            .and_then(Option::take)
            .ok_or_else(|| {
                RowbindError::mapping(format!(
                    "{record}: no bound column matches constructor parameter `{param}`"
                ))
            })?;
        ordered.push(taken);
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::IndexColumn;
    use crate::record::{ConstructorArgs, FieldDescriptor};
    use crate::types::DbType;
    use crate::value::{Value, ValueType};

    #[derive(Debug, PartialEq)]
    struct Person {
        id: i32,
        name: String,
        company_id: i32,
    }

    impl Record for Person {
        fn descriptor() -> RecordDescriptor<Self> {
            RecordDescriptor::<Self>::new("Person")
                .field(FieldDescriptor::of::<i32>("id"))
                .field(FieldDescriptor::of::<String>("name"))
                .field(FieldDescriptor::of::<i32>("companyId"))
                .accessor("id", |p| p.id.into_value())
                .accessor("name", |p| p.name.clone().into_value())
                .accessor("companyId", |p| p.company_id.into_value())
                .constructor(&["id", "name", "companyId"], |values| {
                    let mut args = ConstructorArgs::new("Person", values);
                    Ok(Person {
                        id: args.next("id")?,
                        name: args.next("name")?,
                        company_id: args.next("companyId")?,
                    })
                })
        }
    }

    struct Catalog {
        tables: Vec<&'static str>,
        columns: Vec<(&'static str, &'static str)>,
    }

    impl SchemaIntrospector for Catalog {
        fn table_names(&self) -> Result<Vec<String>> {
            Ok(self.tables.iter().map(|t| t.to_string()).collect())
        }

        fn primary_key_columns(&self, _table: &str) -> Result<Vec<String>> {
            Ok(vec!["id".to_string()])
        }

        fn index_columns(&self, _table: &str) -> Result<Vec<IndexColumn>> {
            Ok(vec![IndexColumn {
                index_name: "person_company".into(),
                unique: false,
                ordinal: 1,
                column: "company_id".into(),
            }])
        }

        fn columns(&self, _table: &str) -> Result<Vec<ColumnDescriptor>> {
            Ok(self
                .columns
                .iter()
                .map(|(name, type_name)| ColumnDescriptor {
                    name: name.to_string(),
                    type_code: None,
                    type_name: type_name.to_string(),
                    size: 10,
                    nullable: *name != "id",
                    autoincrement: *name == "id",
                })
                .collect())
        }
    }

    fn person_catalog(extra: Option<(&'static str, &'static str)>) -> Catalog {
        let mut columns = vec![
            ("company_id", "INTEGER"),
            ("name", "VARCHAR"),
            ("id", "INTEGER"),
        ];
        columns.extend(extra);
        Catalog {
            tables: vec!["company", "person", "history_annotation"],
            columns,
        }
    }

    #[test]
    fn builds_binding_in_constructor_order() {
        let config = MappingConfig::default();
        let registry = ConverterRegistry::new();
        let binding: TableBinding<Person> = SchemaMapper::new(&config, &registry)
            .build(&person_catalog(None))
            .unwrap();

        assert_eq!(binding.table(), "person");
        assert_eq!(binding.column_list(), "id, name, company_id");
        assert!(binding.has_autoincrement_key());
        assert_eq!(binding.column_named("id").map(|c| c.key), Some(KeyRole::Primary));
        assert_eq!(binding.column_named("company_id").map(|c| c.key), Some(KeyRole::Multiple));
        assert_eq!(binding.column_named("name").map(|c| c.db_type), Some(DbType::Varchar));
    }

    #[test]
    fn lenient_policy_drops_reused_columns() {
        let config = MappingConfig::default();
        let registry = ConverterRegistry::new();
        let binding: TableBinding<Person> = SchemaMapper::new(&config, &registry)
            .build(&person_catalog(Some(("names", "VARCHAR"))))
            .unwrap();
        assert_eq!(binding.columns().len(), 3);
        assert!(binding.column_named("names").is_none());
    }

    #[test]
    fn strict_policy_rejects_reused_columns() {
        let config = MappingConfig {
            alignment: AlignmentPolicy::Strict,
            ..MappingConfig::default()
        };
        let registry = ConverterRegistry::new();
        let err = SchemaMapper::new(&config, &registry)
            .build::<Person>(&person_catalog(Some(("names", "VARCHAR"))))
            .unwrap_err();
        assert!(err.is_mapping());
        assert!(err.to_string().contains("already used"));
    }

    #[test]
    fn distance_cap_marks_columns_unmatched() {
        let config = MappingConfig {
            alignment: AlignmentPolicy::Strict,
            max_match_distance: Some(2),
            ..MappingConfig::default()
        };
        let registry = ConverterRegistry::new();
        let err = SchemaMapper::new(&config, &registry)
            .build::<Person>(&person_catalog(Some(("created_at_utc", "TIMESTAMP"))))
            .unwrap_err();
        assert!(err.to_string().contains("unmatched"));
    }

    #[test]
    fn missing_column_leaves_no_matching_constructor() {
        let config = MappingConfig::default();
        let registry = ConverterRegistry::new();
        let catalog = Catalog {
            tables: vec!["person"],
            columns: vec![("id", "INTEGER"), ("name", "VARCHAR")],
        };
        let err = SchemaMapper::new(&config, &registry).build::<Person>(&catalog).unwrap_err();
        assert!(err.is_mapping());
        assert!(err.to_string().contains("2 parameters"));
    }

    #[test]
    fn incompatible_column_type_is_a_type_error() {
        let config = MappingConfig::default();
        let registry = ConverterRegistry::new();
        let catalog = Catalog {
            tables: vec!["person"],
            columns: vec![("id", "INTEGER"), ("name", "DATE"), ("company_id", "INTEGER")],
        };
        let err = SchemaMapper::new(&config, &registry).build::<Person>(&catalog).unwrap_err();
        assert!(err.is_type());
    }

    #[test]
    fn no_visible_table_is_a_mapping_error() {
        let config = MappingConfig::default();
        let registry = ConverterRegistry::new();
        let catalog = Catalog {
            tables: vec![],
            columns: vec![],
        };
        assert!(SchemaMapper::new(&config, &registry)
            .build::<Person>(&catalog)
            .unwrap_err()
            .is_mapping());
    }

    #[test]
    fn row_values_rebuild_the_record() {
        let binding: TableBinding<Person> = SchemaMapper::new(&MappingConfig::default(), &ConverterRegistry::new())
            .build(&person_catalog(None))
            .unwrap();

        struct Row;
        impl crate::executor::ResultRow for Row {
            fn get(&self, column: &str, _db_type: DbType) -> Result<Value> {
                Ok(match column {
                    "id" => Value::Int(1),
                    "name" => Value::Text("Ada".into()),
                    _ => Value::Int(3),
                })
            }
        }

        assert_eq!(
            binding.materialize(&Row).unwrap(),
            Person {
                id: 1,
                name: "Ada".into(),
                company_id: 3
            }
        );
    }
}
