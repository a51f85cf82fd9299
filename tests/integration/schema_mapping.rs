use crate::common::{orm, orm_with, Company, HistoryAnnotation, Person};
use chrono::NaiveDateTime;
use rowbind::{AlignmentPolicy, DbType, HostKind, KeyRole, MappingConfig, Record};
use std::sync::Arc;

#[derive(Debug, Clone, Record)]
#[rowbind(name = "Person")]
#[allow(non_snake_case)]
pub struct CamelPerson {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub lastLogin: Option<NaiveDateTime>,
    pub companyId: i32,
}

#[derive(Debug, Clone, Record)]
#[rowbind(name = "Person")]
pub struct PersonName {
    pub id: i32,
    pub name: String,
}

#[test]
fn test_person_binds_every_column_in_constructor_order() {
    let binding = orm().binding::<Person>().unwrap();
    assert_eq!(binding.table(), "person");
    assert_eq!(binding.column_list(), "id, name, email, last_login, company_id");
    assert_eq!(
        binding.select_all(),
        r#"SELECT "id", "name", "email", "last_login", "company_id" FROM "person""#
    );

    let id = binding.column_named("id").unwrap();
    assert!(id.primary_key);
    assert!(id.autoincrement);
    assert_eq!(id.key, KeyRole::Primary);
    assert!(binding.has_autoincrement_key());

    let company_id = binding.column_named("company_id").unwrap();
    assert_eq!(company_id.key, KeyRole::Multiple);
    // SQLite integers are 64-bit.
    assert_eq!(company_id.db_type, DbType::BigInt);
    assert_eq!(id.db_type, DbType::BigInt);

    assert_eq!(binding.column_named("last_login").unwrap().db_type, DbType::Timestamp);
}

#[test]
fn test_camel_case_members_match_snake_case_columns() {
    let binding = orm().binding::<CamelPerson>().unwrap();
    assert_eq!(binding.column_named("company_id").unwrap().member, "companyId");
    assert_eq!(binding.column_named("last_login").unwrap().member, "lastLogin");
    assert_eq!(binding.columns().len(), 5);
}

#[test]
fn test_company_columns_resolve_types_and_converters() {
    let binding = orm().binding::<Company>().unwrap();
    let by_name = |name: &str| binding.column_named(name).unwrap();

    assert_eq!(by_name("country_code").db_type, DbType::Char);
    assert_eq!(by_name("date").db_type, DbType::Date);
    assert_eq!(by_name("debt").db_type, DbType::Real);
    assert_eq!(by_name("is_active").db_type, DbType::Boolean);
    assert_eq!(by_name("company_type").db_type, DbType::Varchar);
    assert!(matches!(by_name("company_type").member_kind, HostKind::Enum(_)));
    assert!(by_name("is_evil").nullable);
    assert!(!by_name("name").nullable);
}

#[test]
fn test_table_without_primary_key_has_no_key_columns() {
    let binding = orm().binding::<HistoryAnnotation>().unwrap();
    assert_eq!(binding.table(), "history_annotation");
    assert_eq!(binding.key_columns().count(), 0);
    assert!(!binding.has_autoincrement_key());
    assert!(binding.id_column().is_none());
}

#[test]
fn test_surplus_columns_are_dropped_when_lenient() {
    let binding = orm().binding::<PersonName>().unwrap();
    assert_eq!(binding.column_list(), "id, name");
}

#[test]
fn test_surplus_columns_are_fatal_when_strict() {
    let strict = MappingConfig {
        alignment: AlignmentPolicy::Strict,
        ..MappingConfig::default()
    };
    let err = orm_with(strict).binding::<PersonName>().unwrap_err();
    assert!(err.is_mapping(), "{err}");
}

#[test]
fn test_bindings_are_built_once_per_instance() {
    let orm = orm();
    let first = orm.binding::<Person>().unwrap();
    let second = orm.binding::<Person>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}
