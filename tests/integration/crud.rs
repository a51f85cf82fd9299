use crate::common::{
    acme, login, measurement, orm, person, Company, CompanyType, HistoryAnnotation, Measurement, Order, Person,
    Ticket,
};
use chrono::NaiveTime;

#[test]
fn test_insert_returns_sequential_generated_keys() {
    let orm = orm();
    let first = orm.insert(&person("John", "john.doe@x.com", 1)).unwrap();
    let second = orm.insert(&person("Jane", "jane.doe@x.com", 1)).unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 2);
}

#[test]
fn test_insert_then_find_round_trips_person() {
    let orm = orm();
    let inserted = person("John", "john.doe@x.com", 3);
    let id = orm.insert(&inserted).unwrap();

    let found: Person = orm.find(id).unwrap().unwrap();
    assert_eq!(found, Person { id: id as i32, ..inserted });
}

#[test]
fn test_insert_then_find_round_trips_every_company_column() {
    let orm = orm();
    let mut company = acme();
    company.is_evil = Some(false);
    company.company_type = CompanyType::Public;
    let id = orm.insert(&company).unwrap();

    let found: Company = orm.find(id).unwrap().unwrap();
    assert_eq!(found, Company { id: id as i32, ..company });

    let nulls = orm.insert(&acme()).unwrap();
    let found: Company = orm.find(nulls).unwrap().unwrap();
    assert_eq!(found.is_evil, None);
    assert_eq!(found.company_type, CompanyType::Private);
}

#[test]
fn test_save_inserts_new_and_updates_existing() {
    let orm = orm();
    let id = orm.save(&person("John", "john.doe@x.com", 1)).unwrap();
    assert!(id > 0);

    let mut john: Person = orm.find(id).unwrap().unwrap();
    john.name = "Johnny".to_string();
    john.last_login = Some(login(2, 18));
    assert_eq!(orm.save(&john).unwrap(), id);

    let all: Vec<Person> = orm.find_all().unwrap();
    assert_eq!(all, vec![john]);
}

#[test]
fn test_update_reports_rows_changed() {
    let orm = orm();
    let id = orm.insert(&person("John", "john.doe@x.com", 1)).unwrap();
    let mut john: Person = orm.find(id).unwrap().unwrap();
    john.email = "john@elsewhere.org".to_string();
    john.last_login = None;

    assert_eq!(orm.update(&john).unwrap(), 1);
    assert_eq!(orm.find::<Person>(id).unwrap(), Some(john));
}

#[test]
fn test_force_insert_keeps_the_given_key() {
    let orm = orm();
    let mut explicit = person("Fixed", "fixed@x.com", 1);
    explicit.id = 42;
    assert_eq!(orm.force_insert(&explicit).unwrap(), 42);
    assert_eq!(orm.find::<Person>(42).unwrap(), Some(explicit));
}

#[test]
fn test_delete_removes_exactly_one_row() {
    let orm = orm();
    let id = orm.insert(&person("John", "john.doe@x.com", 1)).unwrap();

    assert!(orm.delete::<Person>(id).unwrap());
    assert_eq!(orm.find::<Person>(id).unwrap(), None);
    assert!(!orm.delete::<Person>(id).unwrap());
}

#[test]
fn test_insert_all_writes_every_row_in_one_statement() {
    let orm = orm();
    let people = vec![
        person("Ann", "ann@x.com", 1),
        person("Ben", "ben@x.com", 2),
        person("Cid", "cid@x.com", 2),
    ];
    assert_eq!(orm.insert_all(&people).unwrap(), 3);
    assert_eq!(orm.insert_all::<Person>(&[]).unwrap(), 0);

    let mut names: Vec<String> = orm.find_all::<Person>().unwrap().into_iter().map(|p| p.name).collect();
    names.sort();
    assert_eq!(names, vec!["Ann", "Ben", "Cid"]);
}

#[test]
fn test_find_related_follows_the_foreign_key_column() {
    let orm = orm();
    let company_id = orm.insert(&acme()).unwrap();
    orm.insert_all(&[
        person("Ann", "ann@x.com", company_id as i32),
        person("Ben", "ben@x.com", company_id as i32 + 1),
        person("Cid", "cid@x.com", company_id as i32),
    ])
    .unwrap();

    let acme: Company = orm.find(company_id).unwrap().unwrap();
    let mut staff: Vec<String> = orm
        .find_related::<Person, Company>(&acme)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    staff.sort();
    assert_eq!(staff, vec!["Ann", "Cid"]);

    // No `person_id` or `id_person` column on company.
    let ann: Person = orm.find(1).unwrap().unwrap();
    assert!(orm.find_related::<Company, Person>(&ann).unwrap().is_empty());
}

#[test]
fn test_keyless_table_inserts_but_refuses_keyed_operations() {
    let orm = orm();
    let note = HistoryAnnotation {
        subject: "audit".to_string(),
        amount: 12.25,
        annotation_time: NaiveTime::from_hms_opt(13, 5, 0).unwrap(),
        content: "checked".to_string(),
    };
    assert_eq!(orm.save(&note).unwrap(), 0);
    assert_eq!(orm.find_all::<HistoryAnnotation>().unwrap(), vec![note.clone()]);

    assert!(orm.update(&note).unwrap_err().is_mapping());
    assert!(orm.find::<HistoryAnnotation>(1).unwrap_err().is_mapping());
    assert!(orm.delete::<HistoryAnnotation>(1).unwrap_err().is_mapping());
}

#[test]
fn test_save_keeps_row_when_indexed_key_column_changes() {
    let orm = orm();
    let id = orm.save(&person("John", "john.doe@x.com", 1)).unwrap();
    let mut john: Person = orm.find(id).unwrap().unwrap();
    john.company_id = 2;

    // company_id is indexed, so it is part of the match and no row has 2.
    assert_eq!(orm.update(&john).unwrap(), 0);
    assert_eq!(orm.save(&john).unwrap(), id);
    assert_eq!(orm.find::<Person>(id).unwrap().unwrap().company_id, 1);
}

#[test]
fn test_keyword_table_and_column_names_are_quoted() {
    let orm = orm();
    let id = orm
        .insert(&Order {
            id: 0,
            group: "wholesale".to_string(),
        })
        .unwrap();
    orm.insert_all(&[Order {
        id: 0,
        group: "retail".to_string(),
    }])
    .unwrap();

    let mut order: Order = orm.find(id).unwrap().unwrap();
    assert_eq!(order.group, "wholesale");
    order.group = "export".to_string();
    assert_eq!(orm.update(&order).unwrap(), 1);

    let mut groups: Vec<String> = orm.find_all::<Order>().unwrap().into_iter().map(|o| o.group).collect();
    groups.sort();
    assert_eq!(groups, vec!["export", "retail"]);

    let found = orm.from::<Order>().unwrap().filter(Order::GROUP).like("tai").find().unwrap();
    assert_eq!(found.len(), 1);
    assert!(orm.delete::<Order>(id).unwrap());
}

#[test]
fn test_generated_key_comes_from_the_key_column() {
    let orm = orm();
    let ticket = Ticket {
        id: 42,
        title: "first".to_string(),
    };
    assert_eq!(orm.force_insert(&ticket).unwrap(), 42);
    assert_eq!(orm.find::<Ticket>(42).unwrap(), Some(ticket));

    let wide = Ticket {
        id: i64::from(i32::MAX) + 7,
        title: "wide".to_string(),
    };
    assert_eq!(orm.save(&wide).unwrap(), wide.id);
    assert_eq!(orm.find::<Ticket>(wide.id).unwrap(), Some(wide));
}

#[test]
fn test_every_column_type_round_trips() {
    let orm = orm();
    let original = measurement();
    let id = orm.insert(&original).unwrap();
    assert_eq!(id, 1);

    let found: Measurement = orm.find(id).unwrap().unwrap();
    assert_eq!(
        found,
        Measurement {
            id,
            ledger: found.ledger,
            ..original.clone()
        }
    );
    assert_eq!(found.price, original.price);
}

#[test]
fn test_sqlite_keeps_fifteen_significant_decimal_digits() {
    let orm = orm();
    let original = measurement();
    let id = orm.insert(&original).unwrap();

    let found: Measurement = orm.find(id).unwrap().unwrap();
    assert_ne!(found.ledger, original.ledger);
    assert_eq!(found.ledger.round_sf(15), original.ledger.round_sf(15));
}
