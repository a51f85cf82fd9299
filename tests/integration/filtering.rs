use crate::common::{orm, person, Person};
use rowbind::{JoinOperator, Rowbind, SqliteProvider};

fn seeded() -> Rowbind<SqliteProvider> {
    let orm = orm();
    orm.insert_all(&[
        person("Harry", "harry@hogwarts.uk", 1),
        person("Harriet", "harriet@x.com", 2),
        person("John", "john.doe@x.com", 2),
        person("Ron", "ron@hogwarts.uk", 3),
        person("Mary", "mjohnson@x.com", 3),
    ])
    .unwrap();
    orm
}

fn names(mut people: Vec<Person>) -> Vec<String> {
    people.sort_by_key(|p| p.id);
    people.into_iter().map(|p| p.name).collect()
}

#[test]
fn test_find_by_example_or_joins_non_empty_fields() {
    let orm = seeded();
    let example = Person {
        id: 0,
        name: "Harry".to_string(),
        email: "john".to_string(),
        last_login: None,
        company_id: 0,
    };
    let found = orm.find_by_example(&example).unwrap();
    assert_eq!(names(found), vec!["Harry", "John", "Mary"]);
}

#[test]
fn test_find_by_example_filters_on_positive_ids() {
    let orm = seeded();
    let example = Person {
        id: 0,
        name: String::new(),
        email: String::new(),
        last_login: None,
        company_id: 3,
    };
    assert_eq!(names(orm.find_by_example(&example).unwrap()), vec!["Ron", "Mary"]);
}

#[test]
fn test_empty_example_matches_everything() {
    let orm = seeded();
    let example = Person {
        id: 0,
        name: String::new(),
        email: String::new(),
        last_login: None,
        company_id: 0,
    };
    assert_eq!(orm.find_by_example(&example).unwrap().len(), 5);
}

#[test]
fn test_find_matching_unions_every_example() {
    let orm = seeded();
    let examples = [person("Ron", "", 0), person("", "harriet", 0)];
    let examples: Vec<Person> = examples
        .into_iter()
        .map(|p| Person { last_login: None, ..p })
        .collect();
    assert_eq!(names(orm.find_matching(&examples).unwrap()), vec!["Harriet", "Ron"]);
}

#[test]
fn test_dsl_like_or_equal_to() {
    let orm = seeded();
    let found = orm
        .from::<Person>()
        .unwrap()
        .filter(Person::NAME)
        .like("Harr")
        .or(Person::EMAIL)
        .equal_to("ron@hogwarts.uk".to_string())
        .find()
        .unwrap();
    assert_eq!(names(found), vec!["Harry", "Harriet", "Ron"]);
}

#[test]
fn test_dsl_and_narrows_with_integer_comparisons() {
    let orm = seeded();
    let found = orm
        .from::<Person>()
        .unwrap()
        .filter(Person::COMPANY_ID)
        .greater_than(1)
        .and(Person::ID)
        .less_than(5)
        .and(Person::NAME)
        .not_equal_to("John".to_string())
        .find()
        .unwrap();
    assert_eq!(names(found), vec!["Harriet", "Ron"]);
}

#[test]
fn test_dsl_records_terms_in_append_order() {
    let orm = seeded();
    let select = orm
        .from::<Person>()
        .unwrap()
        .filter(Person::NAME)
        .like("a")
        .or(Person::COMPANY_ID)
        .equal_to(2);
    let terms = select.terms();
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0].column, "name");
    assert_eq!(terms[0].join, JoinOperator::None);
    assert_eq!(terms[1].column, "company_id");
    assert_eq!(terms[1].join, JoinOperator::Or);
}

#[test]
fn test_dsl_without_terms_equals_find_all() {
    let orm = seeded();
    let everything = orm.from::<Person>().unwrap().find().unwrap();
    assert_eq!(names(everything), names(orm.find_all().unwrap()));
}

#[test]
fn test_like_matches_substrings_only() {
    let orm = seeded();
    let found = orm.from::<Person>().unwrap().filter(Person::EMAIL).like("hogwarts").find().unwrap();
    assert_eq!(names(found), vec!["Harry", "Ron"]);
}

#[test]
fn test_dsl_second_filter_joins_with_and() {
    let orm = seeded();
    let select = orm
        .from::<Person>()
        .unwrap()
        .filter(Person::NAME)
        .like("Harr")
        .filter(Person::COMPANY_ID)
        .equal_to(2);
    assert_eq!(select.terms()[0].join, JoinOperator::None);
    assert_eq!(select.terms()[1].join, JoinOperator::And);
    assert_eq!(names(select.find().unwrap()), vec!["Harriet"]);
}
