//! Shared fixtures: record types and the schema they bind to.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rowbind::{MappingConfig, Record, RecordEnum, Rowbind, SqliteProvider};
use rust_decimal::Decimal;

pub const SCHEMA: &str = r#"
    CREATE TABLE company (
        id INTEGER PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        country_code CHAR(2),
        date DATE,
        debt REAL,
        is_active BOOLEAN,
        company_type VARCHAR(20),
        is_evil BOOLEAN
    );
    CREATE TABLE person (
        id INTEGER PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100),
        last_login TIMESTAMP,
        company_id INTEGER
    );
    CREATE INDEX person_company_idx ON person(company_id);
    CREATE TABLE history_annotation (
        subject VARCHAR(50),
        amount FLOAT,
        annotation_time TIME,
        content TEXT
    );
    CREATE TABLE "order" (
        id INTEGER PRIMARY KEY,
        "group" VARCHAR(10)
    );
    CREATE TABLE ticket (
        id BIGINT PRIMARY KEY,
        title VARCHAR(40)
    );
    CREATE TABLE measurement (
        id INTEGER PRIMARY KEY,
        flag TINYINT,
        bit_flag BIT,
        small SMALLINT,
        count INTEGER,
        total BIGINT,
        ratio FLOAT,
        weight REAL,
        precise DOUBLE,
        price DECIMAL(12, 2),
        ledger DECIMAL(22, 2),
        grade CHAR(1),
        label VARCHAR(40),
        notes TEXT,
        taken_on DATE,
        taken_at TIME,
        recorded TIMESTAMP
    );
"#;

#[derive(Debug, Clone, Copy, PartialEq, RecordEnum)]
pub enum CompanyType {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Record)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub country_code: String,
    pub date: NaiveDate,
    pub debt: f32,
    pub is_active: bool,
    pub company_type: CompanyType,
    pub is_evil: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Record)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub last_login: Option<NaiveDateTime>,
    pub company_id: i32,
}

#[derive(Debug, Clone, PartialEq, Record)]
pub struct HistoryAnnotation {
    pub subject: String,
    pub amount: f32,
    pub annotation_time: NaiveTime,
    pub content: String,
}

/// Table and column names that are SQL keywords.
#[derive(Debug, Clone, PartialEq, Record)]
pub struct Order {
    pub id: i64,
    pub group: String,
}

/// Keyed by a `BIGINT` primary key, which SQLite does not alias to the rowid.
#[derive(Debug, Clone, PartialEq, Record)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
}

/// One member per supported column type.
#[derive(Debug, Clone, PartialEq, Record)]
pub struct Measurement {
    pub id: i64,
    pub flag: bool,
    pub bit_flag: bool,
    pub small: i16,
    pub count: i32,
    pub total: i64,
    pub ratio: f32,
    pub weight: f32,
    pub precise: f64,
    pub price: Decimal,
    pub ledger: Decimal,
    pub grade: char,
    pub label: String,
    pub notes: String,
    pub taken_on: NaiveDate,
    pub taken_at: NaiveTime,
    pub recorded: NaiveDateTime,
}

pub fn provider() -> SqliteProvider {
    let provider = SqliteProvider::open_in_memory().unwrap();
    provider.execute_batch(SCHEMA).unwrap();
    provider
}

pub fn orm() -> Rowbind<SqliteProvider> {
    Rowbind::new(provider())
}

pub fn orm_with(mapping: MappingConfig) -> Rowbind<SqliteProvider> {
    Rowbind::with_mapping(provider(), mapping)
}

pub fn login(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, 30, 0)
        .unwrap()
}

pub fn person(name: &str, email: &str, company_id: i32) -> Person {
    Person {
        id: 0,
        name: name.to_string(),
        email: email.to_string(),
        last_login: Some(login(1, 9)),
        company_id,
    }
}

pub fn acme() -> Company {
    Company {
        id: 0,
        name: "Acme".to_string(),
        country_code: "US".to_string(),
        date: NaiveDate::from_ymd_opt(1999, 12, 31).unwrap(),
        debt: 1500.5,
        is_active: true,
        company_type: CompanyType::Private,
        is_evil: None,
    }
}

pub fn measurement() -> Measurement {
    Measurement {
        id: 0,
        flag: true,
        bit_flag: false,
        small: -12_345,
        count: 2_000_000_000,
        total: 9_000_000_000_000_000_001,
        ratio: 0.25,
        weight: 1500.5,
        precise: 6.02214076e23,
        price: Decimal::new(123_456, 2),
        ledger: Decimal::from_str_exact("1234567890123456789.01").unwrap(),
        grade: 'B',
        label: "north gauge".to_string(),
        notes: "multi\nline".to_string(),
        taken_on: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        taken_at: NaiveTime::from_hms_milli_opt(23, 59, 58, 250).unwrap(),
        recorded: login(4, 7),
    }
}
