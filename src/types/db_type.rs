//! Canonical SQL scalar types.
//!
//! Introspection reports a column type either as a numeric code (the
//! JDBC type-code numbering most catalog layers expose) or as a dialect
//! type name. Both resolve to a [`DbType`], which in turn fixes the
//! canonical [`HostKind`] a column's values take on the host side.

use crate::error::{Result, RowbindError};
use crate::value::HostKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbType {
    TinyInt,
    Boolean,
    Bit,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Decimal,
    Char,
    Varchar,
    Text,
    Date,
    Time,
    Timestamp,
}

impl DbType {
    pub const ALL: [DbType; 16] = [
        DbType::TinyInt,
        DbType::Boolean,
        DbType::Bit,
        DbType::SmallInt,
        DbType::Integer,
        DbType::BigInt,
        DbType::Float,
        DbType::Real,
        DbType::Double,
        DbType::Decimal,
        DbType::Char,
        DbType::Varchar,
        DbType::Text,
        DbType::Date,
        DbType::Time,
        DbType::Timestamp,
    ];

    /// Wire type code.
    pub fn sql_code(self) -> i32 {
        match self {
            DbType::TinyInt => -6,
            DbType::Boolean => 16,
            DbType::Bit => -7,
            DbType::SmallInt => 5,
            DbType::Integer => 4,
            DbType::BigInt => -5,
            DbType::Float => 6,
            DbType::Real => 7,
            DbType::Double => 8,
            DbType::Decimal => 3,
            DbType::Char => 1,
            DbType::Varchar => 12,
            DbType::Text => -1,
            DbType::Date => 91,
            DbType::Time => 92,
            DbType::Timestamp => 93,
        }
    }

    /// Host kind that values of this column type take after extraction.
    pub fn host_kind(self) -> HostKind {
        match self {
            // MySQL has no real boolean: bool is tinyint(1). PostgreSQL may report bit.
            DbType::TinyInt | DbType::Boolean | DbType::Bit => HostKind::Bool,
            DbType::SmallInt | DbType::Integer => HostKind::Int,
            DbType::BigInt => HostKind::BigInt,
            DbType::Float | DbType::Real => HostKind::Float,
            DbType::Double => HostKind::Double,
            DbType::Decimal => HostKind::Decimal,
            DbType::Char | DbType::Varchar | DbType::Text => HostKind::Text,
            DbType::Date => HostKind::Date,
            DbType::Time => HostKind::Time,
            DbType::Timestamp => HostKind::DateTime,
        }
    }

    pub fn is_boolean_like(self) -> bool {
        matches!(self, DbType::TinyInt | DbType::Boolean | DbType::Bit)
    }

    pub fn is_integer(self) -> bool {
        matches!(self, DbType::SmallInt | DbType::Integer | DbType::BigInt)
    }

    pub fn is_text(self) -> bool {
        matches!(self, DbType::Char | DbType::Varchar | DbType::Text)
    }

    /// Resolve a wire type code.
    pub fn from_code(code: i32) -> Result<DbType> {
        let db_type = match code {
            -6 => DbType::TinyInt,
            16 => DbType::Boolean,
            -7 => DbType::Bit,
            5 => DbType::SmallInt,
            4 => DbType::Integer,
            -5 => DbType::BigInt,
            6 => DbType::Float,
            7 => DbType::Real,
            8 => DbType::Double,
            // NUMERIC shares the DECIMAL representation
            2 | 3 => DbType::Decimal,
            1 | -15 => DbType::Char,
            12 | -9 => DbType::Varchar,
            -1 | -16 | 2005 => DbType::Text,
            91 => DbType::Date,
            92 | 2013 => DbType::Time,
            93 | 2014 => DbType::Timestamp,
            _ => {
                return Err(RowbindError::type_error(format!(
                    "there is no DbType for sql type code {code}"
                )))
            }
        };
        Ok(db_type)
    }

    /// Resolve a dialect type name such as `int4`, `character varying` or
    /// `VARCHAR(255)`.
    pub fn from_type_name(name: &str) -> Result<DbType> {
        let normalized = normalize_type_name(name);
        let db_type = match normalized.as_str() {
            "tinyint" => DbType::TinyInt,
            "bool" | "boolean" => DbType::Boolean,
            "bit" => DbType::Bit,
            "smallint" | "int2" | "smallserial" => DbType::SmallInt,
            "int" | "integer" | "int4" | "mediumint" | "serial" => DbType::Integer,
            "bigint" | "int8" | "bigserial" => DbType::BigInt,
            "float" | "float4" => DbType::Float,
            "real" => DbType::Real,
            "double" | "double precision" | "float8" => DbType::Double,
            "decimal" | "numeric" => DbType::Decimal,
            "char" | "character" | "bpchar" | "nchar" => DbType::Char,
            "varchar" | "character varying" | "nvarchar" | "varchar2" | "tinytext" | "enum" => {
                DbType::Varchar
            }
            "text" | "mediumtext" | "longtext" | "clob" => DbType::Text,
            "date" => DbType::Date,
            "time" | "time without time zone" => DbType::Time,
            "timestamp"
            | "datetime"
            | "timestamp without time zone"
            | "timestamp with time zone"
            | "timestamptz" => DbType::Timestamp,
            _ => {
                return Err(RowbindError::type_error(format!(
                    "there is no DbType for sql type name `{name}`"
                )))
            }
        };
        Ok(db_type)
    }

    /// Width in digits above which an integer column admits 64-bit values.
    pub(crate) const LONG_WIDTH: u32 = 19;
}

/// Lowercase, drop any `(…)` length/precision suffix and `unsigned`
/// modifiers, collapse inner whitespace.
fn normalize_type_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut without_args = String::with_capacity(lowered.len());
    let mut depth = 0usize;
    for c in lowered.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => without_args.push(c),
            _ => {}
        }
    }
    without_args
        .split_whitespace()
        .filter(|word| *word != "unsigned" && *word != "zerofill")
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DbType::TinyInt => "TINYINT",
            DbType::Boolean => "BOOLEAN",
            DbType::Bit => "BIT",
            DbType::SmallInt => "SMALLINT",
            DbType::Integer => "INTEGER",
            DbType::BigInt => "BIGINT",
            DbType::Float => "FLOAT",
            DbType::Real => "REAL",
            DbType::Double => "DOUBLE",
            DbType::Decimal => "DECIMAL",
            DbType::Char => "CHAR",
            DbType::Varchar => "VARCHAR",
            DbType::Text => "TEXT",
            DbType::Date => "DATE",
            DbType::Time => "TIME",
            DbType::Timestamp => "TIMESTAMP",
        };
        f.write_str(name)
    }
}
