//! Schema introspection capability consumed by the mapper.

use crate::error::{Result, RowbindError};
use crate::types::DbType;

/// A column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_code: Option<i32>,
    pub type_name: String,
    pub size: u32,
    pub nullable: bool,
    pub autoincrement: bool,
}

impl ColumnDescriptor {
    /// Resolve the column's canonical type, preferring the numeric code.
    pub fn db_type(&self) -> Result<DbType> {
        match self.type_code {
            Some(code) => DbType::from_code(code).or_else(|_| DbType::from_type_name(&self.type_name)),
            None => DbType::from_type_name(&self.type_name),
        }
    }
}

/// One column participating in an index, at its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    pub index_name: String,
    pub unique: bool,
    pub ordinal: u32,
    pub column: String,
}

pub trait SchemaIntrospector {
    /// Visible table and view names, in a deterministic order.
    fn table_names(&self) -> Result<Vec<String>>;

    fn primary_key_columns(&self, table: &str) -> Result<Vec<String>>;

    fn index_columns(&self, table: &str) -> Result<Vec<IndexColumn>>;

    /// Columns in declaration order.
    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;
}

/// Parse a catalog `YES`/`NO` flag. Blank reads as `false`.
pub fn yes_no_to_bool(flag: &str) -> Result<bool> {
    let trimmed = flag.trim();
    if trimmed.is_empty() {
        return Ok(false);
    }
    if trimmed.eq_ignore_ascii_case("yes") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("no") {
        Ok(false)
    } else {
        Err(RowbindError::mapping(format!(
            "unexpected value `{flag}` for a YES/NO catalog flag"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_flags() {
        assert!(yes_no_to_bool("YES").unwrap());
        assert!(!yes_no_to_bool("NO").unwrap());
        assert!(!yes_no_to_bool("").unwrap());
        assert!(yes_no_to_bool("maybe").unwrap_err().is_mapping());
    }

    #[test]
    fn db_type_falls_back_to_name() {
        let column = ColumnDescriptor {
            name: "status".into(),
            type_code: Some(1111),
            type_name: "varchar".into(),
            size: 20,
            nullable: true,
            autoincrement: false,
        };
        assert_eq!(column.db_type().unwrap(), DbType::Varchar);
    }
}
