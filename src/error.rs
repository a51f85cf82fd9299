//! Error taxonomy shared by every layer of the crate.
//!
//! Four kinds surface to callers of the binding and query operations:
//! mapping failures, type failures, statement failures (always carrying the
//! table they happened on) and accessor resolution failures. Backend errors
//! enter as [`RowbindError::Driver`] and the query engine re-wraps them with
//! table context before they leave the crate.

use std::error::Error as StdError;

/// Boxed error used for the original cause of a failure.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T, E = RowbindError> = std::result::Result<T, E>;

/// Errors raised while binding records to tables and executing statements.
#[derive(Debug, thiserror::Error)]
pub enum RowbindError {
    /// The record type cannot be aligned to its table.
    #[error("mapping error: {message}")]
    Mapping {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A value or SQL type has no usable representation.
    #[error("type error: {0}")]
    Type(String),

    /// A statement failed against the backing store.
    #[error("{operation} on table `{table}` failed: {source}")]
    QueryExecution {
        table: String,
        operation: String,
        #[source]
        source: BoxError,
    },

    /// An accessor could not be resolved to a column.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Raw backend error that has not been given table context yet.
    #[error("driver error: {0}")]
    Driver(#[source] BoxError),

    /// A connection could not be established or acquired.
    #[error("connection error: {0}")]
    Connection(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl RowbindError {
    pub fn mapping(message: impl Into<String>) -> Self {
        RowbindError::Mapping {
            message: message.into(),
            source: None,
        }
    }

    pub fn mapping_caused_by(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        RowbindError::Mapping {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        RowbindError::Type(message.into())
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        RowbindError::Resolution(message.into())
    }

    /// Attach table and operation context to a driver error.
    ///
    /// Errors of any other kind already describe what went wrong and pass
    /// through unchanged.
    pub fn in_table(self, table: &str, operation: &str) -> Self {
        match self {
            RowbindError::Driver(source) => RowbindError::QueryExecution {
                table: table.to_string(),
                operation: operation.to_string(),
                source,
            },
            other => other,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, RowbindError::Mapping { .. })
    }

    pub fn is_type(&self) -> bool {
        matches!(self, RowbindError::Type(_))
    }

    pub fn is_query_execution(&self) -> bool {
        matches!(self, RowbindError::QueryExecution { .. })
    }

    pub fn is_resolution(&self) -> bool {
        matches!(self, RowbindError::Resolution(_))
    }
}

impl From<may_postgres::Error> for RowbindError {
    fn from(err: may_postgres::Error) -> Self {
        RowbindError::Driver(Box::new(err))
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for RowbindError {
    fn from(err: rusqlite::Error) -> Self {
        RowbindError::Driver(Box::new(err))
    }
}
