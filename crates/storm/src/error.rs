//! Error types for storm

use crate::coerce::CoerceError;
use thiserror::Error;

/// Result type alias for storm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for mapping and database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error (open / ping)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error reported by the driver
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// The record type declares no primary-key field
    #[error("no primary key is found for record `{record}`")]
    MissingPrimaryKey { record: &'static str },

    /// The record type declares more than one primary-key field
    #[error("record `{record}` declares {count} primary keys, expected exactly one")]
    DuplicatePrimaryKey { record: &'static str, count: usize },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {source}")]
    Decode {
        column: String,
        #[source]
        source: CoerceError,
    },

    /// A field value could not be bound as a statement argument
    #[error("Encode error on column '{column}': {source}")]
    Encode {
        column: String,
        #[source]
        source: CoerceError,
    },

    /// Statement validation error (nothing was sent to the database)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, source: CoerceError) -> Self {
        Self::Decode {
            column: column.into(),
            source,
        }
    }

    /// Create an encode error for a specific column
    pub fn encode(column: impl Into<String>, source: CoerceError) -> Self {
        Self::Encode {
            column: column.into(),
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this error was raised before any SQL was issued
    pub fn is_statement_error(&self) -> bool {
        matches!(
            self,
            Self::MissingPrimaryKey { .. }
                | Self::DuplicatePrimaryKey { .. }
                | Self::Encode { .. }
                | Self::Validation(_)
        )
    }

    /// Check if this is a decode error
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
