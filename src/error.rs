//! Error types for daokit.

use thiserror::Error;

/// The main error type for daokit operations.
#[derive(Debug, Error)]
pub enum DaoError {
    /// The driver failed while running a statement.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A lookup by primary key matched no row.
    #[error("No row matched the primary key")]
    NotFound,

    /// The DAO names a column the row type cannot provide a value for.
    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// The DAO has no columns to assign in an UPDATE.
    #[error("No columns to update on table '{table}'")]
    EmptyUpdate { table: String },

    /// The session's transaction was already committed or rolled back.
    #[error("Transaction already committed or rolled back")]
    TransactionClosed,

    /// Failed to parse a primary key or column spec.
    #[error("Invalid spec at position {position}: {message}")]
    InvalidSpec { position: usize, message: String },

    /// SQL type with no Rust mapping.
    #[error("Unsupported type: '{0}'")]
    UnsupportedType(String),

    /// A required generator input was not given.
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// Generator inputs are inconsistent with each other.
    #[error("Generate error: {0}")]
    Generate(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DaoError {
    /// Create a spec parse error at the given position.
    pub fn spec(position: usize, message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            position,
            message: message.into(),
        }
    }

    /// Create an unknown column error.
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Map `RowNotFound` to [`DaoError::NotFound`], keep everything else.
    pub(crate) fn from_fetch(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Database(other),
        }
    }
}

/// Result type alias for daokit operations.
pub type DaoResult<T> = Result<T, DaoError>;
