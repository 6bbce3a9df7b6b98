//! # Database Errors
//!
//! ```text
//! sqlx::Error ─────────┐
//! CoreError (rules) ───┼──► DbError ──► ServiceError (server) ──► ApiError
//! MigrateError ────────┘
//! ```
//!
//! An error from a transactional method means the transaction rolled back
//! and nothing was written.

use sqlx::error::ErrorKind;
use taproom_core::{CoreError, OrderStatus, ValidationError};
use thiserror::Error;

/// SQLite's primary `SQLITE_BUSY` result code. Extended codes share the low byte.
const SQLITE_BUSY: i64 = 5;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `target` is the `table.column` SQLite reports.
    #[error("Duplicate value for {target}")]
    UniqueViolation { target: String },

    /// Typically an ingredient pointing at an unknown product.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A rule checked inside the transaction rejected the input.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Status move rejected against the status read inside the transaction,
    /// or lost to a concurrent writer.
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// SQLite stayed locked past the busy timeout.
    #[error("Database busy: {0}")]
    Busy(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// ```text
/// RowNotFound                  → NotFound
/// Database (unique)            → UniqueViolation
/// Database (foreign key)       → ForeignKeyViolation
/// Database (SQLITE_BUSY)       → Busy
/// PoolTimedOut                 → PoolExhausted
/// PoolClosed                   → ConnectionFailed
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        target: message
                            .rsplit(": ")
                            .next()
                            .unwrap_or_default()
                            .to_string(),
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation(message),
                    _ if is_busy(db_err.code().as_deref()) => DbError::Busy(message),
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

fn is_busy(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i64>().ok())
        .is_some_and(|c| c & 0xff == SQLITE_BUSY)
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTransition { from, to } => DbError::InvalidTransition { from, to },
            CoreError::NotFound { entity, id } => DbError::NotFound { entity, id },
            CoreError::Validation(e) => DbError::Validation(e),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
