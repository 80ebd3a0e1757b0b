use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Failures reported by the Gateway.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("connection pool error: {0}")]
    Connection(#[from] PoolError),
    #[error("database error: {0}")]
    Database(DieselError),
    #[error("record not found")]
    NotFound,
    /// A write was refused because of the state of related records.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A persisted row could not be turned into a domain record.
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl From<DieselError> for RepositoryError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation,
                info,
            ) => Self::Conflict(info.message().to_string()),
            other => Self::Database(other),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
