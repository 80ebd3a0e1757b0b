use thiserror::Error;

use crate::forms::FormError;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    /// The user is not authorized to perform the operation.
    #[error("unauthorized")]
    Unauthorized,
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// Submitted form failed validation; carries field-level messages.
    #[error("{0}")]
    Form(FormError),
    /// A value loaded or submitted violated a domain constraint.
    #[error("invalid data: {0}")]
    TypeConstraint(String),
    /// A business rule refused the operation.
    #[error("{0}")]
    Conflict(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
