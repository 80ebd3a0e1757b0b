//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository, form or service error
//! types, so the conversions live here.

use crate::domain::ticket::InventoryError;
use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::repository::RepositoryError;
use crate::services::ServiceError;
use crate::store::StoreError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        ServiceError::Form(val)
    }
}

impl From<InventoryError> for ServiceError {
    fn from(val: InventoryError) -> Self {
        ServiceError::Conflict(val.to_string())
    }
}

impl From<InventoryError> for StoreError {
    fn from(val: InventoryError) -> Self {
        StoreError::Rejected(val.to_string())
    }
}
