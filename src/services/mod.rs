//! Business operations behind the HTTP routes.
//!
//! Services check the caller's permission, validate the submitted form,
//! then drive the Gateway through an [`crate::store::EntityStore`].
//! Gateway failures are logged here and mapped to [`ServiceError`].

use crate::domain::access::{Group, User};
use crate::domain::auth::{AuthenticatedUser, check_role};
use crate::domain::company::Company;
use crate::domain::contract::Contract;
use crate::domain::finance::{Closing, FinancialRecord};
use crate::domain::party::Party;
use crate::domain::project::Project;
use crate::domain::record::Record;
use crate::domain::ticket::{TicketSale, TicketType};
use crate::domain::venue::Venue;
use crate::repository::RepositoryError;
use crate::store::StoreError;

pub mod access;
pub mod errors;
pub mod export;
pub mod finance;
pub mod records;
pub mod tickets;

pub use errors::{ServiceError, ServiceResult};

pub const REGISTRY_PERMISSION: &str = "registry";
pub const PROJECTS_PERMISSION: &str = "projects";
pub const CONTRACTS_PERMISSION: &str = "contracts";
pub const TICKETS_PERMISSION: &str = "tickets";
pub const FINANCE_PERMISSION: &str = "finance";
pub const ADMIN_PERMISSION: &str = "admin";

/// Record families guarded by a permission code.
pub trait AccessControlled: Record {
    const PERMISSION: &'static str;
}

impl AccessControlled for Company {
    const PERMISSION: &'static str = REGISTRY_PERMISSION;
}

impl AccessControlled for Venue {
    const PERMISSION: &'static str = REGISTRY_PERMISSION;
}

impl AccessControlled for Party {
    const PERMISSION: &'static str = REGISTRY_PERMISSION;
}

impl AccessControlled for Project {
    const PERMISSION: &'static str = PROJECTS_PERMISSION;
}

impl AccessControlled for Contract {
    const PERMISSION: &'static str = CONTRACTS_PERMISSION;
}

impl AccessControlled for TicketType {
    const PERMISSION: &'static str = TICKETS_PERMISSION;
}

impl AccessControlled for TicketSale {
    const PERMISSION: &'static str = TICKETS_PERMISSION;
}

impl AccessControlled for FinancialRecord {
    const PERMISSION: &'static str = FINANCE_PERMISSION;
}

impl AccessControlled for Closing {
    const PERMISSION: &'static str = FINANCE_PERMISSION;
}

impl AccessControlled for User {
    const PERMISSION: &'static str = ADMIN_PERMISSION;
}

impl AccessControlled for Group {
    const PERMISSION: &'static str = ADMIN_PERMISSION;
}

pub(crate) fn authorize(user: &AuthenticatedUser, permission: &str) -> ServiceResult<()> {
    if check_role(permission, &user.roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Maps a Gateway failure, logging the unexpected ones.
pub(crate) fn repository_failure(action: &str, entity: &str, err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::NotFound,
        RepositoryError::Conflict(message) => {
            log::warn!("Refused to {action} {entity}: {message}");
            ServiceError::Conflict(message)
        }
        other => {
            log::error!("Failed to {action} {entity}: {other}");
            ServiceError::Internal
        }
    }
}

pub(crate) fn store_failure(action: &str, entity: &str, err: StoreError) -> ServiceError {
    match err {
        StoreError::Gateway(err) => repository_failure(action, entity, err),
        StoreError::Rejected(message) => ServiceError::Conflict(message),
        StoreError::NotFound => ServiceError::NotFound,
    }
}
