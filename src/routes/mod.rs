//! JSON API over the services.
//!
//! Handlers are thin: extract, call one service, map the result.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::domain::types::TypeConstraintError;
use crate::forms::FieldErrors;
use crate::services::{ServiceError, ServiceResult};

pub mod access;
pub mod auth;
pub mod finance;
pub mod main;
pub mod records;
pub mod tickets;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
}

/// Maps a service failure to its HTTP status with a JSON body.
pub fn error_response(err: ServiceError) -> HttpResponse {
    let message = err.to_string();
    match &err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().json(ErrorBody {
            error: &message,
            fields: None,
        }),
        ServiceError::NotFound => HttpResponse::NotFound().json(ErrorBody {
            error: &message,
            fields: None,
        }),
        ServiceError::Conflict(_) => HttpResponse::Conflict().json(ErrorBody {
            error: &message,
            fields: None,
        }),
        ServiceError::Form(form) => HttpResponse::UnprocessableEntity().json(ErrorBody {
            error: &message,
            fields: form.field_errors(),
        }),
        ServiceError::TypeConstraint(_) => HttpResponse::UnprocessableEntity().json(ErrorBody {
            error: &message,
            fields: None,
        }),
        ServiceError::Internal => HttpResponse::InternalServerError().json(ErrorBody {
            error: &message,
            fields: None,
        }),
    }
}

pub fn json_response<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(err) => error_response(err),
    }
}

pub fn created_response<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Created().json(value),
        Err(err) => error_response(err),
    }
}

/// Path ids that cannot name a record are reported as missing.
pub fn parse_id<I>(raw: i32) -> ServiceResult<I>
where
    I: TryFrom<i32, Error = TypeConstraintError>,
{
    I::try_from(raw).map_err(|_| ServiceError::NotFound)
}

/// Registers every `/api/v1` endpoint plus `/health`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(main::health).service(main::logout).service(
        web::scope("/api/v1")
            .configure(records::configure)
            .configure(tickets::configure)
            .configure(finance::configure)
            .configure(access::configure),
    );
}
