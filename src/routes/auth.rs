//! Request authentication.
//!
//! The auth service signs an HS256 token carrying [`AuthenticatedUser`]
//! claims. It arrives either as a `Bearer` header or as the identity stored
//! in the session cookie. Permission codes of the user's group are added to
//! the token roles on every request.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::domain::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::services::access::resolve_permissions;

/// Verifies `token` against `secret`, checking signature and expiry.
pub fn decode_token(
    token: &str,
    secret: &str,
) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
    let data = decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn session_token(req: &HttpRequest) -> Option<String> {
    req.get_identity().ok().and_then(|identity| identity.id().ok())
}

fn authenticate(req: &HttpRequest) -> actix_web::Result<AuthenticatedUser> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ErrorInternalServerError("server configuration missing"))?;

    let token = bearer_token(req)
        .or_else(|| session_token(req))
        .ok_or_else(|| ErrorUnauthorized("missing credentials"))?;

    let user = decode_token(&token, &config.secret).map_err(|e| {
        log::warn!("Rejected token: {e}");
        ErrorUnauthorized("invalid or expired token")
    })?;

    match req.app_data::<web::Data<DieselRepository>>() {
        Some(repo) => resolve_permissions(repo.get_ref(), user)
            .map_err(|_| ErrorInternalServerError("failed to resolve permissions")),
        None => Ok(user),
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
