use actix_web::{Responder, web};
use serde::Serialize;

use crate::domain::access::{Group, User};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::record::SoftDelete;
use crate::domain::types::{GroupId, TypeConstraintError};
use crate::filters::Confirmation;
use crate::forms::access::{GroupForm, GroupPermissionsForm, UserForm};
use crate::repository::{DieselRepository, RecordDeactivator};
use crate::routes::records::editable;
use crate::routes::{json_response, parse_id};
use crate::services::AccessControlled;
use crate::services::access::{
    deactivate_record, reactivate_record, save_group_permissions as save_group_permissions_service,
    show_group_permissions as show_group_permissions_service,
};

pub async fn deactivate<R>(
    id: web::Path<i32>,
    web::Query(confirmation): web::Query<Confirmation>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder
where
    R: SoftDelete + AccessControlled + Serialize,
    R::Id: TryFrom<i32, Error = TypeConstraintError>,
    DieselRepository: RecordDeactivator<R>,
{
    json_response(
        parse_id(id.into_inner())
            .and_then(|id| deactivate_record::<R, _>(&user, repo.get_ref(), id, confirmation)),
    )
}

pub async fn reactivate<R>(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder
where
    R: SoftDelete + AccessControlled + Serialize,
    R::Id: TryFrom<i32, Error = TypeConstraintError>,
    DieselRepository: RecordDeactivator<R>,
{
    json_response(
        parse_id(id.into_inner())
            .and_then(|id| reactivate_record::<R, _>(&user, repo.get_ref(), id)),
    )
}

pub async fn show_group_permissions(
    group_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(
        parse_id::<GroupId>(group_id.into_inner())
            .and_then(|id| show_group_permissions_service(&user, repo.get_ref(), id)),
    )
}

pub async fn save_group_permissions(
    group_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<GroupPermissionsForm>,
) -> impl Responder {
    json_response(
        parse_id::<GroupId>(group_id.into_inner())
            .and_then(|id| save_group_permissions_service(&user, repo.get_ref(), id, form)),
    )
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    editable::<User, UserForm>(cfg, "/users");
    editable::<Group, GroupForm>(cfg, "/groups");
    cfg.route("/users/{id}/deactivate", web::post().to(deactivate::<User>))
        .route("/users/{id}/reactivate", web::post().to(reactivate::<User>))
        .route("/groups/{id}/deactivate", web::post().to(deactivate::<Group>))
        .route("/groups/{id}/reactivate", web::post().to(reactivate::<Group>))
        .service(
            web::resource("/groups/{id}/permissions")
                .route(web::get().to(show_group_permissions))
                .route(web::put().to(save_group_permissions)),
        );
}
