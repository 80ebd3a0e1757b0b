//! Generic CRUD handlers, instantiated once per record family.

use actix_web::{HttpResponse, Resource, web};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::company::Company;
use crate::domain::contract::Contract;
use crate::domain::finance::FinancialRecord;
use crate::domain::party::Party;
use crate::domain::project::Project;
use crate::domain::types::TypeConstraintError;
use crate::domain::venue::Venue;
use crate::filters::{Confirmation, DateRange, Filterable, ListFilter, StatusTabs, TabSelection};
use crate::forms::RecordForm;
use crate::forms::finance::FinancialRecordForm;
use crate::forms::projects::{ContractForm, ProjectForm};
use crate::forms::registry::{CompanyForm, PartyForm, VenueForm};
use crate::repository::{DieselRepository, ListQuery, RecordDeleter, RecordReader, RecordWriter};
use crate::routes::{created_response, error_response, json_response, parse_id};
use crate::services::records::{
    create_record, delete_record, get_record, list_records, list_tabbed, update_record,
};
use crate::services::{AccessControlled, ServiceError};

/// Query string accepted by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub parent_id: Option<i32>,
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default)]
    pub relations: bool,
    pub category: Option<String>,
    pub status: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Status tab; only read by the `/tabs` endpoints.
    pub tab: Option<String>,
}

impl ListParams {
    pub fn query(&self) -> ListQuery {
        let mut query = ListQuery::default();
        if let Some(parent_id) = self.parent_id {
            query = query.parent(parent_id);
        }
        if self.include_inactive {
            query = query.include_inactive();
        }
        if self.relations {
            query = query.with_relations();
        }
        query
    }

    pub fn filter(&self) -> ListFilter {
        ListFilter {
            text: self.search.clone(),
            category: self.category.clone(),
            status: self.status.clone(),
            range: DateRange::new(self.start, self.end),
        }
    }
}

pub async fn list<R>(
    params: web::Query<ListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> HttpResponse
where
    R: AccessControlled + Filterable + Serialize,
    DieselRepository: RecordReader<R>,
{
    json_response(list_records::<R, _>(
        &user,
        repo.get_ref(),
        &params.query(),
        &params.filter(),
    ))
}

pub async fn tabs<R>(
    params: web::Query<ListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> HttpResponse
where
    R: AccessControlled + Filterable + StatusTabs + Serialize,
    DieselRepository: RecordReader<R>,
{
    let result = TabSelection::parse(params.tab.as_deref())
        .map_err(ServiceError::from)
        .and_then(|selection| {
            list_tabbed::<R, _>(
                &user,
                repo.get_ref(),
                &params.query(),
                &params.filter(),
                selection,
            )
        });
    json_response(result)
}

pub async fn show<R>(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> HttpResponse
where
    R: AccessControlled + Serialize,
    R::Id: TryFrom<i32, Error = TypeConstraintError>,
    DieselRepository: RecordReader<R>,
{
    json_response(
        parse_id(id.into_inner()).and_then(|id| get_record::<R, _>(&user, repo.get_ref(), id)),
    )
}

pub async fn create<R, F>(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<F>,
) -> HttpResponse
where
    R: AccessControlled + Serialize,
    F: RecordForm<R>,
    DieselRepository: RecordWriter<R>,
{
    created_response(create_record::<R, _, F>(&user, repo.get_ref(), form))
}

pub async fn update<R, F>(
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<F>,
) -> HttpResponse
where
    R: AccessControlled + Serialize,
    R::Id: TryFrom<i32, Error = TypeConstraintError>,
    F: RecordForm<R>,
    DieselRepository: RecordReader<R> + RecordWriter<R>,
{
    json_response(
        parse_id(id.into_inner())
            .and_then(|id| update_record::<R, _, F>(&user, repo.get_ref(), id, form)),
    )
}

pub async fn destroy<R>(
    id: web::Path<i32>,
    web::Query(confirmation): web::Query<Confirmation>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> HttpResponse
where
    R: AccessControlled,
    R::Id: TryFrom<i32, Error = TypeConstraintError>,
    DieselRepository: RecordDeleter<R>,
{
    let result = parse_id(id.into_inner())
        .and_then(|id| delete_record::<R, _>(&user, repo.get_ref(), id, confirmation));
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

fn collection<R, F>(path: &str) -> Resource
where
    R: AccessControlled + Filterable + Serialize + 'static,
    F: RecordForm<R> + DeserializeOwned + 'static,
    DieselRepository: RecordReader<R> + RecordWriter<R>,
{
    web::resource(path)
        .route(web::get().to(list::<R>))
        .route(web::post().to(create::<R, F>))
}

fn item<R, F>(path: &str) -> Resource
where
    R: AccessControlled + Serialize + 'static,
    R::Id: TryFrom<i32, Error = TypeConstraintError>,
    F: RecordForm<R> + DeserializeOwned + 'static,
    DieselRepository: RecordReader<R> + RecordWriter<R>,
{
    web::resource(format!("{path}/{{id}}"))
        .route(web::get().to(show::<R>))
        .route(web::put().to(update::<R, F>))
}

/// List, show, create and update endpoints under `path`.
pub fn editable<R, F>(cfg: &mut web::ServiceConfig, path: &str)
where
    R: AccessControlled + Filterable + Serialize + 'static,
    R::Id: TryFrom<i32, Error = TypeConstraintError>,
    F: RecordForm<R> + DeserializeOwned + 'static,
    DieselRepository: RecordReader<R> + RecordWriter<R>,
{
    cfg.service(collection::<R, F>(path))
        .service(item::<R, F>(path));
}

/// [`editable`] plus `DELETE {path}/{id}?confirm=true`.
pub fn crud<R, F>(cfg: &mut web::ServiceConfig, path: &str)
where
    R: AccessControlled + Filterable + Serialize + 'static,
    R::Id: TryFrom<i32, Error = TypeConstraintError>,
    F: RecordForm<R> + DeserializeOwned + 'static,
    DieselRepository: RecordReader<R> + RecordWriter<R> + RecordDeleter<R>,
{
    cfg.service(collection::<R, F>(path)).service(
        item::<R, F>(path).route(web::delete().to(destroy::<R>)),
    );
}

/// `GET {path}/tabs`. Registered ahead of `{path}/{id}`.
fn tabbed<R>(cfg: &mut web::ServiceConfig, path: &str)
where
    R: AccessControlled + Filterable + StatusTabs + Serialize + 'static,
    DieselRepository: RecordReader<R>,
{
    cfg.service(web::resource(format!("{path}/tabs")).route(web::get().to(tabs::<R>)));
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    tabbed::<Project>(cfg, "/projects");
    tabbed::<Contract>(cfg, "/contracts");
    tabbed::<FinancialRecord>(cfg, "/financial-records");

    crud::<Company, CompanyForm>(cfg, "/companies");
    crud::<Venue, VenueForm>(cfg, "/venues");
    crud::<Party, PartyForm>(cfg, "/parties");
    crud::<Project, ProjectForm>(cfg, "/projects");
    crud::<Contract, ContractForm>(cfg, "/contracts");
    crud::<FinancialRecord, FinancialRecordForm>(cfg, "/financial-records");
}
