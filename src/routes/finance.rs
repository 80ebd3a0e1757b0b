use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::finance::Closing;
use crate::domain::types::Regime;
use crate::filters::DateRange;
use crate::forms::finance::ClosingForm;
use crate::repository::DieselRepository;
use crate::routes::records::{destroy, list, show};
use crate::routes::{created_response, error_response, json_response, parse_id};
use crate::services::export::DownloadFormat;
use crate::services::finance::{
    FinanceQuery, close_period as close_period_service, export_records as export_records_service,
    financial_summary as financial_summary_service, update_closing as update_closing_service,
};

#[derive(Debug, Deserialize)]
pub struct FinanceParams {
    project_id: Option<i32>,
    regime: Option<Regime>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl FinanceParams {
    fn query(&self) -> FinanceQuery {
        let defaults = FinanceQuery::default();
        FinanceQuery {
            project_id: self.project_id,
            regime: self.regime.unwrap_or(defaults.regime),
            range: DateRange::new(self.start, self.end),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    format: DownloadFormat,
}

pub async fn financial_summary(
    params: web::Query<FinanceParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(financial_summary_service(
        &user,
        repo.get_ref(),
        &params.query(),
    ))
}

pub async fn export_records(
    params: web::Query<FinanceParams>,
    download: web::Query<DownloadParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match export_records_service(&user, repo.get_ref(), &params.query(), download.format) {
        Ok(file) => HttpResponse::Ok()
            .append_header(("Content-Type", file.content_type))
            .append_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", file.file_name),
            ))
            .body(file.bytes),
        Err(err) => error_response(err),
    }
}

pub async fn close_period(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ClosingForm>,
) -> impl Responder {
    created_response(close_period_service(&user, repo.get_ref(), form))
}

pub async fn update_closing(
    closing_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ClosingForm>,
) -> impl Responder {
    json_response(
        parse_id(closing_id.into_inner())
            .and_then(|id| update_closing_service(&user, repo.get_ref(), id, form)),
    )
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/finance/summary", web::get().to(financial_summary))
        .route("/finance/export", web::get().to(export_records))
        .service(
            web::resource("/closings")
                .route(web::get().to(list::<Closing>))
                .route(web::post().to(close_period)),
        )
        .service(
            web::resource("/closings/{id}")
                .route(web::get().to(show::<Closing>))
                .route(web::put().to(update_closing))
                .route(web::delete().to(destroy::<Closing>)),
        );
}
