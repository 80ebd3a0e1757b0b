use actix_web::{Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::ticket::{TicketSale, TicketType};
use crate::filters::DateRange;
use crate::forms::tickets::{TicketSaleForm, TicketTypeForm};
use crate::repository::DieselRepository;
use crate::routes::records::{crud, destroy, list, show};
use crate::routes::{created_response, json_response, parse_id};
use crate::services::tickets::{
    SalesReportQuery, record_sale as record_sale_service, resync_ticket as resync_ticket_service,
    sales_report as sales_report_service,
};

pub async fn record_sale(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<TicketSaleForm>,
) -> impl Responder {
    created_response(record_sale_service(&user, repo.get_ref(), form))
}

pub async fn resync_ticket(
    ticket_type_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(
        parse_id(ticket_type_id.into_inner())
            .and_then(|id| resync_ticket_service(&user, repo.get_ref(), id)),
    )
}

#[derive(Debug, Deserialize)]
pub struct SalesReportParams {
    project_id: Option<i32>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

pub async fn sales_report(
    params: web::Query<SalesReportParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let query = SalesReportQuery {
        project_id: params.project_id,
        range: DateRange::new(params.start, params.end),
    };
    json_response(sales_report_service(&user, repo.get_ref(), &query))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    crud::<TicketType, TicketTypeForm>(cfg, "/ticket-types");
    cfg.route(
        "/ticket-types/{id}/resync",
        web::post().to(resync_ticket),
    )
    .service(
        web::resource("/sales")
            .route(web::get().to(list::<TicketSale>))
            .route(web::post().to(record_sale)),
    )
    .service(
        web::resource("/sales/{id}")
            .route(web::get().to(show::<TicketSale>))
            .route(web::delete().to(destroy::<TicketSale>)),
    )
    .route("/reports/sales", web::get().to(sales_report));
}
