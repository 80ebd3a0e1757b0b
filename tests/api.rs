#![cfg(feature = "server")]

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use jsonwebtoken::{EncodingKey, Header, encode};
use pushkind_eventos::domain::auth::AuthenticatedUser;
use pushkind_eventos::domain::finance::{FinancialDetails, FinancialRecord, NewFinancialRecord};
use pushkind_eventos::domain::project::{NewProject, Project};
use pushkind_eventos::domain::types::{
    Description, FinancialKind, FinancialStatus, Money, ProjectName, ProjectStatus,
};
use pushkind_eventos::models::config::ServerConfig;
use pushkind_eventos::repository::{DieselRepository, RecordWriter};
use pushkind_eventos::routes;
use serde_json::Value;

mod common;

use common::date;

const SECRET: &str = "0123456789abcdef0123456789abcdef";

fn config() -> ServerConfig {
    ServerConfig {
        database_url: ":memory:".into(),
        address: "127.0.0.1".into(),
        port: 8080,
        secret: SECRET.into(),
        auth_service_url: "http://auth.local".into(),
        db_timeout_secs: 5,
    }
}

fn bearer(roles: &[&str]) -> String {
    let claims = AuthenticatedUser {
        sub: "1".into(),
        email: "ana@arena.com".into(),
        name: "Ana".into(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("should sign token");
    format!("Bearer {token}")
}

fn festival(repo: &DieselRepository) -> Project {
    repo.create_record(&NewProject {
        company_id: None,
        venue_id: None,
        client_id: None,
        name: ProjectName::new("Festival de Verão").expect("valid name"),
        description: Some("Show de abertura".into()),
        status: ProjectStatus::Confirmed,
        start_date: date(2025, 3, 1),
        end_date: date(2025, 3, 2),
        budget: Money::ZERO,
    })
    .expect("should create project")
}

fn expense(repo: &DieselRepository, description: &str, status: FinancialStatus) {
    let _: FinancialRecord = repo
        .create_record(&NewFinancialRecord {
            project_id: None,
            kind: FinancialKind::Expense,
            details: FinancialDetails::Other,
            description: Description::new(description).expect("valid description"),
            amount: Money::from_cents(1_000),
            status,
            due_date: date(2025, 3, 10),
            paid_on: None,
            payment_method: None,
        })
        .expect("should create record");
}

fn get(uri: &str, roles: &[&str]) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header((AUTHORIZATION, bearer(roles)))
}

async fn json_body(response: ServiceResponse) -> (StatusCode, Value) {
    let status = response.status();
    let body = test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[actix_web::test]
async fn closings_are_listed_over_http() {
    let test_db = common::TestDb::new();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_db.repo()))
            .app_data(web::Data::new(config()))
            .configure(routes::configure),
    )
    .await;

    let req = get("/api/v1/closings", &["finance"]).to_request();
    let (status, body) = json_body(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vec![]));

    let req = get("/api/v1/closings", &["tickets"]).to_request();
    let (status, _) = json_body(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn search_is_case_insensitive_across_name_and_description() {
    let test_db = common::TestDb::new();
    festival(&test_db.repo());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_db.repo()))
            .app_data(web::Data::new(config()))
            .configure(routes::configure),
    )
    .await;

    for search in ["VER%C3%83O", "abertura", "FESTIVAL"] {
        let uri = format!("/api/v1/projects?search={search}");
        let req = get(&uri, &["projects"]).to_request();
        let (status, body) = json_body(test::call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1), "search {search}");
    }

    let req = get("/api/v1/projects?search=50%25", &["projects"]).to_request();
    let (_, body) = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn tab_counts_cover_the_unfiltered_collection() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    expense(&repo, "Aluguel do palco", FinancialStatus::Paid);
    expense(&repo, "Som e luz", FinancialStatus::Pending);
    expense(&repo, "Palco extra", FinancialStatus::Pending);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(repo))
            .app_data(web::Data::new(config()))
            .configure(routes::configure),
    )
    .await;

    let uri = "/api/v1/financial-records/tabs?tab=pending&search=palco";
    let req = get(uri, &["finance"]).to_request();
    let (status, body) = json_body(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["items"][0]["description"], "Palco extra");
    assert_eq!(body["tabs"][0]["status"], Value::Null);
    assert_eq!(body["tabs"][0]["count"], 3);

    let pending = body["tabs"]
        .as_array()
        .and_then(|tabs| tabs.iter().find(|t| t["status"] == "pending"))
        .expect("pending tab");
    assert_eq!(pending["count"], 2);

    let req = get("/api/v1/financial-records/tabs?tab=archived", &["finance"]).to_request();
    let (status, _) = json_body(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
