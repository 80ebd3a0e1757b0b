use chrono::Utc;
use pushkind_eventos::domain::access::{Group, NewGroup, NewUser, User};
use pushkind_eventos::domain::company::{Company, CompanyPatch, NewCompany};
use pushkind_eventos::domain::finance::{FinancialDetails, FinancialRecord, NewFinancialRecord};
use pushkind_eventos::domain::ticket::{NewTicketSale, NewTicketType, TicketSale, TicketType};
use pushkind_eventos::domain::types::{
    Capacity, CompanyName, Description, Email, FinancialKind, FinancialStatus, GroupName, Money,
    PaymentMethod, PersonName, Quantity, Regime, SalesChannel, TaxId, TicketTypeName,
};
use pushkind_eventos::filters::DateRange;
use pushkind_eventos::forms::RelationChoice;
use pushkind_eventos::forms::access::GroupPermissionsForm;
use pushkind_eventos::forms::finance::ClosingForm;
use pushkind_eventos::forms::tickets::TicketSaleForm;
use pushkind_eventos::repository::{
    DieselRepository, GroupPermissionReader, ListQuery, RecordDeactivator, RecordDeleter,
    RecordReader, RecordWriter, RepositoryError, TicketSalesWriter,
};
use pushkind_eventos::services::ServiceError;
use pushkind_eventos::services::access::{resolve_permissions, save_group_permissions};
use pushkind_eventos::services::finance::{FinanceQuery, close_period, financial_summary};
use pushkind_eventos::services::tickets::record_sale;

mod common;

use common::{date, project, user};

fn ticket_type(repo: &DieselRepository, capacity: i32) -> TicketType {
    let festival = project(repo, "Festival de Verão");
    repo.create_record(&NewTicketType {
        project_id: festival.id,
        contract_id: None,
        name: TicketTypeName::new("Pista").expect("valid name"),
        price: Money::from_cents(5_000),
        capacity: Capacity::new(capacity).expect("valid capacity"),
        active: true,
    })
    .expect("should create ticket type")
}

fn sale_form(ticket: &TicketType, quantity: i32) -> TicketSaleForm {
    TicketSaleForm {
        ticket_type_id: RelationChoice::Some(ticket.id.get()),
        channel: "box_office".into(),
        payment_method: "pix".into(),
        quantity,
        unit_price: None,
        buyer_name: None,
        sold_at: None,
    }
}

#[test]
fn company_crud_round_trip() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let company: Company = repo
        .create_record(&NewCompany {
            name: CompanyName::new("Arena Eventos").expect("valid name"),
            tax_id: TaxId::new("12.345.678/0001-90").expect("valid tax id"),
            email: Some(Email::new("contato@arena.com").expect("valid email")),
            phone: None,
        })
        .expect("should create company");

    let found: Vec<Company> = repo
        .list_records(&ListQuery::default())
        .expect("should list companies");
    assert_eq!(found.len(), 1);

    let updated: Company = repo
        .update_record(
            company.id,
            &CompanyPatch {
                name: Some(CompanyName::new("Arena Shows").expect("valid name")),
                ..CompanyPatch::default()
            },
        )
        .expect("should update company");
    assert_eq!(updated.name.as_str(), "Arena Shows");
    assert_eq!(updated.tax_id, company.tax_id);

    RecordDeleter::<Company>::delete_record(&repo, company.id).expect("should delete company");
    let missing: Option<Company> = repo.get_record(company.id).expect("lookup should succeed");
    assert!(missing.is_none());
    assert!(matches!(
        RecordDeleter::<Company>::delete_record(&repo, company.id),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn oversell_is_refused_and_counter_untouched() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    let ticket = ticket_type(&repo, 100);
    let seller = user(&["tickets"]);

    let recorded = record_sale(&seller, &repo, sale_form(&ticket, 10)).expect("should sell");
    assert_eq!(recorded.ticket.sold, 10);
    assert_eq!(recorded.sale.total, Money::from_cents(50_000));
    assert!(recorded.sale.ticket.is_some());

    let err = record_sale(&seller, &repo, sale_form(&ticket, 95)).unwrap_err();
    match err {
        ServiceError::Conflict(message) => assert!(message.contains("90"), "{message}"),
        other => panic!("unexpected error: {other:?}"),
    }

    let stored: TicketType = repo
        .get_record(ticket.id)
        .expect("lookup should succeed")
        .expect("ticket type exists");
    assert_eq!(stored.sold, 10);
    let sales: Vec<TicketSale> = repo
        .list_records(&ListQuery::default().parent(ticket.id))
        .expect("should list sales");
    assert_eq!(sales.len(), 1);
}

#[test]
fn gateway_refuses_oversell_even_with_a_stale_check() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    let ticket = ticket_type(&repo, 5);

    let sale = NewTicketSale::new(
        ticket.id,
        SalesChannel::Online,
        PaymentMethod::CreditCard,
        Quantity::new(6).expect("valid quantity"),
        ticket.price,
        None,
        Utc::now().naive_utc(),
    )
    .expect("valid sale");
    assert!(matches!(
        repo.record_sale(&sale),
        Err(RepositoryError::Conflict(_))
    ));
}

#[test]
fn deleting_a_sale_recomputes_sold() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    let ticket = ticket_type(&repo, 50);
    let seller = user(&["tickets"]);

    let first = record_sale(&seller, &repo, sale_form(&ticket, 4)).expect("should sell");
    record_sale(&seller, &repo, sale_form(&ticket, 6)).expect("should sell");

    RecordDeleter::<TicketSale>::delete_record(&repo, first.sale.id).expect("should delete sale");
    let resynced = repo.resync_sold(ticket.id).expect("should resync");
    assert_eq!(resynced.sold, 6);
}

fn finance_record(
    repo: &DieselRepository,
    kind: FinancialKind,
    cents: i64,
    status: FinancialStatus,
) -> FinancialRecord {
    let paid = status == FinancialStatus::Paid;
    repo.create_record(&NewFinancialRecord {
        project_id: None,
        kind,
        details: FinancialDetails::Other,
        description: Description::new("Lançamento").expect("valid description"),
        amount: Money::from_cents(cents),
        status,
        due_date: date(2025, 3, 10),
        paid_on: paid.then(|| date(2025, 3, 12)),
        payment_method: paid.then_some(PaymentMethod::BankTransfer),
    })
    .expect("should create financial record")
}

#[test]
fn regimes_count_different_records() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    finance_record(&repo, FinancialKind::Revenue, 1_000_000, FinancialStatus::Paid);
    finance_record(&repo, FinancialKind::Revenue, 500_000, FinancialStatus::Pending);
    finance_record(&repo, FinancialKind::Expense, 300_000, FinancialStatus::Paid);
    finance_record(&repo, FinancialKind::Expense, 200_000, FinancialStatus::Cancelled);
    let accountant = user(&["finance"]);
    let march = DateRange::new(Some(date(2025, 3, 1)), Some(date(2025, 3, 31)));

    let cash = financial_summary(
        &accountant,
        &repo,
        &FinanceQuery {
            project_id: None,
            regime: Regime::Cash,
            range: march,
        },
    )
    .expect("should summarize");
    assert_eq!(cash.totals.revenue, Money::from_cents(1_000_000));
    assert_eq!(cash.totals.expense, Money::from_cents(300_000));
    assert_eq!(cash.totals.net, Money::from_cents(700_000));

    let accrual = financial_summary(
        &accountant,
        &repo,
        &FinanceQuery {
            project_id: None,
            regime: Regime::Accrual,
            range: march,
        },
    )
    .expect("should summarize");
    assert_eq!(accrual.totals.revenue, Money::from_cents(1_500_000));
    assert_eq!(accrual.totals.net, Money::from_cents(1_200_000));

    let closing = close_period(
        &accountant,
        &repo,
        ClosingForm {
            project_id: RelationChoice::None,
            regime: "cash".into(),
            period_start: "2025-03-01".into(),
            period_end: "2025-03-31".into(),
            notes: None,
        },
    )
    .expect("should close period");
    assert_eq!(closing.net, Money::from_cents(700_000));
}

#[test]
fn group_permissions_persist_only_the_difference() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    let admin = user(&["admin"]);

    let group: Group = repo
        .create_record(&NewGroup {
            name: GroupName::new("Bilheteria").expect("valid name"),
            description: None,
        })
        .expect("should create group");
    let codes = |wanted: &[&str]| -> Vec<i32> {
        repo.list_permissions()
            .expect("should list permissions")
            .into_iter()
            .filter(|p| wanted.contains(&p.code.as_str()))
            .map(|p| p.id.get())
            .collect()
    };

    let changes = save_group_permissions(
        &admin,
        &repo,
        group.id,
        GroupPermissionsForm {
            permission_ids: codes(&["tickets", "finance", "projects"]),
        },
    )
    .expect("should save permissions");
    assert_eq!(changes.added.len(), 3);
    assert!(changes.removed.is_empty());
    assert_eq!(
        repo.list_group_permissions(group.id)
            .expect("should list associations")
            .len(),
        3
    );

    let changes = save_group_permissions(
        &admin,
        &repo,
        group.id,
        GroupPermissionsForm {
            permission_ids: codes(&["tickets", "finance"]),
        },
    )
    .expect("should save permissions");
    assert!(changes.added.is_empty());
    assert_eq!(changes.removed.len(), 1);

    let _: User = repo
        .create_record(&NewUser {
            email: Email::new("ana@arena.com").expect("valid email"),
            name: PersonName::new("Ana").expect("valid name"),
            group_id: Some(group.id),
        })
        .expect("should create user");
    let resolved = resolve_permissions(&repo, user(&[])).expect("should resolve");
    assert_eq!(resolved.roles, vec!["finance".to_string(), "tickets".to_string()]);
}

#[test]
fn group_with_active_members_cannot_be_deactivated() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let group: Group = repo
        .create_record(&NewGroup {
            name: GroupName::new("Financeiro").expect("valid name"),
            description: None,
        })
        .expect("should create group");
    let member: User = repo
        .create_record(&NewUser {
            email: Email::new("bia@arena.com").expect("valid email"),
            name: PersonName::new("Bia").expect("valid name"),
            group_id: Some(group.id),
        })
        .expect("should create user");

    let err = RecordDeactivator::<Group>::set_record_active(&repo, group.id, false).unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Conflict(message) if message.contains("1 active members")
    ));

    RecordDeactivator::<User>::set_record_active(&repo, member.id, false)
        .expect("should deactivate user");
    let group = RecordDeactivator::<Group>::set_record_active(&repo, group.id, false)
        .expect("should deactivate group");
    assert!(!group.active);

    let listed: Vec<Group> = repo
        .list_records(&ListQuery::default())
        .expect("should list groups");
    assert!(listed.is_empty());
    let listed: Vec<Group> = repo
        .list_records(&ListQuery::default().include_inactive())
        .expect("should list groups");
    assert_eq!(listed.len(), 1);
}
