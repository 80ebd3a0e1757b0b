use serde::Serialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::ticket::{TicketSale, TicketType};
use crate::domain::types::{ProjectId, TicketTypeId};
use crate::filters::{DateRange, ListFilter};
use crate::forms::FormError;
use crate::forms::tickets::TicketSaleForm;
use crate::reports::sales::{SalesReport, sales_report as build_sales_report};
use crate::repository::{ListQuery, RecordReader, TicketSalesWriter};
use crate::services::{
    ServiceError, ServiceResult, TICKETS_PERMISSION, authorize, repository_failure, store_failure,
};
use crate::store::{EntityStore, tickets as ticket_store};

/// Result of a recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedSale {
    pub sale: TicketSale,
    pub ticket: TicketType,
}

pub fn record_sale<R>(
    user: &AuthenticatedUser,
    repo: &R,
    form: TicketSaleForm,
) -> ServiceResult<RecordedSale>
where
    R: RecordReader<TicketType> + TicketSalesWriter,
{
    authorize(user, TICKETS_PERMISSION)?;

    let ticket_type_id = form
        .ticket_type_id
        .required(TicketTypeId::new)
        .map_err(|e| FormError::field("ticket_type_id", e.to_string()))?;
    let ticket = match repo.get_record(ticket_type_id) {
        Ok(Some(ticket)) => ticket,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => return Err(repository_failure("get", "ticket type", e)),
    };
    let new_sale = form.into_new(&ticket)?;

    let mut tickets = EntityStore::<TicketType>::new();
    let mut sales = EntityStore::<TicketSale>::new();
    let (sale, ticket) = ticket_store::record_sale(&mut tickets, &mut sales, repo, &new_sale)
        .map_err(|e| store_failure("record", "ticket sale", e))?;
    log::info!(
        "Recorded sale {} of {} x {} ({} of {} sold)",
        sale.id,
        sale.quantity.get(),
        ticket.name,
        ticket.sold,
        ticket.capacity.get()
    );
    Ok(RecordedSale { sale, ticket })
}

pub fn resync_ticket<R>(
    user: &AuthenticatedUser,
    repo: &R,
    ticket_type_id: TicketTypeId,
) -> ServiceResult<TicketType>
where
    R: TicketSalesWriter,
{
    authorize(user, TICKETS_PERMISSION)?;

    let mut tickets = EntityStore::<TicketType>::new();
    ticket_store::resync_ticket(&mut tickets, repo, ticket_type_id)
        .map_err(|e| store_failure("resync", "ticket type", e))
}

/// Scope of a sales report.
#[derive(Debug, Clone, Default)]
pub struct SalesReportQuery {
    pub project_id: Option<i32>,
    pub range: DateRange,
}

pub fn sales_report<R>(
    user: &AuthenticatedUser,
    repo: &R,
    query: &SalesReportQuery,
) -> ServiceResult<SalesReport>
where
    R: RecordReader<TicketType> + RecordReader<TicketSale>,
{
    authorize(user, TICKETS_PERMISSION)?;

    let mut ticket_query = ListQuery::default();
    if let Some(project_id) = query.project_id {
        let project_id = ProjectId::new(project_id)?;
        ticket_query = ticket_query.parent(project_id);
    }

    let mut tickets = EntityStore::<TicketType>::new();
    let tickets = tickets
        .fetch_all(repo, &ticket_query)
        .map_err(|e| store_failure("list", "ticket type", e))?;

    let mut sales = EntityStore::<TicketSale>::new();
    let sales = sales
        .fetch_all(repo, &ListQuery::default().with_relations())
        .map_err(|e| store_failure("list", "ticket sale", e))?;

    let filter = ListFilter {
        range: query.range,
        ..ListFilter::default()
    };
    let scoped: Vec<TicketSale> = filter
        .apply(sales)
        .into_iter()
        .filter(|sale| tickets.iter().any(|t| t.id == sale.ticket_type_id))
        .cloned()
        .collect();

    Ok(build_sales_report(&scoped, tickets))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::project::{NewProject, Project};
    use crate::domain::ticket::NewTicketType;
    use crate::domain::types::{Capacity, Money, ProjectName, ProjectStatus, TicketTypeName};
    use crate::forms::RelationChoice;
    use crate::repository::test::TestRepository;
    use crate::services::test_support::user_with;

    fn seed(repo: &TestRepository, name: &str) -> TicketType {
        let project = repo.seed::<Project>(&NewProject {
            company_id: None,
            venue_id: None,
            client_id: None,
            name: ProjectName::new(name).unwrap(),
            description: None,
            status: ProjectStatus::Confirmed,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            budget: Money::ZERO,
        });
        repo.seed::<TicketType>(&NewTicketType {
            project_id: project.id,
            contract_id: None,
            name: TicketTypeName::new("Pista").unwrap(),
            price: Money::from_cents(5_000),
            capacity: Capacity::new(100).unwrap(),
            active: true,
        })
    }

    fn sale_form(ticket: &TicketType, quantity: i32) -> TicketSaleForm {
        TicketSaleForm {
            ticket_type_id: RelationChoice::Some(ticket.id.get()),
            channel: "online".into(),
            payment_method: "credit_card".into(),
            quantity,
            unit_price: Some("50,00".into()),
            buyer_name: None,
            sold_at: Some("2025-03-01T10:00".into()),
        }
    }

    #[test]
    fn sale_then_oversell_is_a_conflict_citing_remaining() {
        let repo = TestRepository::new();
        let ticket = seed(&repo, "Festival");
        let user = user_with(&["tickets"]);

        let recorded = record_sale(&user, &repo, sale_form(&ticket, 10)).unwrap();
        assert_eq!(recorded.ticket.sold, 10);
        assert_eq!(recorded.sale.total, Money::from_cents(50_000));

        let err = record_sale(&user, &repo, sale_form(&ticket, 95)).unwrap_err();
        match err {
            ServiceError::Conflict(message) => assert!(message.contains("90")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_ticket_type_is_not_found() {
        let repo = TestRepository::new();
        let ticket = seed(&repo, "Festival");
        let user = user_with(&["tickets"]);
        let mut form = sale_form(&ticket, 1);
        form.ticket_type_id = RelationChoice::Some(999);
        assert_eq!(
            record_sale(&user, &repo, form).unwrap_err(),
            ServiceError::NotFound
        );
    }

    #[test]
    fn report_is_scoped_to_project_and_range() {
        let repo = TestRepository::new();
        let festival = seed(&repo, "Festival");
        let fair = seed(&repo, "Feira");
        let user = user_with(&["tickets"]);
        record_sale(&user, &repo, sale_form(&festival, 2)).unwrap();
        record_sale(&user, &repo, sale_form(&fair, 3)).unwrap();

        let query = SalesReportQuery {
            project_id: Some(festival.project_id.get()),
            range: DateRange::default(),
        };
        let report = sales_report(&user, &repo, &query).unwrap();
        assert_eq!(report.overview.tickets, 2);
        assert_eq!(report.by_ticket_type.group("Pista").unwrap().count, 1);

        let query = SalesReportQuery {
            project_id: None,
            range: DateRange::new(NaiveDate::from_ymd_opt(2025, 3, 2), None),
        };
        let report = sales_report(&user, &repo, &query).unwrap();
        assert_eq!(report.overview.sales, 0);
    }

    #[test]
    fn resync_requires_tickets_permission() {
        let repo = TestRepository::new();
        let ticket = seed(&repo, "Festival");
        let user = user_with(&["finance"]);
        assert_eq!(
            resync_ticket(&user, &repo, ticket.id).unwrap_err(),
            ServiceError::Unauthorized
        );
    }
}
