//! Sale recording across the ticket type and ticket sale stores.

use crate::domain::ticket::{NewTicketSale, TicketSale, TicketType};
use crate::domain::types::TicketTypeId;
use crate::repository::{RecordReader, TicketSalesWriter};
use crate::store::{EntityStore, StoreError};

/// Records a sale and keeps both caches consistent with the Gateway.
///
/// The ticket type is re-read first so the availability check runs against
/// the persisted counter rather than a possibly stale cache. A sale that
/// does not fit is rejected before any write. The insert and the counter
/// recomputation happen in a single Gateway call.
pub fn record_sale<G>(
    tickets: &mut EntityStore<TicketType>,
    sales: &mut EntityStore<TicketSale>,
    gateway: &G,
    sale: &NewTicketSale,
) -> Result<(TicketSale, TicketType), StoreError>
where
    G: RecordReader<TicketType> + TicketSalesWriter + ?Sized,
{
    let ticket = match gateway.get_record(sale.ticket_type_id) {
        Ok(Some(ticket)) => ticket,
        Ok(None) => return tickets.fail(StoreError::NotFound),
        Err(err) => return tickets.fail(err.into()),
    };
    tickets.cache_updated(ticket.clone());

    if let Err(rejection) = ticket.check_availability(sale.quantity) {
        log::info!("sale rejected for ticket type {}: {rejection}", ticket.id);
        return sales.fail(rejection.into());
    }

    let (recorded, ticket) = match gateway.record_sale(sale) {
        Ok(result) => result,
        Err(err) => return sales.fail(err.into()),
    };
    sales.cache_created(recorded.clone());
    tickets.cache_updated(ticket.clone());
    Ok((recorded, ticket))
}

/// Recomputes the sold counter of `ticket_type_id` from its sales.
pub fn resync_ticket<G>(
    tickets: &mut EntityStore<TicketType>,
    gateway: &G,
    ticket_type_id: TicketTypeId,
) -> Result<TicketType, StoreError>
where
    G: TicketSalesWriter + ?Sized,
{
    match gateway.resync_sold(ticket_type_id) {
        Ok(ticket) => {
            tickets.cache_updated(ticket.clone());
            Ok(ticket)
        }
        Err(err) => tickets.fail(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::domain::project::{NewProject, Project};
    use crate::domain::ticket::NewTicketType;
    use crate::domain::types::{
        Capacity, Money, PaymentMethod, ProjectName, ProjectStatus, Quantity, SalesChannel,
        TicketTypeName,
    };
    use crate::repository::ListQuery;
    use crate::repository::test::TestRepository;

    fn sold_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn setup() -> (TestRepository, TicketType) {
        let repo = TestRepository::new();
        let project = repo.seed::<Project>(&NewProject {
            company_id: None,
            venue_id: None,
            client_id: None,
            name: ProjectName::new("Festival").unwrap(),
            description: None,
            status: ProjectStatus::Confirmed,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            budget: Money::ZERO,
        });
        let ticket = repo.seed::<TicketType>(&NewTicketType {
            project_id: project.id,
            contract_id: None,
            name: TicketTypeName::new("Pista").unwrap(),
            price: Money::from_cents(5_000),
            capacity: Capacity::new(100).unwrap(),
            active: true,
        });
        (repo, ticket)
    }

    fn sale(ticket: &TicketType, quantity: i32) -> NewTicketSale {
        NewTicketSale::new(
            ticket.id,
            SalesChannel::BoxOffice,
            PaymentMethod::Pix,
            Quantity::new(quantity).unwrap(),
            ticket.price,
            None,
            sold_at(),
        )
        .unwrap()
    }

    #[test]
    fn sale_updates_counter_and_both_caches() {
        let (repo, ticket) = setup();
        let mut tickets = EntityStore::<TicketType>::new();
        let mut sales = EntityStore::<TicketSale>::new();
        tickets.fetch_all(&repo, &ListQuery::default()).unwrap();

        let (recorded, updated) =
            record_sale(&mut tickets, &mut sales, &repo, &sale(&ticket, 10)).unwrap();

        assert_eq!(recorded.total, Money::from_cents(50_000));
        assert_eq!(updated.sold, 10);
        assert_eq!(tickets.get(ticket.id).unwrap().sold, 10);
        assert_eq!(sales.items().len(), 1);
    }

    #[test]
    fn oversell_is_rejected_before_any_write() {
        let (repo, ticket) = setup();
        let mut tickets = EntityStore::<TicketType>::new();
        let mut sales = EntityStore::<TicketSale>::new();
        record_sale(&mut tickets, &mut sales, &repo, &sale(&ticket, 10)).unwrap();

        let calls = repo.calls();
        let err = record_sale(&mut tickets, &mut sales, &repo, &sale(&ticket, 95)).unwrap_err();

        assert!(matches!(err, StoreError::Rejected(_)));
        assert!(err.to_string().contains("only 90 tickets remaining"));
        // Only the re-read reached the Gateway.
        assert_eq!(repo.calls(), calls + 1);
        assert_eq!(sales.items().len(), 1);
        assert_eq!(tickets.get(ticket.id).unwrap().sold, 10);
    }

    #[test]
    fn stale_cache_does_not_hide_concurrent_sales() {
        let (repo, ticket) = setup();
        let mut tickets = EntityStore::<TicketType>::new();
        let mut sales = EntityStore::<TicketSale>::new();
        tickets.fetch_all(&repo, &ListQuery::default()).unwrap();

        // Another operator sells 95 tickets behind this store's back.
        repo.record_sale(&sale(&ticket, 95)).unwrap();
        assert_eq!(tickets.get(ticket.id).unwrap().sold, 0);

        let err = record_sale(&mut tickets, &mut sales, &repo, &sale(&ticket, 10)).unwrap_err();
        assert!(err.to_string().contains("only 5 tickets remaining"));
        assert_eq!(tickets.get(ticket.id).unwrap().sold, 95);
    }

    #[test]
    fn resync_restores_counter_from_sales() {
        let (repo, ticket) = setup();
        let mut tickets = EntityStore::<TicketType>::new();
        let mut sales = EntityStore::<TicketSale>::new();
        record_sale(&mut tickets, &mut sales, &repo, &sale(&ticket, 7)).unwrap();
        repo.set_sold(ticket.id, 40);

        let fixed = resync_ticket(&mut tickets, &repo, ticket.id).unwrap();
        assert_eq!(fixed.sold, 7);

        let again = resync_ticket(&mut tickets, &repo, ticket.id).unwrap();
        assert_eq!(again.sold, 7);
    }

    #[test]
    fn unknown_ticket_type_is_not_found() {
        let (repo, ticket) = setup();
        let mut tickets = EntityStore::<TicketType>::new();
        let mut sales = EntityStore::<TicketSale>::new();
        let mut missing = sale(&ticket, 1);
        missing.ticket_type_id = TicketTypeId::new(999).unwrap();

        let err = record_sale(&mut tickets, &mut sales, &repo, &missing).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(tickets.error(), Some("record not found"));
    }
}
