//! Ticket sales breakdowns.

use serde::Serialize;

use crate::domain::ticket::{TicketSale, TicketType};
use crate::domain::types::Money;
use crate::reports::{Summary, summarize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesOverview {
    pub sales: usize,
    pub tickets: i64,
    pub gross: Money,
    /// Gross divided by tickets sold, rounded down to the cent.
    pub average_ticket_price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub overview: SalesOverview,
    pub by_channel: Summary,
    pub by_payment_method: Summary,
    pub by_ticket_type: Summary,
}

pub fn overview(sales: &[TicketSale]) -> SalesOverview {
    let tickets: i64 = sales.iter().map(|s| i64::from(s.quantity.get())).sum();
    let gross: Money = sales.iter().map(|s| s.total).sum();
    let average_ticket_price = if tickets == 0 {
        Money::ZERO
    } else {
        Money::from_cents(gross.cents() / tickets)
    };
    SalesOverview {
        sales: sales.len(),
        tickets,
        gross,
        average_ticket_price,
    }
}

pub fn by_channel(sales: &[TicketSale]) -> Summary {
    summarize(sales, |s| Some(s.channel.as_str().to_string()), |s| s.total)
}

pub fn by_payment_method(sales: &[TicketSale]) -> Summary {
    summarize(
        sales,
        |s| Some(s.payment_method.as_str().to_string()),
        |s| s.total,
    )
}

/// Uses the joined ticket name; falls back to `tickets` and then to the
/// not-identified label when neither is available.
pub fn by_ticket_type(sales: &[TicketSale], tickets: &[TicketType]) -> Summary {
    summarize(
        sales,
        |s| {
            s.ticket
                .as_ref()
                .map(|t| t.name.to_string())
                .or_else(|| {
                    tickets
                        .iter()
                        .find(|t| t.id == s.ticket_type_id)
                        .map(|t| t.name.to_string())
                })
        },
        |s| s.total,
    )
}

pub fn sales_report(sales: &[TicketSale], tickets: &[TicketType]) -> SalesReport {
    SalesReport {
        overview: overview(sales),
        by_channel: by_channel(sales),
        by_payment_method: by_payment_method(sales),
        by_ticket_type: by_ticket_type(sales, tickets),
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::domain::ticket::TicketRef;
    use crate::domain::types::{
        PaymentMethod, Quantity, SalesChannel, TicketSaleId, TicketTypeId, TicketTypeName,
    };
    use crate::reports::NOT_IDENTIFIED;

    fn sale(id: i32, channel: SalesChannel, quantity: i32, unit: i64, joined: bool) -> TicketSale {
        let epoch = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        let ticket_type_id = TicketTypeId::new(id).unwrap();
        TicketSale {
            id: TicketSaleId::new(id).unwrap(),
            ticket_type_id,
            channel,
            payment_method: PaymentMethod::CreditCard,
            quantity: Quantity::new(quantity).unwrap(),
            unit_price: Money::from_cents(unit),
            total: Money::from_cents(unit * i64::from(quantity)),
            buyer_name: None,
            sold_at: epoch,
            created_at: epoch,
            updated_at: epoch,
            ticket: joined.then(|| TicketRef {
                id: ticket_type_id,
                name: TicketTypeName::new("Pista").unwrap(),
                contract: None,
            }),
        }
    }

    #[test]
    fn overview_averages_per_ticket() {
        let sales = vec![
            sale(1, SalesChannel::Online, 2, 5_000, true),
            sale(2, SalesChannel::BoxOffice, 1, 2_000, true),
        ];
        let overview = overview(&sales);
        assert_eq!(overview.tickets, 3);
        assert_eq!(overview.gross, Money::from_cents(12_000));
        assert_eq!(overview.average_ticket_price, Money::from_cents(4_000));
    }

    #[test]
    fn empty_sales_have_zero_average() {
        assert_eq!(overview(&[]).average_ticket_price, Money::ZERO);
    }

    #[test]
    fn missing_relation_falls_back_to_label() {
        let sales = vec![
            sale(1, SalesChannel::Online, 1, 5_000, true),
            sale(2, SalesChannel::Online, 1, 5_000, false),
        ];
        let summary = by_ticket_type(&sales, &[]);
        assert_eq!(summary.group("Pista").unwrap().count, 1);
        assert_eq!(summary.group(NOT_IDENTIFIED).unwrap().count, 1);
    }

    #[test]
    fn channel_summary_covers_every_sale() {
        let sales = vec![
            sale(1, SalesChannel::Online, 2, 5_000, true),
            sale(2, SalesChannel::Partner, 1, 5_000, true),
            sale(3, SalesChannel::Online, 1, 5_000, true),
        ];
        let summary = by_channel(&sales);
        assert_eq!(summary.groups[0].label, "online");
        assert_eq!(summary.groups[0].total, Money::from_cents(15_000));
        assert_eq!(summary.count, 3);
    }
}
