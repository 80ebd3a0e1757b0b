use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::ticket::{
    NewTicketSale as DomainNewTicketSale, NewTicketType as DomainNewTicketType,
    TicketSale as DomainTicketSale, TicketSalePatch as DomainTicketSalePatch,
    TicketType as DomainTicketType, TicketTypePatch as DomainTicketTypePatch,
};
use crate::domain::types::{
    Capacity, ContractId, Money, PaymentMethod, ProjectId, Quantity, SalesChannel, TicketTypeId,
    TicketTypeName, TypeConstraintError,
};
use crate::models::touch;

/// Diesel model representing the `ticket_types` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::ticket_types)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TicketType {
    pub id: i32,
    pub project_id: i32,
    pub contract_id: Option<i32>,
    pub name: String,
    pub price_cents: i64,
    pub capacity: i32,
    pub sold: i32,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::ticket_types)]
pub struct NewTicketType {
    pub project_id: i32,
    pub contract_id: Option<i32>,
    pub name: String,
    pub price_cents: i64,
    pub capacity: i32,
    pub sold: i32,
    pub active: bool,
}

/// `sold` is deliberately absent: only sale recording writes it.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::ticket_types)]
pub struct TicketTypeChangeset {
    pub contract_id: Option<Option<i32>>,
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub capacity: Option<i32>,
    pub active: Option<bool>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TicketType> for DomainTicketType {
    type Error = TypeConstraintError;

    fn try_from(ticket: TicketType) -> Result<Self, Self::Error> {
        if ticket.sold < 0 {
            return Err(TypeConstraintError::NegativeNumber("sold"));
        }
        Ok(Self {
            id: ticket.id.try_into()?,
            project_id: ProjectId::new(ticket.project_id)?,
            contract_id: ticket.contract_id.map(ContractId::new).transpose()?,
            name: TicketTypeName::new(ticket.name)?,
            price: Money::from_cents(ticket.price_cents),
            capacity: Capacity::new(ticket.capacity)?,
            sold: ticket.sold,
            active: ticket.active,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        })
    }
}

impl From<&DomainNewTicketType> for NewTicketType {
    fn from(ticket: &DomainNewTicketType) -> Self {
        Self {
            project_id: ticket.project_id.get(),
            contract_id: ticket.contract_id.map(ContractId::get),
            name: ticket.name.to_string(),
            price_cents: ticket.price.cents(),
            capacity: ticket.capacity.get(),
            sold: 0,
            active: ticket.active,
        }
    }
}

impl From<&DomainTicketTypePatch> for TicketTypeChangeset {
    fn from(patch: &DomainTicketTypePatch) -> Self {
        Self {
            contract_id: patch.contract_id.map(|id| id.map(ContractId::get)),
            name: patch.name.as_ref().map(ToString::to_string),
            price_cents: patch.price.map(Money::cents),
            capacity: patch.capacity.map(Capacity::get),
            active: patch.active,
            updated_at: touch(),
        }
    }
}

/// Diesel model representing the `ticket_sales` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::ticket_sales)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TicketSale {
    pub id: i32,
    pub ticket_type_id: i32,
    pub channel: String,
    pub payment_method: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub buyer_name: Option<String>,
    pub sold_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::ticket_sales)]
pub struct NewTicketSale {
    pub ticket_type_id: i32,
    pub channel: String,
    pub payment_method: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub buyer_name: Option<String>,
    pub sold_at: NaiveDateTime,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::ticket_sales)]
pub struct TicketSaleChangeset {
    pub channel: Option<String>,
    pub payment_method: Option<String>,
    pub buyer_name: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TicketSale> for DomainTicketSale {
    type Error = TypeConstraintError;

    fn try_from(sale: TicketSale) -> Result<Self, Self::Error> {
        Ok(Self {
            id: sale.id.try_into()?,
            ticket_type_id: TicketTypeId::new(sale.ticket_type_id)?,
            channel: SalesChannel::try_from(sale.channel)?,
            payment_method: PaymentMethod::try_from(sale.payment_method)?,
            quantity: Quantity::new(sale.quantity)?,
            unit_price: Money::from_cents(sale.unit_price_cents),
            total: Money::from_cents(sale.total_cents),
            buyer_name: sale.buyer_name,
            sold_at: sale.sold_at,
            created_at: sale.created_at,
            updated_at: sale.updated_at,
            ticket: None,
        })
    }
}

impl From<&DomainNewTicketSale> for NewTicketSale {
    fn from(sale: &DomainNewTicketSale) -> Self {
        Self {
            ticket_type_id: sale.ticket_type_id.get(),
            channel: sale.channel.into(),
            payment_method: sale.payment_method.into(),
            quantity: sale.quantity.get(),
            unit_price_cents: sale.unit_price.cents(),
            total_cents: sale.total.cents(),
            buyer_name: sale.buyer_name.clone(),
            sold_at: sale.sold_at,
        }
    }
}

impl From<&DomainTicketSalePatch> for TicketSaleChangeset {
    fn from(patch: &DomainTicketSalePatch) -> Self {
        Self {
            channel: patch.channel.map(String::from),
            payment_method: patch.payment_method.map(String::from),
            buyer_name: patch.buyer_name.clone(),
            updated_at: touch(),
        }
    }
}
