//! Forms for ticket types and ticket sales.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::ticket::{NewTicketSale, NewTicketType, TicketType, TicketTypePatch};
use crate::domain::types::{
    Capacity, ContractId, Money, PaymentMethod, ProjectId, Quantity, SalesChannel, TicketTypeId,
    TicketTypeName,
};
use crate::forms::{
    FieldCheck, FormError, RecordForm, RelationChoice, blank_to_none, money_input, parse_choice,
    parse_datetime,
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct TicketTypeForm {
    pub project_id: RelationChoice,
    pub contract_id: RelationChoice,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub price: String,
    #[validate(range(min = 0, message = "capacity must be zero or greater"))]
    pub capacity: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl From<&TicketType> for TicketTypeForm {
    fn from(ticket: &TicketType) -> Self {
        Self {
            project_id: RelationChoice::Some(ticket.project_id.get()),
            contract_id: RelationChoice::from_optional(ticket.contract_id),
            name: ticket.name.to_string(),
            price: money_input(ticket.price),
            capacity: ticket.capacity.get(),
            active: ticket.active,
        }
    }
}

impl TicketTypeForm {
    pub fn into_new(self) -> Result<NewTicketType, FormError> {
        let mut check = FieldCheck::validate(&self);
        let project_id = check.take("project_id", self.project_id.required(ProjectId::new));
        let contract_id = check.take("contract_id", self.contract_id.optional(ContractId::new));
        let name = check.take("name", TicketTypeName::new(&self.name));
        let price = check.take("price", Money::parse_non_negative(&self.price, "price"));
        let capacity = check.take("capacity", Capacity::new(self.capacity));
        let (Some(project_id), Some(contract_id), Some(name), Some(price), Some(capacity)) =
            (project_id, contract_id, name, price, capacity)
        else {
            return Err(check.into_error());
        };
        check.finish()?;
        Ok(NewTicketType {
            project_id,
            contract_id,
            name,
            price,
            capacity,
            active: self.active,
        })
    }

    /// Capacity is checked against the current `sold` counter; the project of
    /// an existing ticket type cannot change.
    pub fn into_patch(self, current: &TicketType) -> Result<TicketTypePatch, FormError> {
        let new = self.into_new()?;
        if new.capacity.get() < current.sold {
            return Err(FormError::field(
                "capacity",
                format!("capacity cannot be lower than the {} tickets already sold", current.sold),
            ));
        }
        Ok(TicketTypePatch {
            contract_id: Some(new.contract_id),
            name: Some(new.name),
            price: Some(new.price),
            capacity: Some(new.capacity),
            active: Some(new.active),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct TicketSaleForm {
    pub ticket_type_id: RelationChoice,
    pub channel: String,
    pub payment_method: String,
    #[validate(range(min = 1, message = "quantity must be greater than zero"))]
    pub quantity: i32,
    /// Defaults to the ticket type's price when blank.
    pub unit_price: Option<String>,
    pub buyer_name: Option<String>,
    /// Defaults to the submission time when blank.
    pub sold_at: Option<String>,
}

impl TicketSaleForm {
    /// Builds the sale; `ticket` supplies the default unit price.
    pub fn into_new(self, ticket: &TicketType) -> Result<NewTicketSale, FormError> {
        let mut check = FieldCheck::validate(&self);
        let ticket_type_id = check.take(
            "ticket_type_id",
            self.ticket_type_id.required(TicketTypeId::new),
        );
        if ticket_type_id.is_some_and(|id| id != ticket.id) {
            check.push("ticket_type_id", "ticket type does not match");
        }
        let channel = check.take("channel", parse_choice::<SalesChannel>(&self.channel));
        let payment_method = check.take(
            "payment_method",
            parse_choice::<PaymentMethod>(&self.payment_method),
        );
        let quantity = check.take("quantity", Quantity::new(self.quantity));
        let unit_price = match blank_to_none(self.unit_price.as_deref()) {
            Some(text) => check.take("unit_price", Money::parse_non_negative(&text, "unit_price")),
            None => Some(ticket.price),
        };
        let sold_at: Option<NaiveDateTime> = match blank_to_none(self.sold_at.as_deref()) {
            Some(text) => check.take("sold_at", parse_datetime(&text)),
            None => Some(Utc::now().naive_utc()),
        };
        let (
            Some(ticket_type_id),
            Some(channel),
            Some(payment_method),
            Some(quantity),
            Some(unit_price),
            Some(sold_at),
        ) = (
            ticket_type_id,
            channel,
            payment_method,
            quantity,
            unit_price,
            sold_at,
        )
        else {
            return Err(check.into_error());
        };
        check.finish()?;
        Ok(NewTicketSale::new(
            ticket_type_id,
            channel,
            payment_method,
            quantity,
            unit_price,
            blank_to_none(self.buyer_name.as_deref()),
            sold_at,
        )?)
    }
}

impl RecordForm<TicketType> for TicketTypeForm {
    fn into_new(self) -> Result<NewTicketType, FormError> {
        TicketTypeForm::into_new(self)
    }

    fn into_patch(self, current: &TicketType) -> Result<TicketTypePatch, FormError> {
        TicketTypeForm::into_patch(self, current)
    }
}
