use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::contract::ContractRef;
use crate::domain::record::{Parented, Record};
use crate::domain::types::{
    Capacity, ContractId, Money, PaymentMethod, ProjectId, Quantity, SalesChannel, TicketSaleId,
    TicketTypeId, TicketTypeName, TypeConstraintError,
};

/// Sellable ticket category of a project.
///
/// `capacity` and `sold` form an inventory counter pair: `sold` never exceeds
/// `capacity`, and `sold` always equals the summed quantity of the ticket's
/// sales once a sale has been recorded through the Gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketType {
    pub id: TicketTypeId,
    pub project_id: ProjectId,
    pub contract_id: Option<ContractId>,
    pub name: TicketTypeName,
    pub price: Money,
    pub capacity: Capacity,
    pub sold: i32,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Rejection of a sale that would break the inventory counter pair.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("only {remaining} tickets remaining for {ticket}, requested {requested}")]
    Insufficient {
        ticket: String,
        requested: i32,
        remaining: i32,
    },
    #[error("ticket type {0} is not on sale")]
    Inactive(String),
}

impl TicketType {
    pub fn remaining(&self) -> i32 {
        (self.capacity.get() - self.sold).max(0)
    }

    /// Checks that `quantity` more tickets can be sold.
    pub fn check_availability(&self, quantity: Quantity) -> Result<(), InventoryError> {
        if !self.active {
            return Err(InventoryError::Inactive(self.name.to_string()));
        }
        let remaining = self.remaining();
        if quantity.get() > remaining {
            return Err(InventoryError::Insufficient {
                ticket: self.name.to_string(),
                requested: quantity.get(),
                remaining,
            });
        }
        Ok(())
    }

    /// Read-only embedded view used by sales.
    pub fn as_ref_view(&self, contract: Option<ContractRef>) -> TicketRef {
        TicketRef {
            id: self.id,
            name: self.name.clone(),
            contract,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTicketType {
    pub project_id: ProjectId,
    pub contract_id: Option<ContractId>,
    pub name: TicketTypeName,
    pub price: Money,
    pub capacity: Capacity,
    pub active: bool,
}

/// Partial update of a [`TicketType`]. `sold` is owned by sale recording and
/// cannot be patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TicketTypePatch {
    pub contract_id: Option<Option<ContractId>>,
    pub name: Option<TicketTypeName>,
    pub price: Option<Money>,
    pub capacity: Option<Capacity>,
    pub active: Option<bool>,
}

impl Record for TicketType {
    type Id = TicketTypeId;
    type New = NewTicketType;
    type Patch = TicketTypePatch;

    const ENTITY: &'static str = "ticket type";

    fn id(&self) -> TicketTypeId {
        self.id
    }

    fn apply_patch(&mut self, patch: &TicketTypePatch) {
        if let Some(contract_id) = patch.contract_id {
            self.contract_id = contract_id;
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(capacity) = patch.capacity {
            self.capacity = capacity;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }
}

impl Parented for TicketType {
    type ParentId = ProjectId;

    fn parent_id(&self) -> Option<ProjectId> {
        Some(self.project_id)
    }
}

/// Embedded read-only view of a ticket type, populated when joined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketRef {
    pub id: TicketTypeId,
    pub name: TicketTypeName,
    pub contract: Option<ContractRef>,
}

/// A recorded sale of one or more tickets of a single type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketSale {
    pub id: TicketSaleId,
    pub ticket_type_id: TicketTypeId,
    pub channel: SalesChannel,
    pub payment_method: PaymentMethod,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub total: Money,
    pub buyer_name: Option<String>,
    pub sold_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Present only when the query asked for relations.
    pub ticket: Option<TicketRef>,
}

/// Data required to record a sale. Built through [`NewTicketSale::new`] so
/// `total` is always `unit_price * quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTicketSale {
    pub ticket_type_id: TicketTypeId,
    pub channel: SalesChannel,
    pub payment_method: PaymentMethod,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub total: Money,
    pub buyer_name: Option<String>,
    pub sold_at: NaiveDateTime,
}

impl NewTicketSale {
    pub fn new(
        ticket_type_id: TicketTypeId,
        channel: SalesChannel,
        payment_method: PaymentMethod,
        quantity: Quantity,
        unit_price: Money,
        buyer_name: Option<String>,
        sold_at: NaiveDateTime,
    ) -> Result<Self, TypeConstraintError> {
        let total = unit_price
            .checked_mul(quantity.get())
            .ok_or(TypeConstraintError::InvalidAmount("total"))?;
        Ok(Self {
            ticket_type_id,
            channel,
            payment_method,
            quantity,
            unit_price,
            total,
            buyer_name,
            sold_at,
        })
    }
}

/// Sales are immutable apart from their bookkeeping fields; quantity and
/// price changes go through a new sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TicketSalePatch {
    pub channel: Option<SalesChannel>,
    pub payment_method: Option<PaymentMethod>,
    pub buyer_name: Option<Option<String>>,
}

impl Record for TicketSale {
    type Id = TicketSaleId;
    type New = NewTicketSale;
    type Patch = TicketSalePatch;

    const ENTITY: &'static str = "ticket sale";

    fn id(&self) -> TicketSaleId {
        self.id
    }

    fn apply_patch(&mut self, patch: &TicketSalePatch) {
        if let Some(channel) = patch.channel {
            self.channel = channel;
        }
        if let Some(payment_method) = patch.payment_method {
            self.payment_method = payment_method;
        }
        if let Some(buyer_name) = &patch.buyer_name {
            self.buyer_name = buyer_name.clone();
        }
    }
}

impl Parented for TicketSale {
    type ParentId = TicketTypeId;

    fn parent_id(&self) -> Option<TicketTypeId> {
        Some(self.ticket_type_id)
    }
}
