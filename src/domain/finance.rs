use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::project::ProjectRef;
use crate::domain::record::{Parented, Record};
use crate::domain::types::{
    ClosingId, ContractId, Description, FinancialCategory, FinancialKind, FinancialRecordId,
    FinancialStatus, Money, PartyId, PaymentMethod, PersonName, ProjectId, Regime, TicketTypeId,
    TypeConstraintError,
};

/// Category of a financial record together with the fields only that
/// category carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum FinancialDetails {
    TicketSales {
        ticket_type_id: Option<TicketTypeId>,
    },
    Sponsorship {
        party_id: PartyId,
        contract_id: Option<ContractId>,
    },
    SupplierPayment {
        party_id: PartyId,
        contract_id: Option<ContractId>,
        invoice_number: Option<String>,
    },
    Payroll {
        staff_name: PersonName,
    },
    Tax {
        tax_code: String,
    },
    Other,
}

/// Flat, nullable-column view of [`FinancialDetails`] used at the
/// persistence and form boundaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialColumns {
    pub category: String,
    pub ticket_type_id: Option<i32>,
    pub party_id: Option<i32>,
    pub contract_id: Option<i32>,
    pub invoice_number: Option<String>,
    pub staff_name: Option<String>,
    pub tax_code: Option<String>,
}

impl FinancialCategory {
    /// Whether a record of this category may be booked as `kind`.
    pub const fn accepts(self, kind: FinancialKind) -> bool {
        match self {
            Self::TicketSales | Self::Sponsorship => matches!(kind, FinancialKind::Revenue),
            Self::SupplierPayment | Self::Payroll | Self::Tax => {
                matches!(kind, FinancialKind::Expense)
            }
            Self::Other => true,
        }
    }
}

impl FinancialDetails {
    pub const fn category(&self) -> FinancialCategory {
        match self {
            Self::TicketSales { .. } => FinancialCategory::TicketSales,
            Self::Sponsorship { .. } => FinancialCategory::Sponsorship,
            Self::SupplierPayment { .. } => FinancialCategory::SupplierPayment,
            Self::Payroll { .. } => FinancialCategory::Payroll,
            Self::Tax { .. } => FinancialCategory::Tax,
            Self::Other => FinancialCategory::Other,
        }
    }

    pub const fn party_id(&self) -> Option<PartyId> {
        match self {
            Self::Sponsorship { party_id, .. } | Self::SupplierPayment { party_id, .. } => {
                Some(*party_id)
            }
            _ => None,
        }
    }

    /// Builds the variant named by `columns.category`, requiring exactly the
    /// fields that variant needs.
    pub fn from_columns(columns: FinancialColumns) -> Result<Self, TypeConstraintError> {
        let category = FinancialCategory::try_from(columns.category.as_str())?;
        let party = |value: Option<i32>| -> Result<PartyId, TypeConstraintError> {
            value
                .ok_or(TypeConstraintError::NonPositiveId("party_id"))
                .and_then(PartyId::new)
        };
        let contract = columns.contract_id.map(ContractId::new).transpose()?;

        let details = match category {
            FinancialCategory::TicketSales => Self::TicketSales {
                ticket_type_id: columns.ticket_type_id.map(TicketTypeId::new).transpose()?,
            },
            FinancialCategory::Sponsorship => Self::Sponsorship {
                party_id: party(columns.party_id)?,
                contract_id: contract,
            },
            FinancialCategory::SupplierPayment => Self::SupplierPayment {
                party_id: party(columns.party_id)?,
                contract_id: contract,
                invoice_number: non_blank(columns.invoice_number),
            },
            FinancialCategory::Payroll => Self::Payroll {
                staff_name: PersonName::new(columns.staff_name.unwrap_or_default())?,
            },
            FinancialCategory::Tax => Self::Tax {
                tax_code: non_blank(columns.tax_code)
                    .ok_or(TypeConstraintError::EmptyString("tax code"))?,
            },
            FinancialCategory::Other => Self::Other,
        };
        Ok(details)
    }

    pub fn to_columns(&self) -> FinancialColumns {
        let mut columns = FinancialColumns {
            category: self.category().as_str().to_string(),
            ..FinancialColumns::default()
        };
        match self {
            Self::TicketSales { ticket_type_id } => {
                columns.ticket_type_id = ticket_type_id.map(TicketTypeId::get);
            }
            Self::Sponsorship {
                party_id,
                contract_id,
            } => {
                columns.party_id = Some(party_id.get());
                columns.contract_id = contract_id.map(ContractId::get);
            }
            Self::SupplierPayment {
                party_id,
                contract_id,
                invoice_number,
            } => {
                columns.party_id = Some(party_id.get());
                columns.contract_id = contract_id.map(ContractId::get);
                columns.invoice_number = invoice_number.clone();
            }
            Self::Payroll { staff_name } => {
                columns.staff_name = Some(staff_name.to_string());
            }
            Self::Tax { tax_code } => {
                columns.tax_code = Some(tax_code.clone());
            }
            Self::Other => {}
        }
        columns
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A revenue or expense entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialRecord {
    pub id: FinancialRecordId,
    pub project_id: Option<ProjectId>,
    pub kind: FinancialKind,
    pub details: FinancialDetails,
    pub description: Description,
    pub amount: Money,
    pub status: FinancialStatus,
    pub due_date: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Present only when the query asked for relations.
    pub project: Option<ProjectRef>,
}

impl FinancialRecord {
    pub const fn category(&self) -> FinancialCategory {
        self.details.category()
    }

    /// Whether the record counts toward totals under `regime`.
    ///
    /// Cash regime counts settled records only; accrual counts everything
    /// that was not cancelled.
    pub fn counts_under(&self, regime: Regime) -> bool {
        match regime {
            Regime::Cash => self.status == FinancialStatus::Paid,
            Regime::Accrual => self.status != FinancialStatus::Cancelled,
        }
    }

    /// Date the record is attributed to under `regime`.
    pub fn regime_date(&self, regime: Regime) -> Option<NaiveDate> {
        match regime {
            Regime::Cash => self.paid_on,
            Regime::Accrual => Some(self.due_date),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewFinancialRecord {
    pub project_id: Option<ProjectId>,
    pub kind: FinancialKind,
    pub details: FinancialDetails,
    pub description: Description,
    pub amount: Money,
    pub status: FinancialStatus,
    pub due_date: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialRecordPatch {
    pub project_id: Option<Option<ProjectId>>,
    pub kind: Option<FinancialKind>,
    pub details: Option<FinancialDetails>,
    pub description: Option<Description>,
    pub amount: Option<Money>,
    pub status: Option<FinancialStatus>,
    pub due_date: Option<NaiveDate>,
    pub paid_on: Option<Option<NaiveDate>>,
    pub payment_method: Option<Option<PaymentMethod>>,
}

impl Record for FinancialRecord {
    type Id = FinancialRecordId;
    type New = NewFinancialRecord;
    type Patch = FinancialRecordPatch;

    const ENTITY: &'static str = "financial record";

    fn id(&self) -> FinancialRecordId {
        self.id
    }

    fn apply_patch(&mut self, patch: &FinancialRecordPatch) {
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(details) = &patch.details {
            self.details = details.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(paid_on) = patch.paid_on {
            self.paid_on = paid_on;
        }
        if let Some(payment_method) = patch.payment_method {
            self.payment_method = payment_method;
        }
    }
}

impl Parented for FinancialRecord {
    type ParentId = ProjectId;

    fn parent_id(&self) -> Option<ProjectId> {
        self.project_id
    }
}

/// Snapshot of a period's totals under a regime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Closing {
    pub id: ClosingId,
    pub project_id: Option<ProjectId>,
    pub regime: Regime,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub revenue: Money,
    pub expense: Money,
    pub net: Money,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewClosing {
    pub project_id: Option<ProjectId>,
    pub regime: Regime,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub revenue: Money,
    pub expense: Money,
    pub net: Money,
    pub notes: Option<String>,
}

/// Totals of a closing are frozen; only notes can change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClosingPatch {
    pub notes: Option<Option<String>>,
}

impl Record for Closing {
    type Id = ClosingId;
    type New = NewClosing;
    type Patch = ClosingPatch;

    const ENTITY: &'static str = "closing";

    fn id(&self) -> ClosingId {
        self.id
    }

    fn apply_patch(&mut self, patch: &ClosingPatch) {
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
    }
}

impl Parented for Closing {
    type ParentId = ProjectId;

    fn parent_id(&self) -> Option<ProjectId> {
        self.project_id
    }
}
