use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::finance::{
    Closing as DomainClosing, ClosingPatch as DomainClosingPatch, FinancialColumns,
    FinancialDetails, FinancialRecord as DomainFinancialRecord,
    FinancialRecordPatch as DomainFinancialRecordPatch, NewClosing as DomainNewClosing,
    NewFinancialRecord as DomainNewFinancialRecord,
};
use crate::domain::types::{
    Description, FinancialKind, FinancialStatus, Money, PaymentMethod, ProjectId, Regime,
    TypeConstraintError,
};
use crate::models::touch;

/// Diesel model representing the `financial_records` table.
///
/// Category-specific fields are flat nullable columns here and become a
/// [`FinancialDetails`] variant on conversion.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::financial_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FinancialRecord {
    pub id: i32,
    pub project_id: Option<i32>,
    pub kind: String,
    pub category: String,
    pub ticket_type_id: Option<i32>,
    pub party_id: Option<i32>,
    pub contract_id: Option<i32>,
    pub invoice_number: Option<String>,
    pub staff_name: Option<String>,
    pub tax_code: Option<String>,
    pub description: String,
    pub amount_cents: i64,
    pub status: String,
    pub due_date: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::financial_records)]
pub struct NewFinancialRecord {
    pub project_id: Option<i32>,
    pub kind: String,
    pub category: String,
    pub ticket_type_id: Option<i32>,
    pub party_id: Option<i32>,
    pub contract_id: Option<i32>,
    pub invoice_number: Option<String>,
    pub staff_name: Option<String>,
    pub tax_code: Option<String>,
    pub description: String,
    pub amount_cents: i64,
    pub status: String,
    pub due_date: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

/// When the details change every category column is rewritten so fields of
/// the previous variant do not linger.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::financial_records)]
pub struct FinancialRecordChangeset {
    pub project_id: Option<Option<i32>>,
    pub kind: Option<String>,
    pub category: Option<String>,
    pub ticket_type_id: Option<Option<i32>>,
    pub party_id: Option<Option<i32>>,
    pub contract_id: Option<Option<i32>>,
    pub invoice_number: Option<Option<String>>,
    pub staff_name: Option<Option<String>>,
    pub tax_code: Option<Option<String>>,
    pub description: Option<String>,
    pub amount_cents: Option<i64>,
    pub status: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub paid_on: Option<Option<NaiveDate>>,
    pub payment_method: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<FinancialRecord> for DomainFinancialRecord {
    type Error = TypeConstraintError;

    fn try_from(record: FinancialRecord) -> Result<Self, Self::Error> {
        let details = FinancialDetails::from_columns(FinancialColumns {
            category: record.category,
            ticket_type_id: record.ticket_type_id,
            party_id: record.party_id,
            contract_id: record.contract_id,
            invoice_number: record.invoice_number,
            staff_name: record.staff_name,
            tax_code: record.tax_code,
        })?;
        Ok(Self {
            id: record.id.try_into()?,
            project_id: record.project_id.map(ProjectId::new).transpose()?,
            kind: FinancialKind::try_from(record.kind)?,
            details,
            description: Description::new(record.description)?,
            amount: Money::from_cents(record.amount_cents),
            status: FinancialStatus::try_from(record.status)?,
            due_date: record.due_date,
            paid_on: record.paid_on,
            payment_method: record
                .payment_method
                .map(PaymentMethod::try_from)
                .transpose()?,
            created_at: record.created_at,
            updated_at: record.updated_at,
            project: None,
        })
    }
}

impl From<&DomainNewFinancialRecord> for NewFinancialRecord {
    fn from(record: &DomainNewFinancialRecord) -> Self {
        let columns = record.details.to_columns();
        Self {
            project_id: record.project_id.map(ProjectId::get),
            kind: record.kind.into(),
            category: columns.category,
            ticket_type_id: columns.ticket_type_id,
            party_id: columns.party_id,
            contract_id: columns.contract_id,
            invoice_number: columns.invoice_number,
            staff_name: columns.staff_name,
            tax_code: columns.tax_code,
            description: record.description.to_string(),
            amount_cents: record.amount.cents(),
            status: record.status.into(),
            due_date: record.due_date,
            paid_on: record.paid_on,
            payment_method: record.payment_method.map(String::from),
        }
    }
}

impl From<&DomainFinancialRecordPatch> for FinancialRecordChangeset {
    fn from(patch: &DomainFinancialRecordPatch) -> Self {
        let columns = patch.details.as_ref().map(FinancialDetails::to_columns);
        let column = |pick: fn(&FinancialColumns) -> Option<i32>| columns.as_ref().map(pick);
        let text = |pick: fn(&FinancialColumns) -> Option<String>| columns.as_ref().map(pick);
        Self {
            project_id: patch.project_id.map(|id| id.map(ProjectId::get)),
            kind: patch.kind.map(String::from),
            category: columns.as_ref().map(|c| c.category.clone()),
            ticket_type_id: column(|c| c.ticket_type_id),
            party_id: column(|c| c.party_id),
            contract_id: column(|c| c.contract_id),
            invoice_number: text(|c| c.invoice_number.clone()),
            staff_name: text(|c| c.staff_name.clone()),
            tax_code: text(|c| c.tax_code.clone()),
            description: patch.description.as_ref().map(ToString::to_string),
            amount_cents: patch.amount.map(Money::cents),
            status: patch.status.map(String::from),
            due_date: patch.due_date,
            paid_on: patch.paid_on,
            payment_method: patch.payment_method.map(|m| m.map(String::from)),
            updated_at: touch(),
        }
    }
}

/// Diesel model representing the `closings` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::closings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Closing {
    pub id: i32,
    pub project_id: Option<i32>,
    pub regime: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub revenue_cents: i64,
    pub expense_cents: i64,
    pub net_cents: i64,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::closings)]
pub struct NewClosing {
    pub project_id: Option<i32>,
    pub regime: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub revenue_cents: i64,
    pub expense_cents: i64,
    pub net_cents: i64,
    pub notes: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::closings)]
pub struct ClosingChangeset {
    pub notes: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Closing> for DomainClosing {
    type Error = TypeConstraintError;

    fn try_from(closing: Closing) -> Result<Self, Self::Error> {
        Ok(Self {
            id: closing.id.try_into()?,
            project_id: closing.project_id.map(ProjectId::new).transpose()?,
            regime: Regime::try_from(closing.regime)?,
            period_start: closing.period_start,
            period_end: closing.period_end,
            revenue: Money::from_cents(closing.revenue_cents),
            expense: Money::from_cents(closing.expense_cents),
            net: Money::from_cents(closing.net_cents),
            notes: closing.notes,
            created_at: closing.created_at,
            updated_at: closing.updated_at,
        })
    }
}

impl From<&DomainNewClosing> for NewClosing {
    fn from(closing: &DomainNewClosing) -> Self {
        Self {
            project_id: closing.project_id.map(ProjectId::get),
            regime: closing.regime.into(),
            period_start: closing.period_start,
            period_end: closing.period_end,
            revenue_cents: closing.revenue.cents(),
            expense_cents: closing.expense.cents(),
            net_cents: closing.net.cents(),
            notes: closing.notes.clone(),
        }
    }
}

impl From<&DomainClosingPatch> for ClosingChangeset {
    fn from(patch: &DomainClosingPatch) -> Self {
        Self {
            notes: patch.notes.clone(),
            updated_at: touch(),
        }
    }
}
