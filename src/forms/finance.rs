//! Forms for financial records and period closings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::finance::{
    Closing, ClosingPatch, FinancialColumns, FinancialDetails, FinancialRecord,
    FinancialRecordPatch, NewFinancialRecord,
};
use crate::domain::types::{
    Description, FinancialCategory, FinancialKind, FinancialStatus, Money, PaymentMethod,
    ProjectId, Regime,
};
use crate::forms::{
    FieldCheck, FormError, RelationChoice, blank_to_none, date_input, money_input, parse_choice,
    parse_date, parse_optional_choice, parse_optional_date, record_form,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct FinancialRecordForm {
    pub project_id: RelationChoice,
    pub kind: String,
    pub category: String,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    pub amount: String,
    pub status: String,
    pub due_date: String,
    pub paid_on: Option<String>,
    pub payment_method: Option<String>,
    pub ticket_type_id: Option<i32>,
    pub party_id: Option<i32>,
    pub contract_id: Option<i32>,
    pub invoice_number: Option<String>,
    pub staff_name: Option<String>,
    pub tax_code: Option<String>,
}

impl From<&FinancialRecord> for FinancialRecordForm {
    fn from(record: &FinancialRecord) -> Self {
        let columns = record.details.to_columns();
        Self {
            project_id: RelationChoice::from_optional(record.project_id),
            kind: record.kind.to_string(),
            category: columns.category,
            description: record.description.to_string(),
            amount: money_input(record.amount),
            status: record.status.to_string(),
            due_date: date_input(record.due_date),
            paid_on: record.paid_on.map(date_input),
            payment_method: record.payment_method.map(|m| m.to_string()),
            ticket_type_id: columns.ticket_type_id,
            party_id: columns.party_id,
            contract_id: columns.contract_id,
            invoice_number: columns.invoice_number,
            staff_name: columns.staff_name,
            tax_code: columns.tax_code,
        }
    }
}

impl FinancialRecordForm {
    pub fn into_new(self) -> Result<NewFinancialRecord, FormError> {
        let mut check = FieldCheck::validate(&self);
        let project_id = check.take("project_id", self.project_id.optional(ProjectId::new));
        let kind = check.take("kind", parse_choice::<FinancialKind>(&self.kind));
        let category = check.take("category", parse_choice::<FinancialCategory>(&self.category));
        let description = check.take("description", Description::new(&self.description));
        let amount = check.take("amount", Money::parse_positive(&self.amount, "amount"));
        let status = check.take("status", parse_choice::<FinancialStatus>(&self.status));
        let due_date = check.take("due_date", parse_date(&self.due_date));
        let paid_on = check.take("paid_on", parse_optional_date(self.paid_on.as_deref()));
        let payment_method = check.take(
            "payment_method",
            parse_optional_choice::<PaymentMethod>(self.payment_method.as_deref()),
        );

        let details = category.and_then(|category| self.details(category, &mut check));

        if let (Some(kind), Some(category)) = (kind, category)
            && !category.accepts(kind)
        {
            check.push(
                "category",
                format!("category {category} cannot be booked as {kind}"),
            );
        }
        if status == Some(FinancialStatus::Paid) && paid_on.is_some_and(|d| d.is_none()) {
            check.push("paid_on", "paid records require a payment date");
        }

        let (
            Some(project_id),
            Some(kind),
            Some(details),
            Some(description),
            Some(amount),
            Some(status),
            Some(due_date),
            Some(paid_on),
            Some(payment_method),
        ) = (
            project_id,
            kind,
            details,
            description,
            amount,
            status,
            due_date,
            paid_on,
            payment_method,
        )
        else {
            return Err(check.into_error());
        };
        check.finish()?;
        Ok(NewFinancialRecord {
            project_id,
            kind,
            details,
            description,
            amount,
            status,
            due_date,
            paid_on,
            payment_method,
        })
    }

    pub fn into_patch(self) -> Result<FinancialRecordPatch, FormError> {
        let new = self.into_new()?;
        Ok(FinancialRecordPatch {
            project_id: Some(new.project_id),
            kind: Some(new.kind),
            details: Some(new.details),
            description: Some(new.description),
            amount: Some(new.amount),
            status: Some(new.status),
            due_date: Some(new.due_date),
            paid_on: Some(new.paid_on),
            payment_method: Some(new.payment_method),
        })
    }

    /// Category-specific fields, reported under their own field names.
    fn details(
        &self,
        category: FinancialCategory,
        check: &mut FieldCheck,
    ) -> Option<FinancialDetails> {
        let required = match category {
            FinancialCategory::Sponsorship | FinancialCategory::SupplierPayment => {
                vec![("party_id", self.party_id.is_some())]
            }
            FinancialCategory::Payroll => vec![(
                "staff_name",
                blank_to_none(self.staff_name.as_deref()).is_some(),
            )],
            FinancialCategory::Tax => vec![(
                "tax_code",
                blank_to_none(self.tax_code.as_deref()).is_some(),
            )],
            FinancialCategory::TicketSales | FinancialCategory::Other => Vec::new(),
        };
        let mut missing = false;
        for (field, present) in required {
            if !present {
                check.push(field, format!("{field} is required for {category} records"));
                missing = true;
            }
        }
        if missing {
            return None;
        }

        let columns = FinancialColumns {
            category: category.as_str().to_string(),
            ticket_type_id: self.ticket_type_id,
            party_id: self.party_id,
            contract_id: self.contract_id,
            invoice_number: self.invoice_number.clone(),
            staff_name: self.staff_name.clone(),
            tax_code: self.tax_code.clone(),
        };
        check.take("category", FinancialDetails::from_columns(columns))
    }
}

/// Period to close. Totals are computed by the service, not submitted.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ClosingForm {
    pub project_id: RelationChoice,
    pub regime: String,
    pub period_start: String,
    pub period_end: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Validated closing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosingRequest {
    pub project_id: Option<ProjectId>,
    pub regime: Regime,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub notes: Option<String>,
}

impl From<&Closing> for ClosingForm {
    fn from(closing: &Closing) -> Self {
        Self {
            project_id: RelationChoice::from_optional(closing.project_id),
            regime: closing.regime.to_string(),
            period_start: date_input(closing.period_start),
            period_end: date_input(closing.period_end),
            notes: closing.notes.clone(),
        }
    }
}

impl ClosingForm {
    pub fn into_request(self) -> Result<ClosingRequest, FormError> {
        let mut check = FieldCheck::validate(&self);
        let project_id = check.take("project_id", self.project_id.optional(ProjectId::new));
        let regime = check.take("regime", parse_choice::<Regime>(&self.regime));
        let period_start = check.take("period_start", parse_date(&self.period_start));
        let period_end = check.take("period_end", parse_date(&self.period_end));
        let (Some(project_id), Some(regime), Some(period_start), Some(period_end)) =
            (project_id, regime, period_start, period_end)
        else {
            return Err(check.into_error());
        };
        if period_end < period_start {
            check.push("period_end", "period end must not be before period start");
        }
        check.finish()?;
        Ok(ClosingRequest {
            project_id,
            regime,
            period_start,
            period_end,
            notes: blank_to_none(self.notes.as_deref()),
        })
    }

    /// Only the notes of an existing closing can be edited.
    pub fn into_patch(self) -> Result<ClosingPatch, FormError> {
        let request = self.into_request()?;
        Ok(ClosingPatch {
            notes: Some(request.notes),
        })
    }
}

record_form!(FinancialRecordForm => FinancialRecord);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PartyId;

    fn form(kind: &str, category: &str) -> FinancialRecordForm {
        FinancialRecordForm {
            project_id: RelationChoice::None,
            kind: kind.into(),
            category: category.into(),
            description: "Patrocínio master".into(),
            amount: "20.000,00".into(),
            status: "pending".into(),
            due_date: "2025-02-10".into(),
            ..FinancialRecordForm::default()
        }
    }

    #[test]
    fn sponsorship_requires_party() {
        let err = form("revenue", "sponsorship").into_new().unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("party_id"));

        let mut valid = form("revenue", "sponsorship");
        valid.party_id = Some(5);
        valid.staff_name = Some("ignored".into());
        let new = valid.into_new().unwrap();
        assert_eq!(
            new.details,
            FinancialDetails::Sponsorship {
                party_id: PartyId::new(5).unwrap(),
                contract_id: None,
            }
        );
        assert_eq!(new.amount, Money::from_cents(2_000_000));
    }

    #[test]
    fn category_must_accept_kind() {
        let mut payroll_revenue = form("revenue", "payroll");
        payroll_revenue.staff_name = Some("Joana".into());
        let err = payroll_revenue.into_new().unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("category"));

        assert!(form("expense", "other").into_new().is_ok());
        assert!(form("revenue", "other").into_new().is_ok());
    }

    #[test]
    fn paid_status_requires_payment_date() {
        let mut paid = form("expense", "other");
        paid.status = "paid".into();
        let err = paid.clone().into_new().unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("paid_on"));

        paid.paid_on = Some("2025-02-11".into());
        assert!(paid.into_new().is_ok());
    }

    #[test]
    fn amount_must_be_positive() {
        let mut zero = form("expense", "other");
        zero.amount = "0".into();
        let err = zero.into_new().unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("amount"));
    }

    #[test]
    fn closing_period_must_be_ordered() {
        let form = ClosingForm {
            project_id: RelationChoice::None,
            regime: "cash".into(),
            period_start: "2025-02-01".into(),
            period_end: "2025-01-31".into(),
            notes: None,
        };
        let err = form.into_request().unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("period_end"));
    }
}
