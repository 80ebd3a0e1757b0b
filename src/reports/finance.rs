//! Regime totals and breakdowns over financial records.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::finance::{FinancialRecord, NewClosing};
use crate::domain::types::{FinancialKind, Money, ProjectId, Regime};
use crate::filters::DateRange;
use crate::reports::{Summary, summarize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegimeTotals {
    pub regime: Regime,
    pub revenue: Money,
    pub expense: Money,
    pub net: Money,
    pub count: usize,
}

/// Records that count under `regime` and fall inside `range` by the
/// regime's date (payment date for cash, due date for accrual).
pub fn counted<'a>(
    records: &'a [FinancialRecord],
    regime: Regime,
    range: &DateRange,
) -> Vec<&'a FinancialRecord> {
    records
        .iter()
        .filter(|r| r.counts_under(regime))
        .filter(|r| r.regime_date(regime).is_some_and(|d| range.contains(d)))
        .collect()
}

pub fn regime_totals(
    records: &[FinancialRecord],
    regime: Regime,
    range: &DateRange,
) -> RegimeTotals {
    let counted = counted(records, regime, range);
    let sum_of = |kind: FinancialKind| -> Money {
        counted
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.amount)
            .sum()
    };
    let revenue = sum_of(FinancialKind::Revenue);
    let expense = sum_of(FinancialKind::Expense);
    RegimeTotals {
        regime,
        revenue,
        expense,
        net: revenue - expense,
        count: counted.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub totals: RegimeTotals,
    pub revenue_by_category: Summary,
    pub expense_by_category: Summary,
    pub by_payment_method: Summary,
    /// Every record due in the range, whatever the regime counts.
    pub by_status: Summary,
}

pub fn financial_summary(
    records: &[FinancialRecord],
    regime: Regime,
    range: &DateRange,
) -> FinancialSummary {
    let counted: Vec<FinancialRecord> = counted(records, regime, range)
        .into_iter()
        .cloned()
        .collect();
    let (revenue, expense): (Vec<FinancialRecord>, Vec<FinancialRecord>) = counted
        .iter()
        .cloned()
        .partition(|r| r.kind == FinancialKind::Revenue);
    let due: Vec<FinancialRecord> = records
        .iter()
        .filter(|r| range.contains(r.due_date))
        .cloned()
        .collect();

    let by_category = |items: &[FinancialRecord]| {
        summarize(
            items,
            |r| Some(r.category().as_str().to_string()),
            |r| r.amount,
        )
    };

    FinancialSummary {
        totals: regime_totals(records, regime, range),
        revenue_by_category: by_category(&revenue),
        expense_by_category: by_category(&expense),
        by_payment_method: summarize(
            &counted,
            |r| r.payment_method.map(|m| m.as_str().to_string()),
            |r| r.amount,
        ),
        by_status: summarize(&due, |r| Some(r.status.as_str().to_string()), |r| r.amount),
    }
}

/// Closing for the period, with totals frozen from `records`.
pub fn closing_draft(
    records: &[FinancialRecord],
    project_id: Option<ProjectId>,
    regime: Regime,
    period_start: NaiveDate,
    period_end: NaiveDate,
    notes: Option<String>,
) -> NewClosing {
    let scoped: Vec<FinancialRecord> = records
        .iter()
        .filter(|r| project_id.is_none() || r.project_id == project_id)
        .cloned()
        .collect();
    let totals = regime_totals(
        &scoped,
        regime,
        &DateRange::new(Some(period_start), Some(period_end)),
    );
    NewClosing {
        project_id,
        regime,
        period_start,
        period_end,
        revenue: totals.revenue,
        expense: totals.expense,
        net: totals.net,
        notes,
    }
}
