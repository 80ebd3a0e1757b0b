//! Client-side filtering and tab partitions over cached collections.

use std::fmt::Debug;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::access::{Group, User};
use crate::domain::company::Company;
use crate::domain::contract::Contract;
use crate::domain::finance::{Closing, FinancialRecord};
use crate::domain::party::Party;
use crate::domain::project::Project;
use crate::domain::ticket::{TicketSale, TicketType};
use crate::domain::types::{ContractStatus, FinancialStatus, ProjectStatus, TypeConstraintError};
use crate::domain::venue::Venue;

/// Describes which attributes of a record the list filters look at.
pub trait Filterable {
    /// Text fields matched by the free-text search.
    fn search_fields(&self) -> Vec<&str>;

    fn category(&self) -> Option<&str> {
        None
    }

    fn status(&self) -> Option<&str> {
        None
    }

    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

/// Inclusive date range; an open bound matches everything on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Filter state of a list view. `None` means the filter is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListFilter {
    pub text: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub range: DateRange,
}

impl ListFilter {
    pub fn matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        self.matches_text(item)
            && self
                .category
                .as_deref()
                .is_none_or(|category| item.category() == Some(category))
            && self
                .status
                .as_deref()
                .is_none_or(|status| item.status() == Some(status))
            && (self.range.is_open() || item.date().is_some_and(|d| self.range.contains(d)))
    }

    pub fn apply<'a, T: Filterable>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }

    fn matches_text<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        let Some(needle) = self
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        item.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Records shown in status tabs.
pub trait StatusTabs {
    type Status: Copy
        + Eq
        + Debug
        + Serialize
        + for<'a> TryFrom<&'a str, Error = TypeConstraintError>
        + 'static;

    /// Closed set of statuses, one tab each, in display order.
    const STATUSES: &'static [Self::Status];

    fn tab_status(&self) -> Self::Status;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabSelection<S> {
    All,
    Only(S),
}

impl<S> TabSelection<S>
where
    S: for<'a> TryFrom<&'a str, Error = TypeConstraintError>,
{
    /// A missing, blank or `all` tab selects everything.
    pub fn parse(tab: Option<&str>) -> Result<Self, TypeConstraintError> {
        match tab.map(str::trim) {
            None | Some("") | Some("all") => Ok(Self::All),
            Some(status) => S::try_from(status).map(Self::Only),
        }
    }
}

/// Badge of one tab. `status` is `None` for the `All` tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TabCount<S> {
    pub status: Option<S>,
    pub count: usize,
}

/// Items shown under `selection`.
pub fn partition<T: StatusTabs>(items: &[T], selection: TabSelection<T::Status>) -> Vec<&T> {
    items
        .iter()
        .filter(|item| match selection {
            TabSelection::All => true,
            TabSelection::Only(status) => item.tab_status() == status,
        })
        .collect()
}

/// Badge counts for every tab, computed over the whole collection. The
/// `All` entry comes first.
pub fn tab_counts<T: StatusTabs>(items: &[T]) -> Vec<TabCount<T::Status>> {
    std::iter::once(TabCount {
        status: None,
        count: items.len(),
    })
    .chain(T::STATUSES.iter().map(|status| TabCount {
        status: Some(*status),
        count: items.iter().filter(|i| i.tab_status() == *status).count(),
    }))
    .collect()
}

/// Explicit confirmation required by destructive operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub confirm: bool,
}

impl Confirmation {
    pub const fn confirmed() -> Self {
        Self { confirm: true }
    }

    pub const fn is_confirmed(self) -> bool {
        self.confirm
    }
}

impl Filterable for Company {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.tax_id.as_str()];
        fields.extend(self.email.as_ref().map(|e| e.as_str()));
        fields
    }
}

impl Filterable for Venue {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.city.as_deref());
        fields.extend(self.address.as_deref());
        fields
    }
}

impl Filterable for Party {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.document.as_deref());
        fields.extend(self.email.as_ref().map(|e| e.as_str()));
        fields
    }

    fn category(&self) -> Option<&str> {
        Some(self.kind.as_str())
    }
}

impl Filterable for Project {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.start_date)
    }
}

impl Filterable for Contract {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.number.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.start_date)
    }
}

impl Filterable for TicketType {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn status(&self) -> Option<&str> {
        Some(if self.active { "active" } else { "inactive" })
    }
}

impl Filterable for TicketSale {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        fields.extend(self.buyer_name.as_deref());
        fields.extend(self.ticket.as_ref().map(|t| t.name.as_str()));
        fields
    }

    fn category(&self) -> Option<&str> {
        Some(self.channel.as_str())
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.sold_at.date())
    }
}

impl Filterable for FinancialRecord {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.description.as_str()];
        fields.extend(self.project.as_ref().map(|p| p.name.as_str()));
        fields
    }

    fn category(&self) -> Option<&str> {
        Some(self.category().as_str())
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.due_date)
    }
}

impl Filterable for Closing {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.regime.as_str()];
        fields.extend(self.notes.as_deref());
        fields
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.period_start)
    }
}

impl Filterable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn status(&self) -> Option<&str> {
        Some(if self.active { "active" } else { "inactive" })
    }
}

impl Filterable for Group {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }

    fn status(&self) -> Option<&str> {
        Some(if self.active { "active" } else { "inactive" })
    }
}

impl StatusTabs for Project {
    type Status = ProjectStatus;
    const STATUSES: &'static [ProjectStatus] = ProjectStatus::ALL;

    fn tab_status(&self) -> ProjectStatus {
        self.status
    }
}

impl StatusTabs for Contract {
    type Status = ContractStatus;
    const STATUSES: &'static [ContractStatus] = ContractStatus::ALL;

    fn tab_status(&self) -> ContractStatus {
        self.status
    }
}

impl StatusTabs for FinancialRecord {
    type Status = FinancialStatus;
    const STATUSES: &'static [FinancialStatus] = FinancialStatus::ALL;

    fn tab_status(&self) -> FinancialStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::domain::finance::FinancialDetails;
    use crate::domain::types::{
        Description, FinancialKind, FinancialRecordId, Money, ProjectId, ProjectName,
    };

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn record(id: i32, description: &str, status: FinancialStatus, due: u32) -> FinancialRecord {
        let epoch = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        FinancialRecord {
            id: FinancialRecordId::new(id).unwrap(),
            project_id: None,
            kind: FinancialKind::Expense,
            details: FinancialDetails::Other,
            description: Description::new(description).unwrap(),
            amount: Money::from_cents(1_000),
            status,
            due_date: date(due),
            paid_on: None,
            payment_method: None,
            created_at: epoch,
            updated_at: epoch,
            project: None,
        }
    }

    fn records() -> Vec<FinancialRecord> {
        vec![
            record(1, "Aluguel do palco", FinancialStatus::Paid, 1),
            record(2, "Som e luz", FinancialStatus::Pending, 10),
            record(3, "Segurança", FinancialStatus::Pending, 20),
            record(4, "Palco extra", FinancialStatus::Cancelled, 31),
        ]
    }

    #[test]
    fn unset_filter_returns_everything() {
        let items = records();
        assert_eq!(ListFilter::default().apply(&items).len(), 4);
    }

    #[test]
    fn text_search_is_case_insensitive_substring() {
        let items = records();
        let filter = ListFilter {
            text: Some("PALCO".into()),
            ..ListFilter::default()
        };
        let ids: Vec<i32> = filter.apply(&items).iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn text_search_covers_relation_names() {
        let mut item = record(1, "Cachê", FinancialStatus::Paid, 1);
        item.project = Some(crate::domain::project::ProjectRef {
            id: ProjectId::new(1).unwrap(),
            name: ProjectName::new("Festival de Verão").unwrap(),
        });
        let filter = ListFilter {
            text: Some("verão".into()),
            ..ListFilter::default()
        };
        assert!(filter.matches(&item));
    }

    #[test]
    fn predicates_are_and_composed() {
        let items = records();
        let filter = ListFilter {
            text: Some("a".into()),
            status: Some("pending".into()),
            range: DateRange::new(Some(date(5)), Some(date(20))),
            ..ListFilter::default()
        };
        let ids: Vec<i32> = filter.apply(&items).iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let range = DateRange::new(Some(date(10)), Some(date(20)));
        assert!(range.contains(date(10)));
        assert!(range.contains(date(20)));
        assert!(!range.contains(date(21)));
        assert!(DateRange::default().contains(date(1)));
    }

    #[test]
    fn category_filter_uses_exact_match() {
        let items = records();
        let filter = ListFilter {
            category: Some("other".into()),
            ..ListFilter::default()
        };
        assert_eq!(filter.apply(&items).len(), 4);
        let filter = ListFilter {
            category: Some("oth".into()),
            ..ListFilter::default()
        };
        assert!(filter.apply(&items).is_empty());
    }

    #[test]
    fn tab_counts_sum_to_collection_size() {
        let items = records();
        let counts = tab_counts(&items);

        assert_eq!(
            counts[0],
            TabCount {
                status: None,
                count: 4
            }
        );
        let per_status: usize = counts[1..].iter().map(|c| c.count).sum();
        assert_eq!(per_status, 4);
        assert!(counts.contains(&TabCount {
            status: Some(FinancialStatus::Pending),
            count: 2
        }));
        assert!(counts.contains(&TabCount {
            status: Some(FinancialStatus::Overdue),
            count: 0
        }));
    }

    #[test]
    fn partition_selects_one_status() {
        let items = records();
        assert_eq!(partition(&items, TabSelection::All).len(), 4);
        let paid = partition(&items, TabSelection::Only(FinancialStatus::Paid));
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id.get(), 1);
    }

    #[test]
    fn tab_selection_parses_all_and_statuses() {
        assert_eq!(
            TabSelection::<FinancialStatus>::parse(None).unwrap(),
            TabSelection::All
        );
        assert_eq!(
            TabSelection::<FinancialStatus>::parse(Some("all")).unwrap(),
            TabSelection::All
        );
        assert_eq!(
            TabSelection::parse(Some("paid")).unwrap(),
            TabSelection::Only(FinancialStatus::Paid)
        );
        assert!(TabSelection::<FinancialStatus>::parse(Some("archived")).is_err());
    }

    #[test]
    fn closings_match_notes_and_period_start() {
        use crate::domain::types::{ClosingId, Regime};

        let epoch = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        let closing = Closing {
            id: ClosingId::new(1).unwrap(),
            project_id: None,
            regime: Regime::Cash,
            period_start: date(1),
            period_end: date(31),
            revenue: Money::ZERO,
            expense: Money::ZERO,
            net: Money::ZERO,
            notes: Some("Fechamento de março".into()),
            created_at: epoch,
            updated_at: epoch,
        };
        let filter = ListFilter {
            text: Some("MARÇO".into()),
            range: DateRange::new(Some(date(1)), Some(date(1))),
            ..ListFilter::default()
        };
        assert!(filter.matches(&closing));
    }
}
