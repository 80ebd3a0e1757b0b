use crate::domain::auth::AuthenticatedUser;
use crate::domain::finance::{Closing, FinancialRecord};
use crate::domain::types::{ClosingId, ProjectId, Regime};
use crate::filters::{DateRange, ListFilter};
use crate::forms::finance::ClosingForm;
use crate::reports::finance::{FinancialSummary, closing_draft, financial_summary as summarize};
use crate::repository::{ListQuery, RecordReader, RecordWriter};
use crate::services::export::{DownloadFile, DownloadFormat, ExportCell, render_download_file};
use crate::services::{
    FINANCE_PERMISSION, ServiceError, ServiceResult, authorize, repository_failure, store_failure,
};
use crate::store::EntityStore;

/// Scope of a financial summary or export.
#[derive(Debug, Clone)]
pub struct FinanceQuery {
    pub project_id: Option<i32>,
    pub regime: Regime,
    pub range: DateRange,
}

impl Default for FinanceQuery {
    fn default() -> Self {
        Self {
            project_id: None,
            regime: Regime::Accrual,
            range: DateRange::default(),
        }
    }
}

fn load_records<R>(repo: &R, project_id: Option<i32>) -> ServiceResult<Vec<FinancialRecord>>
where
    R: RecordReader<FinancialRecord>,
{
    let mut query = ListQuery::default().with_relations();
    if let Some(project_id) = project_id {
        query = query.parent(ProjectId::new(project_id)?);
    }
    let mut store = EntityStore::<FinancialRecord>::new();
    store
        .fetch_all(repo, &query)
        .map(<[FinancialRecord]>::to_vec)
        .map_err(|e| store_failure("list", "financial record", e))
}

pub fn financial_summary<R>(
    user: &AuthenticatedUser,
    repo: &R,
    query: &FinanceQuery,
) -> ServiceResult<FinancialSummary>
where
    R: RecordReader<FinancialRecord>,
{
    authorize(user, FINANCE_PERMISSION)?;

    let records = load_records(repo, query.project_id)?;
    Ok(summarize(&records, query.regime, &query.range))
}

/// Freezes the regime totals of a period into a new closing.
pub fn close_period<R>(
    user: &AuthenticatedUser,
    repo: &R,
    form: ClosingForm,
) -> ServiceResult<Closing>
where
    R: RecordReader<FinancialRecord> + RecordWriter<Closing>,
{
    authorize(user, FINANCE_PERMISSION)?;

    let request = form.into_request()?;
    let records = load_records(repo, request.project_id.map(ProjectId::get))?;
    let draft = closing_draft(
        &records,
        request.project_id,
        request.regime,
        request.period_start,
        request.period_end,
        request.notes,
    );

    let mut store = EntityStore::<Closing>::new();
    let closing = store
        .create(repo, &draft)
        .map_err(|e| store_failure("create", "closing", e))?;
    log::info!(
        "Closed {} period {}..{} with net {}",
        closing.regime,
        closing.period_start,
        closing.period_end,
        closing.net
    );
    Ok(closing)
}

/// Only the notes of a closing are editable.
pub fn update_closing<R>(
    user: &AuthenticatedUser,
    repo: &R,
    id: ClosingId,
    form: ClosingForm,
) -> ServiceResult<Closing>
where
    R: RecordReader<Closing> + RecordWriter<Closing>,
{
    authorize(user, FINANCE_PERMISSION)?;

    match repo.get_record(id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => return Err(repository_failure("get", "closing", e)),
    }
    let patch = form.into_patch()?;
    let mut store = EntityStore::<Closing>::new();
    store
        .update(repo, id, &patch)
        .map_err(|e| store_failure("update", "closing", e))
}

const EXPORT_HEADERS: [&str; 10] = [
    "id",
    "project",
    "kind",
    "category",
    "description",
    "status",
    "due_date",
    "paid_on",
    "payment_method",
    "amount",
];

/// Financial records in `query`'s range by due date, as a spreadsheet.
pub fn export_records<R>(
    user: &AuthenticatedUser,
    repo: &R,
    query: &FinanceQuery,
    format: DownloadFormat,
) -> ServiceResult<DownloadFile>
where
    R: RecordReader<FinancialRecord>,
{
    authorize(user, FINANCE_PERMISSION)?;

    let records = load_records(repo, query.project_id)?;
    let filter = ListFilter {
        range: query.range,
        ..ListFilter::default()
    };
    let rows: Vec<Vec<ExportCell>> = filter
        .apply(&records)
        .into_iter()
        .map(|record| {
            vec![
                ExportCell::text(record.id.to_string()),
                record
                    .project
                    .as_ref()
                    .map_or(ExportCell::Empty, |p| ExportCell::text(p.name.as_str())),
                ExportCell::text(record.kind.as_str()),
                ExportCell::text(record.category().as_str()),
                ExportCell::text(record.description.as_str()),
                ExportCell::text(record.status.as_str()),
                ExportCell::Date(record.due_date),
                ExportCell::optional_date(record.paid_on),
                record
                    .payment_method
                    .map_or(ExportCell::Empty, |m| ExportCell::text(m.as_str())),
                ExportCell::Amount(record.amount),
            ]
        })
        .collect();

    render_download_file("financial-records", format, &EXPORT_HEADERS, &rows).map_err(|e| {
        log::error!("Failed to render financial records export: {e}");
        ServiceError::Internal
    })
}
