//! CRUD services shared by every record family.

use serde::Serialize;

use crate::domain::auth::AuthenticatedUser;
use crate::filters::{
    Confirmation, Filterable, ListFilter, StatusTabs, TabCount, TabSelection, partition,
    tab_counts,
};
use crate::forms::{FormError, RecordForm};
use crate::repository::{ListQuery, RecordDeleter, RecordReader, RecordWriter};
use crate::services::{
    AccessControlled, ServiceError, ServiceResult, authorize, repository_failure, store_failure,
};
use crate::store::EntityStore;

/// Lists records matching `query` on the Gateway and `filter` locally.
pub fn list_records<R, G>(
    user: &AuthenticatedUser,
    repo: &G,
    query: &ListQuery,
    filter: &ListFilter,
) -> ServiceResult<Vec<R>>
where
    R: AccessControlled + Filterable,
    G: RecordReader<R>,
{
    authorize(user, R::PERMISSION)?;

    let mut store = EntityStore::<R>::new();
    let items = store
        .fetch_all(repo, query)
        .map_err(|e| store_failure("list", R::ENTITY, e))?;
    Ok(filter.apply(items).into_iter().cloned().collect())
}

/// A list view split into status tabs.
#[derive(Debug, Serialize)]
pub struct TabbedList<R, S> {
    /// Counts over the whole collection, before any filter.
    pub tabs: Vec<TabCount<S>>,
    /// Items of the selected tab that match the filter.
    pub items: Vec<R>,
}

pub fn list_tabbed<R, G>(
    user: &AuthenticatedUser,
    repo: &G,
    query: &ListQuery,
    filter: &ListFilter,
    selection: TabSelection<R::Status>,
) -> ServiceResult<TabbedList<R, R::Status>>
where
    R: AccessControlled + Filterable + StatusTabs,
    G: RecordReader<R>,
{
    authorize(user, R::PERMISSION)?;

    let mut store = EntityStore::<R>::new();
    let all = store
        .fetch_all(repo, query)
        .map_err(|e| store_failure("list", R::ENTITY, e))?;
    let items = partition(all, selection)
        .into_iter()
        .filter(|item| filter.matches(*item))
        .cloned()
        .collect();
    Ok(TabbedList {
        tabs: tab_counts(all),
        items,
    })
}

pub fn get_record<R, G>(user: &AuthenticatedUser, repo: &G, id: R::Id) -> ServiceResult<R>
where
    R: AccessControlled,
    G: RecordReader<R>,
{
    authorize(user, R::PERMISSION)?;

    match repo.get_record(id) {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => Err(repository_failure("get", R::ENTITY, e)),
    }
}

pub fn create_record<R, G, F>(user: &AuthenticatedUser, repo: &G, form: F) -> ServiceResult<R>
where
    R: AccessControlled,
    G: RecordWriter<R>,
    F: RecordForm<R>,
{
    authorize(user, R::PERMISSION)?;

    let new = form.into_new()?;
    let mut store = EntityStore::<R>::new();
    let record = store
        .create(repo, &new)
        .map_err(|e| store_failure("create", R::ENTITY, e))?;
    log::info!("Created {} {}", R::ENTITY, record.id());
    Ok(record)
}

pub fn update_record<R, G, F>(
    user: &AuthenticatedUser,
    repo: &G,
    id: R::Id,
    form: F,
) -> ServiceResult<R>
where
    R: AccessControlled,
    G: RecordReader<R> + RecordWriter<R>,
    F: RecordForm<R>,
{
    let current = get_record::<R, G>(user, repo, id)?;
    let patch = form.into_patch(&current)?;

    let mut store = EntityStore::<R>::new();
    store
        .update(repo, id, &patch)
        .map_err(|e| store_failure("update", R::ENTITY, e))
}

pub fn delete_record<R, G>(
    user: &AuthenticatedUser,
    repo: &G,
    id: R::Id,
    confirmation: Confirmation,
) -> ServiceResult<()>
where
    R: AccessControlled,
    G: RecordDeleter<R>,
{
    authorize(user, R::PERMISSION)?;
    require_confirmation(confirmation)?;

    let mut store = EntityStore::<R>::new();
    store
        .delete(repo, id)
        .map_err(|e| store_failure("delete", R::ENTITY, e))?;
    log::info!("Deleted {} {id}", R::ENTITY);
    Ok(())
}

pub(crate) fn require_confirmation(confirmation: Confirmation) -> ServiceResult<()> {
    if confirmation.is_confirmed() {
        Ok(())
    } else {
        Err(FormError::field("confirm", "this operation must be confirmed").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::company::Company;
    use crate::domain::types::CompanyId;
    use crate::forms::registry::CompanyForm;
    use crate::repository::RepositoryError;
    use crate::repository::test::TestRepository;
    use crate::services::test_support::user_with;

    fn form(name: &str) -> CompanyForm {
        CompanyForm {
            name: name.into(),
            tax_id: "12.345.678/0001-90".into(),
            email: None,
            phone: None,
        }
    }

    #[test]
    fn missing_permission_is_unauthorized() {
        let repo = TestRepository::new();
        let user = user_with(&["tickets"]);
        let result = create_record::<Company, _, _>(&user, &repo, form("Arena"));
        assert_eq!(result.unwrap_err(), ServiceError::Unauthorized);
        assert_eq!(repo.calls(), 0);
    }

    #[test]
    fn invalid_form_never_reaches_the_gateway() {
        let repo = TestRepository::new();
        let user = user_with(&["registry"]);
        let result = create_record::<Company, _, _>(&user, &repo, form(" "));
        assert!(matches!(result, Err(ServiceError::Form(_))));
        assert_eq!(repo.calls(), 0);
    }

    #[test]
    fn created_records_are_listed_and_filtered() {
        let repo = TestRepository::new();
        let user = user_with(&["admin"]);
        create_record::<Company, _, _>(&user, &repo, form("Arena Eventos")).unwrap();
        create_record::<Company, _, _>(&user, &repo, form("Teatro Municipal")).unwrap();

        let filter = ListFilter {
            text: Some("teatro".into()),
            ..ListFilter::default()
        };
        let items: Vec<Company> =
            list_records(&user, &repo, &ListQuery::default(), &filter).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Teatro Municipal");
    }

    #[test]
    fn listing_is_ordered_by_name_then_id() {
        let repo = TestRepository::new();
        let user = user_with(&["registry"]);
        for name in ["Teatro Municipal", "Arena Eventos", "Casa de Shows"] {
            create_record::<Company, _, _>(&user, &repo, form(name)).unwrap();
        }

        let items: Vec<Company> =
            list_records(&user, &repo, &ListQuery::default(), &ListFilter::default()).unwrap();
        let names: Vec<&str> = items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Arena Eventos", "Casa de Shows", "Teatro Municipal"]);
    }

    #[test]
    fn update_of_missing_record_is_not_found() {
        let repo = TestRepository::new();
        let user = user_with(&["registry"]);
        let result = update_record::<Company, _, _>(
            &user,
            &repo,
            CompanyId::new(42).unwrap(),
            form("Arena"),
        );
        assert_eq!(result.unwrap_err(), ServiceError::NotFound);
    }

    #[test]
    fn delete_requires_confirmation() {
        let repo = TestRepository::new();
        let user = user_with(&["registry"]);
        let company = create_record::<Company, _, _>(&user, &repo, form("Arena")).unwrap();

        let result = delete_record::<Company, _>(&user, &repo, company.id, Confirmation::default());
        assert!(matches!(result, Err(ServiceError::Form(_))));

        delete_record::<Company, _>(&user, &repo, company.id, Confirmation::confirmed()).unwrap();
        let result = get_record::<Company, _>(&user, &repo, company.id);
        assert_eq!(result.unwrap_err(), ServiceError::NotFound);
    }

    #[test]
    fn gateway_failures_become_internal_errors() {
        let repo = TestRepository::new();
        let user = user_with(&["registry"]);
        repo.fail_next(RepositoryError::ValidationError("corrupt row".into()));
        let result =
            list_records::<Company, _>(&user, &repo, &ListQuery::default(), &ListFilter::default());
        assert_eq!(result.unwrap_err(), ServiceError::Internal);
    }

    #[test]
    fn conflicts_are_reported_with_their_message() {
        let repo = TestRepository::new();
        let user = user_with(&["registry"]);
        repo.fail_next(RepositoryError::Conflict("UNIQUE constraint failed".into()));
        let result = create_record::<Company, _, _>(&user, &repo, form("Arena"));
        assert_eq!(
            result.unwrap_err(),
            ServiceError::Conflict("UNIQUE constraint failed".into())
        );
    }

    #[test]
    fn tab_counts_ignore_text_and_category_filters() {
        use crate::domain::finance::{FinancialDetails, FinancialRecord, NewFinancialRecord};
        use crate::domain::types::{Description, FinancialKind, FinancialStatus, Money};
        use chrono::NaiveDate;

        let repo = TestRepository::new();
        let user = user_with(&["finance"]);
        let due = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        for (description, status) in [
            ("Aluguel do palco", FinancialStatus::Paid),
            ("Som e luz", FinancialStatus::Pending),
            ("Palco extra", FinancialStatus::Pending),
        ] {
            repo.seed::<FinancialRecord>(&NewFinancialRecord {
                project_id: None,
                kind: FinancialKind::Expense,
                details: FinancialDetails::Other,
                description: Description::new(description).unwrap(),
                amount: Money::from_cents(1_000),
                status,
                due_date: due,
                paid_on: None,
                payment_method: None,
            });
        }

        let filter = ListFilter {
            text: Some("palco".into()),
            category: Some("payroll".into()),
            ..ListFilter::default()
        };
        let list = list_tabbed::<FinancialRecord, _>(
            &user,
            &repo,
            &ListQuery::default(),
            &filter,
            TabSelection::Only(FinancialStatus::Pending),
        )
        .unwrap();
        assert!(list.items.is_empty());
        assert_eq!(list.tabs[0].count, 3);
        assert!(list.tabs.contains(&TabCount {
            status: Some(FinancialStatus::Pending),
            count: 2
        }));

        let filter = ListFilter {
            text: Some("PALCO".into()),
            ..ListFilter::default()
        };
        let list = list_tabbed::<FinancialRecord, _>(
            &user,
            &repo,
            &ListQuery::default(),
            &filter,
            TabSelection::Only(FinancialStatus::Pending),
        )
        .unwrap();
        let names: Vec<&str> = list.items.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(names, vec!["Palco extra"]);
        assert_eq!(list.tabs[0].count, 3);
    }
}
