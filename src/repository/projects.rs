use diesel::prelude::*;

use crate::domain::contract::Contract;
use crate::domain::project::Project;
use crate::domain::types::{ContractId, ProjectId};
use crate::models::contract::{
    Contract as DbContract, ContractChangeset, NewContract as DbNewContract,
};
use crate::models::project::{NewProject as DbNewProject, Project as DbProject, ProjectChangeset};
use crate::repository::{
    DieselRepository, ListQuery, RecordReader, RepositoryError, RepositoryResult, diesel_find,
    diesel_record_writer,
};

impl RecordReader<Project> for DieselRepository {
    fn list_records(&self, query: &ListQuery) -> RepositoryResult<Vec<Project>> {
        use crate::schema::projects;

        let mut conn = self.conn()?;

        let mut items = projects::table
            .select(DbProject::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(company_id) = query.parent_id {
            items = items.filter(projects::company_id.eq(Some(company_id)));
        }

        items
            .order((projects::start_date.desc(), projects::id.desc()))
            .load::<DbProject>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Project>, _>>()
            .map_err(RepositoryError::from)
    }

    fn get_record(&self, id: ProjectId) -> RepositoryResult<Option<Project>> {
        diesel_find!(self, Project, projects, DbProject, id)
    }
}

diesel_record_writer!(
    Project,
    projects,
    DbProject,
    DbNewProject,
    ProjectChangeset,
    deletable
);

impl RecordReader<Contract> for DieselRepository {
    fn list_records(&self, query: &ListQuery) -> RepositoryResult<Vec<Contract>> {
        use crate::schema::contracts;

        let mut conn = self.conn()?;

        let mut items = contracts::table
            .select(DbContract::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(project_id) = query.parent_id {
            items = items.filter(contracts::project_id.eq(project_id));
        }

        items
            .order((contracts::number.asc(), contracts::id.asc()))
            .load::<DbContract>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Contract>, _>>()
            .map_err(RepositoryError::from)
    }

    fn get_record(&self, id: ContractId) -> RepositoryResult<Option<Contract>> {
        diesel_find!(self, Contract, contracts, DbContract, id)
    }
}

diesel_record_writer!(
    Contract,
    contracts,
    DbContract,
    DbNewContract,
    ContractChangeset,
    deletable
);
