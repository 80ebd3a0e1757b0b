use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::project::{
    NewProject as DomainNewProject, Project as DomainProject, ProjectPatch as DomainProjectPatch,
    ProjectRef,
};
use crate::domain::types::{
    CompanyId, Money, PartyId, ProjectName, ProjectStatus, TypeConstraintError, VenueId,
};
use crate::models::touch;

/// Diesel model representing the `projects` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::projects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Project {
    pub id: i32,
    pub company_id: Option<i32>,
    pub venue_id: Option<i32>,
    pub client_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::projects)]
pub struct NewProject {
    pub company_id: Option<i32>,
    pub venue_id: Option<i32>,
    pub client_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget_cents: i64,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::projects)]
pub struct ProjectChangeset {
    pub company_id: Option<Option<i32>>,
    pub venue_id: Option<Option<i32>>,
    pub client_id: Option<Option<i32>>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget_cents: Option<i64>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Project> for DomainProject {
    type Error = TypeConstraintError;

    fn try_from(project: Project) -> Result<Self, Self::Error> {
        Ok(Self {
            id: project.id.try_into()?,
            company_id: project.company_id.map(CompanyId::new).transpose()?,
            venue_id: project.venue_id.map(VenueId::new).transpose()?,
            client_id: project.client_id.map(PartyId::new).transpose()?,
            name: ProjectName::new(project.name)?,
            description: project.description,
            status: ProjectStatus::try_from(project.status)?,
            start_date: project.start_date,
            end_date: project.end_date,
            budget: Money::from_cents(project.budget_cents),
            created_at: project.created_at,
            updated_at: project.updated_at,
        })
    }
}

/// Builds the embedded view from an `(id, name)` pair selected by a join.
pub fn project_ref(id: i32, name: String) -> Result<ProjectRef, TypeConstraintError> {
    Ok(ProjectRef {
        id: id.try_into()?,
        name: ProjectName::new(name)?,
    })
}

impl From<&DomainNewProject> for NewProject {
    fn from(project: &DomainNewProject) -> Self {
        Self {
            company_id: project.company_id.map(CompanyId::get),
            venue_id: project.venue_id.map(VenueId::get),
            client_id: project.client_id.map(PartyId::get),
            name: project.name.to_string(),
            description: project.description.clone(),
            status: project.status.into(),
            start_date: project.start_date,
            end_date: project.end_date,
            budget_cents: project.budget.cents(),
        }
    }
}

impl From<&DomainProjectPatch> for ProjectChangeset {
    fn from(patch: &DomainProjectPatch) -> Self {
        Self {
            company_id: patch.company_id.map(|id| id.map(CompanyId::get)),
            venue_id: patch.venue_id.map(|id| id.map(VenueId::get)),
            client_id: patch.client_id.map(|id| id.map(PartyId::get)),
            name: patch.name.as_ref().map(ToString::to_string),
            description: patch.description.clone(),
            status: patch.status.map(String::from),
            start_date: patch.start_date,
            end_date: patch.end_date,
            budget_cents: patch.budget.map(Money::cents),
            updated_at: touch(),
        }
    }
}
