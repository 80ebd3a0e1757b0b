use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::record::{Parented, Record};
use crate::domain::types::{
    CompanyId, Money, PartyId, ProjectId, ProjectName, ProjectStatus, VenueId,
};

/// A project or event run by a company, optionally at a venue for a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub company_id: Option<CompanyId>,
    pub venue_id: Option<VenueId>,
    pub client_id: Option<PartyId>,
    pub name: ProjectName,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Money,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProject {
    pub company_id: Option<CompanyId>,
    pub venue_id: Option<VenueId>,
    pub client_id: Option<PartyId>,
    pub name: ProjectName,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectPatch {
    pub company_id: Option<Option<CompanyId>>,
    pub venue_id: Option<Option<VenueId>>,
    pub client_id: Option<Option<PartyId>>,
    pub name: Option<ProjectName>,
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<Money>,
}

/// Embedded read-only view of a project, populated when joined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectRef {
    pub id: ProjectId,
    pub name: ProjectName,
}

impl Record for Project {
    type Id = ProjectId;
    type New = NewProject;
    type Patch = ProjectPatch;

    const ENTITY: &'static str = "project";

    fn id(&self) -> ProjectId {
        self.id
    }

    fn apply_patch(&mut self, patch: &ProjectPatch) {
        if let Some(company_id) = patch.company_id {
            self.company_id = company_id;
        }
        if let Some(venue_id) = patch.venue_id {
            self.venue_id = venue_id;
        }
        if let Some(client_id) = patch.client_id {
            self.client_id = client_id;
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(budget) = patch.budget {
            self.budget = budget;
        }
    }
}

impl Parented for Project {
    type ParentId = CompanyId;

    fn parent_id(&self) -> Option<CompanyId> {
        self.company_id
    }
}
